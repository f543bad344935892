pub mod fixtures;

pub use fixtures::{output_dir, read_all_files};
