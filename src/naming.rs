//! Unique file name generation.
//!
//! Names combine a UTC timestamp with second resolution and a random
//! suffix. The timestamp keeps files sortable by creation time; the suffix is
//! what prevents collisions between rapid or concurrent calls.

use std::path::{Path, PathBuf};

use chrono::Utc;
use rand::{Rng, distributions::Alphanumeric, thread_rng};

const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";
const SUFFIX_LEN: usize = 20;

/// Return `dir/{prefix}{timestamp}_{suffix}`.
///
/// # Examples
///
/// ```
/// let path = rotafile::naming::unique_file_name("/var/log/app", "events_");
/// let name = path.file_name().unwrap().to_string_lossy().into_owned();
/// assert!(name.starts_with("events_"));
/// ```
pub fn unique_file_name<P: AsRef<Path>>(dir: P, prefix: &str) -> PathBuf {
    let timestamp = Utc::now().format(TIMESTAMP_FORMAT);
    dir.as_ref()
        .join(format!("{prefix}{timestamp}_{}", random_suffix()))
}

fn random_suffix() -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SUFFIX_LEN)
        .map(|b| char::from(b).to_ascii_lowercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn name_contains_prefix() {
        let path = unique_file_name("/tmp", "my_prefix");
        let name = path.file_name().expect("file name").to_string_lossy();
        assert!(name.starts_with("my_prefix"));
        assert_eq!(path.parent(), Some(Path::new("/tmp")));
    }

    #[test]
    fn name_has_timestamp_and_suffix() {
        let path = unique_file_name("/tmp", "");
        let name = path.file_name().expect("file name").to_string_lossy();
        let (timestamp, suffix) = name.split_once('_').expect("separator");
        assert_eq!(timestamp.len(), 14);
        assert!(timestamp.chars().all(|c| c.is_ascii_digit()));
        assert_eq!(suffix.len(), SUFFIX_LEN);
        assert!(suffix.chars().all(|c| c.is_ascii_alphanumeric() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn rapid_calls_do_not_collide() {
        let names: HashSet<_> = (0..1000).map(|_| unique_file_name("/tmp", "events_")).collect();
        assert_eq!(names.len(), 1000);
    }
}
