//! Builders for pools and rotating controllers.
//!
//! Builders collect settings, validate them on `build` and report problems as
//! [`BuildError::InvalidConfig`]. The same builders can be populated from an
//! INI document through [`from_ini_str`] or [`from_ini_file`].

mod ini_file;

use std::{
    num::NonZeroU64,
    path::{Path, PathBuf},
    time::Duration,
};

use log::debug;

use crate::{
    error::BuildError,
    naming::unique_file_name,
    pool::ResourcePool,
    resource::{FileResource, FileResourceFactory, ResourceFactory},
    rotating::{RotationConfig, RotationController, RotationFailurePolicy},
};

pub use ini_file::{IniConfig, from_ini_file, from_ini_str};

fn ensure_directory(directory: &Path) -> Result<(), BuildError> {
    if directory.as_os_str().is_empty() {
        return Err(BuildError::InvalidConfig("directory must be set".into()));
    }
    Ok(())
}

/// Builder for [`RotationController`] instances.
///
/// # Examples
///
/// ```no_run
/// use std::time::Duration;
/// use rotafile::RotationControllerBuilder;
///
/// let controller = RotationControllerBuilder::new("/var/spool/events")
///     .with_prefix("events_")
///     .with_max_bytes(64 * 1024 * 1024)
///     .with_interval(Duration::from_secs(300))
///     .build()?;
/// controller.write(b"record\n")?;
/// controller.close()?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone, Debug)]
pub struct RotationControllerBuilder {
    directory: PathBuf,
    prefix: String,
    max_bytes: Option<NonZeroU64>,
    max_bytes_set: bool,
    interval: Option<Duration>,
    failure_policy: RotationFailurePolicy,
}

impl RotationControllerBuilder {
    /// Create a builder writing into `directory`.
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            prefix: String::new(),
            max_bytes: None,
            max_bytes_set: false,
            interval: None,
            failure_policy: RotationFailurePolicy::default(),
        }
    }

    /// Set the file name prefix.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Set the number of bytes after which the active file rotates. Must be
    /// greater than zero.
    pub fn with_max_bytes(mut self, max_bytes: u64) -> Self {
        self.max_bytes = NonZeroU64::new(max_bytes);
        self.max_bytes_set = true;
        self
    }

    /// Set the time after which a non-empty active file rotates.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = Some(interval);
        self
    }

    pub fn with_failure_policy(mut self, policy: RotationFailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    fn rotation_config(&self) -> Result<RotationConfig, BuildError> {
        ensure_directory(&self.directory)?;
        let max_bytes = match (self.max_bytes, self.max_bytes_set) {
            (Some(max_bytes), _) => max_bytes.get(),
            (None, true) => {
                return Err(BuildError::InvalidConfig(
                    "max_bytes must be greater than zero".into(),
                ));
            }
            (None, false) => {
                return Err(BuildError::InvalidConfig("max_bytes must be set".into()));
            }
        };
        let interval = self
            .interval
            .ok_or_else(|| BuildError::InvalidConfig("interval must be set".into()))?;
        let config =
            RotationConfig::new(max_bytes, interval).with_failure_policy(self.failure_policy);
        config.validate()?;
        Ok(config)
    }

    /// Build a controller writing [`FileResource`]s.
    pub fn build(&self) -> Result<RotationController<FileResourceFactory>, BuildError> {
        self.build_with_factory(FileResourceFactory)
    }

    /// Build a controller creating its resources through `factory`.
    pub fn build_with_factory<F: ResourceFactory>(
        &self,
        factory: F,
    ) -> Result<RotationController<F>, BuildError> {
        let config = self.rotation_config()?;
        RotationController::with_factory(
            self.directory.clone(),
            self.prefix.clone(),
            config,
            factory,
        )
    }
}

/// Builder for a [`ResourcePool`] of [`FileResource`]s.
///
/// Every pooled file receives its own unique name in the target directory.
#[derive(Clone, Debug)]
pub struct ResourcePoolBuilder {
    directory: PathBuf,
    prefix: String,
    size: Option<usize>,
}

impl ResourcePoolBuilder {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            prefix: String::new(),
            size: None,
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Set the number of pooled files. Must be greater than zero.
    pub fn with_size(mut self, size: usize) -> Self {
        self.size = Some(size);
        self
    }

    fn validate(&self) -> Result<usize, BuildError> {
        ensure_directory(&self.directory)?;
        match self.size {
            Some(0) => Err(BuildError::InvalidConfig(
                "size must be greater than zero".into(),
            )),
            Some(size) => Ok(size),
            None => Err(BuildError::InvalidConfig("size must be set".into())),
        }
    }

    /// Open the pooled files and build the pool.
    ///
    /// Files opened before a failure are closed again when the partially
    /// built set is dropped.
    pub fn build(&self) -> Result<ResourcePool<FileResource>, BuildError> {
        let size = self.validate()?;
        let resources = (0..size)
            .map(|_| FileResource::create(unique_file_name(&self.directory, &self.prefix)))
            .collect::<Result<Vec<_>, _>>()?;
        debug!(
            "ResourcePool: opened {size} files in {}",
            self.directory.display()
        );
        ResourcePool::new(resources)
    }
}
