//! INI loading for pool and controller builders.
//!
//! ```ini
//! [rotation]
//! directory = /var/spool/events
//! prefix = events_
//! max_bytes = 1048576
//! interval_ms = 60000
//! failure_policy = propagate
//!
//! [pool]
//! directory = /var/spool/batches
//! prefix = batch_
//! size = 4
//! ```
//!
//! Both sections are optional; keys other than `directory` may be omitted
//! and are then left for the builder's own validation to report.

use std::{path::Path, str::FromStr, time::Duration};

use ini::{Ini, Properties};

use super::{ResourcePoolBuilder, RotationControllerBuilder};
use crate::{error::BuildError, rotating::RotationFailurePolicy};

/// Builders populated from an INI document.
#[derive(Clone, Debug, Default)]
pub struct IniConfig {
    /// Present when the document has a `[rotation]` section.
    pub rotation: Option<RotationControllerBuilder>,
    /// Present when the document has a `[pool]` section.
    pub pool: Option<ResourcePoolBuilder>,
}

/// Parse builders from INI text.
pub fn from_ini_str(text: &str) -> Result<IniConfig, BuildError> {
    let ini = Ini::load_from_str(text).map_err(ini::Error::Parse)?;
    parse_sections(&ini)
}

/// Read and parse builders from the INI file at `path`.
pub fn from_ini_file<P: AsRef<Path>>(path: P) -> Result<IniConfig, BuildError> {
    let ini = Ini::load_from_file(path)?;
    parse_sections(&ini)
}

fn parse_sections(ini: &Ini) -> Result<IniConfig, BuildError> {
    let rotation = ini
        .section(Some("rotation"))
        .map(rotation_builder)
        .transpose()?;
    let pool = ini.section(Some("pool")).map(pool_builder).transpose()?;
    Ok(IniConfig { rotation, pool })
}

fn rotation_builder(props: &Properties) -> Result<RotationControllerBuilder, BuildError> {
    let mut builder = RotationControllerBuilder::new(required(props, "rotation", "directory")?);
    if let Some(prefix) = props.get("prefix") {
        builder = builder.with_prefix(prefix);
    }
    if let Some(max_bytes) = number::<u64>(props, "rotation", "max_bytes")? {
        builder = builder.with_max_bytes(max_bytes);
    }
    if let Some(millis) = number::<u64>(props, "rotation", "interval_ms")? {
        builder = builder.with_interval(Duration::from_millis(millis));
    }
    if let Some(policy) = props.get("failure_policy") {
        builder = builder.with_failure_policy(RotationFailurePolicy::parse(policy)?);
    }
    Ok(builder)
}

fn pool_builder(props: &Properties) -> Result<ResourcePoolBuilder, BuildError> {
    let mut builder = ResourcePoolBuilder::new(required(props, "pool", "directory")?);
    if let Some(prefix) = props.get("prefix") {
        builder = builder.with_prefix(prefix);
    }
    if let Some(size) = number::<usize>(props, "pool", "size")? {
        builder = builder.with_size(size);
    }
    Ok(builder)
}

fn required<'a>(props: &'a Properties, section: &str, key: &str) -> Result<&'a str, BuildError> {
    props
        .get(key)
        .ok_or_else(|| BuildError::InvalidConfig(format!("[{section}] is missing '{key}'")))
}

fn number<T: FromStr>(props: &Properties, section: &str, key: &str) -> Result<Option<T>, BuildError>
where
    T::Err: std::fmt::Display,
{
    props
        .get(key)
        .map(|value| {
            value.trim().parse::<T>().map_err(|err| {
                BuildError::InvalidConfig(format!("[{section}] {key} = '{value}': {err}"))
            })
        })
        .transpose()
}
