use config::{Config, Environment, File};
use serde::Deserialize;

use crate::error::Error;

const ENV_PREFIX: &str = "VMENV";

/// Configuration parameters of the host environment divided into categories.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct EnvSettings {
    #[serde(default)]
    pub heap: HeapSettings,
    #[serde(default)]
    pub memcpy: MemcpySettings,
}

/// Layout and growth limits of the guest heap.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct HeapSettings {
    /// Bytes at the bottom of the heap kept for guest static data.
    /// The first allocation starts right after them.
    #[serde(default)]
    pub reserved: usize,
    /// Initial capacity of the heap buffer
    #[serde(default = "default_capacity")]
    pub capacity: usize,
    /// Maximum heap length in bytes. Zero means unbounded.
    #[serde(default)]
    pub limit: usize,
}

/// Behaviour of the `memcpy` native function.
#[derive(Debug, Deserialize, Clone, PartialEq, Default)]
pub struct MemcpySettings {
    #[serde(default)]
    pub overlap: OverlapPolicy,
}

/// Which overlapping ranges `memcpy` rejects.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum OverlapPolicy {
    /// Any overlap between source and destination is rejected
    #[default]
    Strict,
    /// Only `dest < src && dest + len > src` is rejected
    Forward,
}

impl OverlapPolicy {
    pub fn overlaps(&self, dest: u64, src: u64, length: u64) -> bool {
        let forward = dest < src && dest.saturating_add(length) > src;
        match self {
            Self::Forward => forward,
            Self::Strict => forward || (src < dest && src.saturating_add(length) > dest),
        }
    }
}

fn default_capacity() -> usize {
    64 * 1024
}

impl Default for HeapSettings {
    fn default() -> Self {
        Self {
            reserved: 0,
            capacity: default_capacity(),
            limit: 0,
        }
    }
}

impl Default for EnvSettings {
    fn default() -> Self {
        get_default_settings()
    }
}

impl EnvSettings {
    /// Loads the settings from an optional file (TOML or JSON, picked by extension)
    /// overridden by `VMENV_*` environment variables, e.g. `VMENV_HEAP__LIMIT=1048576`.
    /// Missing keys take their default value.
    pub fn load(path: Option<&str>) -> Result<Self, Error> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::with_name(path));
        }
        let settings = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;
        Ok(settings.try_deserialize::<EnvSettings>()?)
    }
}

/// Default settings: unbounded heap with no reserved area and strict `memcpy`.
pub fn get_default_settings() -> EnvSettings {
    EnvSettings {
        heap: HeapSettings::default(),
        memcpy: MemcpySettings::default(),
    }
}
