use std::fs;
use std::path::Path;

use anyhow::Context;
use log::error;
use serde::Deserialize;

const DEFAULT_BOTS_COUNT: u32 = 10;
const DEFAULT_TREES_COUNT: u32 = 100;

/// Scene and host settings read from the properties file.
///
/// A missing or malformed file is logged and replaced by the defaults; the
/// demo always starts. Negative counts are folded to their absolute value
/// instead of being rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameProperties {
    pub bots_count: u32,
    pub trees_count: u32,
    pub window_width: u32,
    pub window_height: u32,
    pub gamma_correction: bool,
}

#[derive(Deserialize)]
#[serde(default)]
struct RawProperties {
    bots_count: i64,
    trees_count: i64,
    window_width: i64,
    window_height: i64,
    gamma_correction: bool,
}

impl Default for RawProperties {
    fn default() -> Self {
        Self {
            bots_count: i64::from(DEFAULT_BOTS_COUNT),
            trees_count: i64::from(DEFAULT_TREES_COUNT),
            window_width: 1280,
            window_height: 720,
            gamma_correction: true,
        }
    }
}

impl Default for GameProperties {
    fn default() -> Self {
        RawProperties::default().into()
    }
}

impl From<RawProperties> for GameProperties {
    fn from(raw: RawProperties) -> Self {
        Self {
            bots_count: fold_count(raw.bots_count),
            trees_count: fold_count(raw.trees_count),
            window_width: fold_count(raw.window_width),
            window_height: fold_count(raw.window_height),
            gamma_correction: raw.gamma_correction,
        }
    }
}

fn fold_count(value: i64) -> u32 {
    u32::try_from(value.unsigned_abs()).unwrap_or(u32::MAX)
}

impl GameProperties {
    /// Reads the properties file, falling back to defaults on any error.
    #[must_use]
    pub fn load(path: &Path) -> Self {
        match Self::try_load(path) {
            Ok(properties) => properties,
            Err(err) => {
                error!("reading game properties from {}: {err:#}", path.display());
                Self::default()
            }
        }
    }

    fn try_load(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("couldn't read {}", path.display()))?;
        let raw: RawProperties = serde_json::from_str(&contents)
            .with_context(|| format!("couldn't parse {}", path.display()))?;
        Ok(raw.into())
    }
}
