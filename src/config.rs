//! Engine configuration.
//!
//! Handles loading, validating, and merging a `tessera.toml` file. Stock
//! defaults are the base layer; a user file overrides only the keys it sets.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [tiling]
//! tile_size = 256           # Tile edge in pixels (128-512)
//! max_concurrency = 4       # Tiles filtered at once (1-8)
//! seam_policy = "clamp"     # "clamp" or "halo"
//!
//! [cache]
//! max_entries = 20          # Cached filter results
//! max_bytes = 52428800      # Total pixel bytes held by the cache (50 MiB)
//!
//! [output]
//! quality = "high"          # low | medium | high | max
//!
//! [preview]
//! max_size = 512            # Longer edge of preview renders
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::tiling::SeamPolicy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

pub const MIN_TILE_SIZE: u32 = 128;
pub const MAX_TILE_SIZE: u32 = 512;
pub const MAX_CONCURRENCY: usize = 8;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Engine configuration loaded from TOML.
///
/// All fields have defaults. User config files need only specify the values
/// they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Tile partition and worker pool.
    pub tiling: TilingConfig,
    /// Filter result cache bounds.
    pub cache: CacheConfig,
    /// Encoder settings used when saving results.
    pub output: OutputConfig,
    /// Preview rendering.
    pub preview: PreviewConfig,
}

impl EngineConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_TILE_SIZE..=MAX_TILE_SIZE).contains(&self.tiling.tile_size) {
            return Err(ConfigError::Validation(format!(
                "tiling.tile_size must be {MIN_TILE_SIZE}-{MAX_TILE_SIZE}"
            )));
        }
        if !(1..=MAX_CONCURRENCY).contains(&self.tiling.max_concurrency) {
            return Err(ConfigError::Validation(format!(
                "tiling.max_concurrency must be 1-{MAX_CONCURRENCY}"
            )));
        }
        if self.cache.max_entries == 0 {
            return Err(ConfigError::Validation(
                "cache.max_entries must be at least 1".into(),
            ));
        }
        if self.cache.max_bytes == 0 {
            return Err(ConfigError::Validation(
                "cache.max_bytes must be at least 1".into(),
            ));
        }
        if self.preview.max_size == 0 {
            return Err(ConfigError::Validation(
                "preview.max_size must be non-zero".into(),
            ));
        }
        Ok(())
    }
}

/// Tile partition and worker pool settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TilingConfig {
    /// Edge length of a full tile in pixels.
    pub tile_size: u32,
    /// Maximum number of tiles filtered concurrently.
    pub max_concurrency: usize,
    /// How neighbourhood filters treat tile boundaries.
    pub seam_policy: SeamPolicy,
}

impl Default for TilingConfig {
    fn default() -> Self {
        Self {
            tile_size: 256,
            max_concurrency: 4,
            seam_policy: SeamPolicy::Clamp,
        }
    }
}

/// Result cache bounds. Whichever limit is hit first triggers eviction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CacheConfig {
    pub max_entries: usize,
    pub max_bytes: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 20,
            max_bytes: 50 * 1024 * 1024,
        }
    }
}

/// Compression quality category passed to the encoder on save.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionQuality {
    Low,
    Medium,
    #[default]
    High,
    Max,
}

impl CompressionQuality {
    /// Encoder quality, 0-100.
    pub fn value(self) -> u8 {
        match self {
            CompressionQuality::Low => 60,
            CompressionQuality::Medium => 80,
            CompressionQuality::High => 95,
            CompressionQuality::Max => 100,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    pub quality: CompressionQuality,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PreviewConfig {
    /// Longer edge of preview renders; smaller sources are not upscaled.
    pub max_size: u32,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self { max_size: 512 }
    }
}

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(EngineConfig::default())
        .map_err(|e| ConfigError::Validation(format!("default config must serialize: {e}")))
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Read a config file as a raw TOML value.
pub fn load_raw_config(path: &Path) -> Result<toml::Value, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<EngineConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: EngineConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `path`, or stock defaults when no path is given.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(path: Option<&Path>) -> Result<EngineConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = path.map(load_raw_config).transpose()?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock config with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Tessera Configuration
# =====================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Pass the file with `tessera --config tessera.toml <command>`.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Tiling
# ---------------------------------------------------------------------------
[tiling]
# Edge length of a tile in pixels (128-512). Edge tiles are truncated.
tile_size = 256

# Maximum tiles filtered at the same time (1-8).
max_concurrency = 4

# How blur, sharpen and edge detection treat tile boundaries:
#   "clamp" - filter each tile on its own (tile edges act as image edges)
#   "halo"  - borrow neighbouring pixels so output matches the whole image
seam_policy = "clamp"

# ---------------------------------------------------------------------------
# Result cache
# ---------------------------------------------------------------------------
[cache]
# Maximum number of cached filter results.
max_entries = 20

# Maximum total pixel bytes held by the cache (default 50 MiB).
max_bytes = 52428800

# ---------------------------------------------------------------------------
# Output
# ---------------------------------------------------------------------------
[output]
# JPEG quality category: "low" (60), "medium" (80), "high" (95), "max" (100).
quality = "high"

# ---------------------------------------------------------------------------
# Preview
# ---------------------------------------------------------------------------
[preview]
# Longer edge of preview renders in pixels. Smaller images are not upscaled.
max_size = 512
"##
}
