use crate::convert::Quality;
use crate::error::{DocshelfError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const CONFIG_FILENAME: &str = "config.json";

/// 10 MiB, the largest file the add operation accepts by default.
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;
const DEFAULT_SETTLE_DELAY_MS: u64 = 100;
const DEFAULT_JPEG_QUALITY: u8 = 85;

/// Keys accepted by `docshelf config`.
pub const CONFIG_KEYS: &[&str] = &[
    "max-upload-bytes",
    "default-quality",
    "settle-delay-ms",
    "jpeg-quality",
    "advanced-renderer",
];

/// Configuration for docshelf, stored in `<data dir>/config.json`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct ShelfConfig {
    /// Largest file accepted by `add`, checked before the file is read
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: u64,

    /// Conversion quality used when `convert` is not given one
    #[serde(default)]
    pub default_quality: Quality,

    /// Pause before rasterizing rendered HTML
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,

    /// JPEG quality (1-100) of rasterized PDF pages
    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u8,

    /// Whether the advanced Word renderer is available at all
    #[serde(default = "default_advanced_renderer")]
    pub advanced_renderer: bool,
}

fn default_max_upload_bytes() -> u64 {
    DEFAULT_MAX_UPLOAD_BYTES
}

fn default_settle_delay_ms() -> u64 {
    DEFAULT_SETTLE_DELAY_MS
}

fn default_jpeg_quality() -> u8 {
    DEFAULT_JPEG_QUALITY
}

fn default_advanced_renderer() -> bool {
    true
}

impl Default for ShelfConfig {
    fn default() -> Self {
        Self {
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            default_quality: Quality::default(),
            settle_delay_ms: DEFAULT_SETTLE_DELAY_MS,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            advanced_renderer: true,
        }
    }
}

impl ShelfConfig {
    /// Load config from the given directory, or return defaults if not found
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_path = config_dir.as_ref().join(CONFIG_FILENAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path).map_err(DocshelfError::Io)?;
        let config: ShelfConfig =
            serde_json::from_str(&content).map_err(DocshelfError::Serialization)?;
        Ok(config)
    }

    /// Save config to the given directory
    pub fn save<P: AsRef<Path>>(&self, config_dir: P) -> Result<()> {
        let config_dir = config_dir.as_ref();

        if !config_dir.exists() {
            fs::create_dir_all(config_dir).map_err(DocshelfError::Io)?;
        }

        let config_path = config_dir.join(CONFIG_FILENAME);
        let content = serde_json::to_string_pretty(self).map_err(DocshelfError::Serialization)?;
        fs::write(config_path, content).map_err(DocshelfError::Io)?;
        Ok(())
    }

    /// Current value of a config key, as shown by `docshelf config <key>`
    pub fn get(&self, key: &str) -> Result<String> {
        let value = match key {
            "max-upload-bytes" => self.max_upload_bytes.to_string(),
            "default-quality" => self.default_quality.to_string(),
            "settle-delay-ms" => self.settle_delay_ms.to_string(),
            "jpeg-quality" => self.jpeg_quality.to_string(),
            "advanced-renderer" => self.advanced_renderer.to_string(),
            other => return Err(unknown_key(other)),
        };
        Ok(value)
    }

    /// Parse and set a config key
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let invalid = |expected: &str| {
            DocshelfError::Validation(format!(
                "Invalid value for {}: {} (expected {})",
                key, value, expected
            ))
        };

        match key {
            "max-upload-bytes" => {
                self.max_upload_bytes = value.parse().map_err(|_| invalid("a byte count"))?;
            }
            "default-quality" => {
                self.default_quality = value.parse().map_err(|_| invalid("basic or advanced"))?;
            }
            "settle-delay-ms" => {
                self.settle_delay_ms = value.parse().map_err(|_| invalid("milliseconds"))?;
            }
            "jpeg-quality" => {
                let quality: u8 = value.parse().map_err(|_| invalid("1-100"))?;
                if !(1..=100).contains(&quality) {
                    return Err(invalid("1-100"));
                }
                self.jpeg_quality = quality;
            }
            "advanced-renderer" => {
                self.advanced_renderer = value.parse().map_err(|_| invalid("true or false"))?;
            }
            other => return Err(unknown_key(other)),
        }
        Ok(())
    }
}

fn unknown_key(key: &str) -> DocshelfError {
    DocshelfError::Validation(format!(
        "Unknown config key: {} (known keys: {})",
        key,
        CONFIG_KEYS.join(", ")
    ))
}
