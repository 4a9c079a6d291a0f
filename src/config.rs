//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/sitetree/sitetree.toml`
//! 3. Local config: `<dir>/.sitetree.toml`
//! 4. Environment variables: `SITETREE_*` prefix

use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;
use crate::domain::virtualization::{
    DEFAULT_CHILDREN_THRESHOLD, DEFAULT_OVERSCAN_ROWS, DEFAULT_ROW_HEIGHT_PX,
    DEFAULT_VIEWPORT_HEIGHT_PX,
};
use crate::domain::VirtualizationPolicy;

/// Recognized range for `children_threshold`.
pub const CHILDREN_THRESHOLD_RANGE: RangeInclusive<usize> = 0..=10_000;

/// Recognized range for `viewport_height_px`.
pub const VIEWPORT_HEIGHT_RANGE: RangeInclusive<u32> = 120..=2_000;

/// Recognized range for `row_height_px`.
pub const ROW_HEIGHT_RANGE: RangeInclusive<u32> = 1..=200;

/// Recognized range for `max_urls`.
pub const MAX_URLS_RANGE: RangeInclusive<usize> = 1_000..=2_000_000;

/// Default cap on URLs read from a source.
pub const DEFAULT_MAX_URLS: usize = 100_000;

/// Raw settings for intermediate parsing; `None` means "not specified".
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub children_threshold: Option<usize>,
    pub viewport_height_px: Option<u32>,
    pub row_height_px: Option<u32>,
    pub overscan_rows: Option<usize>,
    pub max_urls: Option<usize>,
}

/// Unified configuration for sitetree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Child count above which a node's children are windowed (0 = always)
    pub children_threshold: usize,
    /// Height of the scrolling window in pixels
    pub viewport_height_px: u32,
    /// Estimated fixed row height in pixels
    pub row_height_px: u32,
    /// Rows materialized beyond the visible range on each side
    pub overscan_rows: usize,
    /// Upper bound on URLs read from a source
    pub max_urls: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            children_threshold: DEFAULT_CHILDREN_THRESHOLD,
            viewport_height_px: DEFAULT_VIEWPORT_HEIGHT_PX,
            row_height_px: DEFAULT_ROW_HEIGHT_PX,
            overscan_rows: DEFAULT_OVERSCAN_ROWS,
            max_urls: DEFAULT_MAX_URLS,
        }
    }
}

/// Get the XDG config directory for sitetree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "sitetree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("sitetree.toml"))
}

/// Get the path to the local config file in a directory.
pub fn local_config_path(dir: &Path) -> PathBuf {
    dir.join(".sitetree.toml")
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Virtualization policy derived from these settings.
    pub fn policy(&self) -> VirtualizationPolicy {
        VirtualizationPolicy {
            children_threshold: self.children_threshold,
            viewport_height_px: self.viewport_height_px,
            row_height_px: self.row_height_px,
            overscan_rows: self.overscan_rows,
        }
    }

    /// Overlay wins where it specifies a value.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            children_threshold: overlay.children_threshold.unwrap_or(self.children_threshold),
            viewport_height_px: overlay.viewport_height_px.unwrap_or(self.viewport_height_px),
            row_height_px: overlay.row_height_px.unwrap_or(self.row_height_px),
            overscan_rows: overlay.overscan_rows.unwrap_or(self.overscan_rows),
            max_urls: overlay.max_urls.unwrap_or(self.max_urls),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `local_dir` - Optional directory holding a `.sitetree.toml`
    ///
    /// # Precedence (lowest to highest)
    /// 1. Compiled defaults
    /// 2. Global config: `$XDG_CONFIG_HOME/sitetree/sitetree.toml`
    /// 3. Local config: `<local_dir>/.sitetree.toml`
    /// 4. Environment variables: `SITETREE_*` prefix
    ///
    /// The merged result is validated against the recognized ranges.
    pub fn load(local_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                let raw = load_raw_settings(&global_path)?;
                current = current.merge_with(&raw);
            }
        }

        if let Some(dir) = local_dir {
            let local_path = local_config_path(dir);
            if local_path.exists() {
                let raw = load_raw_settings(&local_path)?;
                current = current.merge_with(&raw);
            }
        }

        current = Self::apply_env_overrides(current)?;
        current.validate()?;
        Ok(current)
    }

    /// Load only a specific TOML file on top of defaults (no global, no env).
    pub fn from_file(path: &Path) -> Result<Self, ApplicationError> {
        let raw = load_raw_settings(path)?;
        let settings = Self::default().merge_with(&raw);
        settings.validate()?;
        Ok(settings)
    }

    /// Apply SITETREE_* environment variables as explicit overrides.
    ///
    /// A variable that is set but does not parse is a config error.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(Environment::with_prefix("SITETREE").try_parsing(true))
            .build()
            .map_err(config_err)?;

        if let Some(val) = env_value(&config, "children_threshold")? {
            settings.children_threshold = val;
        }
        if let Some(val) = env_value(&config, "viewport_height_px")? {
            settings.viewport_height_px = val;
        }
        if let Some(val) = env_value(&config, "row_height_px")? {
            settings.row_height_px = val;
        }
        if let Some(val) = env_value(&config, "overscan_rows")? {
            settings.overscan_rows = val;
        }
        if let Some(val) = env_value(&config, "max_urls")? {
            settings.max_urls = val;
        }

        Ok(settings)
    }

    /// Reject values outside their recognized ranges.
    pub fn validate(&self) -> Result<(), ApplicationError> {
        check_range("children_threshold", self.children_threshold, &CHILDREN_THRESHOLD_RANGE)?;
        check_range("viewport_height_px", self.viewport_height_px, &VIEWPORT_HEIGHT_RANGE)?;
        check_range("row_height_px", self.row_height_px, &ROW_HEIGHT_RANGE)?;
        check_range("max_urls", self.max_urls, &MAX_URLS_RANGE)?;
        Ok(())
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# sitetree configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/sitetree/sitetree.toml
#   Local:  <dir>/.sitetree.toml
#   Env:    SITETREE_* environment variables (e.g. SITETREE_MAX_URLS=500000)

# Children above this count are drawn through a scrolling window.
# 0 windows every non-empty child list. Range 0..=10000.
# children_threshold = 100

# Height of the scrolling window in pixels. Range 120..=2000.
# viewport_height_px = 480

# Estimated fixed row height in pixels. Range 1..=200.
# row_height_px = 24

# Extra rows materialized above and below the visible range.
# overscan_rows = 3

# Maximum number of URLs read from a source. Range 1000..=2000000.
# max_urls = 100000
"#
        .to_string()
    }
}

fn check_range<T>(name: &str, value: T, range: &RangeInclusive<T>) -> Result<(), ApplicationError>
where
    T: PartialOrd + std::fmt::Display,
{
    if range.contains(&value) {
        Ok(())
    } else {
        Err(ApplicationError::Config {
            message: format!(
                "{name} = {value} is outside {}..={}",
                range.start(),
                range.end()
            ),
        })
    }
}

/// Read one override; `None` when the variable is not set.
fn env_value<T: DeserializeOwned>(config: &Config, key: &str) -> Result<Option<T>, ApplicationError> {
    match config.get::<T>(key) {
        Ok(val) => Ok(Some(val)),
        Err(ConfigError::NotFound(_)) => Ok(None),
        Err(e) => Err(ApplicationError::Config {
            message: format!("SITETREE_{}: {e}", key.to_uppercase()),
        }),
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
