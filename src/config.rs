//! Generator configuration.
//!
//! Handles loading, validating, and merging `config.toml`. Stock defaults are
//! overridden by an optional `config.toml` in the module directory (or a file
//! passed with `--config`). The config is built once per run and handed to the
//! pipeline; nothing reads it from global state.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [assets]
//! scripts = ["...jquery.min.js", "...codemirror.js", "skulpt/skulpt.js", ...]
//! styles = ["...pure-min.css", "...font-awesome.min.css", "common.css", ...]
//!
//! [manifest]
//! extension = "imcodes"     # Manifest file extension
//!
//! [copy]
//! skip_extensions = ["imcodes", "md", "markdown", "yaml"]
//!
//! [processing]
//! max_processes = 4         # Max parallel render workers (omit for auto)
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse — override just the values you want:
//!
//! ```toml
//! [assets]
//! styles = ["theme.css"]
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Name of the optional config file inside a module directory.
pub const CONFIG_FILENAME: &str = "config.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Generator configuration loaded from `config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Script and stylesheet URLs included on every page.
    pub assets: AssetsConfig,
    /// Manifest discovery settings.
    pub manifest: ManifestConfig,
    /// Passthrough asset copy settings.
    pub copy: CopyConfig,
    /// Parallel rendering settings.
    pub processing: ProcessingConfig,
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.manifest.extension.trim().is_empty() {
            return Err(ConfigError::Validation(
                "manifest.extension must not be empty".into(),
            ));
        }
        if self.manifest.extension.starts_with('.') {
            return Err(ConfigError::Validation(
                "manifest.extension must not start with a dot".into(),
            ));
        }
        if self
            .assets
            .scripts
            .iter()
            .chain(&self.assets.styles)
            .any(|url| url.trim().is_empty())
        {
            return Err(ConfigError::Validation(
                "assets.scripts and assets.styles must not contain empty URLs".into(),
            ));
        }
        if self.processing.max_processes == Some(0) {
            return Err(ConfigError::Validation(
                "processing.max_processes must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Page-wide script and stylesheet URLs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AssetsConfig {
    /// Script URLs, emitted as `<script src>` at the end of every page.
    pub scripts: Vec<String>,
    /// Stylesheet URLs, emitted as `<link rel="stylesheet">` in every head.
    pub styles: Vec<String>,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            scripts: vec![
                "http://ajax.googleapis.com/ajax/libs/jquery/2.1.1/jquery.min.js".to_string(),
                "http://cdnjs.cloudflare.com/ajax/libs/codemirror/4.6.0/codemirror.js".to_string(),
                "http://cdnjs.cloudflare.com/ajax/libs/codemirror/4.6.0/mode/javascript/javascript.min.js".to_string(),
                "http://cdnjs.cloudflare.com/ajax/libs/codemirror/4.6.0/mode/python/python.min.js".to_string(),
                "skulpt/skulpt.js".to_string(),
                "skulpt/skulpt-stdlib.js".to_string(),
            ],
            styles: vec![
                "http://yui.yahooapis.com/pure/0.5.0/pure-min.css".to_string(),
                "http://maxcdn.bootstrapcdn.com/font-awesome/4.2.0/css/font-awesome.min.css".to_string(),
                "http://cdnjs.cloudflare.com/ajax/libs/codemirror/4.6.0/codemirror.min.css".to_string(),
                "common.css".to_string(),
            ],
        }
    }
}

/// Manifest discovery settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ManifestConfig {
    /// File extension (without the dot) identifying the module manifest.
    pub extension: String,
}

impl Default for ManifestConfig {
    fn default() -> Self {
        Self {
            extension: "imcodes".to_string(),
        }
    }
}

/// Passthrough asset copy settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CopyConfig {
    /// Extensions (case-insensitive, without the dot) never copied to output.
    pub skip_extensions: Vec<String>,
}

impl Default for CopyConfig {
    fn default() -> Self {
        Self {
            skip_extensions: ["imcodes", "md", "markdown", "yaml"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

impl CopyConfig {
    pub fn skips_extension(&self, ext: &str) -> bool {
        self.skip_extensions
            .iter()
            .any(|skip| skip.eq_ignore_ascii_case(ext))
    }
}

/// Parallel rendering settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel render workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config.max_processes.map(|n| n.min(cores)).unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(SiteConfig::default())
        .map_err(|e| ConfigError::Validation(format!("stock defaults do not serialize: {e}")))
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely, so an overlay
///   `styles = [..]` replaces the stock list rather than appending to it.
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

/// Merge an optional overlay onto the stock defaults, deserialize and validate.
pub fn resolve_config(overlay: Option<toml::Value>) -> Result<SiteConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from an explicit file. The file must exist.
pub fn load_config_file(path: &Path) -> Result<SiteConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    resolve_config(Some(value))
}

/// Load config from `config.toml` in the module directory.
///
/// Uses the stock defaults when the directory has no `config.toml`.
pub fn load_config(dir: &Path) -> Result<SiteConfig, ConfigError> {
    let path = dir.join(CONFIG_FILENAME);
    if !path.exists() {
        return resolve_config(None);
    }
    load_config_file(&path)
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `--print-config` CLI flag.
pub fn stock_config_toml() -> &'static str {
    r##"# Lesson Pages Configuration
# ==========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Place this file as config.toml in the module directory, or pass it with
# --config. Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Page assets
# ---------------------------------------------------------------------------
[assets]
# Scripts loaded at the end of every page, in order.
scripts = [
    "http://ajax.googleapis.com/ajax/libs/jquery/2.1.1/jquery.min.js",
    "http://cdnjs.cloudflare.com/ajax/libs/codemirror/4.6.0/codemirror.js",
    "http://cdnjs.cloudflare.com/ajax/libs/codemirror/4.6.0/mode/javascript/javascript.min.js",
    "http://cdnjs.cloudflare.com/ajax/libs/codemirror/4.6.0/mode/python/python.min.js",
    "skulpt/skulpt.js",
    "skulpt/skulpt-stdlib.js",
]

# Stylesheets linked from every page head, in order.
styles = [
    "http://yui.yahooapis.com/pure/0.5.0/pure-min.css",
    "http://maxcdn.bootstrapcdn.com/font-awesome/4.2.0/css/font-awesome.min.css",
    "http://cdnjs.cloudflare.com/ajax/libs/codemirror/4.6.0/codemirror.min.css",
    "common.css",
]

# ---------------------------------------------------------------------------
# Manifest
# ---------------------------------------------------------------------------
[manifest]
# Extension of the module manifest. Exactly one such file must exist at the
# top of the module directory.
extension = "imcodes"

# ---------------------------------------------------------------------------
# Passthrough copy
# ---------------------------------------------------------------------------
[copy]
# Files with these extensions are sources, not assets, and are not copied.
# Timeline files referenced by steps and config.toml are never copied either.
skip_extensions = ["imcodes", "md", "markdown", "yaml"]

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel render workers.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}
