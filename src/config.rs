//! Build configuration module.
//!
//! Loads and validates `sophist.toml` from the source root. Anything the
//! file leaves out keeps its default.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! output_dir = "out"        # Where rendered pages are written
//! extension = "sphst"       # Extension of markup documents
//!
//! [build]
//! max_workers = 4           # Parallel compile workers (omit for auto = CPU cores)
//! skip_dirs = [".git", "node_modules"]
//!
//! [page]
//! lang = "en"               # <html lang>
//! charset = "utf-8"         # <meta charset> when `metatags` is set
//! viewport = "width=device-width, initial-scale=1"
//! ```
//!
//! Config files are sparse: override just the values you want. Unknown keys
//! are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

pub const CONFIG_FILE: &str = "sophist.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Configuration loaded from `sophist.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Output root; relative paths resolve against the source root.
    pub output_dir: String,
    /// Extension of markup documents, without the dot.
    pub extension: String,
    pub build: BuildConfig,
    pub page: PageConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            output_dir: "out".to_string(),
            extension: "sphst".to_string(),
            build: BuildConfig::default(),
            page: PageConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.extension.is_empty() || self.extension.contains(['.', '/', '\\']) {
            return Err(ConfigError::Validation(
                "extension must be a bare extension like \"sphst\"".into(),
            ));
        }
        if self.extension.eq_ignore_ascii_case("html") || self.extension.eq_ignore_ascii_case("css") {
            return Err(ConfigError::Validation(format!(
                "extension \"{}\" collides with generated or imported files",
                self.extension
            )));
        }
        if self.output_dir.trim().is_empty() {
            return Err(ConfigError::Validation("output_dir must not be empty".into()));
        }
        if self.build.max_workers == Some(0) {
            return Err(ConfigError::Validation(
                "build.max_workers must be at least 1".into(),
            ));
        }
        if self.page.lang.trim().is_empty() {
            return Err(ConfigError::Validation("page.lang must not be empty".into()));
        }
        Ok(())
    }
}

/// Directory build settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    /// Maximum number of parallel compile workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_workers: Option<usize>,
    /// Directory names never descended into.
    pub skip_dirs: Vec<String>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            max_workers: None,
            skip_dirs: vec![".git".to_string(), "node_modules".to_string()],
        }
    }
}

impl BuildConfig {
    /// Worker threads for a build: `max_workers` capped at the core count,
    /// or every core when unset.
    pub fn worker_threads(&self) -> usize {
        let cores = std::thread::available_parallelism().map_or(1, |n| n.get());
        match self.max_workers {
            Some(wanted) => wanted.min(cores),
            None => cores,
        }
    }
}

/// Page shell settings, used when a document sets `html5`/`metatags`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PageConfig {
    pub lang: String,
    pub charset: String,
    pub viewport: String,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            lang: "en".to_string(),
            charset: "utf-8".to_string(),
            viewport: "width=device-width, initial-scale=1".to_string(),
        }
    }
}

// =============================================================================
// Loading
// =============================================================================

/// Load `sophist.toml` from `root`, or the defaults when there is none.
///
/// Every table is `#[serde(default)]`, so a file only names what it changes
/// and a partial `[build]` keeps the other build defaults. Unknown keys and
/// invalid values are errors.
pub fn load_config(root: &Path) -> Result<SiteConfig, ConfigError> {
    let path = root.join(CONFIG_FILE);
    let config: SiteConfig = if path.is_file() {
        toml::from_str(&fs::read_to_string(&path)?)?
    } else {
        tracing::debug!(root = %root.display(), "No config file, using defaults");
        SiteConfig::default()
    };
    config.validate()?;
    Ok(config)
}

/// Returns a fully-commented stock `sophist.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Sophist Configuration
# =====================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Place this file in the source root as sophist.toml.
# Unknown keys will cause an error.

# Where rendered pages are written, relative to the source root.
output_dir = "out"

# Extension of markup documents (without the dot).
extension = "sphst"

# ---------------------------------------------------------------------------
# Directory builds
# ---------------------------------------------------------------------------
[build]
# Maximum parallel compile workers.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_workers = 4

# Directory names that are never descended into.
skip_dirs = [".git", "node_modules"]

# ---------------------------------------------------------------------------
# Page shell (documents with `html5` / `metatags`)
# ---------------------------------------------------------------------------
[page]
lang = "en"
charset = "utf-8"
viewport = "width=device-width, initial-scale=1"
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_values() {
        let config = SiteConfig::default();
        assert_eq!(config.output_dir, "out");
        assert_eq!(config.extension, "sphst");
        assert_eq!(config.build.max_workers, None);
        assert_eq!(config.build.skip_dirs, vec![".git", "node_modules"]);
        assert_eq!(config.page.lang, "en");
    }

    #[test]
    fn parse_partial_config() {
        let config: SiteConfig = toml::from_str(
            r#"
[page]
lang = "fr"
"#,
        )
        .unwrap();
        assert_eq!(config.page.lang, "fr");
        // Default values preserved
        assert_eq!(config.page.charset, "utf-8");
        assert_eq!(config.output_dir, "out");
    }

    // =========================================================================
    // load_config tests
    // =========================================================================

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.output_dir, "out");
    }

    #[test]
    fn load_config_reads_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILE),
            r#"
output_dir = "public"

[build]
max_workers = 2
"#,
        )
        .unwrap();

        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.output_dir, "public");
        assert_eq!(config.build.max_workers, Some(2));
        // skip_dirs survives a partial [build] table
        assert_eq!(config.build.skip_dirs, vec![".git", "node_modules"]);
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILE), "this is not valid toml [[[").unwrap();
        assert!(matches!(load_config(tmp.path()), Err(ConfigError::Toml(_))));
    }

    #[test]
    fn unknown_key_rejected_via_load_config() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILE), "[page]\nlanguage = \"en\"\n").unwrap();
        let err = load_config(tmp.path()).unwrap_err();
        assert!(err.to_string().contains("unknown field"));
    }

    #[test]
    fn unknown_section_rejected() {
        let result: Result<SiteConfig, _> = toml::from_str("[theme]\ncolor = \"red\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn load_config_arrays_replace_defaults() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILE), "[build]\nskip_dirs = [\"vendor\"]\n").unwrap();
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.build.skip_dirs, vec!["vendor"]);
        assert_eq!(config.build.max_workers, None);
        assert_eq!(config.page, PageConfig::default());
    }

    #[test]
    fn load_config_rejects_invalid_values() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILE), "output_dir = \"  \"\n").unwrap();
        assert!(matches!(
            load_config(tmp.path()),
            Err(ConfigError::Validation(_))
        ));
    }

    // =========================================================================
    // Worker threads
    // =========================================================================

    fn cores() -> usize {
        std::thread::available_parallelism().map_or(1, |n| n.get())
    }

    #[test]
    fn worker_threads_default_to_all_cores() {
        assert_eq!(BuildConfig::default().worker_threads(), cores());
    }

    #[test]
    fn worker_threads_never_exceed_cores() {
        let many = BuildConfig {
            max_workers: Some(99999),
            ..BuildConfig::default()
        };
        let one = BuildConfig {
            max_workers: Some(1),
            ..BuildConfig::default()
        };
        assert_eq!(many.worker_threads(), cores());
        assert_eq!(one.worker_threads(), 1);
    }

    // =========================================================================
    // Validation tests
    // =========================================================================

    #[test]
    fn validate_default_config_passes() {
        assert!(SiteConfig::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_dotted_extension() {
        let mut config = SiteConfig::default();
        config.extension = ".sphst".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn validate_rejects_html_extension() {
        let mut config = SiteConfig::default();
        config.extension = "HTML".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_workers() {
        let mut config = SiteConfig::default();
        config.build.max_workers = Some(0);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("max_workers"));
    }

    // =========================================================================
    // stock_config_toml tests
    // =========================================================================

    #[test]
    fn stock_config_toml_roundtrips_to_defaults() {
        let config: SiteConfig = toml::from_str(stock_config_toml()).unwrap();
        let defaults = SiteConfig::default();
        assert_eq!(config.output_dir, defaults.output_dir);
        assert_eq!(config.extension, defaults.extension);
        assert_eq!(config.build.skip_dirs, defaults.build.skip_dirs);
        assert_eq!(config.page, defaults.page);
    }
}
