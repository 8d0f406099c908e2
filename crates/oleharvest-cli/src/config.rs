//! `.oleharvest.toml` discovery and merging
//!
//! Precedence order (highest to lowest):
//! 1. Command-line arguments
//! 2. Project config (`./.oleharvest.toml`)
//! 3. User config (`~/.oleharvest.toml`)
//! 4. Built-in defaults

use anyhow::{Context, Result};
use colored::Colorize;
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration file name, looked up in the home and working directories
pub const CONFIG_FILE_NAME: &str = ".oleharvest.toml";

/// Output directory used when neither the command line nor a config names one
pub const DEFAULT_OUTPUT_DIR: &str = "extracted";

/// Template written by `config init`
pub const DEFAULT_CONFIG_TEMPLATE: &str = r#"# oleharvest configuration file

# Default settings for the extract command
[extract]
# Directory artifacts are written to
# output_dir = "extracted"

# Containers nested deeper than this are kept as opaque files
# max_depth = 32

# Extensions removed from the output directory after extraction
# cleanup = ["bin"]

# Print the extraction report as JSON
# json = false
"#;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Default settings for the extract command
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extract: Option<ExtractConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    /// Default output directory
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,

    /// Default nesting limit
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_depth: Option<usize>,

    /// Extensions removed after extraction
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cleanup: Option<Vec<String>>,

    /// Default JSON report output
    #[serde(skip_serializing_if = "Option::is_none")]
    pub json: Option<bool>,
}

impl Config {
    /// Load configuration from file
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read or is not valid TOML for this schema.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content).map_err(|e| {
            eprintln!(
                "{} Failed to parse config file: {}",
                "Error:".red().bold(),
                path.display()
            );
            eprintln!("{} {}", "Parse error:".yellow().bold(), e);
            eprintln!();
            eprintln!("{} Configuration file syntax:", "Help:".cyan().bold());
            eprintln!("  [extract]");
            eprintln!("  output_dir = \"extracted\"");
            eprintln!("  max_depth = 32");
            eprintln!("  cleanup = [\"bin\"]");
            anyhow::anyhow!("Failed to parse config file: {e}")
        })
    }

    /// `~/.oleharvest.toml`, if a home directory is known
    #[must_use]
    pub fn user_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(CONFIG_FILE_NAME))
    }

    /// `./.oleharvest.toml`
    #[must_use]
    pub fn project_path() -> PathBuf {
        PathBuf::from(CONFIG_FILE_NAME)
    }

    /// Find and load configuration files
    /// Returns (`user_config`, `project_config`)
    #[must_use]
    pub fn discover() -> (Option<Self>, Option<Self>) {
        let user = Self::user_path().and_then(|path| Self::load_optional(&path, "user"));
        let project = Self::load_optional(&Self::project_path(), "project");
        (user, project)
    }

    /// Discovered configuration, merged
    #[must_use]
    pub fn load() -> Self {
        let (user, project) = Self::discover();
        Self::merge(user, project)
    }

    fn load_optional(path: &Path, scope: &str) -> Option<Self> {
        if !path.exists() {
            return None;
        }

        match Self::load_from_file(path) {
            Ok(config) => {
                debug!("Loaded {scope} config from {}", path.display());
                Some(config)
            }
            Err(e) => {
                eprintln!(
                    "{} Failed to load {scope} config from {}: {e}",
                    "Warning:".yellow().bold(),
                    path.display()
                );
                None
            }
        }
    }

    /// Merge configs key by key: project values override user values
    #[must_use]
    pub fn merge(user: Option<Self>, project: Option<Self>) -> Self {
        let mut merged = user.unwrap_or_default();

        if let Some(extract) = project.and_then(|p| p.extract) {
            let mut merged_extract = merged.extract.unwrap_or_default();
            if let Some(output_dir) = extract.output_dir {
                merged_extract.output_dir = Some(output_dir);
            }
            if let Some(max_depth) = extract.max_depth {
                merged_extract.max_depth = Some(max_depth);
            }
            if let Some(cleanup) = extract.cleanup {
                merged_extract.cleanup = Some(cleanup);
            }
            if let Some(json) = extract.json {
                merged_extract.json = Some(json);
            }
            merged.extract = Some(merged_extract);
        }

        merged
    }

    /// Extract settings, empty if none were configured
    #[must_use]
    pub fn extract_settings(&self) -> ExtractConfig {
        self.extract.clone().unwrap_or_default()
    }
}
