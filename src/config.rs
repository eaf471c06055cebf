//! Project configuration lookup for aliases and the local binary name.
//!
//! The reader walks from the project directory up to the filesystem root and
//! uses the first configuration file it finds. Within one directory an
//! `and-cli.toml` wins over a `package.json`.
//!
//! # `and-cli.toml`
//!
//! ```toml
//! [project]
//! bin = ["and-cli"]
//!
//! [aliases]
//! testdb = "dotnet --cli -- test db migrate"
//! ```
//!
//! # `package.json`
//!
//! ```json
//! {
//!   "name": "web",
//!   "bin": { "web-cli": "cli.js" },
//!   "and-cli": {
//!     "aliases": { "testdb": "dotnet --cli -- test db migrate" }
//!   }
//! }
//! ```
//!
//! Read failures never propagate out of [`PackageConfigReader::read`]; alias
//! support is optional and a broken file degrades to an empty configuration.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Dedicated configuration file name.
pub const CONFIG_FILE: &str = "and-cli.toml";

/// Package manifest consulted when no `and-cli.toml` is present.
pub const PACKAGE_JSON: &str = "package.json";

/// Environment variable naming an explicit configuration file.
pub const CONFIG_ENV: &str = "AND_CLI_CONFIG";

/// Key of the and-cli section inside `package.json`.
const PACKAGE_JSON_SECTION: &str = "and-cli";

/// Configuration relevant to command registration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ProjectConfig {
    /// Binary names declared by the local project, in declaration order
    #[serde(default)]
    pub bin: Vec<String>,
    /// Alias name -> expansion string
    #[serde(default)]
    pub aliases: BTreeMap<String, String>,
}

#[derive(Debug, Default, Deserialize)]
struct AndCliToml {
    #[serde(default)]
    project: ProjectSection,
    #[serde(default)]
    aliases: BTreeMap<String, String>,
}

#[derive(Debug, Default, Deserialize)]
struct ProjectSection {
    #[serde(default)]
    bin: Option<BinField>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum BinField {
    One(String),
    Many(Vec<String>),
}

impl BinField {
    fn into_names(self) -> Vec<String> {
        match self {
            BinField::One(name) => vec![name],
            BinField::Many(names) => names,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct PackageJson {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    bin: Option<serde_json::Value>,
    #[serde(rename = "and-cli", default)]
    and_cli: PackageJsonSection,
}

#[derive(Debug, Default, Deserialize)]
struct PackageJsonSection {
    #[serde(default)]
    aliases: BTreeMap<String, String>,
}

impl ProjectConfig {
    /// Parse an `and-cli.toml` document.
    pub fn parse_toml(content: &str) -> Result<Self> {
        let parsed: AndCliToml = toml::from_str(content).context("Failed to parse and-cli.toml")?;
        Ok(Self {
            bin: parsed
                .project
                .bin
                .map(BinField::into_names)
                .unwrap_or_default(),
            aliases: parsed.aliases,
        })
    }

    /// Parse a `package.json` document.
    ///
    /// A string `bin` declares a single binary named after the package; an
    /// object `bin` declares one binary per key.
    pub fn parse_package_json(content: &str) -> Result<Self> {
        let parsed: PackageJson =
            serde_json::from_str(content).context("Failed to parse package.json")?;

        let bin = match parsed.bin {
            Some(serde_json::Value::String(_)) => parsed.name.into_iter().collect(),
            Some(serde_json::Value::Object(map)) => map.keys().cloned().collect(),
            _ => Vec::new(),
        };

        Ok(Self {
            bin,
            aliases: parsed.and_cli.aliases,
        })
    }

    /// Load configuration from a file, choosing the format by file name.
    pub async fn load(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        if path.file_name().and_then(|n| n.to_str()) == Some(PACKAGE_JSON) {
            Self::parse_package_json(&content)
        } else {
            Self::parse_toml(&content)
        }
    }

    /// First binary name declared by the local project.
    pub fn local_bin_name(&self) -> Option<&str> {
        self.bin.first().map(String::as_str)
    }

    /// Whether the running CLI is consumed as a dependency of this project
    /// rather than developed in it.
    pub fn is_installed_dependency(&self, cli_name: &str) -> bool {
        self.local_bin_name() != Some(cli_name)
    }
}

/// Locates and reads the nearest project configuration.
#[derive(Debug, Clone)]
pub struct PackageConfigReader {
    start_dir: PathBuf,
    explicit: Option<PathBuf>,
}

impl PackageConfigReader {
    pub fn new(start_dir: impl AsRef<Path>) -> Self {
        Self {
            start_dir: start_dir.as_ref().to_path_buf(),
            explicit: None,
        }
    }

    /// Create a reader honoring the `AND_CLI_CONFIG` override.
    pub fn from_env(start_dir: impl AsRef<Path>) -> Self {
        let reader = Self::new(start_dir);
        match std::env::var_os(CONFIG_ENV) {
            Some(path) if !path.is_empty() => reader.with_file(PathBuf::from(path)),
            _ => reader,
        }
    }

    /// Read exactly this file instead of searching. Relative paths are
    /// taken from the start directory.
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        self.explicit = Some(if path.is_absolute() {
            path
        } else {
            self.start_dir.join(path)
        });
        self
    }

    pub fn start_dir(&self) -> &Path {
        &self.start_dir
    }

    /// Path of the configuration file that would be read, if any.
    pub fn find_nearest(&self) -> Option<PathBuf> {
        if let Some(explicit) = &self.explicit {
            return Some(explicit.clone());
        }

        self.start_dir.ancestors().find_map(|dir| {
            [CONFIG_FILE, PACKAGE_JSON]
                .iter()
                .map(|name| dir.join(name))
                .find(|candidate| candidate.is_file())
        })
    }

    /// Read the nearest configuration, propagating failures.
    ///
    /// Returns `Ok(None)` when no configuration file exists.
    pub async fn try_read(&self) -> Result<Option<(PathBuf, ProjectConfig)>> {
        let Some(path) = self.find_nearest() else {
            return Ok(None);
        };
        let config = ProjectConfig::load(&path).await?;
        Ok(Some((path, config)))
    }

    /// Read the nearest configuration, degrading to an empty one on any
    /// failure.
    pub async fn read(&self) -> ProjectConfig {
        match self.try_read().await {
            Ok(Some((path, config))) => {
                tracing::debug!(
                    path = %path.display(),
                    aliases = config.aliases.len(),
                    "Loaded project configuration"
                );
                config
            }
            Ok(None) => {
                tracing::debug!(
                    start_dir = %self.start_dir.display(),
                    "No project configuration found"
                );
                ProjectConfig::default()
            }
            Err(err) => {
                tracing::warn!("Ignoring project configuration: {:#}", err);
                ProjectConfig::default()
            }
        }
    }
}
