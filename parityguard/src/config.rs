//! Parity check configuration.
//!
//! Options live in the `update_xml` entry of the `[preflight]` table. The
//! entry is either a plain boolean or a table:
//!
//! ```toml
//! [preflight]
//! update_xml = true
//!
//! # or
//! [preflight.update_xml]
//! enabled = true
//! check_pcb_parity = true
//! as_warnings = false
//! kicad_version = "7.0.1"
//! ```
//!
//! The boolean form only toggles `enabled`.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::capability::{HostVersion, VersionParseError};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Error reading config {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid config: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("In `preflight.update_xml`: {0}")]
    InvalidEntry(String),
    #[error(transparent)]
    Version(#[from] VersionParseError),
}

/// Effective options for one parity run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParityOptions {
    /// Run the preflight at all.
    pub enabled: bool,
    /// Compare the schematic export against the board.
    pub check_pcb_parity: bool,
    /// Report discrepancies as warnings instead of failing.
    pub as_warnings: bool,
    /// Host version override; otherwise the board's reported version is used.
    pub kicad_version: Option<HostVersion>,
}

impl Default for ParityOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            check_pcb_parity: true,
            as_warnings: false,
            kicad_version: None,
        }
    }
}

impl ParityOptions {
    pub fn should_check(&self) -> bool {
        self.enabled && self.check_pcb_parity
    }

    /// Load options from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse options from TOML text. A document without an `update_xml`
    /// entry yields the defaults.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(content)?;
        let Some(entry) = file.preflight.update_xml else {
            return Ok(Self::default());
        };
        match entry {
            toml::Value::Boolean(enabled) => Ok(Self {
                enabled,
                check_pcb_parity: false,
                ..Self::default()
            }),
            toml::Value::Table(table) => {
                let raw: UpdateXmlOptions = toml::Value::Table(table)
                    .try_into()
                    .map_err(|e: toml::de::Error| ConfigError::InvalidEntry(e.message().to_string()))?;
                let kicad_version = raw
                    .kicad_version
                    .as_deref()
                    .map(str::parse::<HostVersion>)
                    .transpose()?;
                Ok(Self {
                    enabled: raw.enabled,
                    check_pcb_parity: raw.check_pcb_parity,
                    as_warnings: raw.as_warnings,
                    kicad_version,
                })
            }
            other => Err(ConfigError::InvalidEntry(format!(
                "must be boolean or table, found {}",
                other.type_str()
            ))),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    preflight: PreflightSection,
}

#[derive(Debug, Default, Deserialize)]
struct PreflightSection {
    update_xml: Option<toml::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct UpdateXmlOptions {
    #[serde(default = "default_true")]
    enabled: bool,
    #[serde(default)]
    check_pcb_parity: bool,
    #[serde(default)]
    as_warnings: bool,
    #[serde(default)]
    kicad_version: Option<String>,
}

fn default_true() -> bool {
    true
}
