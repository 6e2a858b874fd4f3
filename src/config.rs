//! Project configuration
//!
//! Read from a `csv2cmi.toml` next to the letter table (or in the working
//! directory). Every key is optional; the document falls back to
//! placeholders and logs what is missing.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::edition::EditionType;

pub const CONFIG_FILE: &str = "csv2cmi.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Could not read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub project: ProjectSection,
    /// Default edition, used when the table has no `edition` column
    pub edition: EditionSection,
    /// Full titles keyed by the short title used in the table
    pub editions: BTreeMap<String, EditionSection>,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct ProjectSection {
    pub title: Option<String>,
    pub editor: Vec<String>,
    pub publisher: Vec<String>,
    pub file_url: Option<String>,
    pub license: Option<String>,
    pub extra_delimiter: Option<String>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EditionSection {
    pub title: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum License {
    #[default]
    CcBy4,
    Cc0,
}

impl License {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim() {
            "CC-BY-4.0" => Some(License::CcBy4),
            "CC0-1.0" => Some(License::Cc0),
            _ => None,
        }
    }

    pub fn url(&self) -> &'static str {
        match self {
            License::CcBy4 => "https://creativecommons.org/licenses/by/4.0/",
            License::Cc0 => "https://creativecommons.org/publicdomain/zero/1.0/",
        }
    }

    pub fn text(&self) -> &'static str {
        match self {
            License::CcBy4 => {
                "This file is licensed under the terms of the Creative-Commons-License CC-BY 4.0."
            }
            License::Cc0 => "This file has been marked as dedicated to the public domain.",
        }
    }
}

impl Config {
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Find the configuration for a letter table: next to the table first,
    /// then in the working directory.
    pub fn locate(table: &Path) -> Option<PathBuf> {
        let beside = table
            .parent()
            .map(|dir| dir.join(CONFIG_FILE))
            .filter(|path| path.is_file());
        beside.or_else(|| {
            let local = PathBuf::from(CONFIG_FILE);
            local.is_file().then_some(local)
        })
    }

    pub fn license(&self) -> License {
        match self.project.license.as_deref() {
            None => License::default(),
            Some(name) => License::from_name(name).unwrap_or_else(|| {
                tracing::warn!("Unknown license {}, using CC-BY-4.0", name);
                License::default()
            }),
        }
    }

    /// Type of the editions created during the run.
    pub fn edition_type(&self) -> EditionType {
        match self.edition.kind.as_deref() {
            None => EditionType::default(),
            Some(kind) => kind.parse().unwrap_or_else(|_| {
                tracing::warn!("Unknown edition type {}, using print", kind);
                EditionType::default()
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[project]
title = "Letters of Jean Paul"
editor = ["Jane Doe <jane@example.org>", "John Roe"]
file_url = "https://example.org/letters.xml"
license = "CC0-1.0"
extra_delimiter = ";"

[edition]
title = "Sämtliche Briefe"
type = "hybrid"

[editions."SB"]
title = "Jean Paul: Sämtliche Briefe"
type = "online"
"#;

    #[test]
    fn test_parse_full_config() {
        let config = Config::from_toml(SAMPLE).expect("config should parse");

        assert_eq!(
            config.project.title.as_deref(),
            Some("Letters of Jean Paul")
        );
        assert_eq!(config.project.editor.len(), 2);
        assert!(config.project.publisher.is_empty());
        assert_eq!(config.project.extra_delimiter.as_deref(), Some(";"));
        assert_eq!(config.license(), License::Cc0);
        assert_eq!(config.edition_type(), EditionType::Hybrid);
        assert_eq!(
            config.editions["SB"].title.as_deref(),
            Some("Jean Paul: Sämtliche Briefe")
        );
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::from_toml("").expect("empty config should parse");

        assert_eq!(config.license(), License::CcBy4);
        assert_eq!(config.edition_type(), EditionType::Print);
        assert!(config.editions.is_empty());
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = Config::from_toml(
            r#"
[project]
license = "GPL"

[edition]
type = "manuscript"
"#,
        )
        .expect("config should parse");

        assert_eq!(config.license(), License::CcBy4);
        assert_eq!(config.edition_type(), EditionType::Print);
    }

    #[test]
    fn test_malformed_toml_is_an_error() {
        assert!(matches!(
            Config::from_toml("[project"),
            Err(ConfigError::Parse(_))
        ));
    }
}
