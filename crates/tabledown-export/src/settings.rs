//! Persisted exporter settings.
//!
//! Stored as JSON. Every field has a default, so a partial (or older) file
//! loads with the missing fields filled in.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tabledown::{CodeBlockStyle, HeadingStyle, TurndownOptions};
use tracing::debug;

use crate::error::SettingsError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExportSettings {
    /// Vault-relative file the exports are written to
    pub output_path: String,

    /// Class of the element holding the rendered document
    pub section_class: String,

    /// Class of the decoration stripped before conversion
    pub header_class: String,

    /// Heading line written above copied text
    pub copied_text_heading: String,

    /// `"setext"` or `"atx"`
    pub heading_style: String,

    /// `"indented"` or `"fenced"`
    pub code_block_style: String,

    pub bullet_list_marker: String,
    pub hr: String,
    pub fence: String,
    pub em_delimiter: String,
    pub strong_delimiter: String,
}

impl Default for ExportSettings {
    fn default() -> Self {
        let options = TurndownOptions::default();
        Self {
            output_path: "output.md".to_string(),
            section_class: "markdown-preview-section".to_string(),
            header_class: "mod-header".to_string(),
            copied_text_heading: "# Copied Text".to_string(),
            heading_style: "setext".to_string(),
            code_block_style: "indented".to_string(),
            bullet_list_marker: options.bullet_list_marker.to_string(),
            hr: options.hr,
            fence: options.fence,
            em_delimiter: options.em_delimiter.to_string(),
            strong_delimiter: options.strong_delimiter,
        }
    }
}

impl ExportSettings {
    /// Parse settings JSON, filling in defaults
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Load settings, or the defaults when the file does not exist yet.
    pub async fn load(path: &Path) -> Result<Self, SettingsError> {
        let json = match tokio::fs::read_to_string(path).await {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no settings file, using defaults");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(SettingsError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        Self::from_json(&json).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub async fn save(&self, path: &Path) -> Result<(), SettingsError> {
        let io_error = |source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        };

        let json = serde_json::to_string_pretty(self).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(io_error)?;
        }
        tokio::fs::write(path, json).await.map_err(io_error)
    }
}

/// Unknown or empty values keep the converter defaults.
impl From<&ExportSettings> for TurndownOptions {
    fn from(settings: &ExportSettings) -> Self {
        let mut result = TurndownOptions::default();

        result.heading_style = match settings.heading_style.to_lowercase().as_str() {
            "atx" => HeadingStyle::Atx,
            _ => HeadingStyle::Setext,
        };

        result.code_block_style = match settings.code_block_style.to_lowercase().as_str() {
            "fenced" => CodeBlockStyle::Fenced,
            _ => CodeBlockStyle::Indented,
        };

        if let Some(c) = settings.bullet_list_marker.chars().next() {
            result.bullet_list_marker = c;
        }

        if let Some(c) = settings.em_delimiter.chars().next() {
            result.em_delimiter = c;
        }

        if !settings.hr.is_empty() {
            result.hr = settings.hr.clone();
        }

        if !settings.fence.is_empty() {
            result.fence = settings.fence.clone();
        }

        if !settings.strong_delimiter.is_empty() {
            result.strong_delimiter = settings.strong_delimiter.clone();
        }

        result
    }
}
