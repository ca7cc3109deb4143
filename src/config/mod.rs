//! Layered configuration: defaults < global file < project file < CLI.
//!
//! Each source is a [`ConfigLayer`] of optional fields; [`ResolvedConfig`] is
//! the immutable result of merging them in order, later sources winning per
//! field.

pub mod writer;

use std::path::{Path, PathBuf};

use git2::Repository;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::AppError;

pub const DEFAULT_BASE_BRANCH: &str = "main";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_LANGUAGE: &str = "English";

/// File name of the per-repository config, at the working-copy root.
pub const PROJECT_CONFIG_FILE: &str = ".quill.toml";

/// One configuration source. `None` fields defer to earlier layers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ConfigLayer {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_branch: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip_confirmations: Option<bool>,
}

impl ConfigLayer {
    /// Overlay `over` on top of `self`; fields set in `over` win.
    pub fn merge(self, over: ConfigLayer) -> ConfigLayer {
        ConfigLayer {
            base_branch: over.base_branch.or(self.base_branch),
            model: over.model.or(self.model),
            language: over.language.or(self.language),
            skip_confirmations: over.skip_confirmations.or(self.skip_confirmations),
        }
    }

    pub fn defaults() -> ConfigLayer {
        ConfigLayer {
            base_branch: Some(DEFAULT_BASE_BRANCH.to_string()),
            model: Some(DEFAULT_MODEL.to_string()),
            language: Some(DEFAULT_LANGUAGE.to_string()),
            skip_confirmations: Some(false),
        }
    }
}

/// Fully-resolved settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    pub base_branch: String,
    pub model: String,
    pub language: String,
    pub skip_confirmations: bool,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self::resolve(std::iter::empty())
    }
}

impl ResolvedConfig {
    /// Merge `layers` (lowest precedence first) over the built-in defaults.
    pub fn resolve(layers: impl IntoIterator<Item = ConfigLayer>) -> Self {
        let merged = layers
            .into_iter()
            .fold(ConfigLayer::defaults(), ConfigLayer::merge);

        ResolvedConfig {
            base_branch: merged
                .base_branch
                .unwrap_or_else(|| DEFAULT_BASE_BRANCH.to_string()),
            model: merged.model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            language: merged
                .language
                .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
            skip_confirmations: merged.skip_confirmations.unwrap_or(false),
        }
    }

    pub fn as_layer(&self) -> ConfigLayer {
        ConfigLayer {
            base_branch: Some(self.base_branch.clone()),
            model: Some(self.model.clone()),
            language: Some(self.language.clone()),
            skip_confirmations: Some(self.skip_confirmations),
        }
    }
}

/// `<config dir>/quill/config.toml`, if the platform has a config dir.
pub fn global_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("quill").join("config.toml"))
}

/// `.quill.toml` at the root of the working copy containing `start`.
pub fn project_config_path(start: &Path) -> Option<PathBuf> {
    let repo = Repository::discover(start).ok()?;
    repo.workdir().map(|root| root.join(PROJECT_CONFIG_FILE))
}

/// Read one config file. A missing file is `Ok(None)`.
pub fn load_layer(path: &Path) -> Result<Option<ConfigLayer>, AppError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(AppError::unknown_with(
                format!("Failed to read config file {}", path.display()),
                e,
            ));
        }
    };

    parse_layer(&content)
        .map(Some)
        .map_err(|e| AppError::Validation(format!("Invalid config file {}: {}", path.display(), e)))
}

/// Parse TOML config text. Unknown keys are rejected.
pub fn parse_layer(content: &str) -> Result<ConfigLayer, toml::de::Error> {
    toml::from_str(content)
}

/// Resolve the run configuration for a working copy at `cwd`.
pub fn load(cwd: &Path, overrides: ConfigLayer) -> Result<ResolvedConfig, AppError> {
    let mut layers = Vec::new();

    for path in [global_config_path(), project_config_path(cwd)]
        .into_iter()
        .flatten()
    {
        if let Some(layer) = load_layer(&path)? {
            debug!("Loaded config from {}", path.display());
            layers.push(layer);
        }
    }

    layers.push(overrides);
    Ok(ResolvedConfig::resolve(layers))
}
