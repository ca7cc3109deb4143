//! Format-preserving config file updates.
//!
//! Existing comments, ordering and unrelated keys survive; only the keys set
//! in the [`ConfigLayer`] are written.

use std::path::Path;

use toml_edit::{DocumentMut, value};

use crate::config::ConfigLayer;
use crate::error::AppError;

/// Apply `layer` to the TOML text `existing` and return the new document text.
pub fn update_document(existing: &str, layer: &ConfigLayer) -> Result<String, AppError> {
    let mut doc = existing
        .parse::<DocumentMut>()
        .map_err(|e| AppError::Validation(format!("Existing config is not valid TOML: {e}")))?;

    if let Some(base) = &layer.base_branch {
        doc["baseBranch"] = value(base.as_str());
    }
    if let Some(model) = &layer.model {
        doc["model"] = value(model.as_str());
    }
    if let Some(language) = &layer.language {
        doc["language"] = value(language.as_str());
    }
    if let Some(skip) = layer.skip_confirmations {
        doc["skipConfirmations"] = value(skip);
    }

    Ok(doc.to_string())
}

/// Write `layer` into the config file at `path`, creating parent directories.
pub fn write_config(path: &Path, layer: &ConfigLayer) -> Result<(), AppError> {
    let existing = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
        Err(e) => {
            return Err(AppError::unknown_with(
                format!("Failed to read {}", path.display()),
                e,
            ));
        }
    };

    let updated = update_document(&existing, layer)?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            AppError::unknown_with(format!("Failed to create {}", parent.display()), e)
        })?;
    }

    std::fs::write(path, updated)
        .map_err(|e| AppError::unknown_with(format!("Failed to write {}", path.display()), e))
}
