//! Registry document loading.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use argbind_core::{RegistryDocument, SchemaError};
use thiserror::Error;

/// Errors loading a registry document from disk.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid JSON in '{}': {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid YAML in '{}': {source}", .path.display())]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("unsupported registry file extension for '{}' (expected .json, .yaml or .yml)", .path.display())]
    Extension { path: PathBuf },
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// Loads a registry document, choosing the format by file extension.
///
/// # Errors
///
/// Returns [`LoadError::Io`] if the file cannot be opened,
/// [`LoadError::Json`] or [`LoadError::Yaml`] if it does not deserialize, and
/// [`LoadError::Extension`] for any other extension.
pub fn load_document(path: &Path) -> Result<RegistryDocument, LoadError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    let open = || {
        File::open(path).map(BufReader::new).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })
    };

    let document = match extension.as_deref() {
        Some("json") => serde_json::from_reader(open()?).map_err(|source| LoadError::Json {
            path: path.to_path_buf(),
            source,
        })?,
        Some("yaml" | "yml") => serde_yaml::from_reader(open()?).map_err(|source| LoadError::Yaml {
            path: path.to_path_buf(),
            source,
        })?,
        _ => {
            return Err(LoadError::Extension {
                path: path.to_path_buf(),
            });
        }
    };
    tracing::debug!(path = %path.display(), "loaded registry document");
    Ok(document)
}
