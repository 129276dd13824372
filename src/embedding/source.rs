//! Model identifier resolution.
//!
//! A model identifier is one of:
//! - `none` / empty: the stage is disabled
//! - `stub`: deterministic in-process backend (tests, offline runs)
//! - an existing local directory holding the model files
//! - a Hugging Face Hub repository id, fetched into the local hub cache

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::constants::{DISABLED_MODEL_ID, STUB_MODEL_ID};

use super::error::EmbeddingError;

/// Where a model-backed component gets its weights from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelSource {
    Disabled,
    Stub,
    Local(PathBuf),
    Hub(String),
}

impl ModelSource {
    /// Interprets a configured model identifier.
    pub fn parse(id: &str) -> Self {
        let id = id.trim();
        if id.is_empty()
            || id.eq_ignore_ascii_case(DISABLED_MODEL_ID)
            || id.eq_ignore_ascii_case("off")
        {
            return Self::Disabled;
        }
        if id.eq_ignore_ascii_case(STUB_MODEL_ID) {
            return Self::Stub;
        }

        let path = Path::new(id);
        if path.is_dir() {
            Self::Local(path.to_path_buf())
        } else {
            Self::Hub(id.to_string())
        }
    }

    pub fn is_disabled(&self) -> bool {
        matches!(self, Self::Disabled)
    }

    pub fn is_stub(&self) -> bool {
        matches!(self, Self::Stub)
    }

    /// Returns a directory containing every file in `files`.
    ///
    /// Local directories are checked in place; hub repositories are downloaded into the
    /// shared hub cache (a no-op when already cached).
    pub fn resolve_dir(&self, files: &[&str]) -> Result<PathBuf, EmbeddingError> {
        match self {
            Self::Disabled => Err(EmbeddingError::NotAvailable {
                reason: "model disabled by configuration".to_string(),
            }),
            Self::Stub => Err(EmbeddingError::InvalidConfig {
                reason: "stub models have no files".to_string(),
            }),
            Self::Local(dir) => {
                for file in files {
                    if !dir.join(file).exists() {
                        return Err(EmbeddingError::ModelLoadFailed {
                            reason: format!("Missing {} in {}", file, dir.display()),
                        });
                    }
                }
                debug!(model_dir = %dir.display(), "Using local model files");
                Ok(dir.clone())
            }
            Self::Hub(repo_id) => fetch_from_hub(repo_id, files),
        }
    }
}

impl fmt::Display for ModelSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disabled => write!(f, "{DISABLED_MODEL_ID}"),
            Self::Stub => write!(f, "{STUB_MODEL_ID}"),
            Self::Local(dir) => write!(f, "{}", dir.display()),
            Self::Hub(repo_id) => write!(f, "{repo_id}"),
        }
    }
}

fn fetch_from_hub(repo_id: &str, files: &[&str]) -> Result<PathBuf, EmbeddingError> {
    use hf_hub::api::sync::Api;

    info!(model = repo_id, "Fetching model files from Hugging Face Hub");

    let download_err = |file: &str, reason: String| EmbeddingError::DownloadFailed {
        model: repo_id.to_string(),
        file: file.to_string(),
        reason,
    };

    let api = Api::new().map_err(|e| download_err("*", e.to_string()))?;
    let repo = api.model(repo_id.to_string());

    let mut model_dir: Option<PathBuf> = None;
    for file in files {
        let path = repo.get(file).map_err(|e| download_err(file, e.to_string()))?;
        if model_dir.is_none() {
            model_dir = path.parent().map(Path::to_path_buf);
        }
    }

    model_dir.ok_or_else(|| EmbeddingError::InvalidConfig {
        reason: format!("no files requested for model '{repo_id}'"),
    })
}
