//! Fehlertypen fuer das Registry-Crate

use guidebot_core::GuideError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Registry konnte nicht gespeichert werden: {0}")]
    SpeicherFehler(String),

    #[error("IO-Fehler: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON-Fehler: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<RegistryError> for GuideError {
    fn from(e: RegistryError) -> Self {
        GuideError::Persistenz(e.to_string())
    }
}

pub type RegistryResult<T> = Result<T, RegistryError>;
