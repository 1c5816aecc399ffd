//! Fehlertypen fuer das Katalog-Crate

use guidebot_core::GuideError;
use thiserror::Error;

/// Katalog-Fehlertypen
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Kategorie nicht gefunden: {0}")]
    NichtGefunden(String),

    #[error("Zu wenige Hashtags: {gefunden} (Minimum: {minimum})")]
    ZuWenigeTags { gefunden: usize, minimum: usize },

    #[error("Zu viele Hashtags: {gefunden} (Maximum: {maximum})")]
    ZuVieleTags { gefunden: usize, maximum: usize },

    #[error("Speicher-Fehler: {0}")]
    SpeicherFehler(String),

    #[error("IO-Fehler: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON-Fehler: {0}")]
    Json(#[from] serde_json::Error),
}

impl CatalogError {
    /// Gibt true zurueck wenn die Eingabe des Publishers abgelehnt wurde
    pub fn ist_validierung(&self) -> bool {
        matches!(self, Self::ZuWenigeTags { .. } | Self::ZuVieleTags { .. })
    }
}

impl From<CatalogError> for GuideError {
    fn from(e: CatalogError) -> Self {
        match e {
            CatalogError::NichtGefunden(pfad) => GuideError::NichtGefunden(pfad),
            e @ (CatalogError::ZuWenigeTags { .. } | CatalogError::ZuVieleTags { .. }) => {
                GuideError::Validierung(e.to_string())
            }
            e => GuideError::Persistenz(e.to_string()),
        }
    }
}

pub type CatalogResult<T> = Result<T, CatalogError>;
