//! Fehlertypen fuer den Guidebot
//!
//! Zentraler Fehler-Enum fuer Eingaben, Katalog, Speicher und Konfiguration.
//! Zustellfehler bleiben beim Transport (`ZustellFehler`) und werden pro
//! Empfaenger gezaehlt, nicht propagiert. Untermodule definieren eigene
//! Fehler und konvertieren via `From`.

use thiserror::Error;

/// Globaler Result-Alias fuer den Guidebot
pub type Result<T> = std::result::Result<T, GuideError>;

/// Alle moeglichen Fehler im Guidebot-System
#[derive(Debug, Error)]
pub enum GuideError {
    // --- Eingaben ---
    #[error("Ungueltige Eingabe: {0}")]
    Validierung(String),

    // --- Katalog & Navigation ---
    #[error("Nicht gefunden: {0}")]
    NichtGefunden(String),

    // --- Speicher ---
    #[error("Persistenzfehler: {0}")]
    Persistenz(String),

    // --- Konfiguration ---
    #[error("Konfigurationsfehler: {0}")]
    Konfiguration(String),
}

impl GuideError {
    /// Erstellt einen Persistenzfehler aus einer beliebigen Nachricht
    pub fn persistenz(msg: impl Into<String>) -> Self {
        Self::Persistenz(msg.into())
    }

    /// Gibt true zurueck wenn der Fehler beim naechsten Versuch verschwinden koennte
    ///
    /// Persistenzfehler betreffen nur die aktuelle Anfrage, die naechste
    /// Operation schreibt erneut.
    pub fn ist_wiederholbar(&self) -> bool {
        matches!(self, Self::Persistenz(_))
    }
}
