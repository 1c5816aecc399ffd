//! Fehlertypen des TCP-Gateways

use guidebot_core::{ClientId, GuideError};
use thiserror::Error;

/// Alle moeglichen Fehler einer Gateway-Verbindung
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Protokollfehler: {0}")]
    Protokoll(String),

    #[error("Unbekannter Befehl: {0}")]
    UnbekannterBefehl(String),

    #[error("Pflicht-Parameter fehlt: {0}")]
    ParameterFehlt(String),

    #[error("Nicht angemeldet, zuerst 'hello id=...' senden")]
    NichtAngemeldet,

    #[error("Verbindung ist bereits angemeldet als {0}")]
    BereitsAngemeldet(ClientId),

    #[error("Befehl nur fuer die Publisher-Quelle erlaubt")]
    NurPublisher,

    #[error("Zeile zu lang (maximal {0} Bytes)")]
    ZeileZuLang(usize),

    #[error("Publisher-Quelle {0} ist bereits verbunden")]
    PublisherBelegt(ClientId),

    #[error(transparent)]
    Bot(#[from] GuideError),

    #[error("IO-Fehler: {0}")]
    Io(#[from] std::io::Error),
}

pub type GatewayResult<T> = Result<T, GatewayError>;

impl GatewayError {
    /// Fehler-Code fuer `error id=...`-Antworten
    pub fn fehler_code(&self) -> u32 {
        match self {
            Self::Protokoll(_) => 1000,
            Self::UnbekannterBefehl(_) => 1001,
            Self::ParameterFehlt(_) => 1002,
            Self::NichtAngemeldet => 1003,
            Self::BereitsAngemeldet(_) => 1004,
            Self::NurPublisher => 1005,
            Self::ZeileZuLang(_) => 1006,
            Self::PublisherBelegt(_) => 1007,
            Self::Bot(_) => 2000,
            Self::Io(_) => 5000,
        }
    }
}
