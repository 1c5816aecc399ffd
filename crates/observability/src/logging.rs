//! Structured Logging Setup via tracing-subscriber
//!
//! Konfigurierbar per Umgebungsvariable (hat Vorrang vor der Konfigurationsdatei):
//! - `GB_LOG_LEVEL`: Filter-Direktive (z.B. `info` oder `guidebot_bot=debug`), Standard: info
//! - `GB_LOG_FORMAT`: Format (text/json), Standard: text

use std::str::FromStr;

use tracing_subscriber::{fmt, EnvFilter};

/// Umgebungsvariable fuer den Log-Filter
pub const ENV_LOG_LEVEL: &str = "GB_LOG_LEVEL";
/// Umgebungsvariable fuer das Log-Format
pub const ENV_LOG_FORMAT: &str = "GB_LOG_FORMAT";

/// Ausgabeformat der Logs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            andere => Err(format!("Unbekanntes Log-Format: {andere}")),
        }
    }
}

/// Initialisiert das Logging-System
///
/// `level` und `format` kommen aus der Konfiguration und werden von
/// `GB_LOG_LEVEL` / `GB_LOG_FORMAT` ueberschrieben. Ein unbekanntes Format
/// faellt auf Text zurueck.
pub fn logging_initialisieren(level: &str, format: &str) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_env(ENV_LOG_LEVEL)
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let format = log_format_bestimmen(std::env::var(ENV_LOG_FORMAT).ok().as_deref(), format);

    let ergebnis = match format {
        LogFormat::Json => fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .with_current_span(true)
            .try_init(),
        LogFormat::Text => fmt().with_env_filter(filter).with_target(true).try_init(),
    };
    ergebnis.map_err(|e| anyhow::anyhow!("Logging konnte nicht initialisiert werden: {e}"))
}

/// Waehlt das Format: Umgebung vor Konfiguration, sonst Text
pub fn log_format_bestimmen(umgebung: Option<&str>, konfiguriert: &str) -> LogFormat {
    umgebung
        .unwrap_or(konfiguriert)
        .parse()
        .unwrap_or(LogFormat::Text)
}

/// Validiert ob ein einfacher Log-Level-String gueltig ist
pub fn log_level_gueltig(level: &str) -> bool {
    matches!(level, "trace" | "debug" | "info" | "warn" | "error")
}
