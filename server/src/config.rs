//! Server-Konfiguration
//!
//! Wird beim Start aus einer TOML-Datei geladen. Alle Felder haben
//! sinnvolle Standardwerte, sodass der Bot ohne Konfigurationsdatei
//! lauffaehig ist. Nur die Publisher-ID sollte immer gesetzt werden.

use std::time::Duration;

use guidebot_broadcast::BroadcastConfig;
use guidebot_catalog::IngestConfig;
use guidebot_core::ClientId;
use guidebot_navigation::NavigationConfig;
use serde::{Deserialize, Serialize};

/// Vollstaendige Bot-Konfiguration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    pub bot: BotAbschnitt,
    pub netzwerk: NetzwerkEinstellungen,
    pub speicher: SpeicherEinstellungen,
    /// Tiefe der Hashtag-Pfade
    pub katalog: IngestConfig,
    pub navigation: NavigationEinstellungen,
    /// Versandtempo, Marker und Modus fuer Texte ohne Marker
    pub broadcast: BroadcastConfig,
    pub logging: LoggingEinstellungen,
    pub observability: ObservabilityEinstellungen,
}

/// Allgemeine Bot-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BotAbschnitt {
    /// Client-ID der Publisher-Quelle
    pub publisher: String,
}

impl Default for BotAbschnitt {
    fn default() -> Self {
        Self {
            publisher: "publisher".into(),
        }
    }
}

/// Netzwerk-Einstellungen des Gateways
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetzwerkEinstellungen {
    pub bind_adresse: String,
    /// Port des zeilenbasierten TCP-Gateways
    pub gateway_port: u16,
    /// Maximale gleichzeitige Verbindungen
    pub max_verbindungen: usize,
    /// Maximale Laenge einer Befehlszeile in Bytes
    pub zeilenlimit_bytes: usize,
}

impl Default for NetzwerkEinstellungen {
    fn default() -> Self {
        Self {
            bind_adresse: "0.0.0.0".into(),
            gateway_port: 7400,
            max_verbindungen: 1000,
            zeilenlimit_bytes: 8192,
        }
    }
}

/// Dateipfade fuer Katalog und Registry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeicherEinstellungen {
    pub katalog_datei: String,
    pub registry_datei: String,
}

impl Default for SpeicherEinstellungen {
    fn default() -> Self {
        Self {
            katalog_datei: "data/guides.json".into(),
            registry_datei: "data/clients.json".into(),
        }
    }
}

/// Navigations- und Session-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigationEinstellungen {
    pub auto_view: bool,
    /// Sessions ohne Aktivitaet werden nach dieser Zeit entfernt (Sekunden)
    pub leerlauf_secs: u64,
    /// Abstand zwischen zwei Bereinigungslaeufen (Sekunden)
    pub cleanup_intervall_secs: u64,
}

impl Default for NavigationEinstellungen {
    fn default() -> Self {
        Self {
            auto_view: false,
            leerlauf_secs: 3600,
            cleanup_intervall_secs: 300,
        }
    }
}

impl NavigationEinstellungen {
    pub fn navigation_config(&self) -> NavigationConfig {
        NavigationConfig {
            auto_view: self.auto_view,
        }
    }

    pub fn leerlauf(&self) -> Duration {
        Duration::from_secs(self.leerlauf_secs)
    }

    pub fn cleanup_intervall(&self) -> Duration {
        // tokio::time::interval akzeptiert keine Null-Periode
        Duration::from_secs(self.cleanup_intervall_secs.max(1))
    }
}

/// Logging-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingEinstellungen {
    /// Log-Level: "trace", "debug", "info", "warn", "error"
    pub level: String,
    /// Format: "json" oder "text"
    pub format: String,
}

impl Default for LoggingEinstellungen {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "text".into(),
        }
    }
}

/// Observability-Einstellungen (Metriken + Health-Check)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityEinstellungen {
    /// Aktiviert den Observability-Server
    pub aktiviert: bool,
    /// Port fuer Metriken und Health (Standard: 9300)
    pub port: u16,
}

impl Default for ObservabilityEinstellungen {
    fn default() -> Self {
        Self {
            aktiviert: true,
            port: 9300,
        }
    }
}

impl BotConfig {
    /// Laedt die Konfiguration aus einer TOML-Datei.
    /// Gibt die Standardkonfiguration zurueck wenn die Datei nicht existiert.
    pub fn laden(pfad: &str) -> anyhow::Result<Self> {
        match std::fs::read_to_string(pfad) {
            Ok(inhalt) => {
                let config: Self = toml::from_str(&inhalt)
                    .map_err(|e| anyhow::anyhow!("Konfigurationsfehler in '{pfad}': {e}"))?;
                config.pruefen()?;
                Ok(config)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(
                    pfad = pfad,
                    "Konfigurationsdatei nicht gefunden, verwende Standardwerte"
                );
                Ok(Self::default())
            }
            Err(e) => Err(anyhow::anyhow!(
                "Konfigurationsdatei '{pfad}' nicht lesbar: {e}"
            )),
        }
    }

    /// Prueft Werte, die serde allein nicht ablehnen kann
    pub fn pruefen(&self) -> anyhow::Result<()> {
        if self.bot.publisher.trim().is_empty() {
            anyhow::bail!("[bot] publisher darf nicht leer sein");
        }
        if self.broadcast.marker.trim().is_empty() {
            anyhow::bail!("[broadcast] marker darf nicht leer sein");
        }
        if let Some(max) = self.katalog.max_tiefe {
            if max < self.katalog.min_tiefe {
                anyhow::bail!(
                    "[katalog] max_tiefe ({max}) ist kleiner als min_tiefe ({})",
                    self.katalog.min_tiefe
                );
            }
        }
        if self.katalog.min_tiefe == 0 {
            anyhow::bail!("[katalog] min_tiefe muss mindestens 1 sein");
        }
        Ok(())
    }

    pub fn publisher(&self) -> ClientId {
        ClientId::new(self.bot.publisher.trim())
    }

    /// Gibt die Bind-Adresse fuer das TCP-Gateway zurueck
    pub fn gateway_bind_adresse(&self) -> String {
        format!("{}:{}", self.netzwerk.bind_adresse, self.netzwerk.gateway_port)
    }

    /// Gibt die Bind-Adresse fuer den Observability-Server zurueck
    pub fn observability_bind_adresse(&self) -> String {
        format!("{}:{}", self.netzwerk.bind_adresse, self.observability.port)
    }
}
