//! Broadcast-Konfiguration und Versandmodus

use serde::{Deserialize, Serialize};

/// Marker fuer den Sofort-Versand, wenn nichts konfiguriert ist
pub const STANDARD_MARKER: &str = "#jetztsenden";

/// Konfiguration des Broadcast-Versands
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BroadcastConfig {
    /// Mindestabstand zwischen zwei Sendungen in Millisekunden
    pub verzoegerung_ms: u64,
    /// Maximal gleichzeitig laufende Sendungen (mindestens 1)
    pub parallelitaet: usize,
    /// Token, das einen Sofort-Versand mit Bericht ausloest
    pub marker: String,
    /// Modus fuer Textbeitraege ohne Marker
    pub normal_modus: BroadcastModus,
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self {
            verzoegerung_ms: 100,
            parallelitaet: 1,
            marker: STANDARD_MARKER.to_string(),
            normal_modus: BroadcastModus::Still,
        }
    }
}

/// Versandmodus eines Broadcasts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BroadcastModus {
    /// Marker entfernt, Bericht an den Publisher (auch bei leerer Registry)
    Sofort,
    /// Text unveraendert, Bericht an den Publisher
    Normal,
    /// Text unveraendert, kein Bericht
    Still,
}

impl BroadcastModus {
    /// Gibt true zurueck wenn der Publisher einen Bericht erhaelt
    pub fn mit_bericht(self) -> bool {
        !matches!(self, Self::Still)
    }
}

impl std::fmt::Display for BroadcastModus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Sofort => "sofort",
            Self::Normal => "normal",
            Self::Still => "still",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standardwerte() {
        let cfg = BroadcastConfig::default();
        assert_eq!(cfg.verzoegerung_ms, 100);
        assert_eq!(cfg.parallelitaet, 1);
        assert_eq!(cfg.normal_modus, BroadcastModus::Still);
    }

    #[test]
    fn bericht_nur_wenn_nicht_still() {
        assert!(BroadcastModus::Sofort.mit_bericht());
        assert!(BroadcastModus::Normal.mit_bericht());
        assert!(!BroadcastModus::Still.mit_bericht());
    }

    #[test]
    fn modus_deserialisieren() {
        #[derive(Deserialize)]
        struct Huelle {
            modus: BroadcastModus,
        }
        let h: Huelle = serde_json::from_str(r#"{"modus":"normal"}"#).unwrap();
        assert_eq!(h.modus, BroadcastModus::Normal);
    }
}
