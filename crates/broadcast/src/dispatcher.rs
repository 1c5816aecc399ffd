//! BroadcastDispatcher – Text an alle Empfaenger verteilen
//!
//! Jeder Empfaenger wird genau einmal in Registry-Reihenfolge versucht.
//! Ein Fehler bei einem Empfaenger wird gezaehlt und geloggt, der Rest des
//! Batches laeuft weiter. Es gibt keine Wiederholungen.
//!
//! ## Drosselung
//! Hoechstens `parallelitaet` Sendungen laufen gleichzeitig. Jede Sendung
//! ab Position `parallelitaet` wartet vor dem Start `verzoegerung_ms`, so
//! dass zwischen zwei Sendungen derselben Spur immer mindestens diese
//! Pause liegt.

use std::time::Duration;

use futures_util::stream::{self, StreamExt};
use guidebot_core::{ClientId, GuideError, Outbound};
use regex::{Regex, RegexBuilder};
use tokio_util::sync::CancellationToken;

use crate::config::{BroadcastConfig, BroadcastModus};

/// Aufbereiteter Broadcast: zu sendender Text und Modus
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BroadcastAuftrag {
    pub text: String,
    pub modus: BroadcastModus,
}

/// Zaehlung eines Broadcasts
///
/// Ohne Abbruch gilt `erfolgreich + fehlgeschlagen == gesamt`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BroadcastErgebnis {
    pub erfolgreich: usize,
    pub fehlgeschlagen: usize,
    pub gesamt: usize,
    /// Empfaenger, deren Zustellung fehlschlug
    pub fehlgeschlagene: Vec<ClientId>,
    /// Wegen Abbruch nicht mehr versuchte Empfaenger
    pub nicht_versucht: usize,
}

impl BroadcastErgebnis {
    /// Gibt true zurueck wenn der Broadcast vorzeitig abgebrochen wurde
    pub fn abgebrochen(&self) -> bool {
        self.nicht_versucht > 0
    }

    /// Anzahl tatsaechlich versuchter Sendungen
    pub fn versucht(&self) -> usize {
        self.erfolgreich + self.fehlgeschlagen
    }
}

enum Versuch {
    Erfolg,
    Fehler(ClientId),
    NichtVersucht,
}

/// Fan-out-Versand mit Fehlerisolation pro Empfaenger
#[derive(Debug, Clone)]
pub struct BroadcastDispatcher {
    config: BroadcastConfig,
    marker: Regex,
}

impl BroadcastDispatcher {
    /// Erstellt den Dispatcher, der Marker wird ohne Gross-/Kleinschreibung erkannt
    pub fn neu(config: BroadcastConfig) -> Result<Self, GuideError> {
        if config.marker.trim().is_empty() {
            return Err(GuideError::Konfiguration(
                "Broadcast-Marker darf nicht leer sein".into(),
            ));
        }
        let marker = RegexBuilder::new(&regex::escape(config.marker.trim()))
            .case_insensitive(true)
            .build()
            .map_err(|e| GuideError::Konfiguration(format!("Broadcast-Marker ungueltig: {e}")))?;
        Ok(Self { config, marker })
    }

    pub fn config(&self) -> &BroadcastConfig {
        &self.config
    }

    /// Bestimmt Modus und Text eines Textbeitrags
    ///
    /// Enthaelt der Text den Marker, wird jedes Vorkommen entfernt, der Rest
    /// getrimmt und im Sofort-Modus versendet. Sonst gilt der konfigurierte
    /// Normal-Modus mit unveraendertem Text.
    pub fn vorbereiten(&self, text: &str) -> BroadcastAuftrag {
        if self.marker.is_match(text) {
            BroadcastAuftrag {
                text: self.marker.replace_all(text, "").trim().to_string(),
                modus: BroadcastModus::Sofort,
            }
        } else {
            BroadcastAuftrag {
                text: text.to_string(),
                modus: self.config.normal_modus,
            }
        }
    }

    /// Sendet `text` an alle `empfaenger`
    pub async fn broadcast<O: Outbound>(
        &self,
        outbound: &O,
        text: &str,
        empfaenger: &[ClientId],
    ) -> BroadcastErgebnis {
        self.broadcast_abbrechbar(outbound, text, empfaenger, &CancellationToken::new())
            .await
    }

    /// Wie [`broadcast`](Self::broadcast), kann ueber `abbruch` gestoppt werden
    ///
    /// Laufende Sendungen werden zu Ende gefuehrt, alle weiteren zaehlen als
    /// `nicht_versucht`.
    pub async fn broadcast_abbrechbar<O: Outbound>(
        &self,
        outbound: &O,
        text: &str,
        empfaenger: &[ClientId],
        abbruch: &CancellationToken,
    ) -> BroadcastErgebnis {
        let parallel = self.config.parallelitaet.max(1);
        let verzoegerung = Duration::from_millis(self.config.verzoegerung_ms);

        let auftraege: Vec<_> = empfaenger
            .iter()
            .enumerate()
            .map(|(i, client)| {
                let pause = (i >= parallel && !verzoegerung.is_zero()).then_some(verzoegerung);
                zustellen(outbound, client, text, pause, abbruch)
            })
            .collect();
        let versuche: Vec<Versuch> = stream::iter(auftraege).buffered(parallel).collect().await;

        let mut ergebnis = BroadcastErgebnis {
            gesamt: empfaenger.len(),
            ..Default::default()
        };
        for versuch in versuche {
            match versuch {
                Versuch::Erfolg => ergebnis.erfolgreich += 1,
                Versuch::Fehler(client) => {
                    ergebnis.fehlgeschlagen += 1;
                    ergebnis.fehlgeschlagene.push(client);
                }
                Versuch::NichtVersucht => ergebnis.nicht_versucht += 1,
            }
        }

        tracing::info!(
            erfolgreich = ergebnis.erfolgreich,
            fehlgeschlagen = ergebnis.fehlgeschlagen,
            gesamt = ergebnis.gesamt,
            nicht_versucht = ergebnis.nicht_versucht,
            "Broadcast abgeschlossen"
        );
        ergebnis
    }
}

/// Ein einzelner Zustellversuch, optional nach einer Pause
async fn zustellen<O: Outbound>(
    outbound: &O,
    client: &ClientId,
    text: &str,
    pause: Option<Duration>,
    abbruch: &CancellationToken,
) -> Versuch {
    if let Some(pause) = pause {
        tokio::select! {
            _ = abbruch.cancelled() => return Versuch::NichtVersucht,
            _ = tokio::time::sleep(pause) => {}
        }
    }
    if abbruch.is_cancelled() {
        return Versuch::NichtVersucht;
    }
    match outbound.send_text(client, text).await {
        Ok(()) => Versuch::Erfolg,
        Err(e) => {
            tracing::warn!(client = %client, fehler = %e, "Broadcast-Zustellung fehlgeschlagen");
            Versuch::Fehler(client.clone())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dispatcher() -> BroadcastDispatcher {
        BroadcastDispatcher::neu(BroadcastConfig {
            marker: "#JetztSenden".into(),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn marker_wird_entfernt() {
        let auftrag = dispatcher().vorbereiten("#jetztsenden  Neues Update! #JETZTSENDEN ");
        assert_eq!(auftrag.modus, BroadcastModus::Sofort);
        assert_eq!(auftrag.text, "Neues Update!");
    }

    #[test]
    fn ohne_marker_normal_modus() {
        let auftrag = dispatcher().vorbereiten("  Hallo zusammen ");
        assert_eq!(auftrag.modus, BroadcastModus::Still);
        assert_eq!(auftrag.text, "  Hallo zusammen ");
    }

    #[test]
    fn marker_mit_sonderzeichen_wird_woertlich_erkannt() {
        let d = BroadcastDispatcher::neu(BroadcastConfig {
            marker: "!!(eilig)".into(),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(d.vorbereiten("!!(EILIG) los").modus, BroadcastModus::Sofort);
        assert_eq!(d.vorbereiten("!!eilig los").modus, BroadcastModus::Still);
    }

    #[test]
    fn leerer_marker_ist_konfigurationsfehler() {
        let ergebnis = BroadcastDispatcher::neu(BroadcastConfig {
            marker: "  ".into(),
            ..Default::default()
        });
        assert!(matches!(ergebnis, Err(GuideError::Konfiguration(_))));
    }

    #[test]
    fn ergebnis_hilfsfunktionen() {
        let e = BroadcastErgebnis {
            erfolgreich: 2,
            fehlgeschlagen: 1,
            gesamt: 5,
            fehlgeschlagene: vec![ClientId::from("x")],
            nicht_versucht: 2,
        };
        assert!(e.abgebrochen());
        assert_eq!(e.versucht(), 3);
        assert!(!BroadcastErgebnis::default().abgebrochen());
    }
}
