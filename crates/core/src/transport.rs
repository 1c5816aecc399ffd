//! Outbound-Schnittstelle zum Transport
//!
//! Der Kern ruft diese drei Primitive auf, um Medien, Texte und
//! Auswahlmenues an Clients zu senden. Jede Sendung kann fehlschlagen;
//! der Aufrufer entscheidet, ob der Fehler gezaehlt oder nur geloggt wird.

use thiserror::Error;

use crate::types::{ClientId, MediaRef};

/// Fehler beim Zustellen einer einzelnen Nachricht
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ZustellFehler {
    #[error("Client nicht verbunden: {0}")]
    Offline(ClientId),

    #[error("Send-Queue von {0} voll")]
    QueueVoll(ClientId),

    #[error("Transportfehler: {0}")]
    Transport(String),
}

/// Ausgehende Sende-Primitive des Transports
#[allow(async_fn_in_trait)]
pub trait Outbound: Send + Sync {
    /// Sendet ein Medium mit Beschriftung
    async fn send_media(
        &self,
        client: &ClientId,
        media: &MediaRef,
        beschriftung: &str,
    ) -> Result<(), ZustellFehler>;

    /// Sendet eine Textnachricht
    async fn send_text(&self, client: &ClientId, text: &str) -> Result<(), ZustellFehler>;

    /// Sendet ein Auswahlmenue mit Aufforderungstext
    ///
    /// Die Darstellung (Tastatur, Buttons, Zeilen) ist Sache des Transports.
    async fn send_choice_menu(
        &self,
        client: &ClientId,
        aufforderung: &str,
        auswahl: &[String],
    ) -> Result<(), ZustellFehler>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zustellfehler_anzeige() {
        let e = ZustellFehler::Offline(ClientId::from("42"));
        assert_eq!(e.to_string(), "Client nicht verbunden: client:42");
    }
}
