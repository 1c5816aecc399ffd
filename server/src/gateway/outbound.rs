//! Zustellung an verbundene Gateway-Clients
//!
//! Jede Verbindung besitzt eine begrenzte Send-Queue, die ein eigener
//! Writer-Task in den Socket leert. [`TcpOutbound`] kennt die Queues aller
//! angemeldeten Clients und legt Zeilen nur per `try_send` ab, damit ein
//! langsamer Client nie den Bot blockiert.

use std::sync::Arc;

use dashmap::DashMap;
use guidebot_core::{ClientId, MediaRef, Outbound, ZustellFehler};
use tokio::sync::mpsc;

use crate::gateway::parser::{media_zeile, menue_zeile, text_zeile};

/// Kapazitaet der Send-Queue pro Verbindung
pub const SEND_QUEUE_GROESSE: usize = 256;

/// Legt eine Send-Queue fuer eine neue Verbindung an
pub fn send_queue() -> (mpsc::Sender<String>, mpsc::Receiver<String>) {
    mpsc::channel(SEND_QUEUE_GROESSE)
}

/// Outbound-Implementierung fuer das TCP-Gateway
#[derive(Clone, Default)]
pub struct TcpOutbound {
    clients: Arc<DashMap<ClientId, mpsc::Sender<String>>>,
}

impl TcpOutbound {
    pub fn neu() -> Self {
        Self::default()
    }

    /// Ordnet einer Client-ID die Queue einer Verbindung zu
    ///
    /// Meldet sich dieselbe ID erneut an, gewinnt die neue Verbindung.
    pub fn verbinden(&self, client: ClientId, tx: mpsc::Sender<String>) {
        if self.clients.insert(client.clone(), tx).is_some() {
            tracing::warn!(client = %client, "Client-ID von neuer Verbindung uebernommen");
        } else {
            tracing::debug!(client = %client, "Client im Gateway registriert");
        }
    }

    /// Entfernt die Zuordnung, sofern sie noch zu dieser Queue gehoert
    pub fn trennen(&self, client: &ClientId, tx: &mpsc::Sender<String>) {
        let entfernt = self
            .clients
            .remove_if(client, |_, aktuell| aktuell.same_channel(tx))
            .is_some();
        if entfernt {
            tracing::debug!(client = %client, "Client aus dem Gateway entfernt");
        }
    }

    /// Nur Queues mit lebendem Writer zaehlen als verbunden
    pub fn ist_verbunden(&self, client: &ClientId) -> bool {
        self.clients
            .get(client)
            .is_some_and(|tx| !tx.is_closed())
    }

    pub fn anzahl(&self) -> usize {
        self.clients.len()
    }

    fn zeile_senden(&self, client: &ClientId, zeile: String) -> Result<(), ZustellFehler> {
        // Sender klonen, damit kein Map-Guard ueber den Versand gehalten wird
        let tx = self
            .clients
            .get(client)
            .map(|eintrag| eintrag.value().clone())
            .ok_or_else(|| ZustellFehler::Offline(client.clone()))?;

        match tx.try_send(zeile) {
            Ok(()) => Ok(()),
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!(client = %client, "Send-Queue voll, Nachricht verworfen");
                Err(ZustellFehler::QueueVoll(client.clone()))
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                tracing::debug!(client = %client, "Send-Queue geschlossen (Client getrennt)");
                self.trennen(client, &tx);
                Err(ZustellFehler::Offline(client.clone()))
            }
        }
    }
}

impl Outbound for TcpOutbound {
    async fn send_media(
        &self,
        client: &ClientId,
        media: &MediaRef,
        beschriftung: &str,
    ) -> Result<(), ZustellFehler> {
        self.zeile_senden(client, media_zeile(media, beschriftung))
    }

    async fn send_text(&self, client: &ClientId, text: &str) -> Result<(), ZustellFehler> {
        self.zeile_senden(client, text_zeile(text))
    }

    async fn send_choice_menu(
        &self,
        client: &ClientId,
        aufforderung: &str,
        auswahl: &[String],
    ) -> Result<(), ZustellFehler> {
        self.zeile_senden(client, menue_zeile(aufforderung, auswahl))
    }
}
