//! ClientRegistry – dauerhafte, deduplizierte Liste der Abonnenten
//!
//! Clients werden beim ersten Kontakt einmal eingetragen und nie entfernt.
//! Die Reihenfolge der Eintraege ist die Reihenfolge der Registrierung und
//! bestimmt die Versandreihenfolge eines Broadcasts.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};

use guidebot_core::{persist, ClientId};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::error::{RegistryError, RegistryResult};

/// Abstrakte Client-Registry
#[allow(async_fn_in_trait)]
pub trait ClientRegistry: Send + Sync {
    /// Traegt `client` ein, falls noch nicht vorhanden
    ///
    /// Gibt `true` zurueck wenn der Client neu ist. Kehrt erst zurueck,
    /// wenn der neue Stand dauerhaft gespeichert ist.
    async fn add_if_absent(&self, client: &ClientId) -> RegistryResult<bool>;

    /// Alle Clients in Registrierungsreihenfolge
    async fn list_all(&self) -> RegistryResult<Vec<ClientId>>;
}

/// Gespeichertes Registry-Dokument: `{"clients": ["123", "456"]}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryDokument {
    #[serde(default, alias = "users")]
    pub clients: Vec<ClientId>,
}

/// JSON-Datei als Registry-Backend
///
/// Haelt den Stand im Speicher und schreibt bei jeder Aenderung die ganze
/// Datei atomar neu.
#[derive(Debug)]
pub struct JsonRegistry {
    pfad: PathBuf,
    dokument: Mutex<RegistryDokument>,
}

impl JsonRegistry {
    /// Laedt die Registry aus `pfad` (leer, falls die Datei fehlt)
    pub async fn laden(pfad: impl Into<PathBuf>) -> RegistryResult<Self> {
        let pfad = pfad.into();
        let dokument: RegistryDokument = persist::json_laden(&pfad).await?;
        tracing::info!(
            pfad = %pfad.display(),
            clients = dokument.clients.len(),
            "Client-Registry geladen"
        );
        Ok(Self {
            pfad,
            dokument: Mutex::new(dokument),
        })
    }

    pub fn pfad(&self) -> &std::path::Path {
        &self.pfad
    }
}

impl ClientRegistry for JsonRegistry {
    async fn add_if_absent(&self, client: &ClientId) -> RegistryResult<bool> {
        let mut dokument = self.dokument.lock().await;
        if dokument.clients.contains(client) {
            return Ok(false);
        }

        dokument.clients.push(client.clone());
        if let Err(e) = persist::json_schreiben(&self.pfad, &*dokument).await {
            // Nicht bestaetigt, also auch nicht im Speicher behalten
            dokument.clients.pop();
            tracing::error!(client = %client, fehler = %e, "Registry konnte nicht gespeichert werden");
            return Err(RegistryError::SpeicherFehler(e.to_string()));
        }

        tracing::info!(client = %client, gesamt = dokument.clients.len(), "Neuer Client registriert");
        Ok(true)
    }

    async fn list_all(&self) -> RegistryResult<Vec<ClientId>> {
        Ok(self.dokument.lock().await.clients.clone())
    }
}

/// In-Memory-Registry (Tests, Betrieb ohne Datei)
#[derive(Debug, Default)]
pub struct MemoryRegistry {
    clients: parking_lot::Mutex<Vec<ClientId>>,
    schreibfehler: AtomicBool,
}

impl MemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry mit vorbelegten Clients
    pub fn mit_clients(clients: impl IntoIterator<Item = ClientId>) -> Self {
        Self {
            clients: parking_lot::Mutex::new(clients.into_iter().collect()),
            ..Self::default()
        }
    }

    /// Laesst alle folgenden Eintragungen fehlschlagen (oder wieder gelingen)
    pub fn schreibfehler_setzen(&self, aktiv: bool) {
        self.schreibfehler.store(aktiv, Ordering::SeqCst);
    }
}

impl ClientRegistry for MemoryRegistry {
    async fn add_if_absent(&self, client: &ClientId) -> RegistryResult<bool> {
        let mut clients = self.clients.lock();
        if clients.contains(client) {
            return Ok(false);
        }
        if self.schreibfehler.load(Ordering::SeqCst) {
            return Err(RegistryError::SpeicherFehler("Schreibfehler simuliert".into()));
        }
        clients.push(client.clone());
        Ok(true)
    }

    async fn list_all(&self) -> RegistryResult<Vec<ClientId>> {
        Ok(self.clients.lock().clone())
    }
}
