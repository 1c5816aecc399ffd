//! Storage-Backend fuer den Katalog-Baum
//!
//! Das `TreeStore`-Trait abstrahiert den dauerhaften Speicher. Der Kern
//! verlaesst sich darauf, dass `save_tree` atomar und absturzsicher ist.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use guidebot_core::persist;
use parking_lot::Mutex;

use crate::error::{CatalogError, CatalogResult};
use crate::node::Node;

/// Abstraktes Speicher-Backend fuer den Katalog
#[allow(async_fn_in_trait)]
pub trait TreeStore: Send + Sync {
    /// Gespeicherten Baum laden (leer, falls noch nichts gespeichert wurde)
    async fn load_tree(&self) -> CatalogResult<Node>;

    /// Baum dauerhaft speichern
    async fn save_tree(&self, wurzel: &Node) -> CatalogResult<()>;
}

/// JSON-Datei als Speicher-Backend
///
/// Schreibt ueber Temp-Datei + `rename`, siehe [`persist::atomar_schreiben`].
#[derive(Debug, Clone)]
pub struct JsonTreeStore {
    pfad: PathBuf,
}

impl JsonTreeStore {
    pub fn new(pfad: impl Into<PathBuf>) -> Self {
        Self { pfad: pfad.into() }
    }

    pub fn pfad(&self) -> &std::path::Path {
        &self.pfad
    }
}

impl TreeStore for JsonTreeStore {
    async fn load_tree(&self) -> CatalogResult<Node> {
        let wurzel: Node = persist::json_laden(&self.pfad).await?;
        tracing::debug!(
            pfad = %self.pfad.display(),
            knoten = wurzel.anzahl_knoten(),
            medien = wurzel.anzahl_medien(),
            "Katalog geladen"
        );
        Ok(wurzel)
    }

    async fn save_tree(&self, wurzel: &Node) -> CatalogResult<()> {
        persist::json_schreiben(&self.pfad, wurzel).await?;
        Ok(())
    }
}

/// In-Memory-Speicher (Tests, Betrieb ohne Datei)
///
/// Kann Schreibfehler simulieren, um das Verhalten bei Persistenzfehlern
/// zu pruefen.
#[derive(Debug, Default)]
pub struct MemoryTreeStore {
    wurzel: Mutex<Node>,
    schreibfehler: AtomicBool,
    speichervorgaenge: AtomicUsize,
}

impl MemoryTreeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store mit vorbelegtem Baum
    pub fn mit_baum(wurzel: Node) -> Self {
        Self {
            wurzel: Mutex::new(wurzel),
            ..Self::default()
        }
    }

    /// Laesst alle folgenden `save_tree`-Aufrufe fehlschlagen (oder wieder gelingen)
    pub fn schreibfehler_setzen(&self, aktiv: bool) {
        self.schreibfehler.store(aktiv, Ordering::SeqCst);
    }

    /// Ersetzt den gespeicherten Baum (simuliert eine externe Aenderung)
    pub fn baum_setzen(&self, wurzel: Node) {
        *self.wurzel.lock() = wurzel;
    }

    /// Zuletzt gespeicherter Baum
    pub fn gespeichert(&self) -> Node {
        self.wurzel.lock().clone()
    }

    /// Anzahl erfolgreicher Speichervorgaenge
    pub fn speichervorgaenge(&self) -> usize {
        self.speichervorgaenge.load(Ordering::SeqCst)
    }
}

impl TreeStore for MemoryTreeStore {
    async fn load_tree(&self) -> CatalogResult<Node> {
        Ok(self.wurzel.lock().clone())
    }

    async fn save_tree(&self, wurzel: &Node) -> CatalogResult<()> {
        if self.schreibfehler.load(Ordering::SeqCst) {
            return Err(CatalogError::SpeicherFehler(
                "Schreibfehler simuliert".into(),
            ));
        }
        *self.wurzel.lock() = wurzel.clone();
        self.speichervorgaenge.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
