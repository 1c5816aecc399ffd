//! ContentTree – Katalog mit Snapshot-Lesern und einem Schreiber
//!
//! Leser holen sich per [`ContentTree::snapshot`] einen unveraenderlichen
//! `Arc<Node>` und arbeiten fuer die Dauer einer Operation nur darauf.
//! Schreiber werden ueber einen asynchronen Mutex serialisiert, bauen eine
//! neue Wurzel (Pfadkopie via `Arc::make_mut`), speichern sie dauerhaft und
//! veroeffentlichen sie erst danach. Ein Leser sieht damit immer entweder den
//! Stand vor oder nach einer Mutation, nie einen halb verknuepften Knoten.
//!
//! Schlaegt das Speichern fehl, bleibt der bisherige Stand aktiv und der
//! Fehler geht an den Aufrufer. Eine Mutation wird erst bestaetigt, wenn sie
//! dauerhaft geschrieben ist.

use std::sync::Arc;

use guidebot_core::{pfad_anzeigen, MediaRef};
use parking_lot::RwLock;
use tokio::sync::Mutex;

use crate::error::{CatalogError, CatalogResult};
use crate::node::Node;
use crate::storage::TreeStore;

/// Der gemeinsam genutzte Inhaltskatalog
pub struct ContentTree<S: TreeStore> {
    /// Aktuell veroeffentlichte Wurzel
    aktuell: RwLock<Arc<Node>>,
    /// Serialisiert alle Schreiber (inkl. Speichern)
    schreiber: Mutex<()>,
    store: Arc<S>,
}

impl<S: TreeStore> ContentTree<S> {
    /// Laedt den Baum aus dem Store
    pub async fn laden(store: Arc<S>) -> CatalogResult<Self> {
        let wurzel = store.load_tree().await?;
        tracing::info!(
            knoten = wurzel.anzahl_knoten(),
            medien = wurzel.anzahl_medien(),
            "Katalog initialisiert"
        );
        Ok(Self {
            aktuell: RwLock::new(Arc::new(wurzel)),
            schreiber: Mutex::new(()),
            store,
        })
    }

    /// Leerer Baum ohne vorheriges Laden
    pub fn leer(store: Arc<S>) -> Self {
        Self {
            aktuell: RwLock::new(Arc::new(Node::new())),
            schreiber: Mutex::new(()),
            store,
        }
    }

    /// Zugriff auf das Speicher-Backend
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Unveraenderlicher Snapshot der aktuellen Wurzel
    pub fn snapshot(&self) -> Arc<Node> {
        Arc::clone(&self.aktuell.read())
    }

    /// Folgt `pfad` im aktuellen Snapshot
    ///
    /// Der leere Pfad liefert immer die Wurzel.
    pub fn resolve<L: AsRef<str>>(&self, pfad: &[L]) -> CatalogResult<Arc<Node>> {
        let mut knoten = self.snapshot();
        for label in pfad {
            let kind = knoten
                .child(label.as_ref())
                .cloned()
                .ok_or_else(|| CatalogError::NichtGefunden(pfad_anzeigen(pfad)))?;
            knoten = kind;
        }
        Ok(knoten)
    }

    /// Stellt sicher, dass `pfad` existiert, und gibt das Blatt zurueck
    ///
    /// Existiert der Pfad bereits, wird nichts geschrieben.
    pub async fn ensure_path<L: AsRef<str>>(&self, pfad: &[L]) -> CatalogResult<Arc<Node>> {
        let _guard = self.schreiber.lock().await;

        if let Ok(blatt) = self.resolve(pfad) {
            return Ok(blatt);
        }

        let mut neu = Node::clone(&self.snapshot());
        neu.ensure_path(pfad);
        self.veroeffentlichen(neu).await?;

        tracing::debug!(pfad = %pfad_anzeigen(pfad), "Pfad angelegt");
        self.resolve(pfad)
    }

    /// Haengt ein Medium an den Knoten unter `pfad` an (legt ihn bei Bedarf an)
    ///
    /// Gibt den Knoten nach dem Anhaengen zurueck.
    pub async fn append_media<L: AsRef<str>>(
        &self,
        pfad: &[L],
        media: MediaRef,
    ) -> CatalogResult<Arc<Node>> {
        let _guard = self.schreiber.lock().await;

        let mut neu = Node::clone(&self.snapshot());
        let anzahl = neu.append_media(pfad, media);
        self.veroeffentlichen(neu).await?;

        tracing::debug!(pfad = %pfad_anzeigen(pfad), medien = anzahl, "Medium angehaengt");
        self.resolve(pfad)
    }

    /// Verwirft den In-Memory-Stand und laedt neu aus dem Store
    pub async fn neu_laden(&self) -> CatalogResult<()> {
        let _guard = self.schreiber.lock().await;
        let wurzel = self.store.load_tree().await?;
        *self.aktuell.write() = Arc::new(wurzel);
        tracing::info!("Katalog neu geladen");
        Ok(())
    }

    /// Speichert `neu` und macht ihn danach fuer Leser sichtbar
    ///
    /// Muss unter dem Schreiber-Mutex aufgerufen werden.
    async fn veroeffentlichen(&self, neu: Node) -> CatalogResult<()> {
        if let Err(e) = self.store.save_tree(&neu).await {
            tracing::error!(fehler = %e, "Katalog konnte nicht gespeichert werden");
            return Err(e);
        }
        *self.aktuell.write() = Arc::new(neu);
        Ok(())
    }
}
