//! Knoten des Inhaltskatalogs
//!
//! Ein Knoten haelt immer beide Felder: Unterkategorien (Label -> Knoten)
//! und direkt zugeordnete Medien. Beide duerfen leer sein. Das Label eines
//! Knotens ist sein Schluessel in der `children`-Map des Elternknotens und
//! damit unter Geschwistern eindeutig.
//!
//! Unterknoten liegen hinter `Arc`, damit ein Schreibvorgang nur den Pfad
//! von der Wurzel bis zum geaenderten Knoten kopiert (`Arc::make_mut`) und
//! alle anderen Teilbaeume mit dem vorherigen Snapshot teilt.

use std::collections::BTreeMap;
use std::sync::Arc;

use guidebot_core::MediaRef;
use serde::{Deserialize, Serialize};

/// Ein Punkt in der Katalog-Hierarchie
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    /// Unterkategorien, nach Label sortiert
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub children: BTreeMap<String, Arc<Node>>,
    /// Medien in Veroeffentlichungsreihenfolge (Duplikate erlaubt)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub media: Vec<MediaRef>,
}

impl Node {
    /// Leerer Knoten ohne Kinder und Medien
    pub fn new() -> Self {
        Self::default()
    }

    /// Direktes Kind mit dem angegebenen Label
    pub fn child(&self, label: &str) -> Option<&Arc<Node>> {
        self.children.get(label)
    }

    /// Labels aller direkten Kinder (sortiert)
    pub fn child_labels(&self) -> Vec<String> {
        self.children.keys().cloned().collect()
    }

    pub fn has_media(&self) -> bool {
        !self.media.is_empty()
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Sackgasse: weder Kinder noch Medien
    pub fn ist_leer(&self) -> bool {
        self.children.is_empty() && self.media.is_empty()
    }

    /// Folgt `pfad` ab diesem Knoten. `None` sobald ein Segment fehlt.
    pub fn resolve<S: AsRef<str>>(&self, pfad: &[S]) -> Option<&Node> {
        let mut knoten = self;
        for label in pfad {
            knoten = knoten.children.get(label.as_ref())?;
        }
        Some(knoten)
    }

    /// Laeuft `pfad` ab und legt fehlende Knoten leer an. Gibt das Blatt zurueck.
    ///
    /// Geteilte Knoten entlang des Pfads werden dabei kopiert, alle anderen
    /// Teilbaeume bleiben geteilt.
    pub fn ensure_path<S: AsRef<str>>(&mut self, pfad: &[S]) -> &mut Node {
        let mut knoten = self;
        for label in pfad {
            let kind = knoten
                .children
                .entry(label.as_ref().to_string())
                .or_default();
            knoten = Arc::make_mut(kind);
        }
        knoten
    }

    /// Haengt `media` an den Knoten unter `pfad` an (legt den Pfad bei Bedarf an)
    ///
    /// Gibt die Anzahl der Medien an diesem Pfad nach dem Anhaengen zurueck.
    pub fn append_media<S: AsRef<str>>(&mut self, pfad: &[S], media: MediaRef) -> usize {
        let blatt = self.ensure_path(pfad);
        blatt.media.push(media);
        blatt.media.len()
    }

    /// Anzahl aller Knoten unterhalb (ohne diesen)
    pub fn anzahl_knoten(&self) -> usize {
        self.children
            .values()
            .map(|kind| 1 + kind.anzahl_knoten())
            .sum()
    }

    /// Anzahl aller Medien in diesem Teilbaum
    pub fn anzahl_medien(&self) -> usize {
        self.media.len()
            + self
                .children
                .values()
                .map(|kind| kind.anzahl_medien())
                .sum::<usize>()
    }
}
