//! TagIngester – Hashtags extrahieren und Medien einsortieren
//!
//! Ein Tag ist die maximale Folge von Wortzeichen direkt nach einem `#`.
//! Die Tags einer Beschriftung bilden in ihrer Reihenfolge den Pfad, unter
//! dem das Medium abgelegt wird: `#Guides #Intro` -> `Guides > Intro`.

use std::sync::{Arc, LazyLock};

use guidebot_core::{pfad_anzeigen, MediaRef};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{CatalogError, CatalogResult};
use crate::storage::TreeStore;
use crate::tree::ContentTree;

static TAG_MUSTER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#(\w+)").expect("Tag-Muster ist gueltig"));

/// Erlaubte Pfadtiefe fuer eingehende Medien
///
/// Standard ist mindestens ein Tag ohne Obergrenze. Das feste
/// "Story/Serie"-Format entspricht `min_tiefe = max_tiefe = 2`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    pub min_tiefe: usize,
    pub max_tiefe: Option<usize>,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            min_tiefe: 1,
            max_tiefe: None,
        }
    }
}

impl IngestConfig {
    /// Prueft die Anzahl der Tags gegen die konfigurierte Tiefe
    pub fn pruefen(&self, anzahl: usize) -> CatalogResult<()> {
        let minimum = self.min_tiefe.max(1);
        if anzahl < minimum {
            return Err(CatalogError::ZuWenigeTags {
                gefunden: anzahl,
                minimum,
            });
        }
        if let Some(maximum) = self.max_tiefe {
            if anzahl > maximum {
                return Err(CatalogError::ZuVieleTags {
                    gefunden: anzahl,
                    maximum,
                });
            }
        }
        Ok(())
    }
}

/// Rueckmeldung an den Publisher nach erfolgreichem Ingest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestBericht {
    /// Pfad, unter dem das Medium abgelegt wurde
    pub pfad: Vec<String>,
    /// Anzahl der Medien an diesem Pfad nach dem Anhaengen
    pub medien_anzahl: usize,
}

impl IngestBericht {
    /// Pfad fuer die Anzeige: `Guides > Intro`
    pub fn pfad_anzeige(&self) -> String {
        pfad_anzeigen(&self.pfad)
    }
}

/// Extrahiert die Hashtags einer Beschriftung in Reihenfolge ihres Auftretens
///
/// Wiederholte Tags bleiben erhalten, ein einzelnes `#` ohne Wortzeichen
/// wird ignoriert.
pub fn tags_extrahieren(text: &str) -> Vec<String> {
    TAG_MUSTER
        .captures_iter(text)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Sortiert veroeffentlichte Medien anhand ihrer Hashtags in den Katalog ein
pub struct TagIngester<S: TreeStore> {
    tree: Arc<ContentTree<S>>,
    config: IngestConfig,
}

impl<S: TreeStore> TagIngester<S> {
    pub fn neu(tree: Arc<ContentTree<S>>, config: IngestConfig) -> Self {
        Self { tree, config }
    }

    pub fn config(&self) -> &IngestConfig {
        &self.config
    }

    /// Legt `media` unter dem Pfad aus den Hashtags von `beschriftung` ab
    ///
    /// Ohne (ausreichend) Tags wird nichts veraendert.
    pub async fn ingest(&self, beschriftung: &str, media: MediaRef) -> CatalogResult<IngestBericht> {
        let pfad = tags_extrahieren(beschriftung);

        if let Err(e) = self.config.pruefen(pfad.len()) {
            tracing::info!(tags = pfad.len(), fehler = %e, "Ingest abgelehnt");
            return Err(e);
        }

        let knoten = self.tree.append_media(&pfad, media).await?;
        let bericht = IngestBericht {
            medien_anzahl: knoten.media.len(),
            pfad,
        };

        tracing::info!(
            pfad = %bericht.pfad_anzeige(),
            medien = bericht.medien_anzahl,
            "Medium einsortiert"
        );
        Ok(bericht)
    }
}
