//! Navigations-Zustandsautomat
//!
//! Ein einziger Zustand `Browsing(pfad)`. Jede Aktion wird gegen einen
//! Snapshot der Katalog-Wurzel angewendet, danach wird die Auswahl am neuen
//! Pfad berechnet. Dabei gilt:
//! - Ein veralteter Pfad (nicht mehr aufloesbar) setzt die Session auf die
//!   Wurzel zurueck und meldet [`Hinweis::PfadVeraltet`].
//! - Eine Sackgasse (keine Kinder, keine Medien) steigt automatisch eine
//!   Ebene auf und meldet [`Hinweis::NichtsHier`].
//!
//! Alle Fehler werden lokal behoben; die Session endet immer auf einem
//! gueltigen Pfad.

use guidebot_catalog::Node;
use guidebot_core::{pfad_anzeigen, ClientId, MediaRef};
use serde::{Deserialize, Serialize};

use crate::action::NavAction;
use crate::menu::Auswahl;

/// Verhalten der Navigation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigationConfig {
    /// Medien beim Betreten einer Kategorie sofort ausgeben
    ///
    /// Ist die Kategorie ein Blatt, kehrt die Session danach zur
    /// Elternebene zurueck, damit direkt die naechste Geschwister-Kategorie
    /// gewaehlt werden kann.
    pub auto_view: bool,
}

/// Meldung an den Client nach einem Schritt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Hinweis {
    /// Ziel von `Descend` existiert nicht (mehr)
    KategorieNichtGefunden(String),
    /// `View` auf einer Kategorie ohne Medien
    KeineMedien,
    /// Sackgasse, es wurde automatisch aufgestiegen
    NichtsHier,
    /// Der gemerkte Pfad passt nicht mehr zum Katalog, Session steht wieder an der Wurzel
    PfadVeraltet(String),
}

impl Hinweis {
    /// Gibt true zurueck wenn der Hinweis einen Fehler meldet
    pub fn ist_fehler(&self) -> bool {
        matches!(self, Self::KategorieNichtGefunden(_) | Self::PfadVeraltet(_))
    }
}

/// Ein auszugebendes Medium mit 1-basierter Position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MedienAusgabe {
    pub media: MediaRef,
    pub position: usize,
    pub gesamt: usize,
}

impl MedienAusgabe {
    fn alle(knoten: &Node) -> Vec<Self> {
        let gesamt = knoten.media.len();
        knoten
            .media
            .iter()
            .enumerate()
            .map(|(i, media)| Self {
                media: media.clone(),
                position: i + 1,
                gesamt,
            })
            .collect()
    }
}

/// Ergebnis einer angewendeten Aktion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schritt {
    /// Pfad nach dem Schritt
    pub pfad: Vec<String>,
    /// Auszugebende Medien in Reihenfolge
    pub medien: Vec<MedienAusgabe>,
    /// Pfad, zu dem die Medien gehoeren
    pub medien_pfad: Vec<String>,
    pub hinweise: Vec<Hinweis>,
    /// Verfuegbare Auswahl am neuen Pfad
    pub auswahl: Auswahl,
}

/// Cursor eines Clients im Katalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationSession {
    client_id: ClientId,
    pfad: Vec<String>,
}

impl NavigationSession {
    /// Neue Session an der Wurzel
    pub fn neu(client_id: ClientId) -> Self {
        Self {
            client_id,
            pfad: Vec::new(),
        }
    }

    pub fn client_id(&self) -> &ClientId {
        &self.client_id
    }

    /// Aktueller Pfad (leer = Wurzel)
    pub fn pfad(&self) -> &[String] {
        &self.pfad
    }

    /// Beginnt an der Wurzel; mit `auto_view` werden Wurzel-Medien ausgegeben
    pub fn starten(&mut self, wurzel: &Node, config: &NavigationConfig) -> Schritt {
        self.pfad.clear();
        let medien = if config.auto_view {
            MedienAusgabe::alle(wurzel)
        } else {
            Vec::new()
        };

        let mut hinweise = Vec::new();
        let auswahl = self.auswahl_stabilisieren(wurzel, &mut hinweise);
        Schritt {
            pfad: self.pfad.clone(),
            medien,
            medien_pfad: Vec::new(),
            hinweise,
            auswahl,
        }
    }

    /// Wendet `aktion` auf den Snapshot `wurzel` an
    pub fn anwenden(
        &mut self,
        aktion: NavAction,
        wurzel: &Node,
        config: &NavigationConfig,
    ) -> Schritt {
        let mut hinweise = Vec::new();
        let mut medien = Vec::new();
        let mut medien_pfad = Vec::new();

        match aktion {
            NavAction::Descend(label) => {
                let mut ziel = self.pfad.clone();
                ziel.push(label);

                match wurzel.resolve(&ziel) {
                    None => {
                        let label = ziel.pop().unwrap_or_default();
                        tracing::debug!(
                            client = %self.client_id,
                            pfad = %pfad_anzeigen(&ziel),
                            label = %label,
                            "Kategorie nicht gefunden"
                        );
                        hinweise.push(Hinweis::KategorieNichtGefunden(label));
                    }
                    Some(knoten) => {
                        if config.auto_view && knoten.has_media() {
                            medien = MedienAusgabe::alle(knoten);
                            medien_pfad = ziel.clone();
                            if knoten.has_children() {
                                self.pfad = ziel;
                            }
                        } else {
                            self.pfad = ziel;
                        }
                    }
                }
            }
            NavAction::Ascend => {
                self.pfad.pop();
            }
            NavAction::Reset => {
                self.pfad.clear();
            }
            NavAction::View => match wurzel.resolve(&self.pfad) {
                Some(knoten) if knoten.has_media() => {
                    medien = MedienAusgabe::alle(knoten);
                    medien_pfad = self.pfad.clone();
                }
                Some(_) => hinweise.push(Hinweis::KeineMedien),
                // Veralteter Pfad wird unten behandelt
                None => {}
            },
        }

        let auswahl = self.auswahl_stabilisieren(wurzel, &mut hinweise);

        tracing::debug!(
            client = %self.client_id,
            pfad = %pfad_anzeigen(&self.pfad),
            medien = medien.len(),
            hinweise = hinweise.len(),
            "Navigationsschritt"
        );

        Schritt {
            pfad: self.pfad.clone(),
            medien,
            medien_pfad,
            hinweise,
            auswahl,
        }
    }

    /// Berechnet die Auswahl am aktuellen Pfad und korrigiert ihn bei Bedarf
    ///
    /// Veralteter Pfad -> Wurzel, Sackgasse -> eine Ebene hoch. Terminiert,
    /// weil die Wurzel immer aufloesbar ist und dort nicht weiter
    /// aufgestiegen wird.
    fn auswahl_stabilisieren(&mut self, wurzel: &Node, hinweise: &mut Vec<Hinweis>) -> Auswahl {
        loop {
            let Some(knoten) = wurzel.resolve(&self.pfad) else {
                let veraltet = pfad_anzeigen(&self.pfad);
                tracing::warn!(
                    client = %self.client_id,
                    pfad = %veraltet,
                    "Session-Pfad veraltet, zurueck zur Wurzel"
                );
                hinweise.push(Hinweis::PfadVeraltet(veraltet));
                self.pfad.clear();
                continue;
            };

            let auswahl = Auswahl::berechnen(knoten, &self.pfad);
            if auswahl.ist_sackgasse() && !self.pfad.is_empty() {
                if !hinweise.contains(&Hinweis::NichtsHier) {
                    hinweise.push(Hinweis::NichtsHier);
                }
                self.pfad.pop();
                continue;
            }
            return auswahl;
        }
    }
}
