//! Verfuegbare Auswahl und Menue-Beschriftungen
//!
//! `Auswahl` beschreibt, was an einem Pfad moeglich ist. Die Umwandlung in
//! Menue-Beschriftungen und zurueck in eine [`NavAction`] ist die einzige
//! Stelle, an der Rohtext des Clients interpretiert wird.

use guidebot_catalog::Node;

use crate::action::NavAction;

/// Praefix vor Kategorie-Beschriftungen
pub const PRAEFIX_KATEGORIE: &str = "📁 ";
/// Beschriftung fuer "Medien anzeigen"
pub const LABEL_MEDIEN: &str = "🖼 Medien anzeigen";
/// Beschriftung fuer "eine Ebene hoch"
pub const LABEL_ZURUECK: &str = "← Zurueck";
/// Beschriftung fuer "zur Wurzel"
pub const LABEL_HAUPTMENUE: &str = "🏠 Hauptmenue";

/// Moegliche Aktionen an einem Pfad
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Auswahl {
    /// Labels der Unterkategorien
    pub kategorien: Vec<String>,
    /// Kategorie hat eigene Medien
    pub medien_anzeigen: bool,
    /// Pfad ist nicht die Wurzel
    pub aufsteigen: bool,
    /// Immer verfuegbar
    pub zuruecksetzen: bool,
}

impl Auswahl {
    /// Auswahl fuer `knoten` am Pfad `pfad`
    pub fn berechnen(knoten: &Node, pfad: &[String]) -> Self {
        Self {
            kategorien: knoten.child_labels(),
            medien_anzeigen: knoten.has_media(),
            aufsteigen: !pfad.is_empty(),
            zuruecksetzen: true,
        }
    }

    /// Weder Unterkategorien noch Medien
    pub fn ist_sackgasse(&self) -> bool {
        self.kategorien.is_empty() && !self.medien_anzeigen
    }

    /// Menue-Beschriftungen: Kategorien, Medien, Zurueck, Hauptmenue
    pub fn labels(&self) -> Vec<String> {
        let mut labels: Vec<String> = self
            .kategorien
            .iter()
            .map(|k| format!("{PRAEFIX_KATEGORIE}{k}"))
            .collect();
        if self.medien_anzeigen {
            labels.push(LABEL_MEDIEN.to_string());
        }
        if self.aufsteigen {
            labels.push(LABEL_ZURUECK.to_string());
        }
        if self.zuruecksetzen {
            labels.push(LABEL_HAUPTMENUE.to_string());
        }
        labels
    }
}

/// Bildet eine Menue-Beschriftung auf eine Aktion ab
///
/// Unbekannter Text ergibt `None`.
pub fn aktion_aus_eingabe(eingabe: &str) -> Option<NavAction> {
    let eingabe = eingabe.trim();
    match eingabe {
        LABEL_ZURUECK => Some(NavAction::Ascend),
        LABEL_HAUPTMENUE => Some(NavAction::Reset),
        LABEL_MEDIEN => Some(NavAction::View),
        _ => eingabe
            .strip_prefix(PRAEFIX_KATEGORIE)
            .map(str::trim)
            .filter(|label| !label.is_empty())
            .map(|label| NavAction::Descend(label.to_string())),
    }
}
