//! Geschlossene Menge der Navigationsaktionen

/// Aktion eines Clients im Katalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavAction {
    /// In die Unterkategorie mit diesem Label wechseln
    Descend(String),
    /// Eine Ebene nach oben (an der Wurzel: nichts)
    Ascend,
    /// Zurueck zur Wurzel
    Reset,
    /// Medien der aktuellen Kategorie anzeigen (kein Zustandswechsel)
    View,
}

impl NavAction {
    /// Kurzname fuer Logs und Metriken
    pub fn name(&self) -> &'static str {
        match self {
            Self::Descend(_) => "descend",
            Self::Ascend => "ascend",
            Self::Reset => "reset",
            Self::View => "view",
        }
    }
}
