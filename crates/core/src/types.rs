//! Gemeinsame Identifikationstypen fuer den Guidebot
//!
//! Client-IDs und Medien-Referenzen sind undurchsichtige Strings des
//! Transports. Das Newtype-Pattern schliesst Verwechslungen zwischen
//! beiden zur Compilezeit aus.

use serde::{Deserialize, Serialize};

/// Eindeutige Client-ID (vom Transport vergeben)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientId(pub String);

impl ClientId {
    /// Erstellt eine ClientId aus einem beliebigen String
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Gibt die innere ID als &str zurueck
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ClientId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl std::fmt::Display for ClientId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "client:{}", self.0)
    }
}

/// Undurchsichtiger Verweis auf ein Medium (z.B. eine Datei-ID des Transports)
///
/// Der Kern interpretiert den Inhalt nie.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MediaRef(pub String);

impl MediaRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for MediaRef {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl std::fmt::Display for MediaRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Formatiert einen Pfad fuer die Anzeige: `Guides > Intro`
pub fn pfad_anzeigen<S: AsRef<str>>(pfad: &[S]) -> String {
    pfad.iter()
        .map(|s| s.as_ref())
        .collect::<Vec<_>>()
        .join(" > ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_id_display() {
        let id = ClientId::from("4711");
        assert_eq!(id.to_string(), "client:4711");
        assert_eq!(id.as_str(), "4711");
    }

    #[test]
    fn ids_sind_serde_transparent() {
        let id = ClientId::from("42");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"42\"");
        let id2: ClientId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, id2);

        let m: MediaRef = serde_json::from_str("\"AgAD-xyz\"").unwrap();
        assert_eq!(m.as_str(), "AgAD-xyz");
    }

    #[test]
    fn pfad_anzeige() {
        assert_eq!(pfad_anzeigen(&["Guides", "Intro"]), "Guides > Intro");
        assert_eq!(pfad_anzeigen::<&str>(&[]), "");
    }
}
