//! Eingehende Ereignisse vom Transport
//!
//! Der Transport liefert zwei Arten von Ereignissen an den Kern: Medien mit
//! Beschriftung und reinen Text. Beide tragen die Identitaet des Absenders,
//! die gegen die erlaubte Publisher-Quelle geprueft wird.

use serde::{Deserialize, Serialize};

use crate::types::{ClientId, MediaRef};

/// Alle Ereignisse die vom Publisher-Kanal eintreffen
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InboundEvent {
    /// Medium mit (optionaler) Beschriftung wurde veroeffentlicht
    ContentPosted {
        absender: ClientId,
        beschriftung: String,
        media: MediaRef,
    },
    /// Reiner Text wurde veroeffentlicht (wird als Rundsendung verteilt)
    TextPosted { absender: ClientId, text: String },
}

impl InboundEvent {
    /// Gibt die Identitaet des Absenders zurueck
    pub fn absender(&self) -> &ClientId {
        match self {
            Self::ContentPosted { absender, .. } | Self::TextPosted { absender, .. } => absender,
        }
    }

    /// Prueft ob das Ereignis von der erlaubten Publisher-Quelle stammt
    pub fn von_publisher(&self, publisher: &ClientId) -> bool {
        self.absender() == publisher
    }
}
