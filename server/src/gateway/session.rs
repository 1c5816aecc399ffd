//! Zustand einer Gateway-Verbindung

use std::net::SocketAddr;

use guidebot_core::ClientId;

/// Zustand einer TCP-Verbindung
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerbindungsZustand {
    /// Verbunden, aber noch kein `hello`
    Begruessung,
    /// Mit Client-ID angemeldet
    Angemeldet(ClientId),
    /// Verbindung wird beendet
    Beendend,
}

/// Eine aktive Gateway-Verbindung
#[derive(Debug)]
pub struct Verbindung {
    pub zustand: VerbindungsZustand,
    pub peer: SocketAddr,
}

impl Verbindung {
    pub fn neu(peer: SocketAddr) -> Self {
        Self {
            zustand: VerbindungsZustand::Begruessung,
            peer,
        }
    }

    /// Client-ID, falls bereits angemeldet
    pub fn client(&self) -> Option<&ClientId> {
        match &self.zustand {
            VerbindungsZustand::Angemeldet(client) => Some(client),
            _ => None,
        }
    }

    pub fn anmelden(&mut self, client: ClientId) {
        self.zustand = VerbindungsZustand::Angemeldet(client);
    }

    /// Markiert die Verbindung als beendet und gibt die Client-ID zurueck
    pub fn beenden(&mut self) -> Option<ClientId> {
        match std::mem::replace(&mut self.zustand, VerbindungsZustand::Beendend) {
            VerbindungsZustand::Angemeldet(client) => Some(client),
            _ => None,
        }
    }

    pub fn ist_beendet(&self) -> bool {
        self.zustand == VerbindungsZustand::Beendend
    }
}
