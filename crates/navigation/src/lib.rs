//! guidebot-navigation – Navigation durch den Katalog
//!
//! Jeder Client hat eine eigene `NavigationSession` mit seinem aktuellen
//! Pfad. Aktionen (`NavAction`) werden gegen einen Katalog-Snapshot
//! angewendet; das Ergebnis ist ein `Schritt` mit neuem Pfad, auszugebenden
//! Medien, Hinweisen und der verfuegbaren Auswahl.
//!
//! Die Session-Logik liest nie Rohtext. Menue-Beschriftungen werden in
//! [`menu`] auf Aktionen abgebildet.

pub mod action;
pub mod menu;
pub mod session;
pub mod store;

pub use action::NavAction;
pub use menu::{aktion_aus_eingabe, Auswahl};
pub use session::{Hinweis, MedienAusgabe, NavigationConfig, NavigationSession, Schritt};
pub use store::SessionStore;
