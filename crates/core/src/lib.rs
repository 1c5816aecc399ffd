//! guidebot-core – Gemeinsame Typen, Traits und Fehlertypen
//!
//! Dieses Crate stellt die fundamentalen Bausteine bereit, die von allen
//! anderen Guidebot-Crates gemeinsam genutzt werden: Identifikationstypen,
//! die Fehler-Taxonomie, eingehende Ereignisse und die Outbound-Schnittstelle
//! zum Transport.

pub mod error;
pub mod event;
pub mod persist;
pub mod transport;
pub mod types;

// Re-Exporte fuer bequemen Zugriff
pub use error::{GuideError, Result};
pub use event::InboundEvent;
pub use transport::{Outbound, ZustellFehler};
pub use types::{pfad_anzeigen, ClientId, MediaRef};
