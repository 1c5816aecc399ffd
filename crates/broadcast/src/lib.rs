//! guidebot-broadcast – Nachrichten an alle registrierten Clients
//!
//! Der Dispatcher kennt weder Katalog noch Registry. Er bekommt die
//! Empfaengerliste und einen [`Outbound`](guidebot_core::Outbound) und
//! liefert eine Zaehlung zurueck.

pub mod config;
pub mod dispatcher;

pub use config::{BroadcastConfig, BroadcastModus, STANDARD_MARKER};
pub use dispatcher::{BroadcastAuftrag, BroadcastDispatcher, BroadcastErgebnis};
