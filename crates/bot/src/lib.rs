//! guidebot-bot – Ablaufsteuerung des Guidebot
//!
//! [`GuideBot`] verbindet Katalog, Navigation, Client-Registry und
//! Broadcast. Der Transport ruft ihn fuer jedes eingehende Ereignis auf und
//! stellt ueber [`Outbound`](guidebot_core::Outbound) die Antworten zu.

pub mod bot;
pub mod texte;

pub use bot::{BotEinstellungen, ClientBefehl, GuideBot};
