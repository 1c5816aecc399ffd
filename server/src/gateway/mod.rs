//! Zeilenbasiertes TCP-Gateway zwischen Clients und Bot

pub mod befehl;
pub mod error;
pub mod outbound;
pub mod parser;
pub mod server;
pub mod session;

pub use error::{GatewayError, GatewayResult};
pub use outbound::TcpOutbound;
pub use server::{GatewayKonfig, GatewayServer, BEGRUESSUNG};
