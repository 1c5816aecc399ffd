//! guidebot-registry – Verzeichnis aller Clients, die den Bot gestartet haben

pub mod error;
pub mod store;

pub use error::{RegistryError, RegistryResult};
pub use store::{ClientRegistry, JsonRegistry, MemoryRegistry, RegistryDokument};
