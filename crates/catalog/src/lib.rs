//! guidebot-catalog – Hierarchischer Inhaltskatalog
//!
//! Dieses Crate implementiert:
//! - Node: Kategorie mit Unterkategorien und direkt zugeordneten Medien
//! - ContentTree: Snapshot-Lesezugriffe und serialisierte Schreibzugriffe
//! - TagIngester: Hashtags aus Beschriftungen extrahieren und Medien einsortieren
//! - TreeStore-Trait + JsonTreeStore / MemoryTreeStore
//!
//! # Beispiel
//!
//! ```no_run
//! use std::sync::Arc;
//! use guidebot_catalog::{ContentTree, IngestConfig, JsonTreeStore, TagIngester};
//! use guidebot_core::MediaRef;
//!
//! #[tokio::main]
//! async fn main() {
//!     let store = Arc::new(JsonTreeStore::new("data/guides.json"));
//!     let tree = Arc::new(ContentTree::laden(store).await.unwrap());
//!
//!     let ingester = TagIngester::neu(tree.clone(), IngestConfig::default());
//!     let bericht = ingester
//!         .ingest("#Guides #Intro", MediaRef::from("m1"))
//!         .await
//!         .unwrap();
//!     assert_eq!(bericht.medien_anzahl, 1);
//! }
//! ```

pub mod error;
pub mod ingest;
pub mod node;
pub mod storage;
pub mod tree;

// Bequeme Re-Exporte
pub use error::{CatalogError, CatalogResult};
pub use ingest::{tags_extrahieren, IngestBericht, IngestConfig, TagIngester};
pub use node::Node;
pub use storage::{JsonTreeStore, MemoryTreeStore, TreeStore};
pub use tree::ContentTree;
