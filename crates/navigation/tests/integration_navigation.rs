//! Integration-Tests: Navigation gegen einen lebenden Katalog

use std::sync::Arc;

use guidebot_catalog::{ContentTree, MemoryTreeStore, Node};
use guidebot_core::{ClientId, MediaRef};
use guidebot_navigation::{
    aktion_aus_eingabe, Hinweis, NavAction, NavigationConfig, SessionStore,
};

fn m(id: &str) -> MediaRef {
    MediaRef::from(id)
}

async fn katalog() -> (Arc<ContentTree<MemoryTreeStore>>, Arc<MemoryTreeStore>) {
    let store = Arc::new(MemoryTreeStore::new());
    let tree = Arc::new(ContentTree::leer(store.clone()));
    tree.append_media(&["Guides", "Intro"], m("m1")).await.unwrap();
    (tree, store)
}

/// Ablauf eines Clients: Auswahl per Menue-Beschriftung, Medien ansehen,
/// zurueck zur Wurzel
#[tokio::test]
async fn durch_katalog_navigieren() {
    let (tree, _store) = katalog().await;
    let sessions = SessionStore::neu();
    let client = ClientId::from("7");
    let cfg = NavigationConfig::default();

    let schritt = sessions.bearbeiten(&client, |s| s.starten(&tree.snapshot(), &cfg));
    assert_eq!(schritt.auswahl.labels()[0], "📁 Guides");

    let aktion = aktion_aus_eingabe("📁 Guides").unwrap();
    let schritt = sessions.bearbeiten(&client, |s| s.anwenden(aktion, &tree.snapshot(), &cfg));
    assert_eq!(schritt.pfad, vec!["Guides"]);

    let aktion = aktion_aus_eingabe("📁 Intro").unwrap();
    sessions.bearbeiten(&client, |s| s.anwenden(aktion, &tree.snapshot(), &cfg));

    let schritt = sessions.bearbeiten(&client, |s| {
        s.anwenden(NavAction::View, &tree.snapshot(), &cfg)
    });
    assert_eq!(schritt.medien.len(), 1);
    assert_eq!(schritt.medien[0].media, m("m1"));
    assert_eq!(schritt.pfad, vec!["Guides", "Intro"]);

    let schritt = sessions.bearbeiten(&client, |s| {
        s.anwenden(NavAction::Reset, &tree.snapshot(), &cfg)
    });
    assert!(schritt.pfad.is_empty());
}

/// Eine leere Kategorie fuehrt automatisch eine Ebene hoch
#[tokio::test]
async fn leere_kategorie_fuehrt_zurueck() {
    let (tree, _store) = katalog().await;
    tree.ensure_path(&["Leer"]).await.unwrap();

    let sessions = SessionStore::neu();
    let client = ClientId::from("8");
    let cfg = NavigationConfig::default();

    let schritt = sessions.bearbeiten(&client, |s| {
        s.anwenden(NavAction::Descend("Leer".into()), &tree.snapshot(), &cfg)
    });
    assert!(schritt.pfad.is_empty());
    assert_eq!(schritt.hinweise, vec![Hinweis::NichtsHier]);
    assert!(sessions.get(&client).unwrap().pfad().is_empty());
}

/// Der Katalog wird extern ersetzt, der gemerkte Pfad existiert nicht mehr
#[tokio::test]
async fn extern_geaenderter_katalog() {
    let (tree, store) = katalog().await;
    let sessions = SessionStore::neu();
    let client = ClientId::from("9");
    let cfg = NavigationConfig::default();

    sessions.bearbeiten(&client, |s| {
        let wurzel = tree.snapshot();
        s.anwenden(NavAction::Descend("Guides".into()), &wurzel, &cfg);
        s.anwenden(NavAction::Descend("Intro".into()), &wurzel, &cfg)
    });

    let mut ersatz = Node::new();
    ersatz.append_media(&["Neu"], m("n1"));
    store.baum_setzen(ersatz);
    tree.neu_laden().await.unwrap();

    let schritt = sessions.bearbeiten(&client, |s| {
        s.anwenden(NavAction::View, &tree.snapshot(), &cfg)
    });
    assert!(schritt.pfad.is_empty());
    assert!(schritt.medien.is_empty());
    assert!(schritt.hinweise.iter().any(Hinweis::ist_fehler));
    assert_eq!(schritt.auswahl.kategorien, vec!["Neu"]);
}

/// Mehrere Clients navigieren gleichzeitig, waehrend geschrieben wird
#[tokio::test]
async fn sessions_sind_unabhaengig() {
    let (tree, _store) = katalog().await;
    let sessions = SessionStore::neu();
    let cfg = NavigationConfig::default();

    let mut handles = Vec::new();
    for i in 0..10 {
        let tree = tree.clone();
        let sessions = sessions.clone();
        let cfg = cfg.clone();
        handles.push(tokio::spawn(async move {
            let client = ClientId::new(format!("c{i}"));
            if i % 2 == 0 {
                tree.append_media(&["Guides"], MediaRef::new(format!("g{i}")))
                    .await
                    .unwrap();
            }
            sessions.bearbeiten(&client, |s| {
                s.anwenden(NavAction::Descend("Guides".into()), &tree.snapshot(), &cfg)
            })
        }));
    }

    for h in handles {
        let schritt = h.await.unwrap();
        assert_eq!(schritt.pfad, vec!["Guides"]);
    }
    assert_eq!(sessions.anzahl(), 10);
    assert_eq!(tree.resolve(&["Guides"]).unwrap().media.len(), 5);
}
