//! Integration-Tests fuer Ingest + Katalog mit Datei-Backend

use std::sync::Arc;

use guidebot_catalog::{
    CatalogError, ContentTree, IngestConfig, JsonTreeStore, TagIngester, TreeStore,
};
use guidebot_core::MediaRef;

async fn setup() -> (
    Arc<ContentTree<JsonTreeStore>>,
    TagIngester<JsonTreeStore>,
    tempfile::TempDir,
) {
    let dir = tempfile::tempdir().expect("Temp-Verzeichnis konnte nicht erstellt werden");
    let store = Arc::new(JsonTreeStore::new(dir.path().join("guides.json")));
    let tree = Arc::new(
        ContentTree::laden(store)
            .await
            .expect("Katalog laden fehlgeschlagen"),
    );
    let ingester = TagIngester::neu(tree.clone(), IngestConfig::default());
    (tree, ingester, dir)
}

#[tokio::test]
async fn gleiches_medium_zweimal_einsortieren() {
    let (tree, ingester, _dir) = setup().await;

    ingester
        .ingest("#Guides #Intro", MediaRef::from("m1"))
        .await
        .unwrap();
    ingester
        .ingest("#Guides #Intro", MediaRef::from("m1"))
        .await
        .unwrap();

    let intro = tree.resolve(&["Guides", "Intro"]).unwrap();
    assert_eq!(intro.media, vec![MediaRef::from("m1"), MediaRef::from("m1")]);
}

#[tokio::test]
async fn ohne_tags_bleibt_baum_und_datei_unveraendert() {
    let (tree, ingester, dir) = setup().await;
    ingester
        .ingest("#Guides", MediaRef::from("g1"))
        .await
        .unwrap();
    let vorher = tree.snapshot();
    let datei_vorher = std::fs::read(dir.path().join("guides.json")).unwrap();

    let ergebnis = ingester.ingest("ganz ohne Hashtag", MediaRef::from("x")).await;
    assert!(matches!(ergebnis, Err(CatalogError::ZuWenigeTags { .. })));

    assert_eq!(*tree.snapshot(), *vorher);
    assert_eq!(std::fs::read(dir.path().join("guides.json")).unwrap(), datei_vorher);
}

#[tokio::test]
async fn ingest_ist_nach_neustart_vorhanden() {
    let (_tree, ingester, dir) = setup().await;
    ingester
        .ingest("#Story #Serie1", MediaRef::from("s1"))
        .await
        .unwrap();
    ingester
        .ingest("#Story", MediaRef::from("s0"))
        .await
        .unwrap();

    let store = JsonTreeStore::new(dir.path().join("guides.json"));
    let geladen = store.load_tree().await.unwrap();

    let story = geladen.resolve(&["Story"]).unwrap();
    assert_eq!(story.media, vec![MediaRef::from("s0")]);
    assert_eq!(story.child_labels(), vec!["Serie1"]);
    assert_eq!(
        geladen.resolve(&["Story", "Serie1"]).unwrap().media,
        vec![MediaRef::from("s1")]
    );
}

#[tokio::test]
async fn tiefe_ist_konfigurierbar() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(JsonTreeStore::new(dir.path().join("guides.json")));
    let tree = Arc::new(ContentTree::laden(store).await.unwrap());
    let ingester = TagIngester::neu(
        tree.clone(),
        IngestConfig {
            min_tiefe: 2,
            max_tiefe: Some(2),
        },
    );

    assert!(ingester.ingest("#Story", MediaRef::from("a")).await.is_err());
    assert!(ingester
        .ingest("#Story #Serie #Extra", MediaRef::from("b"))
        .await
        .is_err());
    assert!(tree.snapshot().ist_leer());

    let bericht = ingester
        .ingest("#Story #Serie", MediaRef::from("c"))
        .await
        .unwrap();
    assert_eq!(bericht.medien_anzahl, 1);
}
