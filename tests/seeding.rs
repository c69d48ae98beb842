use cladarium::catalog::{Catalog, MemoryCatalog, RecordSeed};
use cladarium::engine::Engine;

fn setup() -> MemoryCatalog {
    let raw = r#"[
        {
            "id": 1,
            "name": "Lanternfin",
            "full_name": "Photichthys lanterna",
            "common_name": "glowjaw",
            "description": "a 20 cm drifter of the deep",
            "created_at": "2020-03-01T12:00:00",
            "owner": { "id": 7, "name": "Curator" },
            "genus": "Photichthys",
            "zones": ["abyssal"],
            "roles": ["grazer"],
            "taxonomy": { "family": "Photichthyidae", "class": "Actinopterygii" },
            "pictures": [{ "artist": "Mural" }]
        },
        {
            "id": 2,
            "name": "Duskmaw",
            "full_name": "Nyctodon crepusculum",
            "created_at": "2021-03-01T12:00:00",
            "extinct": { "date": "2023-06-01", "reason": "outcompeted" },
            "owner": { "name": "Driftwood" },
            "genus": "Nyctodon",
            "zones": ["abyssal", "pelagic"],
            "prey": [1],
            "endangered": false
        }
    ]"#;
    let seeds: Vec<RecordSeed> = serde_json::from_str(raw).expect("records parse");
    MemoryCatalog::from_seeds(seeds)
}

#[tokio::test]
async fn seeded_records_carry_their_relations() {
    let catalog = setup();
    assert_eq!(catalog.len(), 2);
    let engine = Engine::new(&catalog);
    let result = engine.search("zone:abyssal").await.expect("query ok");
    assert_eq!(result.total_len(), 2);
    let result = engine.search("prey:lanternfin").await.expect("query ok");
    assert_eq!(result.total_len(), 1);
    let result = engine.search("family:photichthyidae").await.expect("query ok");
    assert_eq!(result.total_len(), 1);
    let result = engine.search("artist:mural has:size").await.expect("query ok");
    assert_eq!(result.total_len(), 1);
}

#[tokio::test]
async fn seeded_extinction_and_common_name_round_through() {
    let catalog = setup();
    let lantern = catalog.resolve_single("lanternfin").await.expect("resolved");
    assert_eq!(lantern.common_name(), Some("glowjaw"));
    let duskmaw = catalog.resolve_single("duskmaw").await.expect("resolved");
    assert!(duskmaw.is_extinct());
    assert_eq!(duskmaw.extinction().unwrap().reason(), "outcompeted");
}
