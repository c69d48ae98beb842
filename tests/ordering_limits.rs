use chrono::{NaiveDate, NaiveDateTime};
use cladarium::catalog::MemoryCatalog;
use cladarium::engine::Engine;
use cladarium::record::{Owner, Record};
use cladarium::results::DEFAULT_GROUP;

fn at(year: i32, month: u32, day: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap()
}

fn specimen(id: u64, name: &str, genus: &str, created: NaiveDateTime, size: &str) -> Record {
    let record = Record::new(
        id,
        name.to_string(),
        format!("{genus} {}", name.to_lowercase()),
        genus.to_string(),
        Owner::new(Some(1), "Curator".to_string()),
        created,
    );
    if size.is_empty() {
        record
    } else {
        record.with_description(format!("grows to {size} in open water"))
    }
}

// five extant records, alphabetical by name, one per year
fn setup() -> MemoryCatalog {
    let mut catalog = MemoryCatalog::new();
    catalog.insert(specimen(1, "Aldertail", "Xiphias", at(2020, 5, 1), "12 cm"));
    catalog.insert(specimen(2, "Briskjaw", "Xiphias", at(2021, 5, 1), "2 m"));
    catalog.insert(specimen(3, "Cindrel", "Xiphias", at(2022, 5, 1), ""));
    catalog.insert(specimen(4, "Dunewing", "Yarrella", at(2023, 5, 1), "30 cm"));
    catalog.insert(specimen(5, "Emberling", "Yarrella", at(2024, 5, 1), "5 mm"));
    catalog
}

fn names(result: &cladarium::results::SearchResult, catalog: &MemoryCatalog) -> Vec<String> {
    result
        .groups_in_order()
        .iter()
        .flat_map(|group| group.ordered_items(catalog))
        .map(|record| record.name().to_string())
        .collect()
}

#[tokio::test]
async fn limit_keeps_the_alphabetically_first_records() {
    let catalog = setup();
    let engine = Engine::new(&catalog);
    let result = engine.search("limit:2").await.expect("query ok");
    assert_eq!(names(&result, &catalog), ["Aldertail", "Briskjaw"]);
}

#[tokio::test]
async fn limit_bounds_the_whole_grouped_result() {
    let catalog = setup();
    let engine = Engine::new(&catalog);
    let result = engine.search("groupby:genus limit:3").await.expect("query ok");
    assert!(result.total_len() <= 3);
}

#[tokio::test]
async fn limit_respects_the_chosen_ordering() {
    let catalog = setup();
    let engine = Engine::new(&catalog);
    let result = engine
        .search("orderby:newest limit:2")
        .await
        .expect("query ok");
    assert_eq!(names(&result, &catalog), ["Emberling", "Dunewing"]);
}

#[tokio::test]
async fn newest_and_oldest_order_by_creation_time() {
    let catalog = setup();
    let engine = Engine::new(&catalog);
    let result = engine.search("orderby:newest").await.expect("query ok");
    let group = result.group(DEFAULT_GROUP).expect("default group");
    let ordered = group.ordered_items(&catalog);
    assert_eq!(ordered[0].name(), "Emberling");
    assert_eq!(ordered[4].name(), "Aldertail");
    let result = engine.search("orderby:oldest").await.expect("query ok");
    let group = result.group(DEFAULT_GROUP).expect("default group");
    assert_eq!(group.ordered_items(&catalog)[0].name(), "Aldertail");
}

#[tokio::test]
async fn size_orderings_use_parsed_measurements() {
    let catalog = setup();
    let engine = Engine::new(&catalog);
    let result = engine.search("orderby:smallest").await.expect("query ok");
    let group = result.group(DEFAULT_GROUP).expect("default group");
    let ordered: Vec<String> = group
        .ordered_items(&catalog)
        .iter()
        .map(|r| r.name().to_string())
        .collect();
    assert_eq!(
        ordered,
        ["Emberling", "Aldertail", "Dunewing", "Briskjaw", "Cindrel"],
        "sizeless records sort last"
    );
    let result = engine.search("orderby:largest").await.expect("query ok");
    let group = result.group(DEFAULT_GROUP).expect("default group");
    let ordered: Vec<String> = group
        .ordered_items(&catalog)
        .iter()
        .map(|r| r.name().to_string())
        .collect();
    assert_eq!(
        ordered,
        ["Briskjaw", "Dunewing", "Aldertail", "Emberling", "Cindrel"]
    );
}

#[tokio::test]
async fn ordering_an_already_ordered_group_is_stable() {
    let catalog = setup();
    let engine = Engine::new(&catalog);
    // insertion order is already alphabetical, the default ordering
    let result = engine.search("").await.expect("query ok");
    let group = result.group(DEFAULT_GROUP).expect("default group");
    let before: Vec<u64> = group.items().iter().map(|r| r.id()).collect();
    let after: Vec<u64> = group.ordered_items(&catalog).iter().map(|r| r.id()).collect();
    assert_eq!(before, after);
}

#[tokio::test]
async fn random_takes_a_uniform_subset() {
    let catalog = setup();
    let engine = Engine::new(&catalog);
    let result = engine.search("random:2").await.expect("query ok");
    assert_eq!(result.total_len(), 2);
    let all: Vec<u64> = (1..=5).collect();
    assert!(result.all_records().iter().all(|r| all.contains(&r.id())));
}

#[tokio::test]
async fn oversized_random_keeps_everything() {
    let catalog = setup();
    let engine = Engine::new(&catalog);
    let result = engine.search("random:50").await.expect("query ok");
    assert_eq!(result.total_len(), 5);
}

#[tokio::test]
async fn non_numeric_counts_are_no_ops() {
    let catalog = setup();
    let engine = Engine::new(&catalog);
    for query in ["random:often", "random:0", "limit:some", "limit:0", "limit:-3"] {
        let result = engine.search(query).await.expect("query ok");
        assert_eq!(result.total_len(), 5, "query {query:?} should change nothing");
    }
}
