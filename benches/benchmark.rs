use criterion::{black_box, criterion_group, criterion_main, Criterion};

use chrono::NaiveDate;
use cladarium::catalog::MemoryCatalog;
use cladarium::engine::Engine;
use cladarium::query::SearchQuery;
use cladarium::record::{Owner, Record};

const ZONES: [&str; 4] = ["abyssal", "pelagic", "coastal", "reef"];
const GENERA: [&str; 5] = ["Photichthys", "Nyctodon", "Euphausia", "Xiphias", "Yarrella"];

fn build_catalog(count: u64) -> MemoryCatalog {
    let mut catalog = MemoryCatalog::new();
    let owner = Owner::new(Some(1), "Curator".to_string());
    for n in 0..count {
        let genus = GENERA[(n % GENERA.len() as u64) as usize];
        let created = NaiveDate::from_ymd_opt(2020 + (n % 5) as i32, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let record = Record::new(
            n + 1,
            format!("Specimen{n}"),
            format!("{genus} specimen{n}"),
            genus.to_string(),
            owner.clone(),
            created,
        )
        .with_description(format!("a drifter of about {} cm", 5 + n % 200));
        catalog.insert(record);
        catalog.add_zone(n + 1, ZONES[(n % ZONES.len() as u64) as usize]);
    }
    catalog
}

pub fn criterion_benchmark(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();

    c.bench_function("parse query", |b| {
        b.iter(|| SearchQuery::parse(black_box("drifter zone:abyssal -status:extinct groupby:genus orderby:largest limit:10")))
    });

    for count in [100, 1_000, 10_000] {
        let catalog = build_catalog(count);
        let engine = Engine::new(&catalog);
        c.bench_function(&format!("search {count}"), |b| {
            b.iter(|| {
                rt.block_on(async {
                    engine
                        .search(black_box("zone:abyssal groupby:genus limit:10"))
                        .await
                        .unwrap()
                })
            })
        });
    }
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
