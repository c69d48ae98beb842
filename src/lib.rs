//! Cladarium – the query engine behind a collaborative taxonomy catalog.
//!
//! Users search the catalog with free text augmented by typed modifiers,
//! e.g. `keyword zone:abyssal -status:extinct groupby:genus`, and get the
//! matching records back partitioned into named, orderable, formattable
//! groups. Cladarium is the whole of that pipeline:
//! * [`query`] – the modifier grammar and alias resolver, producing a
//!   [`query::SearchQuery`] of keywords and typed [`query::Modifier`]s,
//!   plus bulk-operation strings of the form `<query> > <operation> <args>`.
//! * [`results`] – the [`results::SearchResult`] partition of records into
//!   [`results::Group`]s, with filter, fan-out group-by, ordering and
//!   display-format operations.
//! * [`dispatch`] – translates each modifier into a predicate or key
//!   extractor over the catalog and applies it to the result.
//! * [`engine`] – ties it together: parse, keyword match, seed, then fold
//!   the modifiers in input order.
//!
//! ## Records and the catalog boundary
//! A [`record::Record`] is a read-only facet of a catalog entry: identity,
//! names, description, creation time, extinction, owner and genus. All
//! other knowledge about a record (zones, roles, taxonomy, predation and
//! ancestry edges, pictures, generations) is reached through the
//! [`catalog::Catalog`] trait. [`catalog::MemoryCatalog`] is the provided
//! in-memory implementation, seedable from a JSON records file.
//!
//! ## Forgiveness
//! Searches are typed interactively, so only syntactically malformed
//! clauses and operation strings fail a query. Unknown modifier names,
//! unknown enum values, unresolvable references and non-numeric counts
//! all degrade to ignored clauses or empty matches.
//!
//! ## Quick Start
//! ```
//! use cladarium::catalog::MemoryCatalog;
//! use cladarium::engine::Engine;
//! use cladarium::record::{Owner, Record};
//! use chrono::NaiveDate;
//!
//! let mut catalog = MemoryCatalog::new();
//! let created = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap().and_hms_opt(12, 0, 0).unwrap();
//! let record = Record::new(1, "Lanternfin".into(), "Photichthys lanterna".into(),
//!     "Photichthys".into(), Owner::new(Some(7), "curator".into()), created);
//! catalog.insert(record);
//! catalog.add_zone(1, "abyssal");
//!
//! let engine = Engine::new(&catalog);
//! let result = tokio::runtime::Runtime::new().unwrap()
//!     .block_on(engine.search("zone:abyssal")).unwrap();
//! assert_eq!(result.total_len(), 1);
//! ```
//!
//! ## Out of scope
//! Persistence, the chat transport, message rendering and pagination, the
//! taxonomy hierarchy itself, trophies, gotchis and wiki publishing live
//! in their own services; this crate only consumes their read interfaces.

pub mod catalog;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod measure;
pub mod query;
pub mod record;
pub mod results;
pub mod server;
