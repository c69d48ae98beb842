
use tracing::debug;

use crate::catalog::Catalog;
use crate::dispatch;
use crate::error::Result;
use crate::query::{BulkOperation, SearchQuery};
use crate::results::{DEFAULT_GROUP, SearchResult};

// ------------- EngineSettings -------------
#[derive(Clone, Debug)]
pub struct EngineSettings {
    /// When off, generation modifiers and groupings are no-ops.
    pub generations: bool,
}
impl Default for EngineSettings {
    fn default() -> Self {
        Self { generations: true }
    }
}

// ------------- Engine -------------
/// Executes queries against a catalog: parse, match keywords, seed the
/// default group, then fold each modifier over the result strictly in
/// input order. Later modifiers depend on the ordered state left by
/// earlier ones, so no reordering happens here.
pub struct Engine<'a, C: Catalog + ?Sized> {
    catalog: &'a C,
    settings: EngineSettings,
}

impl<'a, C: Catalog + ?Sized> Engine<'a, C> {
    pub fn new(catalog: &'a C) -> Self {
        Self {
            catalog,
            settings: EngineSettings::default(),
        }
    }
    pub fn with_settings(catalog: &'a C, settings: EngineSettings) -> Self {
        Self { catalog, settings }
    }
    /// Parse and run one search query.
    pub async fn search(&self, query: &str) -> Result<SearchResult> {
        let parsed = SearchQuery::parse(query)?;
        Ok(self.run(&parsed).await)
    }
    /// Run an already parsed query.
    pub async fn run(&self, query: &SearchQuery) -> SearchResult {
        let matched = self.catalog.match_keywords(query.keywords()).await;
        debug!(
            keywords = query.keywords().len(),
            matched = matched.len(),
            "seeding result"
        );
        let mut result = SearchResult::new();
        result.seed(matched, DEFAULT_GROUP);
        for modifier in query.modifiers() {
            dispatch::apply(self.catalog, &self.settings, &mut result, modifier).await;
        }
        result
    }
    /// Parse a bulk-operation string and run its query half. The caller
    /// owns what the operation then does with the matched records.
    pub async fn plan_operation(&self, input: &str) -> Result<(BulkOperation, SearchResult)> {
        let operation = BulkOperation::parse(input)?;
        let result = self.run(operation.query()).await;
        Ok((operation, result))
    }
}
