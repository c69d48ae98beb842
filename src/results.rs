
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;

use futures_util::future;
// used for internal keep-sets of record identities
use roaring::RoaringTreemap;
use tracing::debug;

use crate::catalog::Catalog;
use crate::query::{DisplayFormat, Ordering};
use crate::record::Record;

/// Every result starts out with all matches in this group.
pub const DEFAULT_GROUP: &str = "";

// ------------- Group -------------
#[derive(Clone, Debug)]
pub struct Group {
    name: String,
    order_by: Ordering,
    display_format: DisplayFormat,
    items: Vec<Arc<Record>>,
    ids: RoaringTreemap,
}

impl Group {
    fn new(name: &str, order_by: Ordering, display_format: DisplayFormat) -> Self {
        Self {
            name: name.to_string(),
            order_by,
            display_format,
            items: Vec::new(),
            ids: RoaringTreemap::new(),
        }
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn order_by(&self) -> Ordering {
        self.order_by
    }
    pub fn display_format(&self) -> DisplayFormat {
        self.display_format
    }
    pub fn items(&self) -> &[Arc<Record>] {
        &self.items
    }
    pub fn len(&self) -> usize {
        self.items.len()
    }
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
    pub fn contains(&self, record: &Record) -> bool {
        self.ids.contains(record.id())
    }
    fn push(&mut self, record: Arc<Record>) {
        // a group never holds the same identity twice
        if self.ids.insert(record.id()) {
            self.items.push(record);
        }
    }
    fn retain_ids(&mut self, keep: &RoaringTreemap) {
        self.items.retain(|record| keep.contains(record.id()));
        self.ids &= keep;
    }
    /// Materialize the items under this group's ordering. All sorts are
    /// stable, so items already in order come back unchanged.
    pub fn ordered_items<C: Catalog + ?Sized>(&self, catalog: &C) -> Vec<Arc<Record>> {
        let mut items = self.items.clone();
        match self.order_by {
            Ordering::Newest => {
                items.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
            }
            Ordering::Oldest => {
                items.sort_by(|a, b| a.created_at().cmp(&b.created_at()));
            }
            Ordering::Smallest | Ordering::Largest => {
                let largest = self.order_by == Ordering::Largest;
                let mut keyed: Vec<_> = items
                    .drain(..)
                    .map(|record| (catalog.extract_size(record.description()), record))
                    .collect();
                // records without a parseable size sort last either way
                keyed.sort_by(|(a, _), (b, _)| match (a, b) {
                    (Some(a), Some(b)) if largest => b.cmp(a),
                    (Some(a), Some(b)) => a.cmp(b),
                    (Some(_), None) => std::cmp::Ordering::Less,
                    (None, Some(_)) => std::cmp::Ordering::Greater,
                    (None, None) => std::cmp::Ordering::Equal,
                });
                items = keyed.into_iter().map(|(_, record)| record).collect();
            }
            Ordering::Count | Ordering::Default => {
                items.sort_by(|a, b| a.name().to_lowercase().cmp(&b.name().to_lowercase()));
            }
        }
        items
    }
}

/// One record's display string under a format. Extinct records are
/// struck through regardless of format.
pub fn display_string(record: &Record, format: DisplayFormat) -> String {
    let base = match format {
        DisplayFormat::FullName => record.full_name().to_string(),
        DisplayFormat::CommonName => record
            .common_name()
            .unwrap_or(record.name())
            .to_string(),
        DisplayFormat::SpeciesOnly => record
            .full_name()
            .split_whitespace()
            .last()
            .unwrap_or(record.name())
            .to_lowercase(),
        DisplayFormat::ShortName | DisplayFormat::Leaderboard => record.name().to_string(),
    };
    if record.is_extinct() {
        format!("~~{base}~~")
    } else {
        base
    }
}

// ------------- SearchResult -------------
// The partition of matched records into named groups. Created once per
// query, mutated in place by each modifier, discarded after rendering.
#[derive(Clone, Debug, Default)]
pub struct SearchResult {
    groups: BTreeMap<String, Group>,
    order_by: Ordering,
    display_format: DisplayFormat,
    explicit_order: bool,
}

impl SearchResult {
    pub fn new() -> Self {
        Self::default()
    }
    /// Append records to the named group, creating it if absent. Merges
    /// into an existing group rather than overwriting it.
    pub fn seed(&mut self, records: Vec<Arc<Record>>, group_name: &str) {
        let order_by = self.order_by;
        let display_format = self.display_format;
        let group = self
            .groups
            .entry(group_name.to_string())
            .or_insert_with(|| Group::new(group_name, order_by, display_format));
        for record in records {
            group.push(record);
        }
    }
    /// Keep, in every group, the items for which the criterion outcome
    /// differs from `subtractive`: the single place where the
    /// subtractive flag inverts a positively phrased criterion. Groups
    /// left empty are removed. Relative order of survivors is preserved.
    pub async fn filter<F, Fut>(&mut self, criterion: F, subtractive: bool)
    where
        F: Fn(Arc<Record>) -> Fut,
        Fut: Future<Output = bool>,
    {
        for group in self.groups.values_mut() {
            let outcomes =
                future::join_all(group.items.iter().map(|r| criterion(Arc::clone(r)))).await;
            let mut keep = RoaringTreemap::new();
            for (record, matched) in group.items.iter().zip(outcomes) {
                if matched != subtractive {
                    keep.insert(record.id());
                }
            }
            group.retain_ids(&keep);
        }
        self.groups.retain(|_, group| !group.is_empty());
    }
    /// Discard the current partition and fan records out into the groups
    /// named by the key extractor. A record lands in every group it has
    /// a key for, which may be none at all.
    pub async fn group_by<F, Fut>(&mut self, keys: F)
    where
        F: Fn(Arc<Record>) -> Fut,
        Fut: Future<Output = Vec<String>>,
    {
        let mut seen = RoaringTreemap::new();
        let mut flat = Vec::new();
        for group in self.groups.values() {
            for record in &group.items {
                if seen.insert(record.id()) {
                    flat.push(Arc::clone(record));
                }
            }
        }
        let keyed = future::join_all(flat.iter().map(|r| keys(Arc::clone(r)))).await;
        let order_by = self.order_by;
        let display_format = self.display_format;
        self.groups.clear();
        for (record, names) in flat.into_iter().zip(keyed) {
            for name in names {
                let group = self
                    .groups
                    .entry(name.clone())
                    .or_insert_with(|| Group::new(&name, order_by, display_format));
                group.push(Arc::clone(&record));
            }
        }
        debug!(groups = self.groups.len(), "regrouped");
    }
    pub fn set_order_by(&mut self, order_by: Ordering) {
        self.propagate_order(order_by);
        self.explicit_order = true;
    }
    /// Propagate an ordering without recording it as user-chosen; lets
    /// the leaderboard format install its count ordering while an
    /// explicit `orderby` still wins.
    pub(crate) fn propagate_order(&mut self, order_by: Ordering) {
        self.order_by = order_by;
        for group in self.groups.values_mut() {
            group.order_by = order_by;
        }
    }
    pub fn has_explicit_order(&self) -> bool {
        self.explicit_order
    }
    pub fn set_display_format(&mut self, display_format: DisplayFormat) {
        self.display_format = display_format;
        for group in self.groups.values_mut() {
            group.display_format = display_format;
        }
    }
    pub fn order_by(&self) -> Ordering {
        self.order_by
    }
    pub fn display_format(&self) -> DisplayFormat {
        self.display_format
    }
    pub fn group(&self, name: &str) -> Option<&Group> {
        self.groups.get(name)
    }
    pub fn groups(&self) -> impl Iterator<Item = &Group> {
        self.groups.values()
    }
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }
    /// Groups in display order: lexicographic by name, unless ordered by
    /// count, in which case larger groups come first (ties stay
    /// lexicographic since the sort is stable).
    pub fn groups_in_order(&self) -> Vec<&Group> {
        let mut groups: Vec<&Group> = self.groups.values().collect();
        if self.order_by == Ordering::Count {
            groups.sort_by(|a, b| b.len().cmp(&a.len()));
        }
        groups
    }
    /// Every distinct record across all groups, in display order.
    pub fn all_records(&self) -> Vec<Arc<Record>> {
        let mut seen = RoaringTreemap::new();
        let mut records = Vec::new();
        for group in self.groups_in_order() {
            for record in &group.items {
                if seen.insert(record.id()) {
                    records.push(Arc::clone(record));
                }
            }
        }
        records
    }
    pub fn total_len(&self) -> usize {
        let mut seen = RoaringTreemap::new();
        for group in self.groups.values() {
            seen |= &group.ids;
        }
        seen.len() as usize
    }
    pub fn is_empty(&self) -> bool {
        self.groups.values().all(Group::is_empty)
    }
    /// Keep only the identities in `keep`, everywhere; drop emptied groups.
    pub(crate) fn retain_ids(&mut self, keep: &RoaringTreemap) {
        for group in self.groups.values_mut() {
            group.retain_ids(keep);
        }
        self.groups.retain(|_, group| !group.is_empty());
    }
    /// Keep only the first `n` records of the ordered result, walking
    /// groups in display order and each group's items in its ordering.
    pub fn limit<C: Catalog + ?Sized>(&mut self, n: usize, catalog: &C) {
        let mut budget = n;
        let mut kept = BTreeMap::new();
        for group in self.groups_in_order() {
            if budget == 0 {
                break;
            }
            let items: Vec<_> = group
                .ordered_items(catalog)
                .into_iter()
                .take(budget)
                .collect();
            budget -= items.len();
            let mut trimmed = Group::new(group.name(), group.order_by, group.display_format);
            for record in items {
                trimmed.push(record);
            }
            if !trimmed.is_empty() {
                kept.insert(trimmed.name.clone(), trimmed);
            }
        }
        self.groups = kept;
    }
}
