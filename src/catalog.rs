// other keepers use HashSet or HashMap
use std::collections::{HashMap, HashSet};
use std::collections::hash_map::RandomState;
use core::hash::{BuildHasher, BuildHasherDefault};
use std::hash::Hash;
use std::sync::Arc;

use async_trait::async_trait;
use bimap::BiMap;
use chrono::{NaiveDate, NaiveDateTime};
use roaring::RoaringTreemap;
use seahash::SeaHasher;
use serde::Deserialize;

use crate::error::Result;
use crate::measure::{self, Measurement};
use crate::record::{Extinction, Owner, Picture, Record, RecordId};

pub type RecordHasher = BuildHasherDefault<SeaHasher>;
pub type OtherHasher = BuildHasherDefault<SeaHasher>;

// ------------- Facet -------------
/// A membership dimension a record can be queried on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Facet {
    Zone,
    Role,
    Taxon,
    Family,
    Order,
    Class,
    Phylum,
    Kingdom,
    Domain,
}

// ------------- GraphKind -------------
/// A direction through the predation or ancestry graph. `Prey` and
/// `Predator` are direct edges; `Ancestor` and `Descendant` cover the
/// transitive closure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GraphKind {
    Prey,
    Predator,
    Ancestor,
    Descendant,
}

// ------------- Generation -------------
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Generation {
    name: String,
    starts: NaiveDate,
}
impl Generation {
    pub fn new(name: String, starts: NaiveDate) -> Self {
        Self { name, starts }
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn starts(&self) -> NaiveDate {
        self.starts
    }
}

// ------------- Catalog -------------
/// The read-only capabilities the engine consumes. How the data is stored
/// and kept consistent is the implementor's concern; the engine only ever
/// reads through this trait.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Substring match across name, full name, common name and description.
    /// All keywords must match; an empty keyword list matches everything.
    async fn match_keywords(&self, keywords: &[String]) -> Vec<Arc<Record>>;
    /// Resolve a reference to exactly one record. Zero or multiple
    /// candidates both yield `None`.
    async fn resolve_single(&self, reference: &str) -> Option<Arc<Record>>;
    async fn memberships(&self, record: &Record, facet: Facet) -> Vec<String>;
    async fn graph_neighbors(&self, record: &Record, kind: GraphKind) -> Vec<RecordId>;
    async fn pictures(&self, record: &Record) -> Vec<Picture>;
    async fn is_endangered(&self, record: &Record) -> bool;
    async fn resolve_user(&self, name: &str) -> Option<u64>;
    async fn generation_by_date(&self, at: NaiveDateTime) -> Option<Generation>;
    fn extract_size(&self, description: &str) -> Option<Measurement> {
        measure::extract_size(description)
    }
}

// ------------- Lookup -------------
#[derive(Debug)]
pub struct Lookup<K, V, H = RandomState> {
    index: HashMap<K, HashSet<V>, H>,
}
impl<K: Eq + Hash, V: Eq + Hash + Clone, H: BuildHasher + Default> Lookup<K, V, H> {
    pub fn new() -> Self {
        Self {
            index: HashMap::<K, HashSet<V>, H>::default(),
        }
    }
    pub fn insert(&mut self, key: K, value: V) {
        let set = self.index.entry(key).or_insert(HashSet::<V>::new());
        set.insert(value);
    }
    pub fn lookup(&self, key: &K) -> Vec<V> {
        self.index
            .get(key)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default()
    }
    pub fn contains(&self, key: &K, value: &V) -> bool {
        self.index.get(key).is_some_and(|set| set.contains(value))
    }
}
impl<K: Eq + Hash, V: Eq + Hash + Clone, H: BuildHasher + Default> Default for Lookup<K, V, H> {
    fn default() -> Self {
        Self::new()
    }
}

// ------------- TaxonomyPath -------------
#[derive(Clone, Debug, Default, Deserialize)]
pub struct TaxonomyPath {
    #[serde(default)]
    family: Option<String>,
    #[serde(default)]
    order: Option<String>,
    #[serde(default)]
    class: Option<String>,
    #[serde(default)]
    phylum: Option<String>,
    #[serde(default)]
    kingdom: Option<String>,
    #[serde(default)]
    domain: Option<String>,
}
impl TaxonomyPath {
    pub fn new(
        family: Option<String>,
        order: Option<String>,
        class: Option<String>,
        phylum: Option<String>,
        kingdom: Option<String>,
        domain: Option<String>,
    ) -> Self {
        Self {
            family,
            order,
            class,
            phylum,
            kingdom,
            domain,
        }
    }
    pub fn rank(&self, facet: Facet) -> Option<&str> {
        match facet {
            Facet::Family => self.family.as_deref(),
            Facet::Order => self.order.as_deref(),
            Facet::Class => self.class.as_deref(),
            Facet::Phylum => self.phylum.as_deref(),
            Facet::Kingdom => self.kingdom.as_deref(),
            Facet::Domain => self.domain.as_deref(),
            Facet::Zone | Facet::Role | Facet::Taxon => None,
        }
    }
    pub fn path(&self) -> Vec<String> {
        [
            &self.family,
            &self.order,
            &self.class,
            &self.phylum,
            &self.kingdom,
            &self.domain,
        ]
        .into_iter()
        .flatten()
        .cloned()
        .collect()
    }
}

// ------------- MemoryCatalog -------------
// An in-memory catalog, indexed the way the engine asks its questions.
// The binary seeds one from a records file; the test suite builds small
// ones by hand.
#[derive(Debug, Default)]
pub struct MemoryCatalog {
    records: HashMap<RecordId, Arc<Record>, RecordHasher>,
    ordered: Vec<RecordId>,
    names: BiMap<String, RecordId>,
    zones: Lookup<RecordId, String, RecordHasher>,
    roles: Lookup<RecordId, String, RecordHasher>,
    taxonomy: HashMap<RecordId, TaxonomyPath, RecordHasher>,
    prey: Lookup<RecordId, RecordId, RecordHasher>,
    predators: Lookup<RecordId, RecordId, RecordHasher>,
    parents: HashMap<RecordId, RecordId, RecordHasher>,
    children: Lookup<RecordId, RecordId, RecordHasher>,
    pictures: HashMap<RecordId, Vec<Picture>, RecordHasher>,
    endangered: RoaringTreemap,
    users: HashMap<String, u64, OtherHasher>,
    generations: Vec<Generation>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }
    /// Load a catalog from a JSON records file.
    pub fn load(path: &str) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let seeds: Vec<RecordSeed> = serde_json::from_str(&raw)?;
        Ok(Self::from_seeds(seeds))
    }
    pub fn from_seeds(seeds: Vec<RecordSeed>) -> Self {
        let mut catalog = Self::new();
        for seed in seeds {
            catalog.insert_seed(seed);
        }
        catalog
    }
    pub fn insert(&mut self, record: Record) -> Arc<Record> {
        let id = record.id();
        if let Some(owner_id) = record.owner().id() {
            self.users
                .insert(record.owner().name().to_lowercase(), owner_id);
        }
        self.names.insert(record.name().to_lowercase(), id);
        let kept = Arc::new(record);
        if self.records.insert(id, Arc::clone(&kept)).is_none() {
            self.ordered.push(id);
        }
        kept
    }
    fn insert_seed(&mut self, seed: RecordSeed) {
        let mut record = Record::new(
            seed.id,
            seed.name,
            seed.full_name,
            seed.genus,
            seed.owner,
            seed.created_at,
        );
        if let Some(common_name) = seed.common_name {
            record = record.with_common_name(common_name);
        }
        if !seed.description.is_empty() {
            record = record.with_description(seed.description);
        }
        if let Some(extinction) = seed.extinct {
            record = record.with_extinction(extinction);
        }
        self.insert(record);
        for zone in seed.zones {
            self.add_zone(seed.id, &zone);
        }
        for role in seed.roles {
            self.add_role(seed.id, &role);
        }
        self.set_taxonomy(seed.id, seed.taxonomy);
        for prey in seed.prey {
            self.add_prey(seed.id, prey);
        }
        if let Some(parent) = seed.parent {
            self.set_parent(seed.id, parent);
        }
        for picture in seed.pictures {
            self.add_picture(seed.id, picture);
        }
        if seed.endangered {
            self.mark_endangered(seed.id);
        }
    }
    pub fn add_zone(&mut self, id: RecordId, zone: &str) {
        self.zones.insert(id, zone.to_string());
    }
    pub fn add_role(&mut self, id: RecordId, role: &str) {
        self.roles.insert(id, role.to_string());
    }
    pub fn set_taxonomy(&mut self, id: RecordId, path: TaxonomyPath) {
        self.taxonomy.insert(id, path);
    }
    pub fn add_prey(&mut self, predator: RecordId, prey: RecordId) {
        self.prey.insert(predator, prey);
        self.predators.insert(prey, predator);
    }
    pub fn set_parent(&mut self, child: RecordId, parent: RecordId) {
        self.parents.insert(child, parent);
        self.children.insert(parent, child);
    }
    pub fn add_picture(&mut self, id: RecordId, picture: Picture) {
        self.pictures.entry(id).or_default().push(picture);
    }
    pub fn mark_endangered(&mut self, id: RecordId) {
        self.endangered.insert(id);
    }
    pub fn add_generation(&mut self, generation: Generation) {
        self.generations.push(generation);
        self.generations.sort_by_key(|g| g.starts());
    }
    pub fn len(&self) -> usize {
        self.records.len()
    }
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn ancestors_of(&self, id: RecordId) -> Vec<RecordId> {
        let mut out = Vec::new();
        let mut seen = RoaringTreemap::new();
        let mut current = self.parents.get(&id).copied();
        while let Some(parent) = current {
            if !seen.insert(parent) {
                break;
            }
            out.push(parent);
            current = self.parents.get(&parent).copied();
        }
        out
    }
    fn descendants_of(&self, id: RecordId) -> Vec<RecordId> {
        let mut out = Vec::new();
        let mut seen = RoaringTreemap::new();
        let mut queue = self.children.lookup(&id);
        while let Some(child) = queue.pop() {
            if !seen.insert(child) {
                continue;
            }
            out.push(child);
            queue.extend(self.children.lookup(&child));
        }
        out
    }
}

fn field_matches(record: &Record, keyword: &str) -> bool {
    record.name().to_lowercase().contains(keyword)
        || record.full_name().to_lowercase().contains(keyword)
        || record
            .common_name()
            .is_some_and(|c| c.to_lowercase().contains(keyword))
        || record.description().to_lowercase().contains(keyword)
}

#[async_trait]
impl Catalog for MemoryCatalog {
    async fn match_keywords(&self, keywords: &[String]) -> Vec<Arc<Record>> {
        let keywords: Vec<String> = keywords.iter().map(|k| k.to_lowercase()).collect();
        self.ordered
            .iter()
            .filter_map(|id| self.records.get(id))
            .filter(|record| keywords.iter().all(|k| field_matches(record, k)))
            .cloned()
            .collect()
    }
    async fn resolve_single(&self, reference: &str) -> Option<Arc<Record>> {
        let needle = reference.trim().to_lowercase();
        if needle.is_empty() {
            return None;
        }
        if let Some(id) = self.names.get_by_left(&needle) {
            return self.records.get(id).cloned();
        }
        let mut candidates = self
            .ordered
            .iter()
            .filter_map(|id| self.records.get(id))
            .filter(|record| field_matches(record, &needle));
        match (candidates.next(), candidates.next()) {
            (Some(only), None) => Some(Arc::clone(only)),
            // ambiguous references are treated as no match
            _ => None,
        }
    }
    async fn memberships(&self, record: &Record, facet: Facet) -> Vec<String> {
        match facet {
            Facet::Zone => self.zones.lookup(&record.id()),
            Facet::Role => self.roles.lookup(&record.id()),
            Facet::Taxon => self
                .taxonomy
                .get(&record.id())
                .map(TaxonomyPath::path)
                .unwrap_or_default(),
            rank => self
                .taxonomy
                .get(&record.id())
                .and_then(|path| path.rank(rank))
                .map(|name| vec![name.to_string()])
                .unwrap_or_default(),
        }
    }
    async fn graph_neighbors(&self, record: &Record, kind: GraphKind) -> Vec<RecordId> {
        match kind {
            GraphKind::Prey => self.prey.lookup(&record.id()),
            GraphKind::Predator => self.predators.lookup(&record.id()),
            GraphKind::Ancestor => self.ancestors_of(record.id()),
            GraphKind::Descendant => self.descendants_of(record.id()),
        }
    }
    async fn pictures(&self, record: &Record) -> Vec<Picture> {
        self.pictures.get(&record.id()).cloned().unwrap_or_default()
    }
    async fn is_endangered(&self, record: &Record) -> bool {
        self.endangered.contains(record.id())
    }
    async fn resolve_user(&self, name: &str) -> Option<u64> {
        self.users.get(&name.trim().to_lowercase()).copied()
    }
    async fn generation_by_date(&self, at: NaiveDateTime) -> Option<Generation> {
        self.generations
            .iter()
            .rev()
            .find(|g| g.starts() <= at.date())
            .cloned()
    }
}

// ------------- RecordSeed -------------
/// One record as stated in a JSON records file, relations included.
#[derive(Debug, Deserialize)]
pub struct RecordSeed {
    pub id: RecordId,
    pub name: String,
    pub full_name: String,
    #[serde(default)]
    pub common_name: Option<String>,
    #[serde(default)]
    pub description: String,
    pub created_at: NaiveDateTime,
    #[serde(default)]
    pub extinct: Option<Extinction>,
    pub owner: Owner,
    pub genus: String,
    #[serde(default)]
    pub zones: Vec<String>,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub taxonomy: TaxonomyPath,
    #[serde(default)]
    pub prey: Vec<RecordId>,
    #[serde(default)]
    pub parent: Option<RecordId>,
    #[serde(default)]
    pub pictures: Vec<Picture>,
    #[serde(default)]
    pub endangered: bool,
}
