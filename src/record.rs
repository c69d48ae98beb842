// custom made ordering for records
use std::cmp::Ordering;

// used to print out readable forms of a record
use std::fmt;

use std::hash::{Hash, Hasher};

// used for creation and extinction timestamps
use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;

// ------------- RecordId -------------
pub type RecordId = u64;

// ------------- Owner -------------
#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize)]
pub struct Owner {
    id: Option<u64>,
    name: String,
}
impl Owner {
    pub fn new(id: Option<u64>, name: String) -> Self {
        Self { id, name }
    }
    pub fn id(&self) -> Option<u64> {
        self.id
    }
    pub fn name(&self) -> &str {
        &self.name
    }
}
impl fmt::Display for Owner {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

// ------------- Extinction -------------
#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize)]
pub struct Extinction {
    date: NaiveDate,
    reason: String,
}
impl Extinction {
    pub fn new(date: NaiveDate, reason: String) -> Self {
        Self { date, reason }
    }
    pub fn date(&self) -> NaiveDate {
        self.date
    }
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

// ------------- Picture -------------
#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize)]
pub struct Picture {
    artist: String,
    #[serde(default)]
    caption: String,
}
impl Picture {
    pub fn new(artist: String, caption: String) -> Self {
        Self { artist, caption }
    }
    pub fn artist(&self) -> &str {
        &self.artist
    }
    pub fn caption(&self) -> &str {
        &self.caption
    }
}

// ------------- Record -------------
// The read-only facet the engine sees. Records are created by the catalog
// and never mutated afterwards; encapsulating the fields behind getters
// yields true immutability for objects after creation.
#[derive(Clone, Debug)]
pub struct Record {
    id: RecordId,
    name: String,
    full_name: String,
    common_name: Option<String>,
    description: String,
    created_at: NaiveDateTime,
    extinction: Option<Extinction>,
    owner: Owner,
    genus: String,
}

impl Record {
    pub fn new(
        id: RecordId,
        name: String,
        full_name: String,
        genus: String,
        owner: Owner,
        created_at: NaiveDateTime,
    ) -> Self {
        Self {
            id,
            name,
            full_name,
            common_name: None,
            description: String::new(),
            created_at,
            extinction: None,
            owner,
            genus,
        }
    }
    pub fn with_common_name(mut self, common_name: String) -> Self {
        self.common_name = Some(common_name);
        self
    }
    pub fn with_description(mut self, description: String) -> Self {
        self.description = description;
        self
    }
    pub fn with_extinction(mut self, extinction: Extinction) -> Self {
        self.extinction = Some(extinction);
        self
    }
    pub fn id(&self) -> RecordId {
        self.id
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn full_name(&self) -> &str {
        &self.full_name
    }
    pub fn common_name(&self) -> Option<&str> {
        self.common_name.as_deref()
    }
    pub fn description(&self) -> &str {
        &self.description
    }
    pub fn created_at(&self) -> NaiveDateTime {
        self.created_at
    }
    pub fn extinction(&self) -> Option<&Extinction> {
        self.extinction.as_ref()
    }
    pub fn is_extinct(&self) -> bool {
        self.extinction.is_some()
    }
    pub fn owner(&self) -> &Owner {
        &self.owner
    }
    pub fn genus(&self) -> &str {
        &self.genus
    }
}
impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}
impl Eq for Record {}
impl Hash for Record {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
impl Ord for Record {
    fn cmp(&self, other: &Self) -> Ordering {
        (&self.name, &self.id).cmp(&(&other.name, &other.id))
    }
}
impl PartialOrd for Record {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.id)
    }
}
