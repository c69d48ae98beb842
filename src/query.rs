
use lazy_static::lazy_static;
use regex::Regex;

use crate::error::{CladariumError, Result};

// ------------- ModifierKind -------------
// A closed union of everything a clause can mean. The three meta kinds
// carry their secondary enum, resolved once at parse time; a `None`
// payload means the value was unrecognized and the clause is ignored.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModifierKind {
    Zone,
    Role,
    Family,
    Order,
    Class,
    Phylum,
    Kingdom,
    Domain,
    Taxon,
    Generation,
    Creator,
    Status,
    Prey,
    Predator,
    Has,
    Ancestor,
    Descendant,
    Random,
    Limit,
    Artist,
    GroupBy(Option<Grouping>),
    OrderBy(Option<Ordering>),
    Format(Option<DisplayFormat>),
    Unknown,
}

impl ModifierKind {
    /// Alias lookup. Unrecognized names resolve to `Unknown` so that a
    /// typo degrades to an ignored clause instead of a failed query.
    pub fn resolve(name: &str, value: &str) -> Self {
        match name {
            "zone" | "z" => Self::Zone,
            "role" | "r" => Self::Role,
            "family" | "f" => Self::Family,
            "order" | "o" => Self::Order,
            "class" | "c" => Self::Class,
            "phylum" | "p" => Self::Phylum,
            "kingdom" | "k" => Self::Kingdom,
            "domain" | "d" => Self::Domain,
            "taxon" | "clade" | "t" => Self::Taxon,
            "generation" | "gen" => Self::Generation,
            "creator" | "owner" | "maker" => Self::Creator,
            "status" | "s" => Self::Status,
            "prey" => Self::Prey,
            "predator" | "pred" => Self::Predator,
            "has" => Self::Has,
            "ancestor" | "anc" => Self::Ancestor,
            "descendant" | "desc" | "evo" => Self::Descendant,
            "random" | "rand" => Self::Random,
            "limit" | "first" => Self::Limit,
            "artist" => Self::Artist,
            "groupby" | "group" | "gb" => Self::GroupBy(Grouping::resolve(value)),
            "orderby" | "sort" | "ob" => Self::OrderBy(Ordering::resolve(value)),
            "format" | "fmt" => Self::Format(DisplayFormat::resolve(value)),
            _ => Self::Unknown,
        }
    }
    pub fn is_meta(&self) -> bool {
        matches!(
            self,
            Self::GroupBy(_) | Self::OrderBy(_) | Self::Format(_)
        )
    }
}

// ------------- Grouping -------------
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Grouping {
    Zone,
    Role,
    Genus,
    Family,
    Order,
    Class,
    Phylum,
    Kingdom,
    Domain,
    Creator,
    Status,
    Generation,
}
impl Grouping {
    pub fn resolve(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "zone" | "z" => Some(Self::Zone),
            "role" | "r" => Some(Self::Role),
            "genus" | "g" => Some(Self::Genus),
            "family" | "f" => Some(Self::Family),
            "order" | "o" => Some(Self::Order),
            "class" | "c" => Some(Self::Class),
            "phylum" | "p" => Some(Self::Phylum),
            "kingdom" | "k" => Some(Self::Kingdom),
            "domain" | "d" => Some(Self::Domain),
            "creator" | "owner" => Some(Self::Creator),
            "status" | "s" => Some(Self::Status),
            "generation" | "gen" => Some(Self::Generation),
            _ => None,
        }
    }
}

// ------------- Ordering -------------
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Ordering {
    #[default]
    Default,
    Newest,
    Oldest,
    Smallest,
    Largest,
    Count,
}
impl Ordering {
    pub fn resolve(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "default" => Some(Self::Default),
            "newest" | "new" | "latest" => Some(Self::Newest),
            "oldest" | "old" => Some(Self::Oldest),
            "smallest" | "small" => Some(Self::Smallest),
            "largest" | "large" | "big" => Some(Self::Largest),
            "count" => Some(Self::Count),
            _ => None,
        }
    }
}

// ------------- DisplayFormat -------------
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DisplayFormat {
    #[default]
    ShortName,
    FullName,
    CommonName,
    SpeciesOnly,
    Leaderboard,
}
impl DisplayFormat {
    pub fn resolve(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "short" | "shortname" => Some(Self::ShortName),
            "full" | "fullname" => Some(Self::FullName),
            "common" | "commonname" => Some(Self::CommonName),
            "species" | "epithet" => Some(Self::SpeciesOnly),
            "leaderboard" | "lb" => Some(Self::Leaderboard),
            _ => None,
        }
    }
}

// ------------- Modifier -------------
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Modifier {
    name: String,
    value: String,
    subtractive: bool,
    kind: ModifierKind,
}

impl Modifier {
    /// Parse one clause of the form `name:value` or `-name:value`.
    ///
    /// The clause must contain exactly one colon outside of quotes, and
    /// the colon may not be the final character. One layer of matching
    /// quotes is stripped from the value.
    pub fn parse(clause: &str) -> Result<Self> {
        let trimmed = clause.trim();
        let (subtractive, rest) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };
        let mut in_quotes = false;
        let mut split = None;
        let mut colons = 0;
        for (at, c) in rest.char_indices() {
            match c {
                '"' => in_quotes = !in_quotes,
                ':' if !in_quotes => {
                    colons += 1;
                    if split.is_none() {
                        split = Some(at);
                    }
                }
                _ => (),
            }
        }
        let at = match (colons, split) {
            (1, Some(at)) if at + 1 < rest.len() => at,
            _ => {
                return Err(CladariumError::MalformedQuery {
                    clause: trimmed.to_string(),
                });
            }
        };
        let name = rest[..at].to_lowercase();
        let value = strip_quotes(&rest[at + 1..]).to_string();
        let kind = ModifierKind::resolve(&name, &value);
        Ok(Self {
            name,
            value,
            subtractive,
            kind,
        })
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn value(&self) -> &str {
        &self.value
    }
    pub fn subtractive(&self) -> bool {
        self.subtractive
    }
    pub fn kind(&self) -> ModifierKind {
        self.kind
    }
    /// The comma-separated value list, trimmed and lowercased, for
    /// membership-style filters.
    pub fn values(&self) -> Vec<String> {
        self.value
            .split(',')
            .map(|v| v.trim().to_lowercase())
            .filter(|v| !v.is_empty())
            .collect()
    }
}

fn strip_quotes(value: &str) -> &str {
    let value = value.trim();
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        &value[1..value.len() - 1]
    } else {
        value
    }
}

lazy_static! {
    // a token is a modifier clause when an optionally negated name is
    // followed by a colon
    static ref MODIFIER_PATTERN: Regex = Regex::new(r"^-?[A-Za-z][A-Za-z0-9_]*:").unwrap();
}

// ------------- SearchQuery -------------
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SearchQuery {
    keywords: Vec<String>,
    modifiers: Vec<Modifier>,
}

impl SearchQuery {
    /// Split a query string on whitespace outside of quoted spans. Tokens
    /// matching the modifier-clause pattern become modifiers; every other
    /// token is a keyword.
    pub fn parse(query: &str) -> Result<Self> {
        let mut keywords = Vec::new();
        let mut modifiers = Vec::new();
        for token in split_tokens(query) {
            if MODIFIER_PATTERN.is_match(&token) {
                modifiers.push(Modifier::parse(&token)?);
            } else {
                keywords.push(strip_quotes(&token).to_string());
            }
        }
        Ok(Self {
            keywords,
            modifiers,
        })
    }
    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }
    pub fn modifiers(&self) -> &[Modifier] {
        &self.modifiers
    }
}

fn split_tokens(query: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    for c in query.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                current.push(c);
            }
            c if c.is_whitespace() && !in_quotes => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

// ------------- BulkOperation -------------
// `<query> > <operation> <args...>`, split on the last `>` so the query
// text itself may contain `>`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BulkOperation {
    query: SearchQuery,
    operation: String,
    args: Vec<String>,
}

impl BulkOperation {
    pub fn parse(input: &str) -> Result<Self> {
        let at = input.rfind('>').ok_or_else(|| CladariumError::MalformedOperation {
            reason: format!("missing '>' in {input:?}"),
        })?;
        let query_part = input[..at].trim();
        let operation_part = input[at + 1..].trim();
        if query_part.is_empty() || operation_part.is_empty() {
            return Err(CladariumError::MalformedOperation {
                reason: format!("empty side of '>' in {input:?}"),
            });
        }
        let query = SearchQuery::parse(query_part)?;
        let mut words = operation_part.split_whitespace().map(str::to_string);
        let Some(operation) = words.next() else {
            return Err(CladariumError::MalformedOperation {
                reason: format!("missing operation name in {input:?}"),
            });
        };
        Ok(Self {
            query,
            operation: operation.to_lowercase(),
            args: words.collect(),
        })
    }
    pub fn query(&self) -> &SearchQuery {
        &self.query
    }
    pub fn operation(&self) -> &str {
        &self.operation
    }
    pub fn args(&self) -> &[String] {
        &self.args
    }
}
