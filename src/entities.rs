//! Entity resolution for the listing API's `included` section.
//!
//! Records reference journals, authors, departments and the like by ID only.
//! Every page carries the referenced entities in `included`; they are folded
//! into an [`EntityMap`] where the first definition seen for an ID is kept.

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Accept JSON:API IDs given either as strings or as bare numbers
pub(crate) fn deserialize_id<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number id, got {}",
            other
        ))),
    }
}

/// Entity object as it appears in a page's `included` array
#[derive(Debug, Clone, Deserialize)]
pub struct IncludedEntity {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub attributes: Value,
}

/// Human-readable attributes of a referenced entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityRecord {
    Journal { title: String, issns: Vec<String> },
    Author { name: String },
    Department { name: String },
    Affiliation { name: String },
    Funder { name: String },
    FieldOfResearch { name: String },
}

impl EntityRecord {
    /// Build the variant for an `included` type tag.
    ///
    /// Returns `None` for unknown tags or when the naming attribute is missing.
    pub fn from_included(kind: &str, attributes: &Value) -> Option<Self> {
        let name = || attributes.get("name").and_then(Value::as_str).map(str::to_string);

        match kind {
            "journal" => {
                let title = attributes.get("title").and_then(Value::as_str)?.to_string();
                let issns = match attributes.get("issns") {
                    Some(Value::Array(items)) => items
                        .iter()
                        .filter_map(Value::as_str)
                        .map(str::to_string)
                        .collect(),
                    Some(Value::String(issn)) => vec![issn.clone()],
                    _ => Vec::new(),
                };
                Some(Self::Journal { title, issns })
            }
            "author" => name().map(|name| Self::Author { name }),
            "department" => name().map(|name| Self::Department { name }),
            "grid-affiliation" => name().map(|name| Self::Affiliation { name }),
            "grid-funder" => name().map(|name| Self::Funder { name }),
            "field-of-research" => name().map(|name| Self::FieldOfResearch { name }),
            _ => None,
        }
    }

    /// Display name (journal title for journals)
    pub fn name(&self) -> &str {
        match self {
            Self::Journal { title, .. } => title,
            Self::Author { name }
            | Self::Department { name }
            | Self::Affiliation { name }
            | Self::Funder { name }
            | Self::FieldOfResearch { name } => name,
        }
    }
}

/// Department and affiliation names never admitted to the map
#[derive(Debug, Clone, Default)]
pub struct Exclusions {
    departments: HashSet<String>,
    affiliations: HashSet<String>,
}

impl Exclusions {
    pub fn new<D, A>(departments: D, affiliations: A) -> Self
    where
        D: IntoIterator,
        D::Item: Into<String>,
        A: IntoIterator,
        A::Item: Into<String>,
    {
        Self {
            departments: departments.into_iter().map(Into::into).collect(),
            affiliations: affiliations.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether this record is filtered out by name
    pub fn excludes(&self, record: &EntityRecord) -> bool {
        match record {
            EntityRecord::Department { name } => self.departments.contains(name),
            EntityRecord::Affiliation { name } => self.affiliations.contains(name),
            _ => false,
        }
    }
}

/// ID → entity lookup with first-wins semantics
#[derive(Debug, Clone, Default)]
pub struct EntityMap {
    entries: HashMap<String, EntityRecord>,
}

impl EntityMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entity unless the ID is already resolved or the name is excluded.
    ///
    /// Returns `true` when the map changed.
    pub fn insert_if_absent(
        &mut self,
        id: &str,
        kind: &str,
        attributes: &Value,
        exclusions: &Exclusions,
    ) -> bool {
        if self.entries.contains_key(id) {
            return false;
        }
        let Some(record) = EntityRecord::from_included(kind, attributes) else {
            debug!(id = id, kind = kind, "Skipping unrecognised entity");
            return false;
        };
        if exclusions.excludes(&record) {
            debug!(id = id, name = record.name(), "Entity excluded by name");
            return false;
        }
        self.entries.insert(id.to_string(), record);
        true
    }

    /// Fold a page's `included` array into the map
    pub fn absorb(&mut self, included: &[IncludedEntity], exclusions: &Exclusions) -> usize {
        included
            .iter()
            .filter(|entity| {
                self.insert_if_absent(&entity.id, &entity.kind, &entity.attributes, exclusions)
            })
            .count()
    }

    pub fn lookup(&self, id: &str) -> Option<&EntityRecord> {
        self.entries.get(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
