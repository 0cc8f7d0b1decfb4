// src/models/records.rs

use serde::{Serialize, Serializer};
use std::collections::HashSet;

/// Anything the clustering core can read tags from.
///
/// The core only ever looks at the tags; `facets` feeds the optional
/// diversity filter applied at harvest time and defaults to nothing.
pub trait TaggedRecord {
    fn tags(&self) -> &[String];

    fn facets(&self) -> &[String] {
        &[]
    }
}

impl TaggedRecord for Vec<String> {
    fn tags(&self) -> &[String] {
        self
    }
}

/// A record loaded from a JSON source.
///
/// `data` is the untouched JSON object; it is what ends up as `source_data`
/// in the assembled output.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceRecord {
    pub row: usize,
    pub tags: Vec<String>,
    pub facets: Vec<String>,
    pub data: serde_json::Value,
}

impl TaggedRecord for SourceRecord {
    fn tags(&self) -> &[String] {
        &self.tags
    }

    fn facets(&self) -> &[String] {
        &self.facets
    }
}

impl Serialize for SourceRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.data.serialize(serializer)
    }
}

/// A record that survived tag-frequency filtering.
///
/// `tags` is the full tag set (used for denominators and tag unions),
/// `encoded_tags` holds only the codes of tags seen in more than one record
/// (used for similarity numerators). `encoded_tags` is never empty.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedRecord {
    pub id: usize,
    pub tags: HashSet<String>,
    pub encoded_tags: HashSet<u32>,
}
