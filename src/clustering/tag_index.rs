// src/clustering/tag_index.rs

use log::debug;
use std::collections::{HashMap, HashSet};

use crate::models::{EncodedRecord, TaggedRecord};

/// Global tag frequency table with dense codes for tags seen more than once.
///
/// A tag carried by a single record can never link two records, so only
/// repeated tags get a code. Codes are assigned in first-appearance order
/// (record order, then tag order inside a record), which keeps encoding
/// deterministic for a given input sequence.
#[derive(Debug, Clone, Default)]
pub struct TagFrequencyIndex {
    frequencies: HashMap<String, usize>,
    codes: HashMap<String, u32>,
}

impl TagFrequencyIndex {
    pub fn build<R: TaggedRecord>(records: &[R]) -> Self {
        let mut frequencies: HashMap<String, usize> = HashMap::new();
        let mut first_seen: Vec<String> = Vec::new();

        for record in records {
            // Walk the record's own order so code assignment stays deterministic.
            let mut counted = HashSet::with_capacity(record.tags().len());
            for tag in record.tags() {
                if !counted.insert(tag.as_str()) {
                    continue;
                }
                match frequencies.get_mut(tag) {
                    Some(count) => *count += 1,
                    None => {
                        frequencies.insert(tag.clone(), 1);
                        first_seen.push(tag.clone());
                    }
                }
            }
        }

        let mut codes = HashMap::new();
        let mut next_code: u32 = 0;
        for tag in first_seen {
            if frequencies.get(&tag).copied().unwrap_or(0) > 1 {
                codes.insert(tag, next_code);
                next_code += 1;
            }
        }

        debug!(
            "Tag index built: {} distinct tags, {} retained",
            frequencies.len(),
            codes.len()
        );

        Self { frequencies, codes }
    }

    pub fn distinct_tags(&self) -> usize {
        self.frequencies.len()
    }

    pub fn retained_tags(&self) -> usize {
        self.codes.len()
    }

    pub fn frequency(&self, tag: &str) -> usize {
        self.frequencies.get(tag).copied().unwrap_or(0)
    }

    pub fn code(&self, tag: &str) -> Option<u32> {
        self.codes.get(tag).copied()
    }

    /// Encodes every record, dropping the ones with no retained tag.
    ///
    /// Surviving records keep their input position as `id`.
    pub fn encode<R: TaggedRecord>(&self, records: &[R]) -> Vec<EncodedRecord> {
        records
            .iter()
            .enumerate()
            .filter_map(|(id, record)| {
                let encoded_tags: HashSet<u32> = record
                    .tags()
                    .iter()
                    .filter_map(|tag| self.code(tag))
                    .collect();
                if encoded_tags.is_empty() {
                    return None;
                }
                Some(EncodedRecord {
                    id,
                    tags: record.tags().iter().cloned().collect(),
                    encoded_tags,
                })
            })
            .collect()
    }
}

/// Builds the index and the encoded, eligible records in one go.
pub fn prepare_records<R: TaggedRecord>(records: &[R]) -> (TagFrequencyIndex, Vec<EncodedRecord>) {
    let index = TagFrequencyIndex::build(records);
    let encoded = index.encode(records);
    (index, encoded)
}
