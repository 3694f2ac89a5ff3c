//! In-process cache of translations obtained from individual lookups.
//!
//! Entries live as long as the owning client. There is no eviction: the
//! working set is the strings an application actually displays.

use crate::language::Language;
use crate::localisation::{StoredRecord, TranslationEntry};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
pub struct HotCache {
    records: Mutex<HashMap<String, StoredRecord>>,
}

impl HotCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn records(&self) -> MutexGuard<'_, HashMap<String, StoredRecord>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get(&self, string_id: &str, language: Language) -> Option<String> {
        self.records()
            .get(string_id)
            .and_then(|record| record.value(language))
            .map(str::to_string)
    }

    /// Store one language's entry, keeping the other languages of the record.
    pub fn put(&self, string_id: &str, language: Language, entry: TranslationEntry) {
        if !entry.is_present() {
            return;
        }
        self.records()
            .entry(string_id.to_string())
            .or_default()
            .translations
            .insert(language, entry);
    }

    /// Merge a whole record into the cache.
    ///
    /// Present entries overwrite cached ones language by language; metadata is
    /// replaced only when the incoming record carries it.
    pub fn merge(&self, string_id: &str, record: StoredRecord) {
        let mut records = self.records();
        let cached = records.entry(string_id.to_string()).or_default();

        if record.description.is_some() {
            cached.description = record.description;
        }
        if record.desired_max_length.is_some() {
            cached.desired_max_length = record.desired_max_length;
        }
        cached.translations.extend(
            record
                .translations
                .into_iter()
                .filter(|(_, entry)| entry.is_present()),
        );
    }

    /// Drop everything cached for a string.
    pub fn remove(&self, string_id: &str) -> Option<StoredRecord> {
        self.records().remove(string_id)
    }

    pub fn len(&self) -> usize {
        self.records().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records().is_empty()
    }
}
