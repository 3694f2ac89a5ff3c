//! Wire and cache shapes for translations.
//!
//! The service returns records carrying their own `stringId`. Caches key
//! records by that id instead, so they store [`StoredRecord`], which has no
//! identifier field at all.

use crate::language::Language;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// One language's translation of a string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationEntry {
    #[serde(default)]
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translator_comment: Option<String>,
}

impl TranslationEntry {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            translator_comment: None,
        }
    }

    /// Empty values are treated as absent everywhere.
    pub fn is_present(&self) -> bool {
        !self.value.is_empty()
    }
}

pub type Translations = HashMap<Language, TranslationEntry>;

/// A record as the service sends it, identified by `stringId`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalisationRecord {
    #[serde(default)]
    pub string_id: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub desired_max_length: Option<u32>,
    #[serde(default, deserialize_with = "known_languages")]
    pub translations: Translations,
}

impl LocalisationRecord {
    /// Split the server-assigned identifier from the cacheable remainder.
    pub fn into_parts(self) -> (Option<String>, StoredRecord) {
        let stored = StoredRecord {
            description: self.description,
            desired_max_length: self.desired_max_length,
            translations: self.translations,
        };
        (self.string_id, stored)
    }
}

/// All known translations of one string, without its identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desired_max_length: Option<u32>,
    #[serde(default, deserialize_with = "known_languages")]
    pub translations: Translations,
}

impl StoredRecord {
    pub fn value(&self, language: Language) -> Option<&str> {
        self.translations
            .get(&language)
            .filter(|entry| entry.is_present())
            .map(|entry| entry.value.as_str())
    }
}

/// StringId to record, for the whole product.
pub type Snapshot = HashMap<String, StoredRecord>;

/// Single translation returned by the per-string endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Translation {
    /// Echoed code; unchecked, the requested language is authoritative.
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub translation: Option<String>,
    #[serde(default)]
    pub manual: bool,
    #[serde(default)]
    pub last_change_date: Option<i64>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub desired_max_length: Option<u32>,
    #[serde(default)]
    pub translator_comment: Option<String>,
    #[serde(default)]
    pub number_of_approvals: Option<u32>,
    #[serde(default)]
    pub full_string_id: Option<String>,
}

impl Translation {
    pub fn into_entry(self) -> Option<TranslationEntry> {
        let entry = TranslationEntry {
            value: self.translation?,
            translator_comment: self.translator_comment,
        };
        entry.is_present().then_some(entry)
    }
}

// Codes outside the known set are dropped instead of failing the record.
fn known_languages<'de, D>(deserializer: D) -> Result<Translations, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = HashMap::<String, TranslationEntry>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .filter_map(|(code, entry)| match Language::from_code(&code) {
            Ok(language) => Some((language, entry)),
            Err(_) => {
                debug!("Skipping translation for unknown language '{}'", code);
                None
            }
        })
        .collect())
}
