//! Language type: validated language codes known to the translation service.
//!
//! The service accepts a closed set of codes. `Language` can only be built
//! from a code in that set, so every layer downstream of configuration works
//! with codes the service understands.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Every language code accepted by the translation service.
pub const LANGUAGE_CODES: &[&str] = &[
    "af", "sq", "am", "ar", "hy", "as", "ay", "az", "bm", "eu", "be", "bn", "bho", "bs", "bg",
    "ca", "ceb", "zh", "zh-Hans", "zh-Hant", "zh-HK", "co", "hr", "cs", "da", "dv", "doi", "nl",
    "en", "eo", "et", "ee", "fil", "fi", "fr", "fy", "gl", "ka", "de", "el", "gn", "gu", "ht",
    "ha", "haw", "he", "hi", "hmn", "hu", "is", "ig", "ilo", "id", "ga", "it", "ja", "jv", "kn",
    "kk", "km", "rw", "gom", "ko", "kri", "ku", "ckb", "ky", "lo", "la", "lv", "ln", "lt", "lg",
    "lb", "mk", "mai", "mg", "ms", "ml", "mt", "mi", "mr", "mni-Mtei", "lus", "mn", "my", "ne",
    "no", "ny", "or", "om", "ps", "fa", "pl", "pt", "pa", "qu", "ro", "ru", "sm", "sa", "gd",
    "nso", "sr", "st", "sn", "sd", "si", "sk", "sl", "so", "es", "su", "sw", "sv", "tl", "tg",
    "ta", "tt", "te", "th", "ti", "ts", "tr", "tk", "ak", "uk", "ur", "ug", "uz", "vi", "cy",
    "xh", "yi", "yo", "zu", "en-GB", "en-US", "pt-BR", "pt-PT",
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown language code: '{0}'")]
pub struct UnknownLanguage(pub String);

/// A language code from [`LANGUAGE_CODES`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Language {
    code: &'static str,
}

impl Language {
    pub const ENGLISH: Language = Language { code: "en" };
    pub const RUSSIAN: Language = Language { code: "ru" };
    pub const PORTUGUESE: Language = Language { code: "pt" };
    pub const BRAZILIAN_PORTUGUESE: Language = Language { code: "pt-BR" };

    /// Create a Language from a language code string.
    ///
    /// Matching is exact: `pt-br` is not `pt-BR`.
    ///
    /// # Example
    /// ```
    /// use polyglot_client::Language;
    ///
    /// let ru = Language::from_code("ru").unwrap();
    /// assert_eq!(ru.code(), "ru");
    /// ```
    pub fn from_code(code: &str) -> Result<Language, UnknownLanguage> {
        LANGUAGE_CODES
            .iter()
            .find(|known| **known == code)
            .map(|known| Language { code: *known })
            .ok_or_else(|| UnknownLanguage(code.to_string()))
    }

    pub fn code(&self) -> &'static str {
        self.code
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code)
    }
}

impl FromStr for Language {
    type Err = UnknownLanguage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Language::from_code(s.trim())
    }
}

impl Serialize for Language {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code)
    }
}

impl<'de> Deserialize<'de> for Language {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = String::deserialize(deserializer)?;
        Language::from_code(&code).map_err(de::Error::custom)
    }
}
