use crate::language::Language;
use crate::retry::RetryConfig;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "https://api.polyglot.rocks";

/// Base language used until configured otherwise, and before `init`.
pub const DEFAULT_BASE_LANGUAGE: Language = Language::ENGLISH;

/// How quickly the service should produce a new translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranslationMode {
    /// Translate before answering the creation request.
    Sync,
    /// Answer immediately; the translation appears later.
    Async,
    /// Machine translation only.
    Fast,
}

impl FromStr for TranslationMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sync" => Ok(TranslationMode::Sync),
            "async" => Ok(TranslationMode::Async),
            "fast" => Ok(TranslationMode::Fast),
            other => bail!("Unknown translation mode: '{}'", other),
        }
    }
}

/// Per-call options for `get_or_translate`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslationParams {
    /// Overrides [`ClientConfig::base_string_as_fallback`] for this call.
    pub base_string_as_fallback: Option<bool>,
    /// Length hint forwarded when a translation has to be created.
    pub desired_max_length: Option<u32>,
    /// Overrides [`ClientConfig::default_mode`] for this call.
    pub mode: Option<TranslationMode>,
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    // Service
    pub token: String,
    pub product_id: String,
    pub api_url: String,
    pub request_timeout: Duration,
    pub retry: RetryConfig,

    // Languages
    pub languages: Vec<Language>,
    pub language_aliases: HashMap<Language, Language>,
    pub base_language: Language,

    // Lookup behaviour
    pub base_string_as_fallback: bool,
    pub default_mode: Option<TranslationMode>,

    // Bulk load
    pub preload: bool,
    pub cache_path: Option<PathBuf>,
    pub exclude: Vec<Language>,
}

impl ClientConfig {
    pub fn new(
        token: impl Into<String>,
        product_id: impl Into<String>,
        languages: impl IntoIterator<Item = Language>,
    ) -> Self {
        Self {
            token: token.into(),
            product_id: product_id.into(),
            api_url: DEFAULT_API_URL.to_string(),
            request_timeout: Duration::from_secs(30),
            retry: RetryConfig::default(),
            languages: languages.into_iter().collect(),
            language_aliases: HashMap::new(),
            base_language: DEFAULT_BASE_LANGUAGE,
            base_string_as_fallback: true,
            default_mode: None,
            preload: false,
            cache_path: None,
            exclude: Vec::new(),
        }
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    pub fn with_alias(mut self, from: Language, to: Language) -> Self {
        self.language_aliases.insert(from, to);
        self
    }

    pub fn with_base_string_as_fallback(mut self, enabled: bool) -> Self {
        self.base_string_as_fallback = enabled;
        self
    }

    pub fn with_preload(mut self, preload: bool) -> Self {
        self.preload = preload;
        self
    }

    pub fn with_cache_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.cache_path = Some(path.into());
        self
    }

    pub fn with_exclude(mut self, exclude: impl IntoIterator<Item = Language>) -> Self {
        self.exclude = exclude.into_iter().collect();
        self
    }

    pub fn with_default_mode(mut self, mode: TranslationMode) -> Self {
        self.default_mode = Some(mode);
        self
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn from_env() -> Result<Self> {
        let languages = parse_language_list(
            &std::env::var("POLYGLOT_LANGUAGES").context("POLYGLOT_LANGUAGES not set")?,
        )
        .context("Invalid POLYGLOT_LANGUAGES")?;

        let mut config = Self::new(
            std::env::var("POLYGLOT_TOKEN").context("POLYGLOT_TOKEN not set")?,
            std::env::var("POLYGLOT_PRODUCT_ID").context("POLYGLOT_PRODUCT_ID not set")?,
            languages,
        );

        if let Ok(url) = std::env::var("POLYGLOT_API_URL") {
            config.api_url = url;
        }
        if let Ok(aliases) = std::env::var("POLYGLOT_LANGUAGE_ALIASES") {
            config.language_aliases =
                parse_aliases(&aliases).context("Invalid POLYGLOT_LANGUAGE_ALIASES")?;
        }
        if let Ok(code) = std::env::var("POLYGLOT_BASE_LANGUAGE") {
            config.base_language = code.parse().context("Invalid POLYGLOT_BASE_LANGUAGE")?;
        }
        if let Ok(mode) = std::env::var("POLYGLOT_MODE") {
            config.default_mode = Some(mode.parse().context("Invalid POLYGLOT_MODE")?);
        }
        if let Ok(exclude) = std::env::var("POLYGLOT_EXCLUDE") {
            config.exclude = parse_language_list(&exclude).context("Invalid POLYGLOT_EXCLUDE")?;
        }
        config.cache_path = std::env::var("POLYGLOT_CACHE_PATH").ok().map(PathBuf::from);
        config.base_string_as_fallback = std::env::var("POLYGLOT_BASE_STRING_AS_FALLBACK")
            .ok()
            .and_then(|v| parse_bool(&v))
            .unwrap_or(true);
        config.preload = std::env::var("POLYGLOT_PRELOAD")
            .ok()
            .and_then(|v| parse_bool(&v))
            .unwrap_or(false);
        config.request_timeout = Duration::from_secs(
            std::env::var("POLYGLOT_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
        );

        Ok(config)
    }
}

/// Parse a comma-separated list of language codes, ignoring blanks.
fn parse_language_list(value: &str) -> Result<Vec<Language>> {
    value
        .split(',')
        .map(str::trim)
        .filter(|code| !code.is_empty())
        .map(|code| Ok(Language::from_code(code)?))
        .collect()
}

/// Parse `pt=pt-BR,en-GB=en` into an alias map.
fn parse_aliases(value: &str) -> Result<HashMap<Language, Language>> {
    value
        .split(',')
        .map(str::trim)
        .filter(|pair| !pair.is_empty())
        .map(|pair| -> Result<(Language, Language)> {
            let (from, to) = pair
                .split_once('=')
                .with_context(|| format!("Alias '{}' is not in from=to form", pair))?;
            Ok((from.parse()?, to.parse()?))
        })
        .collect()
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
