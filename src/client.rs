//! Translation lookups with layered caching.
//!
//! A lookup walks: alias resolution, hot cache, preloaded snapshot (when a
//! bulk load was triggered), a per-string fetch, and finally a creation
//! request when the caller wants a missing translation created. Only
//! [`PolyglotClient::init`] can fail; every lookup returns either a value or
//! `None`.

use crate::alias::AliasResolver;
use crate::cache::HotCache;
use crate::config::{ClientConfig, TranslationMode, TranslationParams, DEFAULT_BASE_LANGUAGE};
use crate::error::InitError;
use crate::fallback::FallbackPolicy;
use crate::language::Language;
use crate::metrics::{ClientMetrics, MetricsReport};
use crate::remote::{CreateStringRequest, PolyglotApi};
use crate::snapshot::{snapshot_readable, BulkCacheLoader};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, error, info, warn};

#[derive(Debug, Default)]
enum ClientState {
    #[default]
    Uninitialized,
    Initialized(Arc<Session>),
}

/// Everything captured by a successful `init`.
#[derive(Debug)]
struct Session {
    api: Arc<PolyglotApi>,
    aliases: AliasResolver,
    languages: HashSet<Language>,
    base_language: Language,
    base_string_as_fallback: bool,
    default_mode: Option<TranslationMode>,
    hot_cache: HotCache,
    bulk_loader: BulkCacheLoader,
    metrics: ClientMetrics,
}

struct Lookup<'a> {
    language: Language,
    source_text: &'a str,
    string_id: &'a str,
    description: Option<&'a str>,
    params: &'a TranslationParams,
    create_if_missing: bool,
}

#[derive(Debug, Default)]
pub struct PolyglotClient {
    state: RwLock<ClientState>,
}

impl PolyglotClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a client and initialize it in one step.
    pub async fn connect(config: ClientConfig) -> Result<Self, InitError> {
        let client = Self::new();
        client.init(config).await?;
        Ok(client)
    }

    fn session(&self) -> Option<Arc<Session>> {
        match &*self.state.read().unwrap_or_else(PoisonError::into_inner) {
            ClientState::Initialized(session) => Some(Arc::clone(session)),
            ClientState::Uninitialized => None,
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.session().is_some()
    }

    /// Register the product's languages and capture the configuration.
    ///
    /// Registration is skipped when the configured snapshot file already
    /// exists. Calling `init` on an initialized client changes nothing except
    /// that `preload = true` starts the bulk load if it has not started yet.
    pub async fn init(&self, config: ClientConfig) -> Result<(), InitError> {
        if let Some(session) = self.session() {
            debug!("Client already initialized");
            if config.preload {
                session.bulk_loader.trigger();
            }
            return Ok(());
        }

        let api = Arc::new(PolyglotApi::new(&config).map_err(InitError::HttpClient)?);

        let registered_before = match &config.cache_path {
            Some(path) => snapshot_readable(path).await,
            None => false,
        };
        if registered_before {
            info!("Snapshot file found, skipping product registration");
        } else {
            api.register_languages(&config.languages)
                .await
                .map_err(|source| InitError::Registration {
                    product_id: config.product_id.clone(),
                    source,
                })?;
        }

        let preload = config.preload;
        let session = {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            match &*state {
                ClientState::Initialized(existing) => {
                    debug!("Concurrent init finished first, keeping its configuration");
                    Arc::clone(existing)
                }
                ClientState::Uninitialized => {
                    let session = Arc::new(Session::new(api, config));
                    *state = ClientState::Initialized(Arc::clone(&session));
                    session
                }
            }
        };

        if preload {
            session.bulk_loader.trigger();
        }

        info!("Initialization was successful!");
        Ok(())
    }

    /// Start the bulk load. Returns `false` if it was already started or the
    /// client is not initialized.
    pub fn preload(&self) -> bool {
        self.session()
            .map(|session| session.bulk_loader.trigger())
            .unwrap_or(false)
    }

    /// Wait for the bulk load, and for the snapshot file it writes, and
    /// return how many strings it holds. `None` if no bulk load was triggered.
    pub async fn wait_for_preload(&self) -> Option<usize> {
        let session = self.session()?;
        let snapshot = session.bulk_loader.snapshot().await?;
        session.bulk_loader.persisted().await;
        Some(snapshot.len())
    }

    /// Read-only lookup; never creates a translation.
    ///
    /// Unlike [`get_or_translate`](Self::get_or_translate), the base language
    /// is looked up like any other: a base-language record may exist remotely.
    pub async fn get_translation(&self, language: Language, string_id: &str) -> Option<String> {
        let params = TranslationParams::default();
        self.lookup(Lookup {
            language,
            source_text: string_id,
            string_id,
            description: None,
            params: &params,
            create_if_missing: false,
        })
        .await
    }

    /// Look up `source_text` (used as its own string id) and ask the service
    /// to translate it if no translation exists yet.
    pub async fn get_or_translate(
        &self,
        language: Language,
        source_text: &str,
        description: Option<&str>,
    ) -> Option<String> {
        self.get_or_translate_with(
            language,
            source_text,
            description,
            source_text,
            &TranslationParams::default(),
        )
        .await
    }

    /// [`get_or_translate`](Self::get_or_translate) with an explicit string id
    /// and per-call options.
    ///
    /// May return `None` even with the fallback enabled: an asynchronous
    /// creation can succeed before the translation is ready.
    pub async fn get_or_translate_with(
        &self,
        language: Language,
        source_text: &str,
        description: Option<&str>,
        string_id: &str,
        params: &TranslationParams,
    ) -> Option<String> {
        self.lookup(Lookup {
            language,
            source_text,
            string_id,
            description,
            params,
            create_if_missing: true,
        })
        .await
    }

    /// Whether a translation is available.
    ///
    /// The base language always counts as translated. Otherwise only the
    /// caches are checked, unless `assume_created_if_remote_has_it` is set, in
    /// which case the answer is whether a read-only lookup yields a value.
    /// With the source-text fallback enabled that is always `true`.
    ///
    /// Before `init` only [`DEFAULT_BASE_LANGUAGE`] counts as translated.
    pub async fn has_translation(
        &self,
        language: Language,
        string_id: &str,
        assume_created_if_remote_has_it: bool,
    ) -> bool {
        let Some(session) = self.session() else {
            warn!("has_translation called before init");
            return language == DEFAULT_BASE_LANGUAGE;
        };

        let resolved = session.aliases.resolve(language);
        if resolved == session.base_language {
            return true;
        }
        if session.cached(string_id, resolved).await.is_some() {
            return true;
        }
        if !assume_created_if_remote_has_it {
            return false;
        }

        let params = TranslationParams::default();
        session
            .resolve(Lookup {
                language: resolved,
                source_text: string_id,
                string_id,
                description: None,
                params: &params,
                create_if_missing: false,
            })
            .await
            .is_some()
    }

    /// Drop everything the hot cache holds for a string. The snapshot is
    /// left untouched.
    pub fn evict(&self, string_id: &str) {
        if let Some(session) = self.session() {
            session.hot_cache.remove(string_id);
        }
    }

    pub fn metrics(&self) -> MetricsReport {
        self.session()
            .map(|session| session.metrics.report())
            .unwrap_or_else(|| ClientMetrics::default().report())
    }

    async fn lookup(&self, lookup: Lookup<'_>) -> Option<String> {
        match self.session() {
            Some(session) => session.resolve(lookup).await,
            None => {
                warn!(
                    "Translation of '{}' requested before init",
                    lookup.string_id
                );
                FallbackPolicy::effective(true, lookup.params.base_string_as_fallback)
                    .decide(lookup.source_text)
            }
        }
    }
}

impl Session {
    fn new(api: Arc<PolyglotApi>, config: ClientConfig) -> Self {
        let bulk_loader = BulkCacheLoader::new(Arc::clone(&api), config.cache_path, config.exclude);

        Self {
            api,
            aliases: AliasResolver::new(config.language_aliases),
            languages: config.languages.into_iter().collect(),
            base_language: config.base_language,
            base_string_as_fallback: config.base_string_as_fallback,
            default_mode: config.default_mode,
            hot_cache: HotCache::new(),
            bulk_loader,
            metrics: ClientMetrics::default(),
        }
    }

    async fn resolve(&self, lookup: Lookup<'_>) -> Option<String> {
        let language = self.aliases.resolve(lookup.language);

        if lookup.create_if_missing && language == self.base_language {
            return Some(lookup.source_text.to_string());
        }

        let fallback = FallbackPolicy::effective(
            self.base_string_as_fallback,
            lookup.params.base_string_as_fallback,
        );

        if let Some(translation) = self.cached(lookup.string_id, language).await {
            return Some(translation);
        }

        if !self.languages.contains(&language) {
            debug!("Language {} is not configured for this product", language);
            return self.miss(fallback, lookup.source_text);
        }

        if let Some(translation) = self.fetch(lookup.string_id, language).await {
            return Some(translation);
        }

        if !lookup.create_if_missing {
            return self.miss(fallback, lookup.source_text);
        }

        self.create(&lookup, language, fallback).await
    }

    /// Hot cache first, then the snapshot if a bulk load was triggered.
    async fn cached(&self, string_id: &str, language: Language) -> Option<String> {
        if let Some(translation) = self.hot_cache.get(string_id, language) {
            self.metrics.record_hot_hit();
            return Some(translation);
        }

        let snapshot = self.bulk_loader.snapshot().await?;
        let translation = snapshot.get(string_id)?.value(language)?.to_string();
        self.metrics.record_snapshot_hit();
        Some(translation)
    }

    async fn fetch(&self, string_id: &str, language: Language) -> Option<String> {
        self.metrics.record_remote_fetch();

        match self.api.fetch_translation(string_id, language).await {
            Ok(translation) => {
                let entry = translation.into_entry()?;
                let value = entry.value.clone();
                self.hot_cache.put(string_id, language, entry);
                Some(value)
            }
            Err(e) if e.is_not_found() => {
                debug!("No {} translation for {} yet", language, string_id);
                None
            }
            Err(e) => {
                self.metrics.record_remote_failure();
                warn!("Failed to get {} translation for {}: {}", language, string_id, e);
                None
            }
        }
    }

    async fn create(
        &self,
        lookup: &Lookup<'_>,
        language: Language,
        fallback: FallbackPolicy,
    ) -> Option<String> {
        info!("Getting auto-translations for {}", lookup.string_id);
        self.metrics.record_creation();

        let body = CreateStringRequest {
            translations: HashMap::from([(self.base_language, lookup.source_text.to_string())]),
            description: lookup.description.map(str::to_string),
            desired_max_length: lookup.params.desired_max_length,
            mode: lookup.params.mode.or(self.default_mode),
        };

        let record = match self.api.create_string(lookup.string_id, &body).await {
            Ok(record) => record,
            Err(e) => {
                self.metrics.record_remote_failure();
                error!("Failed to get translation for {}: {}", lookup.string_id, e);
                return self.miss(fallback, lookup.source_text);
            }
        };

        let (_, stored) = record.into_parts();
        let translation = stored.value(language).map(str::to_string);
        self.hot_cache.merge(lookup.string_id, stored);

        if translation.is_none() {
            debug!(
                "{} translation for {} is not ready yet",
                language, lookup.string_id
            );
            self.metrics.record_miss();
        }
        translation
    }

    fn miss(&self, fallback: FallbackPolicy, source_text: &str) -> Option<String> {
        self.metrics.record_miss();
        fallback.decide(source_text)
    }
}
