//! Client for the Polyglot translation service.
//!
//! Lookups go through an in-memory cache, an optional bulk-loaded snapshot
//! (persisted to disk between runs) and finally the service itself, which
//! can be asked to create translations that do not exist yet.
//!
//! ```rust,no_run
//! use polyglot_client::{ClientConfig, Language, PolyglotClient};
//!
//! # async fn run() -> Result<(), polyglot_client::InitError> {
//! let config = ClientConfig::new(
//!     "token",
//!     "my.product",
//!     [Language::ENGLISH, Language::RUSSIAN],
//! )
//! .with_preload(true)
//! .with_cache_path("/tmp/polyglot-cache.json");
//!
//! let client = PolyglotClient::connect(config).await?;
//! let share = client
//!     .get_or_translate(Language::RUSSIAN, "Share", Some("Mobile app"))
//!     .await;
//! # Ok(())
//! # }
//! ```

pub mod alias;
pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod fallback;
pub mod language;
pub mod localisation;
pub mod metrics;
pub mod remote;
pub mod retry;
pub mod snapshot;

pub use client::PolyglotClient;
pub use config::{ClientConfig, TranslationMode, TranslationParams};
pub use error::{InitError, RemoteError};
pub use language::Language;
pub use metrics::MetricsReport;
pub use retry::RetryConfig;
