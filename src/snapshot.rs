//! One-time bulk load of every translation of the product.
//!
//! The load is claimed through a `OnceLock` holding a shared future, so the
//! first trigger stores the pending load before anything is awaited and every
//! later caller awaits that same load. A readable snapshot file short-circuits
//! the network; otherwise the listing endpoint is used and the result is
//! written back to the file in a background task for the next process.

use crate::error::SnapshotError;
use crate::language::Language;
use crate::localisation::{LocalisationRecord, Snapshot};
use crate::remote::PolyglotApi;
use futures::future::{BoxFuture, FutureExt, Shared};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use tracing::{debug, error, info, warn};

type PendingSnapshot = Shared<BoxFuture<'static, Arc<Snapshot>>>;
type PendingWrite = Shared<BoxFuture<'static, ()>>;

pub struct BulkCacheLoader {
    api: Arc<PolyglotApi>,
    cache_path: Option<PathBuf>,
    exclude: Vec<Language>,
    pending: OnceLock<PendingSnapshot>,
    write: Arc<OnceLock<PendingWrite>>,
}

impl fmt::Debug for BulkCacheLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BulkCacheLoader")
            .field("cache_path", &self.cache_path)
            .field("exclude", &self.exclude)
            .field("triggered", &self.is_triggered())
            .finish()
    }
}

impl BulkCacheLoader {
    pub fn new(api: Arc<PolyglotApi>, cache_path: Option<PathBuf>, exclude: Vec<Language>) -> Self {
        Self {
            api,
            cache_path,
            exclude,
            pending: OnceLock::new(),
            write: Arc::new(OnceLock::new()),
        }
    }

    /// Start the bulk load unless it was already started.
    ///
    /// Returns `true` for the call that started it. Inside a Tokio runtime
    /// the load runs in the background; otherwise it runs when first awaited.
    pub fn trigger(&self) -> bool {
        let mut started = false;
        let pending = self.pending.get_or_init(|| {
            started = true;
            load(
                Arc::clone(&self.api),
                self.cache_path.clone(),
                self.exclude.clone(),
                Arc::clone(&self.write),
            )
            .boxed()
            .shared()
        });

        if started {
            if let Ok(handle) = tokio::runtime::Handle::try_current() {
                handle.spawn(pending.clone());
            }
        }
        started
    }

    pub fn is_triggered(&self) -> bool {
        self.pending.get().is_some()
    }

    /// The snapshot, waiting for an in-flight load. `None` if never triggered.
    ///
    /// Does not wait for the snapshot file to be written.
    pub async fn snapshot(&self) -> Option<Arc<Snapshot>> {
        let pending = self.pending.get()?.clone();
        Some(pending.await)
    }

    /// Wait for the snapshot file write started by a remote load, if any.
    pub async fn persisted(&self) {
        if let Some(write) = self.write.get() {
            write.clone().await;
        }
    }
}

async fn load(
    api: Arc<PolyglotApi>,
    cache_path: Option<PathBuf>,
    exclude: Vec<Language>,
    write: Arc<OnceLock<PendingWrite>>,
) -> Arc<Snapshot> {
    if let Some(path) = &cache_path {
        match read_snapshot(path).await {
            Ok(Some(snapshot)) => {
                info!(
                    "Loaded translations for {} strings from {}",
                    snapshot.len(),
                    path.display()
                );
                return Arc::new(snapshot);
            }
            Ok(None) => debug!("No snapshot file at {}", path.display()),
            Err(e) => warn!("Ignoring snapshot file {}: {}", path.display(), e),
        }
    }

    info!("Downloading translations from the server");
    let records = match api.list_strings(&exclude).await {
        Ok(records) => records,
        Err(e) => {
            error!("Failed to get translations: {}", e);
            return Arc::new(Snapshot::new());
        }
    };
    info!("Loaded translations for {} strings", records.len());

    let snapshot = Arc::new(build_snapshot(records));
    if let Some(path) = cache_path {
        write.get_or_init(|| spawn_write(path, Arc::clone(&snapshot)));
    }

    snapshot
}

fn spawn_write(path: PathBuf, snapshot: Arc<Snapshot>) -> PendingWrite {
    let task = tokio::spawn(async move {
        match write_snapshot(&path, &snapshot).await {
            Ok(()) => debug!("Saved snapshot to {}", path.display()),
            Err(e) => warn!("Failed to save snapshot to {}: {}", path.display(), e),
        }
    });

    task.map(|result| {
        if let Err(e) = result {
            warn!("Snapshot write task failed: {}", e);
        }
    })
    .boxed()
    .shared()
}

fn build_snapshot(records: Vec<LocalisationRecord>) -> Snapshot {
    records
        .into_iter()
        .filter_map(|record| match record.into_parts() {
            (Some(string_id), stored) => Some((string_id, stored)),
            (None, _) => {
                warn!("Skipping listed record without stringId");
                None
            }
        })
        .collect()
}

/// Whether a parseable snapshot file is present, meaning a previous process
/// already registered the product. Unreadable or corrupt files do not count.
pub async fn snapshot_readable(path: &Path) -> bool {
    match read_snapshot(path).await {
        Ok(snapshot) => snapshot.is_some(),
        Err(e) => {
            warn!("Snapshot file {} is unreadable: {}", path.display(), e);
            false
        }
    }
}

/// `Ok(None)` when the file does not exist.
pub async fn read_snapshot(path: &Path) -> Result<Option<Snapshot>, SnapshotError> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    Ok(Some(serde_json::from_slice(&bytes)?))
}

/// Write through a sibling temporary file so readers never see a partial snapshot.
pub async fn write_snapshot(path: &Path, snapshot: &Snapshot) -> Result<(), SnapshotError> {
    let bytes = serde_json::to_vec(snapshot)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }

    let mut tmp_name = path.as_os_str().to_os_string();
    tmp_name.push(".tmp");
    let tmp_path = PathBuf::from(tmp_name);

    tokio::fs::write(&tmp_path, bytes).await?;
    tokio::fs::rename(&tmp_path, path).await?;
    Ok(())
}
