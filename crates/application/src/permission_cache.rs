use std::collections::HashMap;
use std::fmt::{Debug, Formatter};
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::RwLock;

use crate::GranularPermissionCheck;

/// Details handed to a denial callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeniedCheck {
    /// Requested resource.
    pub resource: String,
    /// Requested action.
    pub action: String,
    /// Whether the verdict came from the cache.
    pub from_cache: bool,
}

type DeniedCallback = Box<dyn FnOnce(&DeniedCheck) + Send>;

/// Per-call options of [`PermissionCheckCache::check_permission`].
#[derive(Default)]
pub struct CheckOptions {
    skip_cache: bool,
    on_denied: Option<DeniedCallback>,
}

impl CheckOptions {
    /// Bypasses the cached verdict and overwrites it with a fresh one.
    #[must_use]
    pub fn skip_cache(mut self) -> Self {
        self.skip_cache = true;
        self
    }

    /// Runs `callback` when the verdict is a denial.
    #[must_use]
    pub fn on_denied(mut self, callback: impl FnOnce(&DeniedCheck) + Send + 'static) -> Self {
        self.on_denied = Some(Box::new(callback));
        self
    }
}

impl Debug for CheckOptions {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("CheckOptions")
            .field("skip_cache", &self.skip_cache)
            .field("on_denied", &self.on_denied.is_some())
            .finish()
    }
}

/// Session-scoped memo of granular verdicts keyed by resource and action.
///
/// Negative verdicts are cached too. Every entry is stamped with the epoch it
/// was computed in; [`invalidate`] starts a new epoch and older entries are
/// never served again. Nothing is persisted or shared between sessions.
///
/// [`invalidate`]: PermissionCheckCache::invalidate
#[derive(Debug, Default)]
pub struct PermissionCheckCache {
    epoch: AtomicU64,
    entries: RwLock<HashMap<(String, String), CachedVerdict>>,
}

#[derive(Debug, Clone, Copy)]
struct CachedVerdict {
    allowed: bool,
    epoch: u64,
}

impl PermissionCheckCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached verdict or asks `checker` and remembers the answer.
    ///
    /// A verdict is only remembered when no invalidation happened while
    /// `checker` was running.
    pub async fn check_permission(
        &self,
        checker: &dyn GranularPermissionCheck,
        resource: &str,
        action: &str,
        options: CheckOptions,
    ) -> bool {
        let key = (resource.to_owned(), action.to_owned());
        let epoch = self.current_epoch();

        if !options.skip_cache {
            let cached = self
                .entries
                .read()
                .await
                .get(&key)
                .filter(|verdict| verdict.epoch == epoch)
                .map(|verdict| verdict.allowed);
            if let Some(allowed) = cached {
                if !allowed {
                    notify_denied(options.on_denied, resource, action, true);
                }
                return allowed;
            }
        }

        let allowed = checker.has_granular_permission(resource, action).await;

        let mut entries = self.entries.write().await;
        if self.current_epoch() == epoch {
            entries.insert(key, CachedVerdict { allowed, epoch });
        }
        drop(entries);

        if !allowed {
            notify_denied(options.on_denied, resource, action, false);
        }

        allowed
    }

    /// Stops serving every verdict cached so far. Checks still running keep
    /// their answer out of the cache.
    pub fn invalidate(&self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
    }

    /// Removes entries left behind by earlier epochs.
    pub async fn purge_stale(&self) {
        let epoch = self.current_epoch();
        self.entries
            .write()
            .await
            .retain(|_, verdict| verdict.epoch == epoch);
    }

    /// Drops every cached verdict.
    pub async fn clear(&self) {
        self.invalidate();
        self.entries.write().await.clear();
    }

    /// Returns the number of verdicts that would be served.
    pub async fn len(&self) -> usize {
        let epoch = self.current_epoch();
        self.entries
            .read()
            .await
            .values()
            .filter(|verdict| verdict.epoch == epoch)
            .count()
    }

    /// Returns whether nothing would be served from the cache.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn current_epoch(&self) -> u64 {
        self.epoch.load(Ordering::SeqCst)
    }
}

fn notify_denied(callback: Option<DeniedCallback>, resource: &str, action: &str, from_cache: bool) {
    if let Some(callback) = callback {
        callback(&DeniedCheck {
            resource: resource.to_owned(),
            action: action.to_owned(),
            from_cache,
        });
    }
}
