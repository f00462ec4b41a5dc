//! Grammar validator with single-flight checker loading
//!
//! The checker is loaded lazily on the first validation. Concurrent first
//! callers await one shared load future, so the provider runs exactly once.
//! A failed load is cached and returned to later callers until
//! [`Validator::reset_state`] clears it.

use crate::error::CheckError;
use crate::provider::{CheckerProvider, GrammarChecker};
use artifex_model::ValidationResult;
use futures::future::{BoxFuture, FutureExt, Shared};
use moka::future::Cache;
use parking_lot::{Mutex, RwLock};
use std::fmt;
use std::sync::Arc;

/// Default number of memoized validation results
pub const DEFAULT_CACHE_CAPACITY: u64 = 1024;

type LoadResult = Result<Arc<dyn GrammarChecker>, CheckError>;
type LoadFuture = Shared<BoxFuture<'static, LoadResult>>;

/// Observable phase of the checker loader
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoaderStatus {
    /// Nothing loaded yet (or reset)
    Idle,
    /// Load in flight
    Loading,
    /// Checker loaded and cached
    Ready,
    /// Load failed; the error is cached
    Failed,
}

enum LoaderState {
    Idle,
    Loading(LoadFuture),
    Ready(Arc<dyn GrammarChecker>),
    Failed(CheckError),
}

struct Loader {
    /// Bumped on every reset so stale loads and memo writes are discarded
    epoch: u64,
    state: LoaderState,
}

/// Async grammar validator
///
/// Shared across requests (usually behind an `Arc`). The only mutable state
/// is the loader and the result memo; both are cleared by
/// [`reset_state`](Self::reset_state).
///
/// # Example
///
/// ```rust
/// use artifex_validation::{NullProvider, Validator};
/// use std::sync::Arc;
///
/// # tokio_test_block(async {
/// let validator = Validator::new(Arc::new(NullProvider));
/// let result = validator.validate("flowchart TD\n    A --> B").await;
/// assert!(result.is_skipped());
/// # });
/// # fn tokio_test_block<F: std::future::Future>(f: F) {
/// #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f);
/// # }
/// ```
pub struct Validator {
    provider: RwLock<Arc<dyn CheckerProvider>>,
    loader: Mutex<Loader>,
    memo: Cache<[u8; 32], ValidationResult>,
}

impl Validator {
    /// Create validator with the default memo capacity
    #[must_use]
    pub fn new(provider: Arc<dyn CheckerProvider>) -> Self {
        Self::with_cache_capacity(provider, DEFAULT_CACHE_CAPACITY)
    }

    /// Create validator memoizing at most `capacity` results
    #[must_use]
    pub fn with_cache_capacity(provider: Arc<dyn CheckerProvider>, capacity: u64) -> Self {
        Self {
            provider: RwLock::new(provider),
            loader: Mutex::new(Loader {
                epoch: 0,
                state: LoaderState::Idle,
            }),
            memo: Cache::new(capacity),
        }
    }

    /// Check `code` against the grammar
    ///
    /// Never fails: an unavailable checker yields
    /// [`ValidationResult::skipped`], any other failure
    /// [`ValidationResult::invalid`]. Definitive results are memoized by
    /// content hash; skips are not, so a checker that appears later is used.
    pub async fn validate(&self, code: &str) -> ValidationResult {
        let key = *blake3::hash(code.as_bytes()).as_bytes();
        if let Some(hit) = self.memo.get(&key).await {
            tracing::trace!("validation memo hit");
            return hit;
        }

        let epoch = self.loader.lock().epoch;
        let checker = match self.checker().await {
            Ok(checker) => checker,
            Err(CheckError::Unavailable(_)) => return ValidationResult::skipped(),
            Err(CheckError::Syntax(message)) => return ValidationResult::invalid(message),
        };

        let result = match checker.parse(code).await {
            Ok(()) => ValidationResult::valid(),
            Err(CheckError::Unavailable(message)) => {
                tracing::debug!(%message, "checker unavailable during parse, skipping");
                return ValidationResult::skipped();
            }
            Err(CheckError::Syntax(message)) => ValidationResult::invalid(message),
        };

        let current = self.loader.lock().epoch == epoch;
        if current {
            self.memo.insert(key, result.clone()).await;
        }
        result
    }

    /// Clear the cached checker, any cached load error, the in-flight load
    /// and the result memo
    ///
    /// Callers already awaiting an old load still receive its result, but
    /// it is not stored.
    pub fn reset_state(&self) {
        {
            let mut loader = self.loader.lock();
            loader.epoch = loader.epoch.wrapping_add(1);
            loader.state = LoaderState::Idle;
        }
        self.memo.invalidate_all();
        tracing::debug!("validator state reset");
    }

    /// Replace the checker provider and reset all cached state
    pub fn set_provider(&self, provider: Arc<dyn CheckerProvider>) {
        tracing::debug!(provider = provider.name(), "validator provider replaced");
        *self.provider.write() = provider;
        self.reset_state();
    }

    /// Name of the current provider
    #[must_use]
    pub fn provider_name(&self) -> String {
        self.provider.read().name().to_string()
    }

    /// Current loader phase
    #[must_use]
    pub fn status(&self) -> LoaderStatus {
        match self.loader.lock().state {
            LoaderState::Idle => LoaderStatus::Idle,
            LoaderState::Loading(_) => LoaderStatus::Loading,
            LoaderState::Ready(_) => LoaderStatus::Ready,
            LoaderState::Failed(_) => LoaderStatus::Failed,
        }
    }

    async fn checker(&self) -> LoadResult {
        let (epoch, future) = {
            let mut loader = self.loader.lock();
            let pending = match &loader.state {
                LoaderState::Ready(checker) => return Ok(Arc::clone(checker)),
                LoaderState::Failed(err) => return Err(err.clone()),
                LoaderState::Loading(future) => Some(future.clone()),
                LoaderState::Idle => None,
            };
            let future = match pending {
                Some(future) => future,
                None => {
                    let future = self.start_load();
                    loader.state = LoaderState::Loading(future.clone());
                    future
                }
            };
            (loader.epoch, future)
        };

        let result = future.await;

        let mut loader = self.loader.lock();
        if loader.epoch == epoch && matches!(loader.state, LoaderState::Loading(_)) {
            loader.state = match &result {
                Ok(checker) => {
                    tracing::debug!("grammar checker loaded");
                    LoaderState::Ready(Arc::clone(checker))
                }
                Err(err) => {
                    tracing::warn!(error = %err, "grammar checker failed to load");
                    LoaderState::Failed(err.clone())
                }
            };
        }
        result
    }

    fn start_load(&self) -> LoadFuture {
        let provider = Arc::clone(&*self.provider.read());
        tracing::debug!(provider = provider.name(), "loading grammar checker");
        async move { provider.load().await }.boxed().shared()
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Validator")
            .field("provider", &self.provider_name())
            .field("status", &self.status())
            .field("memoized", &self.memo.entry_count())
            .finish()
    }
}
