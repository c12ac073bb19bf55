//! Adaptive representation routing
//!
//! Profiles the page with cheap signals and picks the cheapest
//! representation strong enough for it. Signals are cached per URL origin
//! to amortize their cost over tight interaction loops.

mod signals;
mod strategy;

#[cfg(test)]
mod tests;

use std::collections::HashMap;
use std::fmt;
use std::time::{Duration, Instant};

use tracing::debug;

pub use signals::SignalExtractor;
pub use strategy::{HeuristicStrategy, RepresentationStrategy};

use crate::page::Page;
use crate::state::{PageSignals, RepresentationType, origin_of};

/// How long cached signals stay valid for an origin
const SIGNAL_CACHE_TTL: Duration = Duration::from_secs(60);

/// A callable that bypasses the strategy entirely
pub type RouterOverride = Box<dyn Fn(&PageSignals) -> RepresentationType + Send + Sync>;

struct CachedSignals {
    signals: PageSignals,
    fetched_at: Instant,
}

/// Selects one representation per observation
pub struct AdaptiveRouter {
    extractor: SignalExtractor,
    strategy: Box<dyn RepresentationStrategy>,
    override_fn: Option<RouterOverride>,
    cache: HashMap<String, CachedSignals>,
}

impl fmt::Debug for AdaptiveRouter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdaptiveRouter")
            .field("override_fn", &self.override_fn.is_some())
            .field("cached_origins", &self.cache.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl Default for AdaptiveRouter {
    fn default() -> Self {
        Self::new()
    }
}

impl AdaptiveRouter {
    /// Create a router with the default heuristic strategy
    #[must_use]
    pub fn new() -> Self {
        Self {
            extractor: SignalExtractor::new(),
            strategy: Box::new(HeuristicStrategy::new()),
            override_fn: None,
            cache: HashMap::new(),
        }
    }

    /// Replace the selection strategy
    #[must_use]
    pub fn with_strategy(mut self, strategy: Box<dyn RepresentationStrategy>) -> Self {
        self.strategy = strategy;
        self
    }

    /// Bypass the strategy with a caller-provided selection function
    #[must_use]
    pub fn with_override(mut self, override_fn: RouterOverride) -> Self {
        self.override_fn = Some(override_fn);
        self
    }

    /// Profile the page (with caching) and choose a representation
    pub async fn select(&mut self, page: &dyn Page) -> RepresentationType {
        let signals = self.signals_for(page).await;

        if let Some(override_fn) = &self.override_fn {
            return override_fn(&signals);
        }

        self.strategy.select(&signals)
    }

    /// Public access to the signals, useful for debugging and benchmarks
    pub async fn get_signals(&mut self, page: &dyn Page) -> PageSignals {
        self.signals_for(page).await
    }

    async fn signals_for(&mut self, page: &dyn Page) -> PageSignals {
        let url = page.url();
        let origin = origin_of(&url);

        if let Some(cached) = self.cache.get_mut(&origin)
            && cached.fetched_at.elapsed() < SIGNAL_CACHE_TTL
        {
            // The path may have changed within the origin
            cached.signals.url = url;
            debug!(%origin, "signal cache hit");
            return cached.signals.clone();
        }

        debug!(%origin, "signal cache miss");
        let signals = self.extractor.extract(page).await;
        self.cache.insert(
            origin,
            CachedSignals {
                signals: signals.clone(),
                fetched_at: Instant::now(),
            },
        );
        signals
    }

    /// Invalidate cached signals; pass a URL to clear just that origin
    pub fn invalidate_cache(&mut self, url: Option<&str>) {
        match url {
            Some(url) => {
                self.cache.remove(&origin_of(url));
            }
            None => self.cache.clear(),
        }
    }
}
