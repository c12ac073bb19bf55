//! The top-level observer
//!
//! Owns every pipeline component for one agent session and wires them
//! together per [`Observer::observe`] call: route, extract, diff, filter,
//! format. All per-observation state (previous snapshot, ref map, signal
//! cache) is bound to one observer; two observers on independent pages
//! share nothing.
//!
//! Calls on one observer must be serialized by the caller. A re-entrant
//! call on the same observer (e.g. from a healing layer) advances the step
//! counter and the differ and is not concurrency-safe.

mod error;

use std::fmt;
use std::time::Instant;

use tracing::{debug, instrument};

pub use error::{ObserveError, ObserveResult};

use crate::diff::StateDiffer;
use crate::extract::{A11yExtractor, DomExtractor, Extractor, HybridExtractor, VisionExtractor};
use crate::format::OutputFormatter;
use crate::page::Page;
use crate::refs::RefManager;
use crate::router::{AdaptiveRouter, RouterOverride};
use crate::state::{Delta, ObservationResult, RepresentationType};

/// Default token budget for formatted output
const DEFAULT_TOKEN_BUDGET: usize = 4096;

/// Constructor options for [`Observer`]
pub struct ObserverConfig {
    /// Maximum tokens in formatted output
    pub token_budget: usize,

    /// Compute deltas between consecutive observations
    pub enable_diffing: bool,

    /// Let the router pick a representation per observation
    pub enable_routing: bool,

    /// Always use this representation, bypassing the router
    pub force_representation: Option<RepresentationType>,

    /// Replace the router's strategy with a caller-provided function
    pub router_override: Option<RouterOverride>,
}

impl Default for ObserverConfig {
    fn default() -> Self {
        Self {
            token_budget: DEFAULT_TOKEN_BUDGET,
            enable_diffing: true,
            enable_routing: true,
            force_representation: None,
            router_override: None,
        }
    }
}

impl fmt::Debug for ObserverConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObserverConfig")
            .field("token_budget", &self.token_budget)
            .field("enable_diffing", &self.enable_diffing)
            .field("enable_routing", &self.enable_routing)
            .field("force_representation", &self.force_representation)
            .field("router_override", &self.router_override.is_some())
            .finish()
    }
}

/// Stateful per-session observation pipeline
pub struct Observer {
    enable_diffing: bool,
    enable_routing: bool,
    force_representation: Option<RepresentationType>,
    step: u64,
    refs: RefManager,
    router: AdaptiveRouter,
    differ: StateDiffer,
    formatter: OutputFormatter,
    a11y: A11yExtractor,
    dom: DomExtractor,
    vision: VisionExtractor,
    hybrid: HybridExtractor,
}

impl fmt::Debug for Observer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observer")
            .field("step", &self.step)
            .field("enable_diffing", &self.enable_diffing)
            .field("enable_routing", &self.enable_routing)
            .field("force_representation", &self.force_representation)
            .field("total_refs", &self.refs.total_refs())
            .finish_non_exhaustive()
    }
}

impl Default for Observer {
    fn default() -> Self {
        Self::new(ObserverConfig::default())
    }
}

impl Observer {
    /// Create an observer from constructor options
    #[must_use]
    pub fn new(config: ObserverConfig) -> Self {
        let mut router = AdaptiveRouter::new();
        if let Some(override_fn) = config.router_override {
            router = router.with_override(override_fn);
        }

        Self {
            enable_diffing: config.enable_diffing,
            enable_routing: config.enable_routing,
            force_representation: config.force_representation,
            step: 0,
            refs: RefManager::new(),
            router,
            differ: StateDiffer::new(),
            formatter: OutputFormatter::new(config.token_budget),
            a11y: A11yExtractor::new(),
            dom: DomExtractor::new(),
            vision: VisionExtractor::new(),
            hybrid: HybridExtractor::new(),
        }
    }

    /// Observe the page and return a compact, LLM-ready representation
    ///
    /// The first call returns the full page state; subsequent calls return
    /// only what changed, unless the page navigated or the delta would be
    /// larger than the full state.
    #[instrument(skip(self, page), fields(step, representation))]
    pub async fn observe(&mut self, page: &dyn Page) -> ObserveResult<ObservationResult> {
        let started = Instant::now();
        self.step += 1;
        tracing::Span::current().record("step", self.step);

        let representation_type = if let Some(forced) = self.force_representation {
            forced
        } else if self.enable_routing {
            self.router.select(page).await
        } else {
            RepresentationType::A11yTree
        };
        tracing::Span::current().record("representation", representation_type.as_str());

        let extractor: &dyn Extractor = match representation_type {
            RepresentationType::A11yTree => &self.a11y,
            RepresentationType::DistilledDom => &self.dom,
            RepresentationType::Vision => &self.vision,
            RepresentationType::Hybrid => &self.hybrid,
        };
        let mut state = extractor.extract(page, &mut self.refs).await?;
        state.step = self.step;

        let mut diff_discarded = false;
        let mut delta = if self.enable_diffing {
            let navigated = self
                .differ
                .previous_url()
                .is_some_and(|previous| previous != state.url);
            if navigated {
                debug!(url = %state.url, "navigation detected, discarding diff");
                diff_discarded = true;
                Some(self.differ.force_full_state(&state))
            } else {
                Some(self.differ.diff(&state))
            }
        } else {
            None
        };

        let (formatted_text, token_count) = match delta.take() {
            Some(computed) if !computed.is_full_state => {
                let (delta_text, delta_tokens) = self.formatter.format_delta(&computed, &state);
                let (full_text, full_tokens) = self.formatter.format_full_state(&state);
                if delta_tokens > full_tokens {
                    debug!(delta_tokens, full_tokens, "delta larger than full state, discarding diff");
                    diff_discarded = true;
                    delta = Some(Delta::full_state(
                        state.step,
                        state.representation_type,
                        state.node_count(),
                    ));
                    (full_text, full_tokens)
                } else {
                    delta = Some(computed);
                    (delta_text, delta_tokens)
                }
            }
            other => {
                delta = other;
                self.formatter.format_full_state(&state)
            }
        };

        let latency_ms = started.elapsed().as_secs_f64() * 1000.0;
        debug!(token_count, latency_ms, diff_discarded, "observation complete");

        Ok(ObservationResult {
            step: self.step,
            url: state.url.clone(),
            representation_type,
            formatted_text,
            delta,
            page_state: state,
            token_count,
            latency_ms,
            diff_discarded,
        })
    }

    /// Reset step counter, refs, and the stored snapshot
    ///
    /// The router cache is keyed per origin and stays valid.
    pub fn reset(&mut self) {
        self.step = 0;
        self.refs.reset();
        self.differ.reset();
    }

    /// Current step counter
    #[must_use]
    pub fn step(&self) -> u64 {
        self.step
    }

    /// Access the router for signal inspection and cache invalidation
    pub fn router_mut(&mut self) -> &mut AdaptiveRouter {
        &mut self.router
    }

    /// Access the differ for previous-URL inspection and forced snapshots
    pub fn differ_mut(&mut self) -> &mut StateDiffer {
        &mut self.differ
    }
}
