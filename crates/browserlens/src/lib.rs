//! # BrowserLens
//!
//! BrowserLens sits between a browser-automation driver and a language-model
//! agent. Each time the agent asks "what does the page look like now?", it
//! produces a compact, token-bounded textual representation of the live
//! page, exploiting the fact that between two consecutive agent steps only a
//! small part of the page usually changes.
//!
//! ## Overview
//!
//! Per [`Observer::observe`] call:
//!
//! 1. An adaptive router profiles the page with cheap signals and picks the
//!    cheapest representation strong enough for it.
//! 2. One of four extractors turns live browser state into a normalized
//!    semantic tree, stamping every node with a stable `@eN` reference.
//! 3. A differ compares the tree against the previous observation and
//!    strips low-signal churn (timers, ads, live-region chatter).
//! 4. A formatter renders the full state or the delta as LLM-ready text
//!    within a token budget.
//!
//! The pipeline consumes any [`Page`] implementation; the browser driver
//! itself is an external collaborator.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use browserlens::{Observer, ObserverConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), browserlens::ObserveError> {
//!     let mut observer = Observer::new(ObserverConfig::default());
//!
//!     // `page` is any type implementing browserlens::Page
//!     let result = observer.observe(&page).await?;
//!     println!("{}", result.formatted_text); // send to the LLM
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Module Structure
//!
//! - [`page`]: the browser page capability and raw payload types
//! - [`state`]: the normalized tree and observation data model
//! - [`refs`]: stable `@eN` reference management
//! - [`extract`]: the four page-state extractors
//! - [`router`]: signal collection and representation selection
//! - [`diff`]: snapshot storage, tree diffing, semantic filtering
//! - [`format`]: token budgeting and output rendering
//! - [`observer`]: the orchestrator owning all of the above

pub mod diff;
pub mod extract;
pub mod format;
pub mod observer;
pub mod page;
pub mod refs;
pub mod router;
pub mod state;

pub use observer::{ObserveError, ObserveResult, Observer, ObserverConfig};
pub use page::{Page, PageError};
pub use state::{
    Delta, NodeChange, ObservationResult, PageSignals, PageState, RepresentationType, StateNode,
};
