//! Recognition-string element locator
//!
//! This crate searches an externally-owned element tree for the element a
//! recognition string describes. The tree is reached only through
//! [`ElementAdapter`]; [`SnapshotTree`] is an in-memory implementation.
//!
//! ```text
//! caller → TreeSearchEngine ─┬─ DefinitionChain (parsed once per call)
//!                            └─ polling loop → IndexTracker → MatchEvaluator
//! ```

#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

pub mod adapter;
pub mod clock;
pub mod engine;
pub mod evaluator;
pub mod snapshot;

pub use adapter::{ElementAdapter, ElementFacts};
pub use clock::{Clock, ManualClock, SystemClock};
pub use engine::{LevelMatch, LocateOutcome, Located, NotFound, TreeSearchEngine};
pub use evaluator::{MatchEvaluator, SearchScope};
pub use snapshot::{NodePath, SnapshotNode, SnapshotNodeBuilder, SnapshotTree};

// Re-export error types from core
pub use uilocator_core::error::{Error, Result};
