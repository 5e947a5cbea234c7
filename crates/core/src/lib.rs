//! Core types for the recognition-string element locator
//!
//! This crate provides the foundations used by the search engine:
//!
//! - **Recognition grammar**: splitting recognition strings into levels and qualifiers
//! - **Definitions**: parsed levels linked into a parent→child chain
//! - **Index tracking**: relative and absolute occurrence counters
//! - **Configuration**: polling and sentinel settings
//! - **Error handling**: unified error types
//!

#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

pub mod config;
pub mod definition;
pub mod error;
pub mod index;
pub mod recognition;

// Re-export main types for convenience
pub use config::{Config, LocatorConfig};
pub use definition::{DefinitionChain, ElementDefinition};
pub use error::{Error, Result, ResultExt};
pub use index::{type_key, CounterKind, IndexTracker, MatchResult};
pub use recognition::{
    parse_level, Qualifier, QualifierKind, RecognitionPath, CHILD_SEPARATOR, FPSM_SENTINEL,
};

/// Version of the core library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::definition::{DefinitionChain, ElementDefinition};
    pub use crate::error::{Result, ResultExt};
    pub use crate::index::{CounterKind, IndexTracker, MatchResult};
}
