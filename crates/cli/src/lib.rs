//! Library interface for the uilocator CLI
//!
//! This module exposes the command implementations for integration testing
//! while keeping argument parsing in main.rs.

pub mod report;

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::debug;
use uilocator_core::config::Config;
use uilocator_engine::{LocateOutcome, NotFound, SnapshotTree, TreeSearchEngine};

pub use report::{parse_report, ElementReport, LevelReport, LocateReport};

/// Arguments shared by `locate` and `exists`
#[derive(Debug, Clone)]
pub struct LocateRequest {
    /// JSON tree snapshot to search
    pub tree: PathBuf,
    pub root: String,
    pub child: Option<String>,
    /// Falls back to the configured default when absent
    pub timeout_secs: Option<u64>,
    pub single_pass: bool,
}

/// Result of a locate command
#[derive(Debug)]
pub enum Lookup {
    Found(LocateReport),
    Missing(NotFound),
}

/// Load the snapshot named by `request` and search it.
pub fn locate(request: &LocateRequest, config: &Config) -> Result<Lookup> {
    let tree = SnapshotTree::from_file(&request.tree)
        .with_context(|| format!("Failed to load tree snapshot {}", request.tree.display()))?;
    let timeout = request
        .timeout_secs
        .unwrap_or(config.locator.default_timeout_secs);
    debug!(root = %request.root, child = ?request.child, timeout, "Locating element");

    let mut engine = TreeSearchEngine::new(&tree, config.locator.clone());
    let outcome = match &request.child {
        Some(child) => engine.locate_descendant(&request.root, child, timeout, request.single_pass),
        None => engine.locate_root(&request.root, timeout, request.single_pass),
    }?;

    match outcome {
        LocateOutcome::Found(located) => Ok(Lookup::Found(LocateReport::new(&tree, located)?)),
        LocateOutcome::NotFound(not_found) => Ok(Lookup::Missing(not_found)),
    }
}
