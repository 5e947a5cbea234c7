//! Timeout-polled, backtracking search over the element tree.
//!
//! A locate call parses its recognition string once, then repeats a full
//! search pass until it matches, the timeout runs out, or (in single-pass
//! mode) after the first pass. Within a pass:
//!
//! - top-level roots are scanned in adapter order against the first level;
//! - a matching element commits the search to its subtree, and relative
//!   counters restart for its children;
//! - a non-matching element is searched through for the same level (unless
//!   the level is FPSM). When that excursion fails, only the relative class
//!   and subclass counters are rolled back.

use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info, trace};
use uilocator_core::error::{Error, Result};
use uilocator_core::recognition::strip_fpsm;
use uilocator_core::{
    type_key, CounterKind, DefinitionChain, IndexTracker, LocatorConfig, MatchResult,
};

use crate::adapter::{ElementAdapter, ElementFacts};
use crate::clock::{Clock, SystemClock};
use crate::evaluator::{MatchEvaluator, SearchScope};

/// Match result captured for one resolved path level
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LevelMatch {
    /// Level text as written
    pub level: String,
    pub result: MatchResult,
}

/// A located element and how each level of its path matched
#[derive(Debug, Clone)]
pub struct Located<E> {
    pub element: E,
    pub levels: Vec<LevelMatch>,
    /// Number of polling passes it took
    pub passes: usize,
}

/// A search that ran out of time (or passes) without a match
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotFound {
    pub recognition: String,
    pub timeout_secs: u64,
    pub elapsed: Duration,
    pub passes: usize,
}

impl NotFound {
    pub fn into_error(self) -> Error {
        Error::NotFound {
            recognition: self.recognition,
            timeout_secs: self.timeout_secs,
            elapsed_ms: u64::try_from(self.elapsed.as_millis()).unwrap_or(u64::MAX),
        }
    }
}

/// Outcome of a locate call. Not finding anything is a normal outcome.
#[derive(Debug, Clone)]
pub enum LocateOutcome<E> {
    Found(Located<E>),
    NotFound(NotFound),
}

impl<E> LocateOutcome<E> {
    /// For existence checks, where absence is an expected answer
    pub fn exists(&self) -> bool {
        matches!(self, LocateOutcome::Found(_))
    }

    pub fn found(&self) -> Option<&Located<E>> {
        match self {
            LocateOutcome::Found(located) => Some(located),
            LocateOutcome::NotFound(_) => None,
        }
    }

    /// Treat absence as an error naming the recognition string and timeout
    pub fn into_result(self) -> Result<Located<E>> {
        match self {
            LocateOutcome::Found(located) => Ok(located),
            LocateOutcome::NotFound(not_found) => Err(not_found.into_error()),
        }
    }
}

#[derive(Debug, Clone)]
struct CachedRoot<E> {
    path: String,
    element: E,
}

/// Finds elements by recognition string.
///
/// Owns its adapter and clock; each locate call builds its own definition
/// chain and index tracker, so nothing but the root cache carries over
/// between calls.
pub struct TreeSearchEngine<A: ElementAdapter, C: Clock = SystemClock> {
    adapter: A,
    clock: C,
    config: LocatorConfig,
    root_cache: Option<CachedRoot<A::Element>>,
    last_levels: Vec<LevelMatch>,
}

impl<A: ElementAdapter> TreeSearchEngine<A, SystemClock> {
    pub fn new(adapter: A, config: LocatorConfig) -> Self {
        Self::with_clock(adapter, SystemClock, config)
    }
}

impl<A: ElementAdapter, C: Clock> TreeSearchEngine<A, C> {
    pub fn with_clock(adapter: A, clock: C, config: LocatorConfig) -> Self {
        Self {
            adapter,
            clock,
            config,
            root_cache: None,
            last_levels: Vec::new(),
        }
    }

    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    pub fn config(&self) -> &LocatorConfig {
        &self.config
    }

    /// Match results of the most recent successful locate, one per level
    pub fn last_level_matches(&self) -> &[LevelMatch] {
        &self.last_levels
    }

    /// The cached root for `root_path`, if one was located before
    pub fn cached_root(&self, root_path: &str) -> Option<&A::Element> {
        self.root_cache
            .as_ref()
            .filter(|cached| cached.path == root_path)
            .map(|cached| &cached.element)
    }

    pub fn clear_root_cache(&mut self) {
        self.root_cache = None;
    }

    /// Find a top-level element (and any further levels of `path` below it).
    ///
    /// # Errors
    ///
    /// [`Error::MalformedPath`] before any polling if `path` is unusable;
    /// [`Error::AdapterFailure`] as soon as the tree cannot be read.
    pub fn locate_root(
        &mut self,
        path: &str,
        timeout_secs: u64,
        single_pass: bool,
    ) -> Result<LocateOutcome<A::Element>> {
        let mut chain = DefinitionChain::build(path)?;
        let started = self.clock.now();
        let timeout = Duration::from_secs(timeout_secs);
        let mut tracker = IndexTracker::new();
        let mut passes = 0;

        loop {
            passes += 1;
            chain.clear_matches();
            debug!(path = %path, pass = passes, "Scanning top-level roots");

            if let Some(element) = self.scan_roots(&mut chain, &mut tracker)? {
                let levels = resolved_levels(&chain, 0);
                info!(path = %path, passes, "Located root element");
                self.root_cache = Some(CachedRoot {
                    path: path.to_string(),
                    element: element.clone(),
                });
                self.last_levels = levels.clone();
                return Ok(LocateOutcome::Found(Located {
                    element,
                    levels,
                    passes,
                }));
            }

            let elapsed = self.clock.now().saturating_duration_since(started);
            if single_pass || elapsed >= timeout {
                debug!(path = %path, passes, ?elapsed, "Root not found");
                return Ok(LocateOutcome::NotFound(NotFound {
                    recognition: path.to_string(),
                    timeout_secs,
                    elapsed,
                    passes,
                }));
            }
            self.clock.sleep(self.config.poll_interval());
        }
    }

    /// Find an element below the root identified by `root_path`.
    ///
    /// The root comes from the cache when `root_path` was located before;
    /// otherwise it is located with the configured short root timeout. A first
    /// descendant level that names the top-level window itself is skipped.
    pub fn locate_descendant(
        &mut self,
        root_path: &str,
        descendant_path: &str,
        timeout_secs: u64,
        single_pass: bool,
    ) -> Result<LocateOutcome<A::Element>> {
        let mut chain = DefinitionChain::build(descendant_path)?;

        let root = match self.cached_root(root_path) {
            Some(element) => element.clone(),
            None => {
                let refresh = self.config.root_refresh_timeout_secs;
                match self.locate_root(root_path, refresh, single_pass)? {
                    LocateOutcome::Found(located) => located.element,
                    LocateOutcome::NotFound(not_found) => {
                        return Ok(LocateOutcome::NotFound(not_found))
                    }
                }
            }
        };

        let start = self.first_searched_level(&chain);
        if start >= chain.len() {
            debug!(path = %descendant_path, "Descendant path names the root itself");
            self.last_levels = Vec::new();
            return Ok(LocateOutcome::Found(Located {
                element: root,
                levels: Vec::new(),
                passes: 0,
            }));
        }

        let started = self.clock.now();
        let timeout = Duration::from_secs(timeout_secs);
        let mut tracker = IndexTracker::new();
        let saved = tracker.snapshot();
        let mut passes = 0;

        loop {
            passes += 1;
            chain.clear_matches();
            tracker.reset_relative();
            tracker.restore_relative_class_and_subclass_only(&saved);
            debug!(path = %descendant_path, pass = passes, "Searching descendants");

            if let Some(element) = self.search_children(&root, &mut chain, start, &mut tracker)? {
                let levels = resolved_levels(&chain, start);
                info!(path = %descendant_path, passes, "Located descendant element");
                self.last_levels = levels.clone();
                return Ok(LocateOutcome::Found(Located {
                    element,
                    levels,
                    passes,
                }));
            }

            let elapsed = self.clock.now().saturating_duration_since(started);
            if single_pass || elapsed >= timeout {
                debug!(path = %descendant_path, passes, ?elapsed, "Descendant not found");
                return Ok(LocateOutcome::NotFound(NotFound {
                    recognition: descendant_path.to_string(),
                    timeout_secs,
                    elapsed,
                    passes,
                }));
            }
            self.clock.sleep(self.config.poll_interval());
        }
    }

    fn first_searched_level(&self, chain: &DefinitionChain) -> usize {
        match chain.level(0) {
            Some(first) if self.config.is_top_level_sentinel(strip_fpsm(first.raw()).1) => 1,
            _ => 0,
        }
    }

    /// One pass over the top-level roots against the first level of `chain`.
    fn scan_roots(
        &self,
        chain: &mut DefinitionChain,
        tracker: &mut IndexTracker,
    ) -> Result<Option<A::Element>> {
        let evaluator = MatchEvaluator::new(&self.adapter);
        tracker.reset_relative();

        for root in self.adapter.list_top_level_roots()? {
            let facts = ElementFacts::collect(&self.adapter, &root)?;
            count_element(tracker, &facts);
            trace!(class = %facts.class_name, "Visiting top-level root");

            let Some(definition) = chain.level_mut(0) else {
                return Ok(None);
            };
            if !evaluator.evaluate(&root, &facts, definition, tracker, SearchScope::Root)? {
                continue;
            }

            return match chain.child_of(0) {
                None => Ok(Some(root)),
                Some(child_level) => {
                    tracker.reset_relative();
                    self.search_children(&root, chain, child_level, tracker)
                }
            };
        }

        Ok(None)
    }

    /// Depth-first search below `parent` for the definition at `level`.
    fn search_children(
        &self,
        parent: &A::Element,
        chain: &mut DefinitionChain,
        level: usize,
        tracker: &mut IndexTracker,
    ) -> Result<Option<A::Element>> {
        let children = self.adapter.list_children(parent)?;
        if children.is_empty() {
            return Ok(None);
        }

        let evaluator = MatchEvaluator::new(&self.adapter);
        let fpsm = chain.level(level).is_some_and(|d| d.is_fpsm());

        for child in children {
            let facts = ElementFacts::collect(&self.adapter, &child)?;
            count_element(tracker, &facts);
            trace!(class = %facts.class_name, level, "Visiting element");

            let Some(definition) = chain.level_mut(level) else {
                return Ok(None);
            };
            let matched =
                evaluator.evaluate(&child, &facts, definition, tracker, SearchScope::Descendant)?;

            if matched {
                return match chain.child_of(level) {
                    None => Ok(Some(child)),
                    Some(next) => {
                        tracker.reset_relative();
                        self.search_children(&child, chain, next, tracker)
                    }
                };
            }

            if fpsm {
                continue;
            }

            let saved = tracker.snapshot();
            if let Some(found) = self.search_children(&child, chain, level, tracker)? {
                return Ok(Some(found));
            }
            tracker.restore_relative_class_and_subclass_only(&saved);
        }

        Ok(None)
    }
}

/// Advance every counter a visited element contributes to.
fn count_element(tracker: &mut IndexTracker, facts: &ElementFacts) {
    tracker.increment(CounterKind::Class, &facts.class_name);
    for ancestor in &facts.lineage {
        tracker.increment(CounterKind::Subclass, ancestor);
    }
    tracker.increment(CounterKind::Type, &type_key(&facts.resolved_type));
    if let Some(id) = &facts.id {
        tracker.increment(CounterKind::Id, id);
    }
    if let Some(name) = &facts.name {
        tracker.increment(CounterKind::Name, name);
    }
    tracker.increment_object();
}

fn resolved_levels(chain: &DefinitionChain, start: usize) -> Vec<LevelMatch> {
    chain
        .levels()
        .iter()
        .skip(start)
        .filter_map(|definition| {
            definition.match_result().map(|result| LevelMatch {
                level: definition.raw().to_string(),
                result: result.clone(),
            })
        })
        .collect()
}
