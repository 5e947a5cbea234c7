//! Test utilities for engine integration tests

use std::cell::Cell;
use std::sync::Once;
use std::time::Duration;

use uilocator_core::LocatorConfig;
use uilocator_engine::{
    ElementAdapter, ManualClock, NodePath, Result, SnapshotNode, SnapshotNodeBuilder,
    SnapshotTree, TreeSearchEngine,
};

static INIT_LOGGING: Once = Once::new();

/// Route engine logs to the test writer, filtered by UILOCATOR_TEST_LOG or
/// RUST_LOG. Initialized once per test binary.
pub fn init_test_logging() {
    INIT_LOGGING.call_once(|| {
        let log_level = std::env::var("UILOCATOR_TEST_LOG")
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or_else(|_| "error".to_string());

        tracing_subscriber::fmt()
            .with_env_filter(log_level)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

/// Create a node with just a class name
#[allow(dead_code)]
pub fn node(class_name: &str) -> SnapshotNode {
    SnapshotNodeBuilder::default()
        .class_name(class_name)
        .build()
        .expect("Failed to build test node")
}

/// Create a node with a resolved type and caption
#[allow(dead_code)]
pub fn captioned(class_name: &str, resolved_type: &str, caption: &str) -> SnapshotNode {
    SnapshotNodeBuilder::default()
        .class_name(class_name)
        .resolved_type(Some(resolved_type.to_string()))
        .caption(caption)
        .build()
        .expect("Failed to build test node")
}

/// Create a named node
#[allow(dead_code)]
pub fn named(class_name: &str, name: &str) -> SnapshotNode {
    SnapshotNodeBuilder::default()
        .class_name(class_name)
        .name(Some(name.to_string()))
        .build()
        .expect("Failed to build test node")
}

/// Attach children to a node
#[allow(dead_code)]
pub fn with_children(mut parent: SnapshotNode, children: Vec<SnapshotNode>) -> SnapshotNode {
    parent.children = children;
    parent
}

/// A top-level window captioned `caption` holding `children`
#[allow(dead_code)]
pub fn window(caption: &str, children: Vec<SnapshotNode>) -> SnapshotNode {
    with_children(captioned("Frame", "Window", caption), children)
}

/// Engine over `tree` with a virtual clock and a one-second poll interval
#[allow(dead_code)]
pub fn engine_for(
    tree: SnapshotTree,
) -> (TreeSearchEngine<SnapshotTree, ManualClock>, ManualClock) {
    init_test_logging();
    let clock = ManualClock::new();
    let engine = TreeSearchEngine::with_clock(tree, clock.clone(), LocatorConfig::default());
    (engine, clock)
}

/// Wraps a snapshot tree to count root listings, to hide the top-level
/// roots until a virtual time has passed, and optionally to replace the
/// whole tree with a later version once another virtual time is reached.
#[allow(dead_code)]
pub struct ObservedTree {
    pub tree: SnapshotTree,
    pub clock: ManualClock,
    pub roots_visible_after: Duration,
    pub root_listings: Cell<usize>,
    pub later: Option<(Duration, SnapshotTree)>,
}

#[allow(dead_code)]
impl ObservedTree {
    pub fn new(tree: SnapshotTree, clock: ManualClock, roots_visible_after: Duration) -> Self {
        Self {
            tree,
            clock,
            roots_visible_after,
            root_listings: Cell::new(0),
            later: None,
        }
    }

    /// Serve `tree` instead once `after` of virtual time has passed
    pub fn changing_to(mut self, after: Duration, tree: SnapshotTree) -> Self {
        self.later = Some((after, tree));
        self
    }

    fn current(&self) -> &SnapshotTree {
        match &self.later {
            Some((after, later)) if self.clock.elapsed() >= *after => later,
            _ => &self.tree,
        }
    }
}

impl ElementAdapter for ObservedTree {
    type Element = NodePath;

    fn list_top_level_roots(&self) -> Result<Vec<NodePath>> {
        self.root_listings.set(self.root_listings.get() + 1);
        if self.clock.elapsed() < self.roots_visible_after {
            return Ok(Vec::new());
        }
        self.current().list_top_level_roots()
    }

    fn list_children(&self, element: &NodePath) -> Result<Vec<NodePath>> {
        self.current().list_children(element)
    }

    fn class_name(&self, element: &NodePath) -> Result<String> {
        self.current().class_name(element)
    }

    fn superclass_chain(&self, element: &NodePath) -> Result<Vec<String>> {
        self.current().superclass_chain(element)
    }

    fn resolved_type(&self, element: &NodePath) -> Result<String> {
        self.current().resolved_type(element)
    }

    fn id(&self, element: &NodePath) -> Result<Option<String>> {
        self.current().id(element)
    }

    fn name(&self, element: &NodePath) -> Result<Option<String>> {
        self.current().name(element)
    }

    fn text(&self, element: &NodePath) -> Result<String> {
        self.current().text(element)
    }

    fn caption(&self, element: &NodePath) -> Result<String> {
        self.current().caption(element)
    }

    fn property(&self, element: &NodePath, name: &str) -> Result<String> {
        self.current().property(element, name)
    }
}
