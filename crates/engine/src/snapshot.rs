//! In-memory element tree.
//!
//! A [`SnapshotTree`] is a captured copy of a UI hierarchy, loadable from
//! JSON. It implements [`ElementAdapter`] so the engine can search it exactly
//! as it would a live tree; elements are addressed by their index path from
//! the top-level roots.

use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use uilocator_core::error::{Error, Result};

use crate::adapter::ElementAdapter;

/// One element of a captured tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Builder)]
#[builder(setter(into))]
pub struct SnapshotNode {
    pub class_name: String,

    /// Superclass names, most specific first
    #[serde(default)]
    #[builder(default)]
    pub superclasses: Vec<String>,

    /// Platform type; the class name is used when absent
    #[serde(default)]
    #[builder(default)]
    pub resolved_type: Option<String>,

    #[serde(default)]
    #[builder(default)]
    pub id: Option<String>,

    #[serde(default)]
    #[builder(default)]
    pub name: Option<String>,

    #[serde(default)]
    #[builder(default)]
    pub text: String,

    #[serde(default)]
    #[builder(default)]
    pub caption: String,

    #[serde(default)]
    #[builder(default)]
    pub properties: BTreeMap<String, String>,

    #[serde(default)]
    #[builder(default)]
    pub children: Vec<SnapshotNode>,
}

/// Index path from the top-level roots to an element
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct NodePath(Vec<usize>);

impl NodePath {
    /// The `index`th top-level root
    pub fn root(index: usize) -> Self {
        Self(vec![index])
    }

    pub fn child(&self, index: usize) -> Self {
        let mut path = self.0.clone();
        path.push(index);
        Self(path)
    }

    pub fn indices(&self) -> &[usize] {
        &self.0
    }

    /// Number of levels below the top-level roots
    pub fn depth(&self) -> usize {
        self.0.len().saturating_sub(1)
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        write!(f, "/{}", parts.join("/"))
    }
}

/// A captured element tree
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotTree {
    pub roots: Vec<SnapshotNode>,

    /// Make every listing call fail, as an inaccessible tree would
    #[serde(skip)]
    fail_listing: bool,
}

impl SnapshotTree {
    pub fn new(roots: Vec<SnapshotNode>) -> Self {
        Self {
            roots,
            fail_listing: false,
        }
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        serde_json::from_str(content)
            .map_err(|e| Error::serialization(format!("Failed to parse tree snapshot: {e}")))
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    pub fn set_fail_listing(&mut self, fail: bool) {
        self.fail_listing = fail;
    }

    /// Resolve a path to its node.
    ///
    /// # Errors
    ///
    /// Returns an adapter failure if the path no longer exists in the tree.
    pub fn node(&self, path: &NodePath) -> Result<&SnapshotNode> {
        let stale = || Error::adapter(format!("element {path} is no longer in the tree"));
        let (first, rest) = path.indices().split_first().ok_or_else(stale)?;
        let mut node = self.roots.get(*first).ok_or_else(stale)?;
        for index in rest {
            node = node.children.get(*index).ok_or_else(stale)?;
        }
        Ok(node)
    }

    fn check_accessible(&self) -> Result<()> {
        if self.fail_listing {
            return Err(Error::adapter("element tree is not accessible"));
        }
        Ok(())
    }
}

impl ElementAdapter for SnapshotTree {
    type Element = NodePath;

    fn list_top_level_roots(&self) -> Result<Vec<NodePath>> {
        self.check_accessible()?;
        Ok((0..self.roots.len()).map(NodePath::root).collect())
    }

    fn list_children(&self, element: &NodePath) -> Result<Vec<NodePath>> {
        self.check_accessible()?;
        let node = self.node(element)?;
        Ok((0..node.children.len()).map(|i| element.child(i)).collect())
    }

    fn class_name(&self, element: &NodePath) -> Result<String> {
        Ok(self.node(element)?.class_name.clone())
    }

    fn superclass_chain(&self, element: &NodePath) -> Result<Vec<String>> {
        Ok(self.node(element)?.superclasses.clone())
    }

    fn resolved_type(&self, element: &NodePath) -> Result<String> {
        let node = self.node(element)?;
        Ok(node
            .resolved_type
            .clone()
            .unwrap_or_else(|| node.class_name.clone()))
    }

    fn id(&self, element: &NodePath) -> Result<Option<String>> {
        Ok(self.node(element)?.id.clone())
    }

    fn name(&self, element: &NodePath) -> Result<Option<String>> {
        Ok(self.node(element)?.name.clone())
    }

    fn text(&self, element: &NodePath) -> Result<String> {
        Ok(self.node(element)?.text.clone())
    }

    fn caption(&self, element: &NodePath) -> Result<String> {
        Ok(self.node(element)?.caption.clone())
    }

    fn property(&self, element: &NodePath, name: &str) -> Result<String> {
        Ok(self
            .node(element)?
            .properties
            .get(name)
            .cloned()
            .unwrap_or_default())
    }
}
