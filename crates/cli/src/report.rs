//! JSON shapes printed by the CLI

use serde::Serialize;
use uilocator_core::{DefinitionChain, Qualifier};
use uilocator_engine::{
    ElementAdapter, LevelMatch, Located, NodePath, Result, SnapshotTree,
};

/// One parsed level of a recognition string
#[derive(Debug, Serialize)]
pub struct LevelReport {
    pub raw: String,
    /// Re-rendered in canonical form
    pub canonical: String,
    pub fpsm: bool,
    pub qualifiers: Vec<Qualifier>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

pub fn parse_report(recognition: &str) -> Result<Vec<LevelReport>> {
    let chain = DefinitionChain::build(recognition)?;
    Ok(chain
        .levels()
        .iter()
        .map(|level| LevelReport {
            raw: level.raw().to_string(),
            canonical: level.to_string(),
            fpsm: level.is_fpsm(),
            qualifiers: level.qualifiers().to_vec(),
            warnings: level.warnings().to_vec(),
        })
        .collect())
}

/// Attributes of a located element
#[derive(Debug, Serialize)]
pub struct ElementReport {
    pub path: String,
    pub class_name: String,
    pub resolved_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub caption: String,
    pub text: String,
}

impl ElementReport {
    pub fn describe(tree: &SnapshotTree, element: &NodePath) -> Result<Self> {
        Ok(Self {
            path: element.to_string(),
            class_name: tree.class_name(element)?,
            resolved_type: tree.resolved_type(element)?,
            id: tree.id(element)?,
            name: tree.name(element)?,
            caption: tree.caption(element)?,
            text: tree.text(element)?,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct LocateReport {
    pub element: ElementReport,
    pub passes: usize,
    pub levels: Vec<LevelMatch>,
}

impl LocateReport {
    pub fn new(tree: &SnapshotTree, located: Located<NodePath>) -> Result<Self> {
        Ok(Self {
            element: ElementReport::describe(tree, &located.element)?,
            passes: located.passes,
            levels: located.levels,
        })
    }
}
