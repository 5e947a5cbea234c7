//! Parsed path levels and the chain they form.

use std::cell::OnceCell;
use std::fmt::{self, Display};

use crate::error::{Error, Result};
use crate::index::MatchResult;
use crate::recognition::{
    parse_level, strip_fpsm, Qualifier, QualifierKind, RecognitionPath, FPSM_SENTINEL,
    QUALIFIER_SEPARATOR,
};

/// One parsed level of a recognition path.
#[derive(Debug, Clone)]
pub struct ElementDefinition {
    raw: String,
    fpsm: bool,
    qualifiers: Vec<Qualifier>,
    warnings: Vec<String>,
    defined_by_type: OnceCell<bool>,
    defined_by_id: OnceCell<bool>,
    defined_by_name: OnceCell<bool>,
    match_result: Option<MatchResult>,
}

impl ElementDefinition {
    /// Parse a single path level. Never fails; see [`Self::is_usable`].
    pub fn parse(raw: &str) -> Self {
        let parsed = parse_level(raw);
        Self {
            raw: raw.to_string(),
            fpsm: parsed.fpsm,
            qualifiers: parsed.qualifiers,
            warnings: parsed.warnings,
            defined_by_type: OnceCell::new(),
            defined_by_id: OnceCell::new(),
            defined_by_name: OnceCell::new(),
            match_result: None,
        }
    }

    /// The level text as written
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Full-path-single-match: only direct children are inspected
    pub fn is_fpsm(&self) -> bool {
        self.fpsm
    }

    pub fn qualifiers(&self) -> &[Qualifier] {
        &self.qualifiers
    }

    /// Tokens dropped while parsing
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// A level with no recognized qualifier cannot constrain anything
    pub fn is_usable(&self) -> bool {
        !self.qualifiers.is_empty()
    }

    pub fn has(&self, kind: QualifierKind) -> bool {
        self.qualifiers.iter().any(|q| q.kind == kind)
    }

    pub fn is_defined_by_type(&self) -> bool {
        *self
            .defined_by_type
            .get_or_init(|| self.has(QualifierKind::Type))
    }

    pub fn is_defined_by_id(&self) -> bool {
        *self.defined_by_id.get_or_init(|| self.has(QualifierKind::Id))
    }

    pub fn is_defined_by_name(&self) -> bool {
        *self
            .defined_by_name
            .get_or_init(|| self.has(QualifierKind::Name))
    }

    /// Counters captured when this level last matched
    pub fn match_result(&self) -> Option<&MatchResult> {
        self.match_result.as_ref()
    }

    pub fn record_match(&mut self, result: MatchResult) {
        self.match_result = Some(result);
    }

    pub fn clear_match(&mut self) {
        self.match_result = None;
    }
}

impl PartialEq for ElementDefinition {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw && self.fpsm == other.fpsm && self.qualifiers == other.qualifiers
    }
}

impl Display for ElementDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.fpsm {
            write!(f, "{FPSM_SENTINEL}")?;
        }
        let mut first = true;
        for qualifier in &self.qualifiers {
            if !first {
                write!(f, "{QUALIFIER_SEPARATOR}")?;
            }
            write!(f, "{qualifier}")?;
            first = false;
        }
        Ok(())
    }
}

/// Ordered definitions for every level of one recognition path.
///
/// Level `i`'s child is level `i + 1`; the last level has no child.
#[derive(Debug, Clone, PartialEq)]
pub struct DefinitionChain {
    path: String,
    levels: Vec<ElementDefinition>,
}

impl DefinitionChain {
    /// Parse every level of `path`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedPath`] if the path is blank or any level has
    /// no recognized qualifier.
    pub fn build(path: &str) -> Result<Self> {
        if path.trim().is_empty() {
            return Err(Error::malformed_path(path, "recognition string is empty"));
        }

        let split = RecognitionPath::split(path);
        let mut levels = Vec::with_capacity(split.len());
        for (position, raw) in split.levels().iter().enumerate() {
            let definition = ElementDefinition::parse(raw);
            if !definition.is_usable() {
                let (_, body) = strip_fpsm(raw);
                let reason = if body.trim().is_empty() {
                    format!("level {} is empty", position + 1)
                } else {
                    format!(
                        "level {} ('{raw}') has no recognized qualifier",
                        position + 1
                    )
                };
                return Err(Error::malformed_path(path, reason));
            }
            levels.push(definition);
        }

        Ok(Self {
            path: path.to_string(),
            levels,
        })
    }

    /// The full recognition string
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn levels(&self) -> &[ElementDefinition] {
        &self.levels
    }

    pub fn level(&self, index: usize) -> Option<&ElementDefinition> {
        self.levels.get(index)
    }

    pub fn level_mut(&mut self, index: usize) -> Option<&mut ElementDefinition> {
        self.levels.get_mut(index)
    }

    /// Index of the child level of `index`, if any
    pub fn child_of(&self, index: usize) -> Option<usize> {
        let child = index + 1;
        (child < self.levels.len()).then_some(child)
    }

    /// Forget every captured match result
    pub fn clear_matches(&mut self) {
        for level in &mut self.levels {
            level.clear_match();
        }
    }
}

impl Display for DefinitionChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self.levels.iter().map(ToString::to_string).collect();
        write!(f, "{}", rendered.join(crate::recognition::CHILD_SEPARATOR))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{CounterKind, IndexTracker};

    #[test]
    fn test_derived_flags() {
        let def = ElementDefinition::parse("Type=Button;Name=ok");
        assert!(def.is_defined_by_type());
        assert!(def.is_defined_by_name());
        assert!(!def.is_defined_by_id());
        // cached values are stable
        assert!(def.is_defined_by_type());
    }

    #[test]
    fn test_parse_twice_yields_same_definition() {
        let a = ElementDefinition::parse(":FPSM:Id=7;Index=1");
        let b = ElementDefinition::parse(":FPSM:Id=7;Index=1");
        assert_eq!(a, b);
        assert_eq!(a.is_defined_by_id(), b.is_defined_by_id());
        assert_eq!(a.is_defined_by_name(), b.is_defined_by_name());
    }

    #[test]
    fn test_chain_links_levels_by_position() {
        let chain = DefinitionChain::build("Type=Window;\\;Type=Panel;\\;Caption=OK").unwrap();
        assert_eq!(chain.len(), 3);
        assert_eq!(chain.child_of(0), Some(1));
        assert_eq!(chain.child_of(1), Some(2));
        assert_eq!(chain.child_of(2), None);
    }

    #[test]
    fn test_empty_path_is_malformed() {
        assert!(matches!(
            DefinitionChain::build("   "),
            Err(Error::MalformedPath { .. })
        ));
    }

    #[test]
    fn test_unusable_level_is_malformed() {
        let err = DefinitionChain::build("Type=Window;\\;Bogus=1").unwrap_err();
        assert!(err.to_string().contains("no recognized qualifier"));

        let err = DefinitionChain::build("Type=Window;\\;").unwrap_err();
        assert!(err.to_string().contains("level 2 is empty"));
    }

    #[test]
    fn test_display_renders_wire_format() {
        let chain = DefinitionChain::build("CurrentWindow;\\;:FPSM:class=Foo;index=2").unwrap();
        assert_eq!(chain.to_string(), "CurrentWindow;\\;:FPSM:Class=Foo;Index=2");
    }

    #[test]
    fn test_record_and_clear_match() {
        let mut chain = DefinitionChain::build("Class=Foo").unwrap();
        let mut tracker = IndexTracker::new();
        tracker.increment(CounterKind::Class, "Foo");

        chain.level_mut(0).unwrap().record_match(tracker.snapshot());
        assert_eq!(
            chain.level(0).unwrap().match_result().unwrap().get(CounterKind::Class, "Foo"),
            1
        );

        chain.clear_matches();
        assert!(chain.level(0).unwrap().match_result().is_none());
    }
}
