//! Decides whether one element satisfies one path level.
//!
//! Qualifiers are evaluated in declaration order and the first failure ends
//! evaluation. Counters must already include the element being evaluated;
//! the evaluator only reads them.
//!
//! Case sensitivity differs per kind and is deliberate:
//!
//! | Kind | Comparison |
//! |------|------------|
//! | Class, Subclass, Caption, Name, Text, Property | exact, case-sensitive |
//! | Type | exact, case-insensitive |
//! | NameContains, TextContains, PropertyContains | substring, case-insensitive |
//! | Id | numeric |
//! | index kinds | trimmed value equals the decimal count |

use tracing::{debug, trace, warn};
use uilocator_core::error::Result;
use uilocator_core::{
    type_key, CounterKind, ElementDefinition, IndexTracker, Qualifier, QualifierKind,
};

use crate::adapter::{ElementAdapter, ElementFacts};

/// Which part of the tree the evaluated element belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchScope {
    /// Top-level roots
    Root,
    /// Anything below a root
    Descendant,
}

pub struct MatchEvaluator<'a, A: ElementAdapter + ?Sized> {
    adapter: &'a A,
}

impl<'a, A: ElementAdapter + ?Sized> MatchEvaluator<'a, A> {
    pub fn new(adapter: &'a A) -> Self {
        Self { adapter }
    }

    /// Evaluate every qualifier of `definition` against `element`.
    ///
    /// On success the current counters are captured into the definition's
    /// match result.
    pub fn evaluate(
        &self,
        element: &A::Element,
        facts: &ElementFacts,
        definition: &mut ElementDefinition,
        tracker: &IndexTracker,
        scope: SearchScope,
    ) -> Result<bool> {
        let mut matched_ancestor: Option<&str> = None;

        for qualifier in definition.qualifiers() {
            let satisfied = self.check(
                element,
                facts,
                definition,
                qualifier,
                tracker,
                scope,
                &mut matched_ancestor,
            )?;
            if !satisfied {
                trace!(
                    class = %facts.class_name,
                    qualifier = %qualifier,
                    "Qualifier not satisfied"
                );
                return Ok(false);
            }
        }

        definition.record_match(tracker.snapshot());
        debug!(class = %facts.class_name, level = %definition.raw(), "Element matched level");
        Ok(true)
    }

    #[allow(clippy::too_many_arguments)]
    fn check<'f>(
        &self,
        element: &A::Element,
        facts: &'f ElementFacts,
        definition: &ElementDefinition,
        qualifier: &Qualifier,
        tracker: &IndexTracker,
        scope: SearchScope,
        matched_ancestor: &mut Option<&'f str>,
    ) -> Result<bool> {
        let value = qualifier.value.as_str();

        let satisfied = match qualifier.kind {
            QualifierKind::Class => facts.class_name == value,
            QualifierKind::Subclass => {
                match facts.lineage.iter().find(|ancestor| ancestor.as_str() == value) {
                    Some(ancestor) => {
                        *matched_ancestor = Some(ancestor.as_str());
                        true
                    }
                    None => false,
                }
            }
            QualifierKind::Type => facts.resolved_type.eq_ignore_ascii_case(value),
            QualifierKind::Caption => self.adapter.caption(element)? == value,
            QualifierKind::Name => facts.name.as_deref() == Some(value),
            QualifierKind::NameContains => facts
                .name
                .as_deref()
                .is_some_and(|name| contains_ignore_case(name, value)),
            QualifierKind::Text => self.adapter.text(element)? == value,
            QualifierKind::TextContains => {
                contains_ignore_case(&self.adapter.text(element)?, value)
            }
            QualifierKind::Property | QualifierKind::PropertyContains => {
                let Some((property, expected)) = qualifier.property_parts() else {
                    debug!(qualifier = %qualifier, "Property qualifier lacks 'name:value'");
                    return Ok(false);
                };
                let actual = self.adapter.property(element, property)?;
                if qualifier.kind == QualifierKind::Property {
                    actual == expected
                } else {
                    contains_ignore_case(&actual, expected)
                }
            }
            QualifierKind::Id => ids_equal(facts.id.as_deref(), value),
            QualifierKind::Index => {
                let count = if definition.is_defined_by_id() {
                    keyed(tracker, CounterKind::Id, facts.id.as_deref(), false)
                } else if definition.is_defined_by_name() {
                    keyed(tracker, CounterKind::Name, facts.name.as_deref(), false)
                } else if definition.is_defined_by_type() {
                    tracker.get(CounterKind::Type, &type_key(&facts.resolved_type))
                } else {
                    tracker.get(CounterKind::Class, &facts.class_name)
                };
                count_equals(value, count)
            }
            QualifierKind::AbsIndex => {
                let count = if definition.is_defined_by_type() {
                    tracker.get_absolute(CounterKind::Type, &type_key(&facts.resolved_type))
                } else {
                    tracker.get_absolute(CounterKind::Class, &facts.class_name)
                };
                count_equals(value, count)
            }
            QualifierKind::ClassIndex => {
                count_equals(value, tracker.get(CounterKind::Class, &facts.class_name))
            }
            QualifierKind::AbsClassIndex => count_equals(
                value,
                tracker.get_absolute(CounterKind::Class, &facts.class_name),
            ),
            QualifierKind::ObjectIndex => count_equals(value, tracker.object()),
            QualifierKind::AbsObjectIndex => count_equals(value, tracker.absolute_object()),
            QualifierKind::SubclassIndex | QualifierKind::AbsSubclassIndex => {
                let Some(ancestor) = *matched_ancestor else {
                    debug!(
                        qualifier = %qualifier,
                        "Subclass index without a preceding Subclass match"
                    );
                    return Ok(false);
                };
                let absolute = qualifier.kind == QualifierKind::AbsSubclassIndex;
                count_equals(
                    value,
                    keyed(tracker, CounterKind::Subclass, Some(ancestor), absolute),
                )
            }
            QualifierKind::Path => {
                debug!(qualifier = %qualifier, "Path qualifiers are not resolvable here");
                false
            }
            QualifierKind::Current => match scope {
                SearchScope::Root => tracker.object() == 1,
                SearchScope::Descendant => {
                    warn!(
                        qualifier = %qualifier,
                        "Current is unsupported below the top level"
                    );
                    false
                }
            },
        };

        Ok(satisfied)
    }
}

fn keyed(tracker: &IndexTracker, kind: CounterKind, key: Option<&str>, absolute: bool) -> usize {
    match (key, absolute) {
        (Some(key), false) => tracker.get(kind, key),
        (Some(key), true) => tracker.get_absolute(kind, key),
        (None, _) => 0,
    }
}

fn count_equals(value: &str, count: usize) -> bool {
    value.trim() == count.to_string()
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn ids_equal(element_id: Option<&str>, value: &str) -> bool {
    let Ok(expected) = value.trim().parse::<i64>() else {
        return false;
    };
    element_id
        .and_then(|id| id.trim().parse::<i64>().ok())
        .is_some_and(|actual| actual == expected)
}
