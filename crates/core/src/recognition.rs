//! Recognition string grammar.
//!
//! A recognition string is a sequence of path levels joined by the child
//! separator `;\;`. Each level is a list of qualifiers joined by `;`, where a
//! qualifier is either `KEY=VALUE` or a bare keyword such as `CurrentWindow`.
//! A level may start with the `:FPSM:` sentinel to disable recursive descent
//! for that level.
//!
//! Parsing a level never fails: unknown keys are logged and dropped. Whether the
//! result is usable for a search is decided by [`crate::definition::DefinitionChain`].

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use std::str::FromStr;
use strum_macros::{Display as StrumDisplay, EnumIter, EnumString};
use tracing::{debug, warn};

/// Separator between qualifiers within one path level
pub const QUALIFIER_SEPARATOR: char = ';';

/// Separator between a qualifier key and its value
pub const ASSIGNMENT_SEPARATOR: char = '=';

/// Separator between path levels
pub const CHILD_SEPARATOR: &str = ";\\;";

/// Separator between property name and expected value in `Property=` qualifiers
pub const PROPERTY_SEPARATOR: char = ':';

/// Leading token that marks a level as full-path-single-match
pub const FPSM_SENTINEL: &str = ":FPSM:";

/// The closed set of qualifier keys understood by the locator.
///
/// Keys are matched case-insensitively, so `type=Button` and `TYPE=Button`
/// both parse as [`QualifierKind::Type`].
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    StrumDisplay,
    EnumString,
    EnumIter,
)]
#[strum(ascii_case_insensitive)]
pub enum QualifierKind {
    Class,
    Subclass,
    Type,
    Current,
    Index,
    Caption,
    Id,
    Name,
    NameContains,
    Property,
    PropertyContains,
    Text,
    TextContains,
    Path,
    ClassIndex,
    ObjectIndex,
    AbsClassIndex,
    AbsIndex,
    AbsObjectIndex,
    SubclassIndex,
    AbsSubclassIndex,
}

impl QualifierKind {
    /// True for the kinds whose value is an occurrence count
    pub fn is_index(&self) -> bool {
        matches!(
            self,
            QualifierKind::Index
                | QualifierKind::ClassIndex
                | QualifierKind::ObjectIndex
                | QualifierKind::AbsClassIndex
                | QualifierKind::AbsIndex
                | QualifierKind::AbsObjectIndex
                | QualifierKind::SubclassIndex
                | QualifierKind::AbsSubclassIndex
        )
    }
}

/// One constraint within a path level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Qualifier {
    pub kind: QualifierKind,
    /// Raw value as written, untrimmed
    pub value: String,
    /// Written without an assignment separator
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub bare: bool,
}

impl Qualifier {
    pub fn new(kind: QualifierKind, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
            bare: false,
        }
    }

    /// Split a `Property`/`PropertyContains` value into `(name, expected)`.
    pub fn property_parts(&self) -> Option<(&str, &str)> {
        self.value.split_once(PROPERTY_SEPARATOR)
    }
}

impl Display for Qualifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.bare && self.value.is_empty() {
            write!(f, "{}", self.kind)
        } else if self.bare {
            write!(f, "{}", self.value)
        } else {
            write!(f, "{}{ASSIGNMENT_SEPARATOR}{}", self.kind, self.value)
        }
    }
}

/// Outcome of parsing a single path level.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedLevel {
    pub fpsm: bool,
    pub qualifiers: Vec<Qualifier>,
    /// Tokens that were dropped, with the reason
    pub warnings: Vec<String>,
}

/// Remove a leading FPSM sentinel, if present.
pub fn strip_fpsm(level: &str) -> (bool, &str) {
    let trimmed = level.trim_start();
    match trimmed.get(..FPSM_SENTINEL.len()) {
        Some(head) if head.eq_ignore_ascii_case(FPSM_SENTINEL) => {
            (true, &trimmed[FPSM_SENTINEL.len()..])
        }
        _ => (false, level),
    }
}

/// Parse one path level into an ordered qualifier list.
pub fn parse_level(level: &str) -> ParsedLevel {
    let (fpsm, body) = strip_fpsm(level);
    let mut parsed = ParsedLevel {
        fpsm,
        ..Default::default()
    };

    for token in body.split(QUALIFIER_SEPARATOR) {
        if token.trim().is_empty() {
            continue;
        }
        match parse_token(token) {
            Ok(qualifier) => parsed.qualifiers.push(qualifier),
            Err(reason) => {
                warn!(level = %level, token = %token, "Dropping qualifier: {reason}");
                parsed.warnings.push(reason);
            }
        }
    }

    debug!(
        level = %level,
        fpsm = parsed.fpsm,
        qualifiers = parsed.qualifiers.len(),
        "Parsed recognition level"
    );
    parsed
}

fn parse_token(token: &str) -> std::result::Result<Qualifier, String> {
    match token.split_once(ASSIGNMENT_SEPARATOR) {
        Some((key, value)) => {
            let key = key.trim();
            QualifierKind::from_str(key)
                .map(|kind| Qualifier::new(kind, value))
                .map_err(|_| format!("unrecognized qualifier key '{key}'"))
        }
        None => parse_bare_keyword(token.trim()),
    }
}

fn parse_bare_keyword(word: &str) -> std::result::Result<Qualifier, String> {
    let kind = if word.to_ascii_lowercase().starts_with("current") {
        QualifierKind::Current
    } else {
        QualifierKind::from_str(word).map_err(|_| format!("unrecognized keyword '{word}'"))?
    };
    let value = if kind == QualifierKind::Current {
        word.to_string()
    } else {
        String::new()
    };
    Ok(Qualifier {
        kind,
        value,
        bare: true,
    })
}

/// A recognition string split into its path levels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognitionPath {
    levels: Vec<String>,
}

impl RecognitionPath {
    /// Split on the child separator. Empty levels are kept so callers can
    /// reject them with a useful message.
    pub fn split(path: &str) -> Self {
        Self {
            levels: path.split(CHILD_SEPARATOR).map(String::from).collect(),
        }
    }

    pub fn levels(&self) -> &[String] {
        &self.levels
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

impl Display for RecognitionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.levels.join(CHILD_SEPARATOR))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_type_and_caption() {
        let parsed = parse_level("Type=PushButton;Caption=OK");
        assert!(!parsed.fpsm);
        assert_eq!(
            parsed.qualifiers,
            vec![
                Qualifier::new(QualifierKind::Type, "PushButton"),
                Qualifier::new(QualifierKind::Caption, "OK"),
            ]
        );
        assert!(parsed.warnings.is_empty());
    }

    #[test]
    fn test_parse_fpsm_sentinel() {
        let parsed = parse_level(":FPSM:Type=EditBox;Index=2");
        assert!(parsed.fpsm);
        assert_eq!(parsed.qualifiers.len(), 2);
        assert_eq!(parsed.qualifiers[1], Qualifier::new(QualifierKind::Index, "2"));

        assert!(parse_level(":fpsm:Class=Foo").fpsm);
    }

    #[test]
    fn test_keys_are_case_insensitive() {
        let parsed = parse_level("TYPE=Button;namecontains=ok;absSubclassIndex=3");
        let kinds: Vec<_> = parsed.qualifiers.iter().map(|q| q.kind).collect();
        assert_eq!(
            kinds,
            vec![
                QualifierKind::Type,
                QualifierKind::NameContains,
                QualifierKind::AbsSubclassIndex
            ]
        );
    }

    #[test]
    fn test_unknown_key_is_dropped_not_fatal() {
        let parsed = parse_level("Colour=red;Class=Foo");
        assert_eq!(parsed.qualifiers, vec![Qualifier::new(QualifierKind::Class, "Foo")]);
        assert_eq!(parsed.warnings.len(), 1);
        assert!(parsed.warnings[0].contains("Colour"));
    }

    #[test]
    fn test_bare_keyword_current_window() {
        let parsed = parse_level("CurrentWindow");
        assert_eq!(parsed.qualifiers.len(), 1);
        assert_eq!(parsed.qualifiers[0].kind, QualifierKind::Current);
        assert_eq!(parsed.qualifiers[0].value, "CurrentWindow");
        assert_eq!(parsed.qualifiers[0].to_string(), "CurrentWindow");
    }

    #[test]
    fn test_value_keeps_embedded_separators() {
        let parsed = parse_level("Property=hint:a=b");
        let q = &parsed.qualifiers[0];
        assert_eq!(q.kind, QualifierKind::Property);
        assert_eq!(q.value, "hint:a=b");
        assert_eq!(q.property_parts(), Some(("hint", "a=b")));
    }

    #[test]
    fn test_split_path_levels() {
        let path = RecognitionPath::split("CurrentWindow;\\;:FPSM:Class=Foo");
        assert_eq!(path.levels(), &["CurrentWindow", ":FPSM:Class=Foo"]);
        assert_eq!(path.to_string(), "CurrentWindow;\\;:FPSM:Class=Foo");
    }

    #[test]
    fn test_every_kind_parses_from_its_display_name() {
        use strum::IntoEnumIterator;

        for kind in QualifierKind::iter() {
            let token = format!("{kind}=1");
            let parsed = parse_level(&token);
            assert_eq!(parsed.qualifiers[0].kind, kind, "failed for: {token}");
        }
    }

    #[test]
    fn test_parse_is_idempotent() {
        let level = ":FPSM:Type=Button;Name=ok;Index=2;Bogus=1";
        assert_eq!(parse_level(level), parse_level(level));
    }
}
