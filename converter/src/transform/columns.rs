//! Per-column output rules.
//!
//! A lookup table decides, for each header name, which array grammar applies
//! and how the per-token child elements are named. Columns not in the table
//! parse as flat lists with `<ColumnName>Item` children.

use std::borrow::Cow;
use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Element wrapping the first token of a sentence group.
pub const LABEL_TAG: &str = "Label";

/// Element wrapping each remaining token of a sentence group.
pub const LOCALIZATION_TAG: &str = "Localization";

/// The one PadChest column holding lists of lists.
pub const SENTENCE_COLUMN: &str = "LabelsLocalizationsBySentence";

static XML_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9._-]*$").expect("valid XML name pattern"));

/// Which array literal grammar a column uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Grammar {
    /// `['a', 'b']`
    Flat,
    /// `[['label', 'loc', ...], ...]`, one sentence group per inner list
    SentenceGroups,
}

/// Output rule for one column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnRule {
    pub child_tag: String,
    pub grammar: Grammar,
}

/// Column name to [`ColumnRule`] table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnSchema {
    rules: HashMap<String, ColumnRule>,
}

impl ColumnSchema {
    /// Schema with no explicit rules; every column falls back.
    pub fn new() -> Self {
        Self::default()
    }

    /// Naming and grammar used by the PadChest export.
    pub fn padchest() -> Self {
        Self::new()
            .with_rule("Labels", "Label", Grammar::Flat)
            .with_rule("Localizations", "Localization", Grammar::Flat)
            .with_rule(SENTENCE_COLUMN, "Sentence", Grammar::SentenceGroups)
            .with_rule("labelCUIS", "labelCUI", Grammar::Flat)
            .with_rule("LocalizationsCUIS", "LocalizationsCUI", Grammar::Flat)
    }

    pub fn with_rule(
        mut self,
        column: impl Into<String>,
        child_tag: impl Into<String>,
        grammar: Grammar,
    ) -> Self {
        self.rules.insert(
            column.into(),
            ColumnRule {
                child_tag: child_tag.into(),
                grammar,
            },
        );
        self
    }

    pub fn rule(&self, column: &str) -> Option<&ColumnRule> {
        self.rules.get(column)
    }

    /// Child element name for each token (or group) of `column`.
    pub fn child_tag<'a>(&'a self, column: &str) -> Cow<'a, str> {
        match self.rules.get(column) {
            Some(rule) => Cow::Borrowed(rule.child_tag.as_str()),
            None => Cow::Owned(format!("{}Item", column)),
        }
    }

    pub fn grammar(&self, column: &str) -> Grammar {
        self.rules
            .get(column)
            .map(|rule| rule.grammar)
            .unwrap_or(Grammar::Flat)
    }
}

/// Whether `name` can be used verbatim as an element name.
pub fn is_xml_name(name: &str) -> bool {
    XML_NAME.is_match(name) && !name.to_ascii_lowercase().starts_with("xml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_padchest_child_tags() {
        let schema = ColumnSchema::padchest();
        assert_eq!(schema.child_tag("Labels"), "Label");
        assert_eq!(schema.child_tag("Localizations"), "Localization");
        assert_eq!(schema.child_tag(SENTENCE_COLUMN), "Sentence");
        assert_eq!(schema.child_tag("labelCUIS"), "labelCUI");
        assert_eq!(schema.child_tag("LocalizationsCUIS"), "LocalizationsCUI");
    }

    #[test]
    fn test_unlisted_column_fallback() {
        let schema = ColumnSchema::padchest();
        assert_eq!(schema.child_tag("Projection"), "ProjectionItem");
        assert_eq!(schema.grammar("Projection"), Grammar::Flat);
        assert!(schema.rule("Projection").is_none());
    }

    #[test]
    fn test_only_sentence_column_is_nested() {
        let schema = ColumnSchema::padchest();
        assert_eq!(schema.grammar(SENTENCE_COLUMN), Grammar::SentenceGroups);
        for column in ["Labels", "Localizations", "labelCUIS", "LocalizationsCUIS", "Report"] {
            assert_eq!(schema.grammar(column), Grammar::Flat, "{column}");
        }
    }

    #[test]
    fn test_custom_rule() {
        let schema = ColumnSchema::new().with_rule("Findings", "Finding", Grammar::SentenceGroups);
        assert_eq!(schema.grammar("Findings"), Grammar::SentenceGroups);
        assert_eq!(schema.child_tag("Findings"), "Finding");
        assert_eq!(schema.grammar("Labels"), Grammar::Flat);
        assert_eq!(schema.child_tag("Labels"), "LabelsItem");
    }

    #[test]
    fn test_xml_names() {
        assert!(is_xml_name("PatientSex_DICOM"));
        assert!(is_xml_name("labelCUIS"));
        assert!(!is_xml_name("Patient Sex"));
        assert!(!is_xml_name("9lives"));
        assert!(!is_xml_name(""));
        assert!(!is_xml_name("xmlThing"));
    }
}
