//! Domain models for the CSV to XML conversion.
//!
//! - [`ImageElement`] - one `<image>` built from one CSV record
//! - [`FieldValue`] - a leaf scalar or a parsed array literal
//! - [`ArrayField`] - `Empty`, flat token list, or sentence groups
//! - [`SentenceGroup`] - a label with its localizations

use serde::{Deserialize, Serialize};

// =============================================================================
// Array literals
// =============================================================================

/// One inner list of a nested array literal.
///
/// The first surviving token is the label, the rest are localizations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentenceGroup {
    pub label: String,
    pub localizations: Vec<String>,
}

impl SentenceGroup {
    /// Build a group from cleaned tokens. Returns `None` when no token survived.
    pub fn from_tokens(mut tokens: Vec<String>) -> Option<Self> {
        if tokens.is_empty() {
            return None;
        }
        let label = tokens.remove(0);
        Some(Self {
            label,
            localizations: tokens,
        })
    }
}

/// Parsed content of a bracketed field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "items", rename_all = "lowercase")]
pub enum ArrayField {
    /// `[]`, or brackets that do not enclose anything.
    Empty,
    /// Flat list of cleaned, non-empty tokens.
    Flat(Vec<String>),
    /// List of lists, one group per non-empty inner list.
    Nested(Vec<SentenceGroup>),
}

impl ArrayField {
    /// Number of direct child elements this field produces.
    pub fn child_count(&self) -> usize {
        match self {
            ArrayField::Empty => 0,
            ArrayField::Flat(tokens) => tokens.len(),
            ArrayField::Nested(groups) => groups.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.child_count() == 0
    }
}

// =============================================================================
// Image elements
// =============================================================================

/// Value of one projected column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Scalar(String),
    Array(ArrayField),
}

/// A named child of `<image>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageField {
    pub name: String,
    pub value: FieldValue,
}

/// One `<image>` element. `identifier` becomes the `Identifiant` attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageElement {
    pub identifier: String,
    pub fields: Vec<ImageField>,
}

impl ImageElement {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            fields: Vec::new(),
        }
    }

    pub fn push(&mut self, name: impl Into<String>, value: FieldValue) {
        self.fields.push(ImageField {
            name: name.into(),
            value,
        });
    }
}
