//! Array literal parsing.
//!
//! Fields containing `[` hold Python-style list literals with single-quoted
//! strings. Two grammars exist:
//!
//! - flat: `['a', 'b', 'None']` -> tokens `a`, `b`
//! - sentence groups: `[['label', 'loc a', 'loc b'], ['None']]` -> one group
//!
//! Both are driven by the same [`Scanner`], whose whole state is the quote
//! flag and the bracket depth. Every token goes through [`clean`]; tokens
//! that clean to empty never produce an element.

use crate::models::{ArrayField, SentenceGroup};

use super::columns::Grammar;

/// Depth of the inner lists in the sentence grammar.
const GROUP_DEPTH: isize = 2;

/// Result of parsing one array field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrayParse {
    pub field: ArrayField,
    /// Tokens dropped because they cleaned to empty.
    pub suppressed: usize,
}

impl ArrayParse {
    fn empty() -> Self {
        Self {
            field: ArrayField::Empty,
            suppressed: 0,
        }
    }
}

/// Normalize one token: trim, strip one `[`/`]` pair, strip one `'` pair,
/// trim again, and collapse `None` (any case) to the empty string.
pub fn clean(token: &str) -> String {
    let value = token.trim();
    let value = value.strip_prefix('[').unwrap_or(value);
    let value = value.strip_suffix(']').unwrap_or(value);
    let value = value.strip_prefix('\'').unwrap_or(value);
    let value = value.strip_suffix('\'').unwrap_or(value);
    let value = value.trim();

    if value.eq_ignore_ascii_case("none") {
        String::new()
    } else {
        value.to_string()
    }
}

/// Text from the first `[` through the last `]`, if both exist in order.
pub fn extract_brackets(raw: &str) -> Option<&str> {
    let start = raw.find('[')?;
    let end = raw.rfind(']')?;
    if end <= start {
        return None;
    }
    Some(raw[start..=end].trim())
}

/// Parse a bracketed field with the given grammar.
pub fn parse_array(raw: &str, grammar: Grammar) -> ArrayParse {
    let content = match extract_brackets(raw) {
        Some(content) if content != "[]" => content,
        _ => return ArrayParse::empty(),
    };

    match grammar {
        Grammar::Flat => parse_flat(content),
        Grammar::SentenceGroups => parse_sentence_groups(content),
    }
}

// =============================================================================
// Scanner
// =============================================================================

/// Scanner state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanState {
    /// Inside a single-quoted span.
    pub quoted: bool,
    /// Unquoted `[` minus unquoted `]` seen so far.
    pub depth: isize,
}

/// What one input character meant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanEvent {
    /// A `'`; never part of a token.
    Quote,
    /// Unquoted `[`, depth after the transition.
    Open(isize),
    /// Unquoted `]`, depth before the transition.
    Close(isize),
    /// Unquoted `,`, at the current depth.
    Separator(isize),
    /// Token content, at the current depth.
    Text(char, isize),
}

/// Character-level state machine shared by both grammars.
#[derive(Debug, Clone, Default)]
pub struct Scanner {
    state: ScanState,
    /// When false, brackets are plain text.
    track_brackets: bool,
}

impl Scanner {
    /// Scanner for flat lists: only quotes and commas are structural.
    pub fn flat() -> Self {
        Self {
            state: ScanState::default(),
            track_brackets: false,
        }
    }

    /// Scanner for nested lists: unquoted brackets move the depth.
    pub fn nested() -> Self {
        Self {
            state: ScanState::default(),
            track_brackets: true,
        }
    }

    pub fn state(&self) -> ScanState {
        self.state
    }

    pub fn step(&mut self, c: char) -> ScanEvent {
        let ScanState { quoted, depth } = self.state;
        match c {
            '\'' => {
                self.state.quoted = !quoted;
                ScanEvent::Quote
            }
            '[' if self.track_brackets && !quoted => {
                self.state.depth = depth + 1;
                ScanEvent::Open(depth + 1)
            }
            ']' if self.track_brackets && !quoted => {
                self.state.depth = depth - 1;
                ScanEvent::Close(depth)
            }
            ',' if !quoted => ScanEvent::Separator(depth),
            _ => ScanEvent::Text(c, depth),
        }
    }
}

// =============================================================================
// Grammars
// =============================================================================

/// Accumulates cleaned tokens, counting the ones that collapse to empty.
#[derive(Default)]
struct TokenSink {
    token: String,
    tokens: Vec<String>,
    suppressed: usize,
}

impl TokenSink {
    fn flush(&mut self) {
        let value = clean(&self.token);
        self.token.clear();
        if value.is_empty() {
            self.suppressed += 1;
        } else {
            self.tokens.push(value);
        }
    }
}

fn parse_flat(content: &str) -> ArrayParse {
    let mut scanner = Scanner::flat();
    let mut sink = TokenSink::default();

    for c in content.chars() {
        match scanner.step(c) {
            ScanEvent::Quote => {}
            ScanEvent::Separator(_) => sink.flush(),
            ScanEvent::Text(c, _) => sink.token.push(c),
            // Brackets are text in flat mode
            ScanEvent::Open(_) | ScanEvent::Close(_) => {}
        }
    }
    sink.flush();

    ArrayParse {
        field: ArrayField::Flat(sink.tokens),
        suppressed: sink.suppressed,
    }
}

fn parse_sentence_groups(content: &str) -> ArrayParse {
    let mut scanner = Scanner::nested();
    let mut sink = TokenSink::default();
    let mut groups = Vec::new();

    for c in content.chars() {
        match scanner.step(c) {
            ScanEvent::Close(GROUP_DEPTH) => {
                sink.flush();
                if let Some(group) = SentenceGroup::from_tokens(std::mem::take(&mut sink.tokens)) {
                    groups.push(group);
                }
            }
            ScanEvent::Separator(GROUP_DEPTH) => sink.flush(),
            ScanEvent::Text(c, GROUP_DEPTH) => sink.token.push(c),
            _ => {}
        }
    }

    ArrayParse {
        field: ArrayField::Nested(groups),
        suppressed: sink.suppressed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat(raw: &str) -> ArrayField {
        parse_array(raw, Grammar::Flat).field
    }

    fn nested(raw: &str) -> ArrayField {
        parse_array(raw, Grammar::SentenceGroups).field
    }

    fn group(label: &str, localizations: &[&str]) -> SentenceGroup {
        SentenceGroup {
            label: label.to_string(),
            localizations: localizations.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_clean() {
        assert_eq!(clean("  'pleural effusion' "), "pleural effusion");
        assert_eq!(clean("['normal'"), "normal");
        assert_eq!(clean("'normal']"), "normal");
        assert_eq!(clean("' spaced '"), "spaced");
        assert_eq!(clean("None"), "");
        assert_eq!(clean("'NONE'"), "");
        assert_eq!(clean("none "), "");
        assert_eq!(clean("Nonexistent"), "Nonexistent");
        assert_eq!(clean("[[x]]"), "[x]");
    }

    #[test]
    fn test_extract_brackets() {
        assert_eq!(extract_brackets("xx['a'] yy"), Some("['a']"));
        assert_eq!(extract_brackets("[[1], [2]]"), Some("[[1], [2]]"));
        assert_eq!(extract_brackets("['open"), None);
        assert_eq!(extract_brackets("] backwards ["), None);
    }

    #[test]
    fn test_flat_drops_none_and_keeps_order() {
        let parse = parse_array("['a','b','None','c']", Grammar::Flat);
        assert_eq!(parse.field, ArrayField::Flat(vec!["a".into(), "b".into(), "c".into()]));
        assert_eq!(parse.suppressed, 1);
    }

    #[test]
    fn test_flat_quoted_commas_stay_in_token() {
        assert_eq!(
            flat("['loc left, basal', 'cardiomegaly']"),
            ArrayField::Flat(vec!["loc left, basal".into(), "cardiomegaly".into()])
        );
    }

    #[test]
    fn test_flat_unquoted_tokens() {
        assert_eq!(
            flat("[C0027051, C0018802]"),
            ArrayField::Flat(vec!["C0027051".into(), "C0018802".into()])
        );
    }

    #[test]
    fn test_flat_all_none_is_empty_list() {
        let parse = parse_array("['None', 'none', '']", Grammar::Flat);
        assert_eq!(parse.field, ArrayField::Flat(Vec::new()));
        assert_eq!(parse.suppressed, 3);
    }

    #[test]
    fn test_empty_literal() {
        assert_eq!(flat("[]"), ArrayField::Empty);
        assert_eq!(nested("[]"), ArrayField::Empty);
        assert_eq!(flat("  [] "), ArrayField::Empty);
        assert_eq!(flat("['unterminated"), ArrayField::Empty);
    }

    #[test]
    fn test_nested_groups() {
        assert_eq!(
            nested("[['cardiomegaly','loc right'], ['None']]"),
            ArrayField::Nested(vec![group("cardiomegaly", &["loc right"])])
        );
    }

    #[test]
    fn test_nested_multiple_localizations() {
        assert_eq!(
            nested("[['pleural effusion', 'loc left', 'loc basal'], ['normal'], ['scoliosis', 'None']]"),
            ArrayField::Nested(vec![
                group("pleural effusion", &["loc left", "loc basal"]),
                group("normal", &[]),
                group("scoliosis", &[]),
            ])
        );
    }

    #[test]
    fn test_nested_none_label_promotes_next_token() {
        assert_eq!(
            nested("[['None', 'loc apical']]"),
            ArrayField::Nested(vec![group("loc apical", &[])])
        );
    }

    #[test]
    fn test_nested_quoted_brackets_and_commas_are_text() {
        assert_eq!(
            nested("[['fracture [old], healed', 'loc rib']]"),
            ArrayField::Nested(vec![group("fracture [old], healed", &["loc rib"])])
        );
    }

    #[test]
    fn test_nested_counts_suppressed_tokens() {
        let parse = parse_array("[['None'], ['x', 'none']]", Grammar::SentenceGroups);
        assert_eq!(parse.field, ArrayField::Nested(vec![group("x", &[])]));
        assert_eq!(parse.suppressed, 2);
    }

    #[test]
    fn test_scanner_transitions() {
        let mut scanner = Scanner::nested();
        assert_eq!(scanner.step('['), ScanEvent::Open(1));
        assert_eq!(scanner.step('['), ScanEvent::Open(2));
        assert_eq!(scanner.step('\''), ScanEvent::Quote);
        assert!(scanner.state().quoted);
        assert_eq!(scanner.step(','), ScanEvent::Text(',', 2));
        assert_eq!(scanner.step(']'), ScanEvent::Text(']', 2));
        assert_eq!(scanner.step('\''), ScanEvent::Quote);
        assert_eq!(scanner.step(','), ScanEvent::Separator(2));
        assert_eq!(scanner.step(']'), ScanEvent::Close(2));
        assert_eq!(scanner.state(), ScanState { quoted: false, depth: 1 });

        let mut flat = Scanner::flat();
        assert_eq!(flat.step('['), ScanEvent::Text('[', 0));
        assert_eq!(flat.state().depth, 0);
    }
}
