//! User-friendly signature error types and formatting.
//!
//! Converts raw pest parser errors into structured, human-readable diagnostics
//! with source context, a column indicator, and an actionable hint.

use std::fmt;

use super::parse::Rule;

/// A structured signature error.
///
/// Produced either from a raw `pest::error::Error` (syntax) or from the
/// semantic checks that run on an already parsed parameter list.
#[derive(Debug, Clone, PartialEq)]
pub struct SignatureError {
    /// Human-readable error message (no raw rule names).
    pub message: String,
    /// Line number (1-indexed) for syntax errors.
    pub line: Option<usize>,
    /// Column number (1-indexed) where the error begins.
    pub col: Option<usize>,
    /// End column for span errors (used to size the underline caret).
    pub col_end: Option<usize>,
    /// The full text of the offending source line.
    pub source_line: Option<String>,
    /// Optional suggestion to help the user fix the error.
    pub hint: Option<String>,
}

impl SignatureError {
    /// An error found after parsing, with no source position.
    pub fn semantic(message: impl Into<String>) -> Self {
        SignatureError {
            message: message.into(),
            line: None,
            col: None,
            col_end: None,
            source_line: None,
            hint: None,
        }
    }

    /// Build a `SignatureError` from a pest error, enriching it with source context.
    pub fn from_pest(error: &pest::error::Error<Rule>, source: &str) -> Self {
        let (line, col, col_end) = match error.line_col {
            pest::error::LineColLocation::Pos((l, c)) => (l, c, None),
            pest::error::LineColLocation::Span((sl, sc), (el, ec)) => {
                let end = if sl == el { Some(ec) } else { None };
                (sl, sc, end)
            }
        };

        let source_line = source
            .lines()
            .nth(line.saturating_sub(1))
            .map(str::to_string);

        let (message, hint) = match &error.variant {
            pest::error::ErrorVariant::ParsingError { positives, .. } => {
                (friendly_message(positives), friendly_hint(positives))
            }
            pest::error::ErrorVariant::CustomError { message } => (message.clone(), None),
        };

        SignatureError {
            message,
            line: Some(line),
            col: Some(col),
            col_end,
            source_line,
            hint,
        }
    }
}

/// Return a short, user-facing label for a grammar rule, or `None` to omit it.
fn rule_label(rule: Rule) -> Option<&'static str> {
    match rule {
        Rule::identifier => Some("parameter name"),
        Rule::regular_param => Some("parameter"),
        Rule::var_positional => Some("`*name` (variadic parameter)"),
        Rule::var_keyword => Some("`**name` (keyword catch-all)"),
        Rule::kwonly_marker => Some("`*`"),
        Rule::annotation => Some("type annotation (`: type`)"),
        Rule::param_default => Some("default value (`= value`)"),
        Rule::type_expr | Rule::type_term => Some("type"),
        Rule::type_args => Some("type arguments (`[...]`)"),
        Rule::literal | Rule::list_literal => Some("literal value"),
        Rule::string => Some("quoted string"),
        Rule::integer | Rule::float => Some("number"),
        // EOI and all silent/atomic helpers are suppressed.
        _ => None,
    }
}

/// Compose a human-readable message from the expected rule set.
fn friendly_message(positives: &[Rule]) -> String {
    let mut named: Vec<&str> = positives.iter().copied().filter_map(rule_label).collect();
    named.dedup();

    match named.as_slice() {
        [] => "unexpected token".to_string(),
        [single] => format!("expected {single}"),
        [a, b] => format!("expected {a} or {b}"),
        many => match many.split_last() {
            Some((last, rest)) => format!("expected {} or {}", rest.join(", "), last),
            None => "unexpected token".to_string(),
        },
    }
}

/// Return an actionable hint based on the set of expected rules.
fn friendly_hint(positives: &[Rule]) -> Option<String> {
    let has = |r: Rule| positives.contains(&r);

    if has(Rule::type_expr) || has(Rule::type_term) {
        return Some(
            "Types look like `int`, `list[str]`, `Literal['a', 'b']` or `str | None`.".to_string(),
        );
    }

    if has(Rule::literal) {
        return Some(
            "Defaults are literals: numbers, quoted strings, True/False, None or `[...]` lists."
                .to_string(),
        );
    }

    if has(Rule::identifier) || has(Rule::regular_param) {
        return Some(
            "Parameters look like `name`, `name: type = default`, `*rest` or `**extra`. \
             Separate parameters with commas."
                .to_string(),
        );
    }

    None
}

/// Format the caret underline for an error at `col` with optional `col_end`.
fn underline(col: usize, col_end: Option<usize>) -> String {
    let start = col.saturating_sub(1);
    let len = col_end.map_or(1, |end| end.saturating_sub(col).max(1));
    format!("{}{}", " ".repeat(start), "^".repeat(len))
}

impl fmt::Display for SignatureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;

        if let (Some(line), Some(col)) = (self.line, self.col) {
            write!(f, " at {line}:{col}")?;
        }

        if let (Some(src), Some(col)) = (&self.source_line, self.col) {
            writeln!(f)?;
            writeln!(f, "   | {src}")?;
            write!(f, "   | {}", underline(col, self.col_end))?;
        }

        if let Some(ref hint) = self.hint {
            writeln!(f)?;
            write!(f, "   = hint: {hint}")?;
        }

        Ok(())
    }
}

impl std::error::Error for SignatureError {}
