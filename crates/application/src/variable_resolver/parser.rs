//! Placeholder parser for `${KEY}` syntax
//!
//! Scans strings for placeholders with their positions. The scanner holds no
//! state between calls, so it is safe to call concurrently.

use std::ops::Range;

use envshield_domain::environment::{ResolutionError, VariableMap, is_valid_variable_name};

/// Represents a parsed placeholder in a string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableReference {
    /// The referenced key (without `${` `}`).
    pub name: String,

    /// Byte range in the original string where the placeholder appears.
    pub span: Range<usize>,
}

impl VariableReference {
    /// Creates a new variable reference.
    #[must_use]
    pub fn new(name: impl Into<String>, span: Range<usize>) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }
}

const fn is_key_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Parses a string and returns every placeholder, left to right.
///
/// A placeholder is `${`, one or more of `[A-Za-z0-9_]`, then `}`. Anything
/// else (unterminated, empty braces, whitespace or other characters inside)
/// is literal text.
///
/// # Examples
///
/// ```
/// use envshield_application::variable_resolver::parser::parse_references;
///
/// let refs = parse_references("postgres://${USER}@${HOST}/db");
/// assert_eq!(refs.len(), 2);
/// assert_eq!(refs[0].name, "USER");
/// assert_eq!(refs[1].name, "HOST");
/// ```
#[must_use]
pub fn parse_references(input: &str) -> Vec<VariableReference> {
    let bytes = input.as_bytes();
    let mut references = Vec::new();
    let mut i = 0;

    while i + 1 < bytes.len() {
        if bytes[i] != b'$' || bytes[i + 1] != b'{' {
            i += 1;
            continue;
        }

        let name_start = i + 2;
        let mut j = name_start;
        while j < bytes.len() && is_key_byte(bytes[j]) {
            j += 1;
        }

        if j > name_start && j < bytes.len() && bytes[j] == b'}' {
            // Key bytes are ASCII, so both ends sit on char boundaries.
            references.push(VariableReference::new(&input[name_start..j], i..j + 1));
            i = j + 1;
        } else {
            // Not a placeholder; a later `$` may still start one.
            i += 1;
        }
    }

    references
}

/// Returns the keys referenced by `value`, in order, duplicates preserved.
#[must_use]
pub fn extract_references(value: &str) -> Vec<String> {
    parse_references(value)
        .into_iter()
        .map(|r| r.name)
        .collect()
}

/// Returns true if `value` contains at least one placeholder.
#[must_use]
pub fn has_references(value: &str) -> bool {
    !parse_references(value).is_empty()
}

/// Returns the keys `value` depends on. Alias of [`extract_references`].
#[must_use]
pub fn get_referenced_variables(value: &str) -> Vec<String> {
    extract_references(value)
}

/// Reports one `Invalid` error per key that is not a valid variable name.
///
/// Resolution itself never runs this check; it is offered to callers that
/// accept new keys.
#[must_use]
pub fn validate_variable_names(variables: &VariableMap) -> Vec<ResolutionError> {
    variables
        .keys()
        .filter(|key| !is_valid_variable_name(key))
        .map(ResolutionError::invalid)
        .collect()
}
