//! Variable maps and key grammars

use indexmap::IndexMap;

use crate::error::{DomainError, DomainResult};

/// Raw variables of one environment, keyed by variable name.
///
/// Iteration follows insertion order. When a map is deserialized from JSON
/// that is the document order, so every diagnostic derived from a map is
/// stable across runs.
pub type VariableMap = IndexMap<String, String>;

/// Returns true if `name` matches `^[A-Za-z_][A-Za-z0-9_]*$`.
///
/// This is the grammar the resolution engine accepts for variable keys.
///
/// # Examples
///
/// ```
/// use envshield_domain::environment::is_valid_variable_name;
///
/// assert!(is_valid_variable_name("DATABASE_URL"));
/// assert!(is_valid_variable_name("_private"));
/// assert!(!is_valid_variable_name("1ST"));
/// ```
#[must_use]
pub fn is_valid_variable_name(name: &str) -> bool {
    let mut bytes = name.bytes();

    match bytes.next() {
        Some(first) if first.is_ascii_alphabetic() || first == b'_' => {}
        _ => return false,
    }

    bytes.all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

/// Returns true if `key` matches `^[A-Z0-9_]+$`.
///
/// Stricter rule applied when variables are imported or pushed: uppercase
/// only, but a leading digit is allowed.
#[must_use]
pub fn is_valid_import_key(key: &str) -> bool {
    !key.is_empty()
        && key
            .bytes()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit() || b == b'_')
}

/// Validates a variable name against [`is_valid_variable_name`].
///
/// # Errors
/// Returns `DomainError::InvalidVariableName` when the name does not match.
pub fn validate_variable_name(name: &str) -> DomainResult<()> {
    if is_valid_variable_name(name) {
        Ok(())
    } else {
        Err(DomainError::InvalidVariableName(name.to_string()))
    }
}
