//! Resolution outcome types
//!
//! Diagnostics produced while interpolating `${KEY}` placeholders are plain
//! data. Nothing here is an `Err`: callers always receive a best-effort map
//! alongside the errors and warnings.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::variable::VariableMap;

/// Warning emitted when resolution is aborted because of a cycle.
pub const ABORTED_WARNING: &str = "Resolution aborted due to circular dependencies";

/// Classification of a resolution error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolutionErrorKind {
    /// The variable participates in a reference cycle. Terminal.
    Circular,
    /// The variable references a key absent from the map.
    Missing,
    /// The variable key is malformed.
    Invalid,
}

impl fmt::Display for ResolutionErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Circular => "circular",
            Self::Missing => "missing",
            Self::Invalid => "invalid",
        };
        f.write_str(label)
    }
}

/// A diagnostic attributed to a single variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionError {
    /// Key the diagnostic is attributed to.
    pub variable: String,

    /// Human readable description.
    pub message: String,

    /// Error classification.
    #[serde(rename = "type")]
    pub kind: ResolutionErrorKind,
}

impl ResolutionError {
    /// Creates a `Circular` error for a cycle path such as `["A", "B", "A"]`.
    #[must_use]
    pub fn circular(variable: impl Into<String>, path: &[String]) -> Self {
        Self {
            variable: variable.into(),
            message: format!("Circular dependency: {}", path.join(" -> ")),
            kind: ResolutionErrorKind::Circular,
        }
    }

    /// Creates a `Missing` error for `variable` referencing `target`.
    #[must_use]
    pub fn missing(variable: impl Into<String>, target: &str) -> Self {
        Self {
            variable: variable.into(),
            message: format!("References undefined variable: {target}"),
            kind: ResolutionErrorKind::Missing,
        }
    }

    /// Creates an `Invalid` error for a malformed key.
    #[must_use]
    pub fn invalid(variable: impl Into<String>) -> Self {
        let variable = variable.into();
        Self {
            message: format!("Invalid variable name: {variable}"),
            variable,
            kind: ResolutionErrorKind::Invalid,
        }
    }
}

impl fmt::Display for ResolutionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.variable, self.message)
    }
}

/// Outcome of resolving one environment.
///
/// `resolved` always has exactly the key set of the input map. When
/// `errors` contains a `Circular` entry it is the unmodified input.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ResolutionResult {
    /// Best-effort substituted values.
    pub resolved: VariableMap,

    /// Errors in the order the stages produced them.
    pub errors: Vec<ResolutionError>,

    /// Informational warnings about incomplete substitution.
    pub warnings: Vec<String>,
}

impl ResolutionResult {
    /// Creates the result of an aborted resolution: input untouched.
    #[must_use]
    pub fn aborted(original: VariableMap, errors: Vec<ResolutionError>) -> Self {
        Self {
            resolved: original,
            errors,
            warnings: vec![ABORTED_WARNING.to_string()],
        }
    }

    /// Returns true if any error was reported.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Returns true if a cycle was detected.
    #[must_use]
    pub fn has_circular(&self) -> bool {
        self.errors
            .iter()
            .any(|e| e.kind == ResolutionErrorKind::Circular)
    }

    /// Returns true if there are neither errors nor warnings.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }

    /// Returns true if the resolved values may be injected into a process.
    ///
    /// Missing references keep their placeholders and are acceptable; a cycle
    /// means `resolved` is the raw input and must not be used.
    #[must_use]
    pub fn is_safe_to_inject(&self) -> bool {
        !self.has_circular()
    }

    /// Returns the errors of the given kind, in order.
    pub fn errors_of_kind(
        &self,
        kind: ResolutionErrorKind,
    ) -> impl Iterator<Item = &ResolutionError> {
        self.errors.iter().filter(move |e| e.kind == kind)
    }
}
