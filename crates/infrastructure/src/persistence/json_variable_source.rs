//! JSON variable source.
//!
//! Reads the raw variables of one environment from a JSON document, either
//! a file or standard input. Two shapes are accepted:
//!
//! ```text
//! { "DATABASE_URL": "postgres://${HOST}/db", "HOST": "localhost" }
//!
//! { "variables": [ { "key": "HOST", "value": "localhost", "description": "..." } ] }
//! ```
//!
//! The first is the flat map exchanged between server and CLI; the second is
//! the pull payload. Pull entries with an empty key or value are skipped.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use envshield_application::ports::{VariableSource, VariableSourceError};
use envshield_domain::environment::VariableMap;
use serde::Deserialize;
use tokio::io::AsyncReadExt;
use tracing::debug;

use crate::serialization::from_json_bytes;

#[derive(Debug, Deserialize)]
struct PulledVariable {
    key: String,
    #[serde(default)]
    value: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum VariablesDocument {
    Pull { variables: Vec<PulledVariable> },
    Flat(VariableMap),
}

/// Parses a variables document in either accepted shape.
///
/// # Errors
/// Returns `VariableSourceError::Serialization` for malformed JSON and
/// `VariableSourceError::Invalid` for JSON of the wrong shape, such as
/// non-string values.
pub fn parse_variables_document(bytes: &[u8]) -> Result<VariableMap, VariableSourceError> {
    // Syntax errors get their own message before shape matching.
    let value: serde_json::Value = from_json_bytes(bytes)
        .map_err(|e| VariableSourceError::Serialization(e.to_string()))?;

    let document: VariablesDocument = serde_json::from_value(value).map_err(|_| {
        VariableSourceError::Invalid(
            "expected an object of string values or a {\"variables\": [...]} payload".to_string(),
        )
    })?;

    Ok(match document {
        VariablesDocument::Flat(map) => map,
        VariablesDocument::Pull { variables } => variables
            .into_iter()
            .filter_map(|v| match v.value {
                Some(value) if !v.key.is_empty() && !value.is_empty() => Some((v.key, value)),
                _ => None,
            })
            .collect(),
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Location {
    File(PathBuf),
    Stdin,
}

/// Variable source backed by a JSON document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonVariableSource {
    location: Location,
}

impl JsonVariableSource {
    /// Creates a source reading the file at `path`.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self {
            location: Location::File(path.into()),
        }
    }

    /// Creates a source reading standard input.
    #[must_use]
    pub const fn stdin() -> Self {
        Self {
            location: Location::Stdin,
        }
    }

    /// Creates a source from a command-line argument, where `-` means stdin.
    #[must_use]
    pub fn from_arg(arg: &Path) -> Self {
        if arg.as_os_str() == "-" {
            Self::stdin()
        } else {
            Self::from_path(arg)
        }
    }

    async fn read_bytes(&self) -> Result<Vec<u8>, VariableSourceError> {
        match &self.location {
            Location::File(path) => tokio::fs::read(path).await.map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    VariableSourceError::NotFound(path.display().to_string())
                } else {
                    VariableSourceError::Io(e)
                }
            }),
            Location::Stdin => {
                let mut buffer = Vec::new();
                tokio::io::stdin().read_to_end(&mut buffer).await?;
                Ok(buffer)
            }
        }
    }
}

#[async_trait]
impl VariableSource for JsonVariableSource {
    async fn load(&self) -> Result<VariableMap, VariableSourceError> {
        let bytes = self.read_bytes().await?;
        let variables = parse_variables_document(&bytes)?;
        debug!(source = %self.describe(), variables = variables.len(), "Parsed variables document");
        Ok(variables)
    }

    fn describe(&self) -> String {
        match &self.location {
            Location::File(path) => path.display().to_string(),
            Location::Stdin => "<stdin>".to_string(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn keys(map: &VariableMap) -> Vec<&str> {
        map.keys().map(String::as_str).collect()
    }

    #[test]
    fn test_parse_flat_map() {
        let map = parse_variables_document(br#"{"URL": "${HOST}/x", "HOST": "h", "EMPTY": ""}"#)
            .expect("should parse");
        assert_eq!(keys(&map), vec!["URL", "HOST", "EMPTY"]);
        assert_eq!(map["URL"], "${HOST}/x");
    }

    #[test]
    fn test_parse_pull_payload() {
        let json = br#"{"variables": [
            {"key": "HOST", "value": "h", "description": "database host"},
            {"key": "EMPTY", "value": ""},
            {"key": "", "value": "orphan"},
            {"key": "NULL", "value": null},
            {"key": "URL", "value": "${HOST}"}
        ]}"#;

        let map = parse_variables_document(json).expect("should parse");
        assert_eq!(keys(&map), vec!["HOST", "URL"]);
    }

    #[test]
    fn test_parse_rejects_non_string_values() {
        let result = parse_variables_document(br#"{"PORT": 5432}"#);
        assert!(matches!(result, Err(VariableSourceError::Invalid(_))));
    }

    #[test]
    fn test_parse_rejects_malformed_json() {
        let result = parse_variables_document(br#"{"PORT": "#);
        assert!(matches!(result, Err(VariableSourceError::Serialization(_))));
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("vars.json");
        std::fs::write(&path, r#"{"A": "1", "B": "${A}"}"#).expect("write");

        let source = JsonVariableSource::from_path(&path);
        let map = source.load().await.expect("should load");
        assert_eq!(keys(&map), vec!["A", "B"]);
        assert_eq!(source.describe(), path.display().to_string());
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let dir = TempDir::new().expect("temp dir");
        let source = JsonVariableSource::from_path(dir.path().join("absent.json"));

        let result = source.load().await;
        assert!(matches!(result, Err(VariableSourceError::NotFound(_))));
    }

    #[test]
    fn test_from_arg_dash_is_stdin() {
        assert_eq!(JsonVariableSource::from_arg(Path::new("-")), JsonVariableSource::stdin());
        assert_eq!(JsonVariableSource::stdin().describe(), "<stdin>");
        assert_eq!(
            JsonVariableSource::from_arg(Path::new("vars.json")),
            JsonVariableSource::from_path("vars.json")
        );
    }
}
