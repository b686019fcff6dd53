//! Resolve environment use case

use envshield_domain::environment::{ResolutionResult, VariableMap};
use tracing::{debug, info};

use crate::ports::{VariableSource, VariableSourceError};
use crate::variable_resolver::VariableResolver;

/// Errors that can occur when resolving an environment.
#[derive(Debug, thiserror::Error)]
pub enum ResolveEnvironmentError {
    /// The variable source does not exist.
    #[error("Variables not found: {0}")]
    NotFound(String),

    /// Failed to read the variable source.
    #[error("Failed to read variables: {0}")]
    IoError(String),

    /// Failed to parse the variable source.
    #[error("Failed to parse variables: {0}")]
    ParseError(String),
}

impl From<VariableSourceError> for ResolveEnvironmentError {
    fn from(error: VariableSourceError) -> Self {
        match error {
            VariableSourceError::NotFound(name) => Self::NotFound(name),
            VariableSourceError::Io(e) => Self::IoError(e.to_string()),
            VariableSourceError::Serialization(e) | VariableSourceError::Invalid(e) => {
                Self::ParseError(e)
            }
        }
    }
}

/// Output containing the raw variables and their resolution.
#[derive(Debug, Clone)]
pub struct ResolveEnvironmentOutput {
    /// The variables as loaded from the source.
    pub raw: VariableMap,

    /// The resolution outcome.
    pub result: ResolutionResult,
}

/// Loads the variables of an environment and resolves their references.
pub struct ResolveEnvironment<S> {
    source: S,
    resolver: VariableResolver,
}

impl<S: VariableSource> ResolveEnvironment<S> {
    /// Creates a new `ResolveEnvironment` use case with the default resolver.
    pub const fn new(source: S) -> Self {
        Self {
            source,
            resolver: VariableResolver::new(),
        }
    }

    /// Replaces the resolver configuration.
    #[must_use]
    pub const fn with_resolver(mut self, resolver: VariableResolver) -> Self {
        self.resolver = resolver;
        self
    }

    /// Loads the raw variables without resolving them.
    ///
    /// # Errors
    /// Returns an error if the variables cannot be loaded.
    pub async fn load_raw(&self) -> Result<VariableMap, ResolveEnvironmentError> {
        let raw = self.source.load().await?;
        debug!(
            source = %self.source.describe(),
            variables = raw.len(),
            "Loaded variables"
        );
        Ok(raw)
    }

    /// Executes the use case.
    ///
    /// # Errors
    /// Returns an error if the variables cannot be loaded. Resolution
    /// problems are reported inside the output, not as errors.
    pub async fn execute(&self) -> Result<ResolveEnvironmentOutput, ResolveEnvironmentError> {
        let raw = self.load_raw().await?;
        let result = self.resolver.resolve(&raw);

        info!(
            source = %self.source.describe(),
            variables = raw.len(),
            errors = result.errors.len(),
            warnings = result.warnings.len(),
            "Resolved variables"
        );

        Ok(ResolveEnvironmentOutput { raw, result })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use envshield_domain::environment::ResolutionErrorKind;
    use pretty_assertions::assert_eq;

    struct MockSource {
        variables: Option<VariableMap>,
    }

    impl MockSource {
        fn with(pairs: &[(&str, &str)]) -> Self {
            Self {
                variables: Some(
                    pairs
                        .iter()
                        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                        .collect(),
                ),
            }
        }

        const fn missing() -> Self {
            Self { variables: None }
        }
    }

    #[async_trait]
    impl VariableSource for MockSource {
        async fn load(&self) -> Result<VariableMap, VariableSourceError> {
            self.variables
                .clone()
                .ok_or_else(|| VariableSourceError::NotFound("mock".to_string()))
        }

        fn describe(&self) -> String {
            "mock".to_string()
        }
    }

    #[tokio::test]
    async fn test_resolve_environment_success() {
        let use_case = ResolveEnvironment::new(MockSource::with(&[
            ("HOST", "localhost"),
            ("URL", "http://${HOST}"),
        ]));

        let output = use_case.execute().await.expect("Should succeed");
        assert_eq!(output.raw["URL"], "http://${HOST}");
        assert_eq!(output.result.resolved["URL"], "http://localhost");
        assert!(output.result.is_clean());
    }

    #[tokio::test]
    async fn test_resolve_environment_reports_cycles_as_data() {
        let use_case = ResolveEnvironment::new(MockSource::with(&[("A", "${B}"), ("B", "${A}")]));

        let output = use_case.execute().await.expect("Should succeed");
        assert_eq!(output.result.resolved, output.raw);
        assert_eq!(
            output.result.errors[0].kind,
            ResolutionErrorKind::Circular
        );
    }

    #[tokio::test]
    async fn test_resolve_environment_uses_configured_resolver() {
        let use_case = ResolveEnvironment::new(MockSource::with(&[("A", "1"), ("B", "${A}")]))
            .with_resolver(VariableResolver::new().with_max_iterations(0));

        let output = use_case.execute().await.expect("Should succeed");
        assert_eq!(output.result.resolved["B"], "${A}");
        assert_eq!(output.result.warnings.len(), 2);
    }

    #[tokio::test]
    async fn test_resolve_environment_not_found() {
        let use_case = ResolveEnvironment::new(MockSource::missing());

        let result = use_case.execute().await;
        assert!(matches!(result, Err(ResolveEnvironmentError::NotFound(_))));
    }
}
