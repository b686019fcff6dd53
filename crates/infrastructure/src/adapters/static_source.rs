//! In-memory variable source adapter

use async_trait::async_trait;
use envshield_application::ports::{VariableSource, VariableSourceError};
use envshield_domain::environment::VariableMap;

/// Variable source holding an already decrypted map in memory.
#[derive(Debug, Clone, Default)]
pub struct StaticVariableSource {
    variables: VariableMap,
}

impl StaticVariableSource {
    /// Creates a source serving `variables`.
    #[must_use]
    pub const fn new(variables: VariableMap) -> Self {
        Self { variables }
    }
}

impl FromIterator<(String, String)> for StaticVariableSource {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[async_trait]
impl VariableSource for StaticVariableSource {
    async fn load(&self) -> Result<VariableMap, VariableSourceError> {
        Ok(self.variables.clone())
    }

    fn describe(&self) -> String {
        "<memory>".to_string()
    }
}
