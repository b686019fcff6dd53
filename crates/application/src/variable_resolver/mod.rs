//! Variable resolution module
//!
//! Provides parsing and resolution of `${KEY}` placeholders across the
//! variables of one environment.
//!
//! # Usage
//!
//! ```
//! use envshield_application::variable_resolver::VariableResolver;
//! use envshield_domain::environment::VariableMap;
//!
//! let mut vars = VariableMap::new();
//! vars.insert("USER".to_string(), "app".to_string());
//! vars.insert("HOST".to_string(), "db.internal".to_string());
//! vars.insert("DATABASE_URL".to_string(), "postgres://${USER}@${HOST}/main".to_string());
//!
//! let result = VariableResolver::new().resolve(&vars);
//! assert_eq!(result.resolved["DATABASE_URL"], "postgres://app@db.internal/main");
//! assert!(result.errors.is_empty());
//! ```

pub mod engine;
pub mod graph;
pub mod parser;

pub use engine::{
    DEFAULT_MAX_ITERATIONS, ValueResolution, VariableResolver, missing_reference_check,
    resolve_value, resolve_variables,
};
pub use graph::DependencyGraph;
pub use parser::{
    VariableReference, extract_references, get_referenced_variables, has_references,
    parse_references, validate_variable_names,
};
