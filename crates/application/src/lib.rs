//! EnvShield Application - Variable resolution and use cases
//!
//! Hosts the variable resolution engine shared by every caller, plus the
//! ports and use cases that feed it raw variables.

pub mod error;
pub mod ports;
pub mod use_cases;
pub mod variable_resolver;

pub use error::{ApplicationError, ApplicationResult};
pub use variable_resolver::{
    DependencyGraph, VariableResolver, get_referenced_variables, has_references,
    resolve_variables,
};
pub use envshield_domain::environment::is_valid_variable_name;
