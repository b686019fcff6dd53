//! Environment variable domain types

mod resolution;
mod variable;

pub use resolution::{ABORTED_WARNING, ResolutionError, ResolutionErrorKind, ResolutionResult};
pub use variable::{
    VariableMap, is_valid_import_key, is_valid_variable_name, validate_variable_name,
};
