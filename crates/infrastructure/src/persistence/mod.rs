//! File-backed adapters.

mod json_variable_source;

pub use json_variable_source::{JsonVariableSource, parse_variables_document};
