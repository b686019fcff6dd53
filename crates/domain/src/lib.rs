//! EnvShield Domain - Core types
//!
//! This crate defines the data model shared by every caller of the
//! variable resolution engine. All types here are pure Rust with no I/O.

pub mod environment;
pub mod error;

pub use environment::{
    ResolutionError, ResolutionErrorKind, ResolutionResult, VariableMap, is_valid_import_key,
    is_valid_variable_name,
};
pub use error::{DomainError, DomainResult};
