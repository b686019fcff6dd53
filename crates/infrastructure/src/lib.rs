//! EnvShield Infrastructure - Adapters and implementations
//!
//! This crate provides concrete implementations of the ports
//! defined in the application layer, plus process injection for the CLI.

pub mod adapters;
pub mod persistence;
pub mod process;
pub mod serialization;

pub use adapters::StaticVariableSource;
pub use persistence::{JsonVariableSource, parse_variables_document};
pub use process::{ProcessError, SIGNAL_EXIT_CODE, run_with_variables};
pub use serialization::{SerializationError, from_json, from_json_bytes, to_json_stable};
