//! Deterministic JSON serialization for variable maps and resolution output.
//!
//! - Keys keep the map's insertion order (`IndexMap` in domain types)
//! - 2-space indentation
//! - Trailing newline

mod json;

pub use json::*;
