//! Adapter implementations of application ports.

mod static_source;

pub use static_source::StaticVariableSource;
