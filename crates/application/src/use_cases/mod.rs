//! Application use cases (business logic orchestration).

mod resolve_environment;

pub use resolve_environment::{
    ResolveEnvironment, ResolveEnvironmentError, ResolveEnvironmentOutput,
};
