//! Infrastructure layer: configuration and the in-memory user registry

pub mod config;
pub mod registry;

pub use config::EngineConfig;
pub use registry::{UserHandle, UserRegistry};
