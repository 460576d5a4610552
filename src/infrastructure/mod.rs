//! Infrastructure layer: I/O implementations, shared state and DI container
//!
//! This layer implements I/O boundary traits and wires up services.

pub mod di;
pub mod error;
pub mod shared;
pub mod traits;

pub use error::{InfraError, InfraResult};
pub use shared::SharedHierarchy;
