//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on I/O boundary traits (FileSystem) but are themselves
//! concrete structs, not traits.

mod hierarchy;
mod team;

pub use hierarchy::HierarchyStore;
pub use team::{TeamService, DEFAULT_MAX_IMPORT_BYTES};
