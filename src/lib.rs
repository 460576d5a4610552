//! teamtree: an in-memory organisational hierarchy.
//!
//! Members form a single-rooted tree held in a generational arena. The
//! [`application::services::HierarchyStore`] exposes create, reparent,
//! delete, demote, query and rebalance operations on it;
//! [`application::services::TeamService`] moves whole teams in and out as
//! nested JSON.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod tree_traits;
pub mod util;
