//! Domain layer: the member tree and its algorithms
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod arena;
pub mod error;
pub mod member;
pub mod query;
pub mod rebalance;
pub mod traversal;

pub use arena::MemberArena;
pub use error::{DomainError, DomainResult};
pub use member::{Member, MemberId};
pub use query::MemberQuery;
pub use rebalance::rebalance;
pub use traversal::{BreadthFirst, DepthFirst};

/// Expand `~` and environment variables in a path-like string.
pub fn expand_env_vars(path: &str) -> String {
    shellexpand::full(path)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| path.to_string())
}
