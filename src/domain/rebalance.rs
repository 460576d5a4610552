//! Rebalancing: nudge every manager's direct-report count toward a target.
//!
//! One breadth-first pass over the live tree. For each visited member the
//! member's manager `g` is inspected:
//!
//! - overflow (`g` has more than `k` employees): employees past the first `k`
//!   are detached with their subtrees and handed out one level down, filling
//!   the kept siblings up to `k` each; leftovers go to the last kept sibling.
//! - underflow (`g` has fewer than `k`): grandchildren of `g` are promoted one
//!   level until `g` has `k` employees or no candidates remain.
//!
//! Each individual detach/attach moves a member one level. The walk follows the
//! live tree, so a member pushed down is visited again under its new manager
//! and may be pushed further in the same pass: net depth change per pass is
//! not bounded by one. The pass is a heuristic and may leave deeper branches
//! unbalanced; calling it again continues the work.

use generational_arena::Index;
use tracing::{debug, instrument, warn};

use crate::domain::arena::MemberArena;
use crate::domain::error::{DomainError, DomainResult};

/// Rebalance `arena` toward `balance_index` direct employees per manager and
/// return the (unchanged) root.
#[instrument(level = "debug", skip(arena), fields(members = arena.len()))]
pub fn rebalance(arena: &mut MemberArena, balance_index: i64) -> DomainResult<Index> {
    let root = arena
        .root()
        .ok_or_else(|| DomainError::InvalidState("the team structure is empty".to_string()))?;
    if balance_index < 1 {
        return Err(DomainError::InvalidArgument(
            "the balance index must be equal or greater than 1".to_string(),
        ));
    }
    let k = usize::try_from(balance_index)
        .map_err(|_| DomainError::InvalidArgument("the balance index is too large".to_string()))?;

    let budget = visit_budget(arena.len());
    let visits = arena.walk_breadth_first_mut(budget, |arena, member| {
        if let Some(manager) = arena.manager_of(member) {
            spread_overflow(arena, manager, k);
            promote_into(arena, manager, k);
        }
    });
    if visits == budget {
        warn!("rebalance: stopped after {} visits", visits);
    }
    debug!("rebalance: k={} visits={} height={}", k, visits, arena.height());
    Ok(root)
}

/// Revisits happen when members are pushed below a not yet visited sibling;
/// quadratic in the member count is far above what a pass needs.
fn visit_budget(members: usize) -> usize {
    members.saturating_mul(members).saturating_add(members).max(1)
}

fn spread_overflow(arena: &mut MemberArena, manager: Index, k: usize) {
    let employees = arena.employees_of(manager).to_vec();
    if employees.len() <= k {
        return;
    }
    let (kept, extra) = employees.split_at(k);
    let mut pool = extra.to_vec();
    for &member in &pool {
        arena.detach(member);
    }

    for &sibling in kept {
        while arena.employees_of(sibling).len() < k {
            match pool.pop() {
                Some(member) => arena.link(sibling, member),
                None => break,
            }
        }
    }
    if let Some(&last) = kept.last() {
        while let Some(member) = pool.pop() {
            arena.link(last, member);
        }
    }
}

fn promote_into(arena: &mut MemberArena, manager: Index, k: usize) {
    let size = arena.employees_of(manager).len();
    if size >= k {
        return;
    }
    let mut deficit = k - size;
    let siblings = arena.employees_of(manager).to_vec();
    'outer: for sibling in siblings {
        for grandchild in arena.employees_of(sibling).to_vec() {
            if deficit == 0 {
                break 'outer;
            }
            arena.reparent(grandchild, Some(manager));
            deficit -= 1;
        }
    }
}
