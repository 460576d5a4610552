//! Traversal engine over a [`MemberArena`].
//!
//! Depth-first (stack) for lookups where any match will do, breadth-first
//! (queue) for level-by-level work such as queries and rebalancing.

use std::collections::VecDeque;

use generational_arena::Index;
use tracing::{instrument, trace};

use crate::domain::arena::MemberArena;
use crate::domain::member::Member;

/// Pre-order depth-first iterator, employees visited left to right.
pub struct DepthFirst<'a> {
    arena: &'a MemberArena,
    stack: Vec<Index>,
}

impl<'a> DepthFirst<'a> {
    fn new(arena: &'a MemberArena, start: Option<Index>) -> Self {
        Self {
            arena,
            stack: start.into_iter().collect(),
        }
    }
}

impl<'a> Iterator for DepthFirst<'a> {
    type Item = (Index, &'a Member);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current) = self.stack.pop() {
            if let Some(member) = self.arena.get(current) {
                // reverse so the first employee is popped first
                self.stack.extend(member.employees().iter().rev().copied());
                return Some((current, member));
            }
        }
        None
    }
}

/// Level-order iterator.
pub struct BreadthFirst<'a> {
    arena: &'a MemberArena,
    queue: VecDeque<Index>,
}

impl<'a> BreadthFirst<'a> {
    fn new(arena: &'a MemberArena, start: Option<Index>) -> Self {
        Self {
            arena,
            queue: start.into_iter().collect(),
        }
    }
}

impl<'a> Iterator for BreadthFirst<'a> {
    type Item = (Index, &'a Member);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current) = self.queue.pop_front() {
            if let Some(member) = self.arena.get(current) {
                self.queue.extend(member.employees().iter().copied());
                return Some((current, member));
            }
        }
        None
    }
}

impl MemberArena {
    pub fn iter(&self) -> DepthFirst<'_> {
        DepthFirst::new(self, self.root())
    }

    pub fn iter_breadth_first(&self) -> BreadthFirst<'_> {
        BreadthFirst::new(self, self.root())
    }

    /// Depth-first walk of the subtree rooted at `start`.
    pub fn iter_subtree(&self, start: Index) -> DepthFirst<'_> {
        DepthFirst::new(self, Some(start))
    }

    /// First member (depth-first) for which `predicate` holds.
    #[instrument(level = "trace", skip_all)]
    pub fn find<P>(&self, mut predicate: P) -> Option<Index>
    where
        P: FnMut(Index, &Member) -> bool,
    {
        self.iter()
            .find(|&(idx, member)| predicate(idx, member))
            .map(|(idx, _)| idx)
    }

    /// Every member for which `predicate` holds, in level order.
    #[instrument(level = "trace", skip_all)]
    pub fn filter<P>(&self, mut predicate: P) -> Vec<Index>
    where
        P: FnMut(Index, &Member) -> bool,
    {
        self.iter_breadth_first()
            .filter(|&(idx, member)| predicate(idx, member))
            .map(|(idx, _)| idx)
            .collect()
    }

    /// Breadth-first walk that lets `visit` restructure the tree as it goes.
    ///
    /// A member's employees are queued after `visit` returns, so the walk
    /// follows the live structure: members moved further down are reached
    /// again through their new manager. `max_visits` bounds the walk; the
    /// return value is the number of visits made.
    pub fn walk_breadth_first_mut<F>(&mut self, max_visits: usize, mut visit: F) -> usize
    where
        F: FnMut(&mut MemberArena, Index),
    {
        let mut queue: VecDeque<Index> = self.root().into_iter().collect();
        let mut visits = 0;
        while let Some(current) = queue.pop_front() {
            if visits == max_visits {
                trace!("walk_breadth_first_mut: visit budget of {} reached", max_visits);
                break;
            }
            if self.get(current).is_none() {
                continue;
            }
            visits += 1;
            visit(self, current);
            queue.extend(self.employees_of(current).iter().copied());
        }
        visits
    }
}
