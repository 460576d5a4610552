//! Member queries: case-insensitive substring filters, ANDed together.

use generational_arena::Index;

use crate::domain::arena::MemberArena;
use crate::domain::member::Member;

/// Filters for [`MemberArena::query`]. Empty strings count as "not set".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemberQuery {
    pub name: Option<String>,
    pub email: Option<String>,
    /// Matches against the member's manager; members without a manager never match
    pub manager_email: Option<String>,
    /// Matches if at least one direct employee's email contains the needle
    pub employee_email: Option<String>,
}

impl MemberQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, needle: impl Into<String>) -> Self {
        self.name = Some(needle.into());
        self
    }

    pub fn email(mut self, needle: impl Into<String>) -> Self {
        self.email = Some(needle.into());
        self
    }

    pub fn manager_email(mut self, needle: impl Into<String>) -> Self {
        self.manager_email = Some(needle.into());
        self
    }

    pub fn employee_email(mut self, needle: impl Into<String>) -> Self {
        self.employee_email = Some(needle.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        [
            &self.name,
            &self.email,
            &self.manager_email,
            &self.employee_email,
        ]
        .iter()
        .all(|f| needle(f).is_none())
    }

    /// Evaluate the query against one member of `arena`.
    pub fn matches(&self, arena: &MemberArena, idx: Index, member: &Member) -> bool {
        if let Some(n) = needle(&self.name) {
            if !contains_ci(&member.name, &n) {
                return false;
            }
        }
        if let Some(n) = needle(&self.email) {
            if !contains_ci(&member.email, &n) {
                return false;
            }
        }
        if let Some(n) = needle(&self.manager_email) {
            let manager_matches = member
                .manager()
                .and_then(|m| arena.get(m))
                .map(|m| contains_ci(&m.email, &n))
                .unwrap_or(false);
            if !manager_matches {
                return false;
            }
        }
        if let Some(n) = needle(&self.employee_email) {
            if arena
                .filter_employees(idx, |e| contains_ci(&e.email, &n))
                .is_empty()
            {
                return false;
            }
        }
        true
    }
}

impl MemberArena {
    /// All members matching `query`, in level order.
    pub fn query(&self, query: &MemberQuery) -> Vec<Index> {
        self.filter(|idx, member| query.matches(self, idx, member))
    }
}

fn needle(field: &Option<String>) -> Option<String> {
    field
        .as_deref()
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase)
}

fn contains_ci(haystack: &str, lowered_needle: &str) -> bool {
    haystack.to_lowercase().contains(lowered_needle)
}
