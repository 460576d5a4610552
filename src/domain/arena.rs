use std::collections::{HashMap, HashSet, VecDeque};

use generational_arena::{Arena, Index};
use tracing::instrument;

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::member::{Member, MemberId};

/// Arena-based member tree.
///
/// Members live in a generational arena and reference each other through
/// arena indices, so `manager` is a plain back-pointer and ownership runs
/// only through the arena. Every member stored here is reachable from
/// `root`; removing a member from the tree removes it from the arena.
#[derive(Debug, Clone)]
pub struct MemberArena {
    arena: Arena<Member>,
    /// Index of the root member, None for an empty tree
    root: Option<Index>,
    /// Id lookup for O(1) resolution of external ids
    ids: HashMap<MemberId, Index>,
}

impl Default for MemberArena {
    fn default() -> Self {
        Self::new()
    }
}

impl MemberArena {
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            root: None,
            ids: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    pub fn root(&self) -> Option<Index> {
        self.root
    }

    pub fn get(&self, idx: Index) -> Option<&Member> {
        self.arena.get(idx)
    }

    pub fn index_of(&self, id: MemberId) -> Option<Index> {
        self.ids.get(&id).copied()
    }

    /// Resolve an external id to its arena index.
    pub fn lookup(&self, id: MemberId) -> DomainResult<Index> {
        self.index_of(id).ok_or(DomainError::MemberNotFound(id))
    }

    pub fn member(&self, idx: Index) -> DomainResult<&Member> {
        self.arena
            .get(idx)
            .ok_or_else(|| DomainError::InvalidState(format!("dangling member index {:?}", idx)))
    }

    pub fn manager_of(&self, idx: Index) -> Option<Index> {
        self.arena.get(idx).and_then(|m| m.manager)
    }

    pub fn employees_of(&self, idx: Index) -> &[Index] {
        self.arena
            .get(idx)
            .map(|m| m.employees.as_slice())
            .unwrap_or(&[])
    }

    /// Insert a new member, either as the root (`manager == None`) or as a
    /// direct employee of `manager`.
    #[instrument(level = "trace", skip(self, member), fields(id = %member.id()))]
    pub fn insert(&mut self, member: Member, manager: Option<Index>) -> DomainResult<Index> {
        let id = member.id();
        if self.ids.contains_key(&id) {
            return Err(DomainError::InvalidArgument(format!(
                "member id '{}' is already in use",
                id
            )));
        }
        match manager {
            Some(manager_idx) => {
                self.member(manager_idx)?;
            }
            None if self.root.is_some() => {
                return Err(DomainError::InvalidState(
                    "the tree already has a root".to_string(),
                ));
            }
            None => {}
        }

        let idx = self.arena.insert(member);
        self.ids.insert(id, idx);
        match manager {
            Some(manager_idx) => self.link(manager_idx, idx),
            None => self.root = Some(idx),
        }
        Ok(idx)
    }

    /// Make `employee` a direct employee of `manager`.
    ///
    /// Fails with `InvalidOperation` for self-employment and for members that
    /// already report to someone else; moving a managed member is
    /// [`update_manager`](Self::update_manager)'s job.
    #[instrument(level = "trace", skip(self))]
    pub fn add_employee(&mut self, manager: Index, employee: Index) -> DomainResult<()> {
        if manager == employee {
            return Err(DomainError::InvalidOperation(
                "a member cannot be its own employee".to_string(),
            ));
        }
        self.member(manager)?;
        let current = self.member(employee)?.manager;
        match current {
            Some(m) if m == manager => Ok(()),
            Some(_) => Err(DomainError::InvalidOperation(
                "member already reports to another manager".to_string(),
            )),
            None if Some(employee) == self.root => Err(DomainError::InvalidOperation(
                "the root cannot become an employee".to_string(),
            )),
            None => {
                self.link(manager, employee);
                Ok(())
            }
        }
    }

    /// Remove `employee` from `manager`'s employee list.
    ///
    /// The employee's own manager link is left as is; callers keep the two
    /// directions consistent.
    #[instrument(level = "trace", skip(self))]
    pub fn remove_employee(&mut self, manager: Index, employee: Index) {
        if let Some(m) = self.arena.get_mut(manager) {
            m.employees.retain(|&e| e != employee);
        }
    }

    /// Move a member (with its whole subtree) under `new_manager`.
    ///
    /// `None` only detaches. Rejects moves that would put a member under
    /// itself or one of its own descendants; the tree is untouched on error.
    #[instrument(level = "trace", skip(self))]
    pub fn update_manager(&mut self, idx: Index, new_manager: Option<Index>) -> DomainResult<()> {
        self.member(idx)?;
        if let Some(target) = new_manager {
            self.member(target)?;
            if self.is_in_subtree(idx, target) {
                return Err(DomainError::InvalidOperation(
                    "a member cannot report to itself or to one of its descendants".to_string(),
                ));
            }
        }
        self.reparent(idx, new_manager);
        Ok(())
    }

    /// Detach a member and splice its direct employees under its former
    /// manager. The member stays in the arena as a childless, unattached node.
    #[instrument(level = "trace", skip(self))]
    pub fn splice_out(&mut self, idx: Index) -> DomainResult<()> {
        let grand = self.member(idx)?.manager;
        self.detach(idx);
        let employees = self.employees_of(idx).to_vec();
        for employee in employees {
            self.reparent(employee, grand);
        }
        Ok(())
    }

    /// Remove a member from the tree, promoting its direct employees to its
    /// former manager.
    ///
    /// Deleting the root abandons the whole tree: its employees have no
    /// manager to move to, so every member is dropped and the arena is empty
    /// afterwards.
    #[instrument(level = "debug", skip(self))]
    pub fn delete(&mut self, idx: Index) -> DomainResult<Member> {
        self.splice_out(idx)?;
        let removed = self
            .arena
            .remove(idx)
            .ok_or_else(|| DomainError::InvalidState(format!("dangling member index {:?}", idx)))?;
        self.ids.remove(&removed.id());
        if self.root == Some(idx) {
            self.clear();
        }
        Ok(removed)
    }

    /// Direct employees (not the full subtree) matching `predicate`.
    pub fn filter_employees<P>(&self, idx: Index, mut predicate: P) -> Vec<Index>
    where
        P: FnMut(&Member) -> bool,
    {
        self.employees_of(idx)
            .iter()
            .copied()
            .filter(|&e| self.arena.get(e).map(&mut predicate).unwrap_or(false))
            .collect()
    }

    /// True if `idx` is `ancestor` or lies below it.
    pub fn is_in_subtree(&self, ancestor: Index, idx: Index) -> bool {
        let mut current = Some(idx);
        while let Some(c) = current {
            if c == ancestor {
                return true;
            }
            current = self.manager_of(c);
        }
        false
    }

    /// Number of manager links between `idx` and the root (root is 0).
    pub fn depth_of(&self, idx: Index) -> usize {
        let mut depth = 0;
        let mut current = self.manager_of(idx);
        while let Some(c) = current {
            depth += 1;
            current = self.manager_of(c);
        }
        depth
    }

    /// Number of levels in the tree; 0 for an empty tree.
    #[instrument(level = "debug", skip(self))]
    pub fn height(&self) -> usize {
        let mut max_depth = 0;
        let mut queue = VecDeque::new();
        if let Some(root) = self.root {
            queue.push_back((root, 1));
        }
        while let Some((idx, depth)) = queue.pop_front() {
            max_depth = max_depth.max(depth);
            for &e in self.employees_of(idx) {
                queue.push_back((e, depth + 1));
            }
        }
        max_depth
    }

    pub fn clear(&mut self) {
        self.arena.clear();
        self.ids.clear();
        self.root = None;
    }

    /// Check the structural invariants: one root, mutually consistent
    /// manager/employee links, no duplicates, every stored member reachable.
    pub fn verify(&self) -> DomainResult<()> {
        let Some(root) = self.root else {
            return if self.arena.is_empty() {
                Ok(())
            } else {
                Err(DomainError::InvalidState(format!(
                    "{} members stored without a root",
                    self.arena.len()
                )))
            };
        };
        if self.member(root)?.manager.is_some() {
            return Err(DomainError::InvalidState("the root has a manager".to_string()));
        }

        let mut seen = HashSet::new();
        let mut queue = VecDeque::from([root]);
        while let Some(idx) = queue.pop_front() {
            if !seen.insert(idx) {
                return Err(DomainError::InvalidState(format!(
                    "member {} is reachable twice",
                    self.member(idx)?.id()
                )));
            }
            for &e in self.employees_of(idx) {
                let employee = self.member(e)?;
                if employee.manager != Some(idx) {
                    return Err(DomainError::InvalidState(format!(
                        "member {} is listed as an employee but reports elsewhere",
                        employee.id()
                    )));
                }
                queue.push_back(e);
            }
        }
        if seen.len() != self.arena.len() {
            return Err(DomainError::InvalidState(format!(
                "{} of {} members are unreachable from the root",
                self.arena.len() - seen.len(),
                self.arena.len()
            )));
        }
        for (id, &idx) in &self.ids {
            if self.arena.get(idx).map(|m| m.id()) != Some(*id) {
                return Err(DomainError::InvalidState(format!(
                    "id index out of sync for {}",
                    id
                )));
            }
        }
        Ok(())
    }

    /// Clear a member's manager link and drop it from the manager's
    /// employees. Its own employees stay with it.
    pub(crate) fn detach(&mut self, idx: Index) {
        if let Some(manager) = self.manager_of(idx) {
            self.remove_employee(manager, idx);
        }
        if let Some(m) = self.arena.get_mut(idx) {
            m.manager = None;
        }
    }

    /// Detach and attach in one step; both indices must be valid and the
    /// move must not create a cycle.
    pub(crate) fn reparent(&mut self, idx: Index, new_manager: Option<Index>) {
        self.detach(idx);
        if let Some(manager) = new_manager {
            self.link(manager, idx);
        }
    }

    /// Attach an unattached member under `manager`.
    pub(crate) fn link(&mut self, manager: Index, employee: Index) {
        if let Some(e) = self.arena.get_mut(employee) {
            e.manager = Some(manager);
        }
        if let Some(m) = self.arena.get_mut(manager) {
            if !m.employees.contains(&employee) {
                m.employees.push(employee);
            }
        }
    }
}
