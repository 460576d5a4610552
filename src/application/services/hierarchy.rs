//! Hierarchy store
//!
//! Owns the member tree and the email-uniqueness index, and exposes the
//! create / lookup / reparent / delete / demote / query / rebalance
//! operations against it.

use std::collections::HashSet;

use tracing::{debug, info, instrument};

use crate::application::ApplicationResult;
use crate::domain::{rebalance, DomainError, Member, MemberArena, MemberId, MemberQuery};

/// The current team structure.
///
/// Constructed explicitly and handed to whoever serves requests; there is
/// no global instance. Mutations go through `&mut self`, so sharing across
/// threads needs an outer lock (see `infrastructure::SharedHierarchy`).
#[derive(Debug, Default, Clone)]
pub struct HierarchyStore {
    tree: MemberArena,
    /// Emails of all members reachable from the root
    emails: HashSet<String>,
}

impl HierarchyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store around an already assembled tree.
    pub fn from_tree(tree: MemberArena) -> Self {
        let mut store = Self::new();
        store.set_root(tree);
        store
    }

    pub fn tree(&self) -> &MemberArena {
        &self.tree
    }

    pub fn len(&self) -> usize {
        self.tree.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Create a member under `manager_id`, under the root when no manager is
    /// given, or as the root of an empty tree.
    ///
    /// Email uniqueness is the caller's check (see `TeamService::create_member`).
    #[instrument(level = "debug", skip(self))]
    pub fn create_member(
        &mut self,
        name: &str,
        email: &str,
        manager_id: Option<MemberId>,
    ) -> ApplicationResult<&Member> {
        let manager = match manager_id {
            Some(id) => Some(self.tree.lookup(id)?),
            None => self.tree.root(),
        };
        let idx = self.tree.insert(Member::new(name, email), manager)?;
        self.emails.insert(email.to_string());
        let member = self.tree.member(idx)?;
        debug!("create_member: id={} root={}", member.id(), manager.is_none());
        Ok(member)
    }

    pub fn is_email_used(&self, email: &str) -> bool {
        self.emails.contains(email)
    }

    pub fn root(&self) -> Option<&Member> {
        self.tree.root().and_then(|idx| self.tree.get(idx))
    }

    /// Replace the whole tree and rebuild the email index from it.
    ///
    /// Callers validate the candidate first (see [`Self::check_emails`]).
    #[instrument(level = "debug", skip_all, fields(members = tree.len()))]
    pub fn set_root(&mut self, tree: MemberArena) {
        self.emails = tree.iter().map(|(_, m)| m.email.clone()).collect();
        self.tree = tree;
        info!("set_root: replaced team with {} members", self.tree.len());
    }

    pub fn get_member(&self, id: MemberId) -> ApplicationResult<&Member> {
        let idx = self.tree.lookup(id)?;
        Ok(self.tree.member(idx)?)
    }

    /// Remove a member; its direct employees move up to its former manager.
    /// Deleting the root empties the store.
    #[instrument(level = "debug", skip(self))]
    pub fn delete_member(&mut self, id: MemberId) -> ApplicationResult<Member> {
        let idx = self.tree.lookup(id)?;
        let removed = self.tree.delete(idx)?;
        if self.tree.root().is_none() {
            self.emails.clear();
        } else {
            self.emails.remove(&removed.email);
        }
        debug!("delete_member: removed {}", removed);
        Ok(removed)
    }

    /// Move a member, with its subtree, under another manager.
    #[instrument(level = "debug", skip(self))]
    pub fn update_manager(
        &mut self,
        id: MemberId,
        manager_id: MemberId,
    ) -> ApplicationResult<&Member> {
        let idx = self.tree.lookup(id)?;
        let manager = self.tree.lookup(manager_id)?;
        self.tree.update_manager(idx, Some(manager))?;
        Ok(self.tree.member(idx)?)
    }

    /// Demote = splice the member out (its employees move up to its former
    /// manager), then attach it as a leaf under `manager_id`.
    #[instrument(level = "debug", skip(self))]
    pub fn demote_manager(
        &mut self,
        id: MemberId,
        manager_id: MemberId,
    ) -> ApplicationResult<&Member> {
        let idx = self.tree.lookup(id)?;
        if self.tree.root() == Some(idx) {
            return Err(DomainError::InvalidOperation(
                "the top manager cannot be demoted".to_string(),
            )
            .into());
        }
        let manager = self.tree.lookup(manager_id)?;
        if manager == idx {
            return Err(DomainError::InvalidOperation(
                "a member cannot be demoted under itself".to_string(),
            )
            .into());
        }

        self.tree.splice_out(idx)?;
        // childless now, so any other member is a valid manager
        self.tree.update_manager(idx, Some(manager))?;
        Ok(self.tree.member(idx)?)
    }

    /// Members matching every set filter, in level order.
    pub fn get_members(&self, query: &MemberQuery) -> Vec<&Member> {
        self.tree
            .query(query)
            .into_iter()
            .filter_map(|idx| self.tree.get(idx))
            .collect()
    }

    pub fn find<P>(&self, mut predicate: P) -> Option<&Member>
    where
        P: FnMut(&Member) -> bool,
    {
        self.tree
            .find(|_, m| predicate(m))
            .and_then(|idx| self.tree.get(idx))
    }

    pub fn filter<P>(&self, mut predicate: P) -> Vec<&Member>
    where
        P: FnMut(&Member) -> bool,
    {
        self.tree
            .filter(|_, m| predicate(m))
            .into_iter()
            .filter_map(|idx| self.tree.get(idx))
            .collect()
    }

    /// True if no two members of `candidate` share an email.
    pub fn check_emails(candidate: &MemberArena) -> bool {
        let mut seen = HashSet::new();
        candidate.iter().all(|(_, m)| seen.insert(m.email.as_str()))
    }

    #[instrument(level = "debug", skip(self))]
    pub fn rebalance(&mut self, balance_index: i64) -> ApplicationResult<&Member> {
        let root = rebalance(&mut self.tree, balance_index)?;
        Ok(self.tree.member(root)?)
    }

    /// Check tree invariants plus agreement between the email index and the
    /// emails reachable from the root.
    pub fn verify(&self) -> ApplicationResult<()> {
        self.tree.verify()?;
        let reachable: HashSet<String> = self.tree.iter().map(|(_, m)| m.email.clone()).collect();
        if reachable != self.emails {
            return Err(DomainError::InvalidState(format!(
                "email index has {} entries, tree has {}",
                self.emails.len(),
                reachable.len()
            ))
            .into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_empty_store_when_creating_then_first_member_is_root() {
        let mut store = HierarchyStore::new();
        let id = store.create_member("Top Manager", "top@x.com", None).unwrap().id();
        assert_eq!(store.root().map(Member::id), Some(id));
        assert!(store.is_email_used("top@x.com"));
        store.verify().unwrap();
    }

    #[test]
    fn given_unknown_manager_when_creating_then_member_not_found() {
        let mut store = HierarchyStore::new();
        let ghost = MemberId::new();
        let err = store.create_member("A", "a@x.com", Some(ghost)).unwrap_err();
        assert_eq!(err.as_domain(), Some(&DomainError::MemberNotFound(ghost)));
        assert!(!store.is_email_used("a@x.com"));
    }

    #[test]
    fn given_root_when_demoting_then_invalid_operation() {
        let mut store = HierarchyStore::new();
        let root = store.create_member("Top", "top@x.com", None).unwrap().id();
        let a = store.create_member("A", "a@x.com", None).unwrap().id();
        let err = store.demote_manager(root, a).unwrap_err();
        assert!(matches!(err.as_domain(), Some(DomainError::InvalidOperation(_))));
        store.verify().unwrap();
    }

    #[test]
    fn given_candidate_with_duplicate_emails_then_check_fails() {
        let mut tree = MemberArena::new();
        let root = tree.insert(Member::new("A", "same@x.com"), None).unwrap();
        tree.insert(Member::new("B", "same@x.com"), Some(root)).unwrap();
        assert!(!HierarchyStore::check_emails(&tree));
    }
}
