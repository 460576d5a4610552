//! Nested wire record for import/export: `{id, name, email, employees?}`.

use std::collections::HashMap;

use generational_arena::Index;
use serde::{Deserialize, Serialize};

use crate::domain::MemberArena;

/// A member and, recursively, its employees.
///
/// Every field is optional on the way in so that missing values surface as
/// validation messages rather than parse errors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub employees: Vec<MemberRecord>,
}

impl MemberRecord {
    /// Snapshot the subtree at `idx`; `None` if the index is stale.
    ///
    /// Built bottom-up from a reversed pre-order walk, so chains of any
    /// length snapshot without recursion.
    pub fn from_arena(arena: &MemberArena, idx: Index) -> Option<Self> {
        let order: Vec<_> = arena.iter_subtree(idx).collect();
        let mut built: HashMap<Index, MemberRecord> = HashMap::with_capacity(order.len());
        for (current, member) in order.into_iter().rev() {
            let employees = member
                .employees()
                .iter()
                .filter_map(|e| built.remove(e))
                .collect();
            built.insert(
                current,
                Self {
                    id: Some(member.id().to_string()),
                    name: Some(member.name.clone()),
                    email: Some(member.email.clone()),
                    employees,
                },
            );
        }
        built.remove(&idx)
    }

    /// Snapshot the whole tree; `None` when it is empty.
    pub fn from_tree(arena: &MemberArena) -> Option<Self> {
        arena.root().and_then(|root| Self::from_arena(arena, root))
    }

    /// Number of records in this subtree.
    pub fn count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(record) = stack.pop() {
            count += 1;
            stack.extend(record.employees.iter());
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Member;

    #[test]
    fn given_leaf_when_serializing_then_employees_omitted() {
        let record = MemberRecord {
            name: Some("A".to_string()),
            email: Some("a@x.com".to_string()),
            ..Default::default()
        };
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"name":"A","email":"a@x.com"}"#);
    }

    #[test]
    fn given_partial_json_when_deserializing_then_missing_fields_are_none() {
        let record: MemberRecord = serde_json::from_str(r#"{"email":"a@x.com"}"#).unwrap();
        assert!(record.name.is_none());
        assert!(record.id.is_none());
        assert!(record.employees.is_empty());
    }

    #[test]
    fn given_tree_when_snapshotting_then_nested_with_ids() {
        let mut arena = MemberArena::new();
        let root = arena.insert(Member::new("Top", "top@x.com"), None).unwrap();
        arena.insert(Member::new("Sub", "sub@x.com"), Some(root)).unwrap();

        let record = MemberRecord::from_tree(&arena).unwrap();
        assert_eq!(record.count(), 2);
        assert_eq!(record.employees[0].name.as_deref(), Some("Sub"));
        let root_id = arena.get(root).unwrap().id().to_string();
        assert_eq!(record.id, Some(root_id));
    }

    #[test]
    fn given_long_chain_when_snapshotting_then_every_level_present() {
        let mut arena = MemberArena::new();
        let mut manager = None;
        for i in 0..2_000 {
            let member = Member::new(format!("m{i}"), format!("m{i}@x.com"));
            manager = Some(arena.insert(member, manager).unwrap());
        }

        let record = MemberRecord::from_tree(&arena).unwrap();

        assert_eq!(record.count(), 2_000);
        let mut deepest = &record;
        while let Some(next) = deepest.employees.first() {
            deepest = next;
        }
        assert_eq!(deepest.name.as_deref(), Some("m1999"));
    }
}
