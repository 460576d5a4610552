//! Member entity: identity, attributes and structural links

use std::fmt;
use std::str::FromStr;

use generational_arena::Index;
use uuid::Uuid;

/// Opaque member identifier, assigned at creation and never changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MemberId(Uuid);

impl MemberId {
    /// Generate a fresh random identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for MemberId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for MemberId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl FromStr for MemberId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A person in the hierarchy.
///
/// `manager` and `employees` are arena indices owned by the surrounding
/// [`MemberArena`](crate::domain::MemberArena); they are only meaningful
/// inside the arena that created them. The links are private so that only
/// the arena can change them and keep both directions consistent.
#[derive(Debug, Clone)]
pub struct Member {
    id: MemberId,
    pub name: String,
    pub email: String,
    pub(crate) manager: Option<Index>,
    /// Direct employees in insertion order, no duplicates
    pub(crate) employees: Vec<Index>,
}

impl Member {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self::with_id(MemberId::new(), name, email)
    }

    pub fn with_id(id: MemberId, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            email: email.into(),
            manager: None,
            employees: Vec::new(),
        }
    }

    pub fn id(&self) -> MemberId {
        self.id
    }

    pub fn manager(&self) -> Option<Index> {
        self.manager
    }

    pub fn employees(&self) -> &[Index] {
        &self.employees
    }
}

impl fmt::Display for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}>", self.name, self.email)
    }
}
