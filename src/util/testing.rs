//! Shared test setup: logging and small team fixtures.

use std::collections::HashMap;
use std::env;
use std::sync::Once;

use tracing::{debug, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::application::services::HierarchyStore;
use crate::domain::{MemberArena, MemberId};

static TEST_SETUP: Once = Once::new();

pub fn init_test_setup() {
    TEST_SETUP.call_once(|| {
        setup_test_logging();
        info!("Test Setup complete");
    });
}

fn setup_test_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

    let subscriber = tracing_subscriber::registry().with(
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_test_writer()
            .with_target(true)
            .with_filter(env_filter),
    );

    // Only set if we haven't already set a global subscriber
    if tracing::dispatcher::has_been_set() {
        debug!("Tracing subscriber already set");
    } else if let Err(e) = subscriber.try_init() {
        if env::var("RUST_LOG").is_ok() {
            eprintln!("Error: Failed to set up logging: {}", e);
        }
    }
}

/// Team fixture keyed by short labels.
///
/// Each label `l` becomes a member named `Hawk l` with email
/// `hawk.l@payhawk.com`; `edges` lists `(label, manager_label)` pairs in
/// insertion order, the first entry being the root.
pub struct TeamFixture {
    pub store: HierarchyStore,
    pub ids: HashMap<String, MemberId>,
}

impl TeamFixture {
    pub fn new(edges: &[(&str, Option<&str>)]) -> Self {
        let mut store = HierarchyStore::new();
        let mut ids = HashMap::new();
        for &(label, manager) in edges {
            let manager_id = manager.map(|m| ids[m]);
            let id = store
                .create_member(&format!("Hawk {label}"), &email(label), manager_id)
                .expect("fixture member")
                .id();
            ids.insert(label.to_string(), id);
        }
        Self { store, ids }
    }

    pub fn id(&self, label: &str) -> MemberId {
        self.ids[label]
    }

    /// Labels of `label`'s direct employees, in order.
    pub fn employees(&self, label: &str) -> Vec<String> {
        let tree = self.store.tree();
        let idx = tree.lookup(self.id(label)).expect("fixture label");
        tree.employees_of(idx)
            .iter()
            .filter_map(|&e| tree.get(e))
            .map(|m| label_of(&m.email))
            .collect()
    }

    /// Label of `label`'s manager.
    pub fn manager(&self, label: &str) -> Option<String> {
        let tree = self.store.tree();
        let idx = tree.lookup(self.id(label)).ok()?;
        tree.manager_of(idx)
            .and_then(|m| tree.get(m))
            .map(|m| label_of(&m.email))
    }

    /// Depth of every member, keyed by label.
    pub fn depths(&self) -> HashMap<String, usize> {
        depths(self.store.tree())
    }
}

pub fn email(label: &str) -> String {
    format!("hawk.{label}@payhawk.com")
}

fn label_of(email: &str) -> String {
    email
        .trim_start_matches("hawk.")
        .trim_end_matches("@payhawk.com")
        .to_string()
}

pub fn depths(tree: &MemberArena) -> HashMap<String, usize> {
    tree.iter()
        .map(|(idx, m)| (label_of(&m.email), tree.depth_of(idx)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_test_setup() {
        init_test_setup();
    }

    #[test]
    fn given_edges_when_building_fixture_then_structure_matches() {
        let team = TeamFixture::new(&[("0", None), ("1", Some("0")), ("2", Some("0"))]);
        assert_eq!(team.employees("0"), vec!["1", "2"]);
        assert_eq!(team.manager("2").as_deref(), Some("0"));
        assert_eq!(team.depths()["1"], 1);
    }
}
