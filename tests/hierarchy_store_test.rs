//! Tests for HierarchyStore: create, move, delete, demote and lookups

use teamtree::application::services::{HierarchyStore, TeamService};
use teamtree::application::{ApplicationError, MemberInput};
use teamtree::domain::{DomainError, Member, MemberId, MemberQuery};
use teamtree::infrastructure::traits::RealFileSystem;
use teamtree::util::testing::{email, init_test_setup, TeamFixture};

use std::sync::Arc;

/// 0 -> {1 -> {3, 4}, 2 -> {8}}
fn small_team() -> TeamFixture {
    TeamFixture::new(&[
        ("0", None),
        ("1", Some("0")),
        ("2", Some("0")),
        ("3", Some("1")),
        ("4", Some("1")),
        ("8", Some("2")),
    ])
}

#[test]
fn given_empty_store_when_creating_members_then_second_goes_under_root() {
    init_test_setup();
    // Arrange
    let mut store = HierarchyStore::new();

    // Act
    let root = store
        .create_member("Top Manager", "top.manager@payhawk.com", None)
        .unwrap()
        .id();
    let john = store
        .create_member("John Doe", "john.doe@payhawk.com", None)
        .unwrap()
        .id();

    // Assert
    assert_eq!(store.len(), 2);
    assert_eq!(store.root().map(Member::id), Some(root));
    assert_eq!(store.root().map(|r| r.employees().len()), Some(1));
    let found = store.find(|m| m.email == "john.doe@payhawk.com").unwrap();
    assert_eq!(found.id(), john);
    let root_idx = store.tree().lookup(root).unwrap();
    assert_eq!(store.tree().manager_of(store.tree().lookup(john).unwrap()), Some(root_idx));
    store.verify().unwrap();
}

#[test]
fn given_explicit_manager_when_creating_then_member_is_appended_to_its_employees() {
    // Arrange
    let mut team = small_team();

    // Act
    let id = team
        .store
        .create_member("Hawk 9", &email("9"), Some(team.id("1")))
        .unwrap()
        .id();
    team.ids.insert("9".to_string(), id);

    // Assert
    assert_eq!(team.employees("1"), vec!["3", "4", "9"]);
    team.store.verify().unwrap();
}

#[test]
fn given_member_with_employees_when_deleting_then_employees_join_former_manager() {
    // Arrange: root -> A -> {B, C}, B -> {D, E}
    let mut team = TeamFixture::new(&[
        ("root", None),
        ("a", Some("root")),
        ("b", Some("a")),
        ("c", Some("a")),
        ("d", Some("b")),
        ("e", Some("b")),
    ]);

    // Act
    let removed = team.store.delete_member(team.id("b")).unwrap();

    // Assert
    assert_eq!(removed.email, email("b"));
    assert_eq!(team.employees("a"), vec!["c", "d", "e"]);
    assert_eq!(team.manager("d").as_deref(), Some("a"));
    assert_eq!(team.store.len(), 5);
    assert!(!team.store.is_email_used(&email("b")));
    team.store.verify().unwrap();
}

#[test]
fn given_deleted_member_when_reusing_its_email_then_creation_succeeds() {
    // Arrange
    let service = TeamService::new(Arc::new(RealFileSystem));
    let mut team = small_team();
    team.store.delete_member(team.id("8")).unwrap();

    let manager_id = team.id("2");

    // Act
    let result = service.create_member(
        &mut team.store,
        &MemberInput::new("New Hawk", email("8")),
        Some(manager_id),
    );

    // Assert
    assert!(result.is_ok());
    team.store.verify().unwrap();
}

#[test]
fn given_root_when_deleting_then_store_is_empty_and_emails_are_free() {
    // Arrange
    let mut team = small_team();

    // Act
    team.store.delete_member(team.id("0")).unwrap();

    // Assert
    assert!(team.store.is_empty());
    assert!(team.store.root().is_none());
    assert!(!team.store.is_email_used(&email("3")));
    team.store.verify().unwrap();
}

#[test]
fn given_unknown_id_when_deleting_then_member_not_found() {
    let mut team = small_team();
    let ghost = MemberId::new();

    let err = team.store.delete_member(ghost).unwrap_err();

    assert_eq!(err.as_domain(), Some(&DomainError::MemberNotFound(ghost)));
    assert_eq!(team.store.len(), 6);
}

#[test]
fn given_member_when_updating_manager_then_subtree_moves_along() {
    // Arrange
    let mut team = small_team();

    // Act
    team.store
        .update_manager(team.id("1"), team.id("8"))
        .unwrap();

    // Assert
    assert_eq!(team.employees("0"), vec!["2"]);
    assert_eq!(team.employees("8"), vec!["1"]);
    assert_eq!(team.employees("1"), vec!["3", "4"]);
    assert_eq!(team.depths()["3"], 4);
    team.store.verify().unwrap();
}

#[test]
fn given_ancestor_when_moving_under_descendant_then_rejected_without_changes() {
    // Arrange
    let mut team = small_team();

    // Act
    let err = team
        .store
        .update_manager(team.id("1"), team.id("3"))
        .unwrap_err();

    // Assert
    assert!(matches!(
        err,
        ApplicationError::Domain(DomainError::InvalidOperation(_))
    ));
    assert_eq!(team.employees("1"), vec!["3", "4"]);
    team.store.verify().unwrap();
}

#[test]
fn given_manager_when_demoting_under_other_member_then_becomes_leaf_and_employees_move_up() {
    // Arrange
    let mut team = small_team();

    // Act
    let demoted = team
        .store
        .demote_manager(team.id("1"), team.id("8"))
        .unwrap();

    // Assert
    assert_eq!(demoted.email, email("1"));
    assert!(demoted.employees().is_empty());
    assert_eq!(team.employees("0"), vec!["2", "3", "4"]);
    assert_eq!(team.employees("8"), vec!["1"]);
    assert_eq!(team.depths()["1"], 3);
    team.store.verify().unwrap();
}

#[test]
fn given_middle_manager_when_demoting_under_sibling_then_its_employees_join_root() {
    // Arrange: z -> {a -> {b, c}, m}
    let mut team = TeamFixture::new(&[
        ("z", None),
        ("a", Some("z")),
        ("b", Some("a")),
        ("c", Some("a")),
        ("m", Some("z")),
    ]);

    // Act
    team.store
        .demote_manager(team.id("a"), team.id("m"))
        .unwrap();

    // Assert
    assert_eq!(team.manager("a").as_deref(), Some("m"));
    assert!(team.employees("a").is_empty());
    assert_eq!(team.manager("b").as_deref(), Some("z"));
    assert_eq!(team.manager("c").as_deref(), Some("z"));
    assert_eq!(team.employees("z"), vec!["m", "b", "c"]);
    team.store.verify().unwrap();
}

#[test]
fn given_member_when_demoting_under_own_employee_then_employee_moves_up_first() {
    // Arrange
    let mut team = small_team();

    // Act
    team.store
        .demote_manager(team.id("1"), team.id("3"))
        .unwrap();

    // Assert
    assert_eq!(team.manager("3").as_deref(), Some("0"));
    assert_eq!(team.employees("3"), vec!["1"]);
    team.store.verify().unwrap();
}

#[test]
fn given_member_when_demoting_under_itself_then_invalid_operation() {
    let mut team = small_team();

    let err = team
        .store
        .demote_manager(team.id("2"), team.id("2"))
        .unwrap_err();

    assert!(matches!(
        err.as_domain(),
        Some(DomainError::InvalidOperation(_))
    ));
    assert_eq!(team.employees("2"), vec!["8"]);
}

#[test]
fn given_team_when_querying_then_results_in_level_order() {
    // Arrange
    let team = small_team();

    // Act
    let hits = team
        .store
        .get_members(&MemberQuery::new().email("payhawk"));

    // Assert
    let emails: Vec<_> = hits.iter().map(|m| m.email.clone()).collect();
    let expected: Vec<_> = ["0", "1", "2", "3", "4", "8"].iter().map(|l| email(l)).collect();
    assert_eq!(emails, expected);
}

#[test]
fn given_team_when_querying_by_manager_and_employee_then_filters_compose() {
    let team = small_team();

    let under_zero_with_eight = team
        .store
        .get_members(&MemberQuery::new().manager_email("hawk.0").employee_email("hawk.8"));

    assert_eq!(under_zero_with_eight.len(), 1);
    assert_eq!(under_zero_with_eight[0].email, email("2"));
}

#[test]
fn given_predicate_when_filtering_then_all_matches_returned() {
    let team = small_team();

    let leaves = team.store.filter(|m| m.employees().is_empty());

    let mut emails: Vec<_> = leaves.iter().map(|m| m.email.clone()).collect();
    emails.sort();
    assert_eq!(emails, vec![email("3"), email("4"), email("8")]);
}

#[test]
fn given_team_when_getting_member_by_id_then_returns_it() {
    let team = small_team();

    let member = team.store.get_member(team.id("4")).unwrap();

    assert_eq!(member.name, "Hawk 4");
    assert_eq!(team.store.tree().depth_of(team.store.tree().lookup(member.id()).unwrap()), 2);
}
