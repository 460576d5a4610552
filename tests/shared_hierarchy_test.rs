//! Tests for concurrent access and the file-backed service container

use std::sync::Arc;
use std::thread;

use tempfile::TempDir;

use teamtree::application::services::{HierarchyStore, TeamService};
use teamtree::application::{ApplicationError, MemberInput};
use teamtree::config::Settings;
use teamtree::domain::MemberQuery;
use teamtree::infrastructure::di::ServiceContainer;
use teamtree::infrastructure::traits::RealFileSystem;
use teamtree::infrastructure::{InfraError, SharedHierarchy};
use teamtree::util::testing::init_test_setup;

#[test]
fn given_parallel_writers_when_creating_members_then_all_land_in_one_valid_tree() {
    init_test_setup();
    // Arrange
    let shared = SharedHierarchy::new(HierarchyStore::new());
    let service = Arc::new(TeamService::new(Arc::new(RealFileSystem)));
    shared
        .write(|store| service.create_member(store, &MemberInput::new("Top", "top@payhawk.com"), None))
        .unwrap();

    // Act
    let handles: Vec<_> = (0..8)
        .map(|t| {
            let shared = shared.clone();
            let service = Arc::clone(&service);
            thread::spawn(move || {
                for i in 0..10 {
                    let input = MemberInput::new(format!("Hawk {t}-{i}"), format!("hawk.{t}.{i}@payhawk.com"));
                    shared
                        .write(|store| service.create_member(store, &input, None))
                        .unwrap();
                    let seen = shared
                        .read(|store| {
                            Ok(store.get_members(&MemberQuery::new().email(format!(".{t}."))).len())
                        })
                        .unwrap();
                    assert!(seen > i);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    // Assert
    let (len, root_employees) = shared
        .read(|store| {
            store.verify()?;
            let root = store.root().map(|m| m.employees().len()).unwrap_or(0);
            Ok((store.len(), root))
        })
        .unwrap();
    assert_eq!(len, 81);
    assert_eq!(root_employees, 80);
}

#[test]
fn given_racing_writers_with_same_email_then_exactly_one_wins() {
    // Arrange
    let shared = SharedHierarchy::new(HierarchyStore::new());
    let service = Arc::new(TeamService::new(Arc::new(RealFileSystem)));
    shared
        .write(|store| service.create_member(store, &MemberInput::new("Top", "top@payhawk.com"), None))
        .unwrap();

    // Act
    let results: Vec<_> = (0..6)
        .map(|t| {
            let shared = shared.clone();
            let service = Arc::clone(&service);
            thread::spawn(move || {
                let input = MemberInput::new(format!("Racer {t}"), "racer@payhawk.com");
                shared.write(|store| service.create_member(store, &input, None))
            })
        })
        .collect::<Vec<_>>()
        .into_iter()
        .map(|h| h.join().unwrap())
        .collect();

    // Assert
    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(results.iter().filter(|r| r.is_err()).all(|r| matches!(
        r,
        Err(InfraError::Application(ApplicationError::EmailInUse(_)))
    )));
    assert_eq!(shared.read(|store| Ok(store.len())).unwrap(), 2);
}

#[test]
fn given_missing_team_file_when_loading_then_starts_empty() {
    let temp = TempDir::new().unwrap();
    let container = ServiceContainer::with_deps(Settings::default(), Arc::new(RealFileSystem));

    let loaded = container.load_team(&temp.path().join("team.json")).unwrap();

    assert!(!loaded);
    assert!(container.hierarchy.read(|store| Ok(store.is_empty())).unwrap());
}

#[test]
fn given_saved_team_when_loading_in_new_container_then_same_members() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("team.json");
    let first = ServiceContainer::with_deps(Settings::default(), Arc::new(RealFileSystem));
    first
        .hierarchy
        .write(|store| {
            let top = first
                .team
                .create_member(store, &MemberInput::new("Top", "top@payhawk.com"), None)?;
            first
                .team
                .create_member(store, &MemberInput::new("Sub", "sub@payhawk.com"), Some(top))
        })
        .unwrap();

    // Act
    first.save_team(&path).unwrap();
    let second = ServiceContainer::new(Settings::default());
    let loaded = second.load_team(&path).unwrap();

    // Assert
    assert!(loaded);
    let emails = second
        .hierarchy
        .read(|store| {
            Ok(store
                .get_members(&MemberQuery::new())
                .iter()
                .map(|m| m.email.clone())
                .collect::<Vec<_>>())
        })
        .unwrap();
    assert_eq!(emails, vec!["top@payhawk.com", "sub@payhawk.com"]);
}

#[test]
fn given_emptied_team_when_saving_and_loading_then_still_empty() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("team.json");
    let container = ServiceContainer::with_deps(Settings::default(), Arc::new(RealFileSystem));

    // Act
    container.save_team(&path).unwrap();
    let loaded = container.load_team(&path).unwrap();

    // Assert
    assert!(loaded);
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "{}\n");
    assert!(container.hierarchy.read(|store| Ok(store.is_empty())).unwrap());
}

#[test]
fn given_corrupt_team_file_when_loading_then_error_and_store_untouched() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("team.json");
    std::fs::write(&path, "{ broken").unwrap();
    let container = ServiceContainer::with_deps(Settings::default(), Arc::new(RealFileSystem));

    let err = container.load_team(&path).unwrap_err();

    assert!(matches!(
        err,
        InfraError::Application(ApplicationError::InvalidJson(_))
    ));
    assert!(container.hierarchy.read(|store| Ok(store.is_empty())).unwrap());
}
