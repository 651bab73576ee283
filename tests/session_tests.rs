use edugo_web::{
    AppConfig, Role, SessionStore, Tier,
    session::{ROLE_KEY, TOKEN_KEY},
    storage::{FileStorage, MemoryStorage, SessionStorage, StorageTier},
};
use std::{fs, sync::Arc};
use tempfile::TempDir;

/// A store whose tiers the test can inspect directly.
fn store_with_tiers() -> (SessionStore, Arc<MemoryStorage>, Arc<MemoryStorage>) {
    let remembered = Arc::new(MemoryStorage::new());
    let transient = Arc::new(MemoryStorage::new());
    let store = SessionStore::new(
        remembered.clone() as StorageTier,
        transient.clone() as StorageTier,
    );
    (store, remembered, transient)
}

#[test]
fn test_empty_store_is_anonymous() {
    let store = SessionStore::in_memory();
    assert_eq!(store.token(), None);
    assert_eq!(store.role(), None);
    assert_eq!(store.active_tier(), None);

    let snapshot = store.snapshot();
    assert!(!snapshot.is_authenticated());
    assert_eq!(snapshot.role(), None);
}

#[test]
fn test_remembered_login_writes_durable_tier_only() {
    let (store, remembered, transient) = store_with_tiers();
    store.set_session("tok-1", Some(Role::Teacher), true).unwrap();

    assert_eq!(remembered.get(TOKEN_KEY).unwrap().as_deref(), Some("tok-1"));
    assert_eq!(remembered.get(ROLE_KEY).unwrap().as_deref(), Some("teacher"));
    assert!(transient.is_empty());

    let snapshot = store.snapshot();
    assert_eq!(snapshot.token(), Some("tok-1"));
    assert_eq!(snapshot.role(), Some(Role::Teacher));
    assert_eq!(snapshot.tier(), Some(Tier::Remembered));
}

#[test]
fn test_transient_login_clears_durable_tier() {
    let (store, remembered, transient) = store_with_tiers();
    store.set_session("old", Some(Role::Admin), true).unwrap();
    store.set_session("new", Some(Role::Student), false).unwrap();

    assert!(remembered.is_empty());
    assert_eq!(transient.get(TOKEN_KEY).unwrap().as_deref(), Some("new"));
    assert_eq!(store.token().as_deref(), Some("new"));
    assert_eq!(store.role(), Some(Role::Student));
    assert_eq!(store.active_tier(), Some(Tier::Transient));
}

#[test]
fn test_remembered_tier_wins_over_transient() {
    let (store, remembered, transient) = store_with_tiers();
    remembered.set(TOKEN_KEY, "durable").unwrap();
    remembered.set(ROLE_KEY, "parent").unwrap();
    transient.set(TOKEN_KEY, "tab").unwrap();
    transient.set(ROLE_KEY, "super_admin").unwrap();

    assert_eq!(store.token().as_deref(), Some("durable"));
    assert_eq!(store.role(), Some(Role::Parent));
    assert_eq!(store.snapshot().role(), Some(Role::Parent));
}

#[test]
fn test_clear_session_empties_both_tiers() {
    let (store, remembered, transient) = store_with_tiers();
    remembered.set(TOKEN_KEY, "a").unwrap();
    transient.set(TOKEN_KEY, "b").unwrap();
    transient.set(ROLE_KEY, "admin").unwrap();

    store.clear_session().unwrap();

    assert!(remembered.is_empty());
    assert!(transient.is_empty());
    assert!(!store.snapshot().is_authenticated());
}

#[test]
fn test_role_without_token_is_not_a_session() {
    let (store, remembered, _transient) = store_with_tiers();
    remembered.set(ROLE_KEY, "super_admin").unwrap();

    let snapshot = store.snapshot();
    assert!(!snapshot.is_authenticated());
    assert_eq!(snapshot.role(), None);
}

#[test]
fn test_snapshot_pairs_role_with_token_tier() {
    let (store, remembered, transient) = store_with_tiers();
    // Stale role in the durable tier, live session in the transient one.
    remembered.set(ROLE_KEY, "super_admin").unwrap();
    transient.set(TOKEN_KEY, "live").unwrap();
    transient.set(ROLE_KEY, "student").unwrap();

    let snapshot = store.snapshot();
    assert_eq!(snapshot.token(), Some("live"));
    assert_eq!(snapshot.role(), Some(Role::Student));
    assert_eq!(snapshot.tier(), Some(Tier::Transient));
}

#[test]
fn test_unknown_role_reads_as_absent() {
    let (store, _remembered, transient) = store_with_tiers();
    transient.set(TOKEN_KEY, "tok").unwrap();
    transient.set(ROLE_KEY, "janitor").unwrap();

    let snapshot = store.snapshot();
    assert!(snapshot.is_authenticated());
    assert_eq!(snapshot.role(), None);
}

#[test]
fn test_set_session_without_role_drops_stale_role() {
    let (store, _remembered, transient) = store_with_tiers();
    store.set_session("first", Some(Role::Admin), false).unwrap();
    store.set_session("second", None, false).unwrap();

    assert_eq!(transient.get(ROLE_KEY).unwrap(), None);
    assert_eq!(store.snapshot().role(), None);
}

#[test]
fn test_replace_token_keeps_tier_and_role() {
    let (store, remembered, transient) = store_with_tiers();
    store.set_session("before", Some(Role::Teacher), true).unwrap();

    store.replace_token("after").unwrap();

    assert_eq!(remembered.get(TOKEN_KEY).unwrap().as_deref(), Some("after"));
    assert_eq!(remembered.get(ROLE_KEY).unwrap().as_deref(), Some("teacher"));
    assert!(transient.is_empty());
}

#[test]
fn test_replace_token_without_session_uses_transient_tier() {
    let (store, remembered, transient) = store_with_tiers();
    store.replace_token("orphan").unwrap();

    assert!(remembered.is_empty());
    assert_eq!(transient.get(TOKEN_KEY).unwrap().as_deref(), Some("orphan"));
    assert_eq!(store.snapshot().role(), None);
}

#[test]
fn test_clones_share_tiers() {
    let store = SessionStore::in_memory();
    let other = store.clone();
    store.set_session("shared", Some(Role::Parent), false).unwrap();
    assert_eq!(other.token().as_deref(), Some("shared"));
}

#[test]
fn test_config_store_remembers_across_instances() {
    let dir = TempDir::new().unwrap();
    let config = AppConfig {
        session_dir: dir.path().to_path_buf(),
        ..AppConfig::default()
    };

    SessionStore::from_config(&config)
        .set_session("kept", Some(Role::Admin), true)
        .unwrap();
    SessionStore::from_config(&config)
        .set_session("tab-only", Some(Role::Student), false)
        .unwrap_or_else(|e| panic!("transient login failed: {e}"));

    // The transient login cleared the durable tier; a new process sees nothing.
    assert_eq!(SessionStore::from_config(&config).token(), None);

    SessionStore::from_config(&config)
        .set_session("kept", Some(Role::Admin), true)
        .unwrap();
    let restarted = SessionStore::from_config(&config);
    assert_eq!(restarted.token().as_deref(), Some("kept"));
    assert_eq!(restarted.role(), Some(Role::Admin));
}

#[test]
fn test_corrupt_durable_tier_fails_closed() {
    let dir = TempDir::new().unwrap();
    let durable = FileStorage::in_dir(dir.path());
    fs::write(durable.path(), "[1, 2").unwrap();

    let store = SessionStore::new(Arc::new(durable), Arc::new(MemoryStorage::new()));
    assert!(!store.snapshot().is_authenticated());

    // Logging in again overwrites the damaged file.
    store.set_session("repaired", Some(Role::Teacher), true).unwrap();
    assert_eq!(store.token().as_deref(), Some("repaired"));
}
