// CLASSIFICATION: COMMUNITY
// Filename: wallet_tree.rs v0.2
// Author: Lukas Bower
// Date Modified: 2027-08-14

//! End-to-end walks of the wallet tree over the in-process bus.

use std::collections::BTreeMap;
use std::sync::Arc;

use kwallet_client::{
    consts, Error, EntryType, MemoryBus, RecurseOpts, WalletItem, WalletManager,
};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A bus seeded with one wallet holding a folder of all four item kinds.
fn seeded_bus() -> Arc<MemoryBus> {
    let bus = Arc::new(MemoryBus::new());
    bus.seed_entry(
        consts::DEFAULT_WALLET,
        "creds",
        "login",
        EntryType::Password,
        b"hunter2".to_vec(),
    )
    .expect("seed password");

    let mut map = BTreeMap::new();
    map.insert("user".to_string(), "alice".to_string());
    map.insert("realm".to_string(), "example.org".to_string());
    bus.seed_map(consts::DEFAULT_WALLET, "creds", "session", &map)
        .expect("seed map");

    bus.seed_entry(
        consts::DEFAULT_WALLET,
        "creds",
        "certificate",
        EntryType::Stream,
        vec![0xde, 0xad, 0xbe, 0xef],
    )
    .expect("seed blob");

    bus.seed_raw_entry(consts::DEFAULT_WALLET, "creds", "mystery", 77, vec![1, 2, 3])
        .expect("seed unknown");
    bus
}

#[test]
fn eager_recursion_populates_every_item_kind() {
    init_logging();
    let bus = seeded_bus();
    let (manager, warnings) =
        WalletManager::new(bus, None, RecurseOpts::everything()).expect("manager");
    assert!(warnings.is_empty(), "unexpected warnings: {warnings}");

    let wallet = manager.wallet(consts::DEFAULT_WALLET).expect("wallet cached");
    let folder = wallet.folder("creds").expect("folder cached");

    let password = folder.password("login").expect("password cached");
    assert_eq!(password.value(), "hunter2");
    assert_eq!(password.entry_type(), EntryType::Password);

    let map = folder.map("session").expect("map cached");
    assert_eq!(map.get("user"), Some("alice"));
    assert_eq!(map.get("realm"), Some("example.org"));

    let blob = folder.blob("certificate").expect("blob cached");
    assert_eq!(blob.value(), &[0xde, 0xad, 0xbe, 0xef]);

    let unknown = folder.unknown_item("mystery").expect("unknown cached");
    assert_eq!(unknown.raw_type(), 77);
    assert_eq!(unknown.value(), &[1, 2, 3]);
    assert_eq!(unknown.entry_type(), EntryType::Unknown);
}

#[test]
fn lazy_recursion_fetches_nothing_eagerly() {
    init_logging();
    let bus = seeded_bus();
    let (manager, warnings) =
        WalletManager::new(bus, None, RecurseOpts::lazy()).expect("manager");
    assert!(warnings.is_empty());
    assert!(manager.wallets().is_empty());
}

#[test]
fn default_recursion_stops_at_folders() {
    init_logging();
    let bus = seeded_bus();
    let (manager, _) =
        WalletManager::new(bus, None, RecurseOpts::default()).expect("manager");
    let folder = manager
        .wallet(consts::DEFAULT_WALLET)
        .expect("wallet cached")
        .folder("creds")
        .expect("folder cached");
    assert!(folder.passwords().is_empty());
    assert!(folder.maps().is_empty());
    assert!(folder.blobs().is_empty());
    assert!(folder.unknown_items().is_empty());
}

#[test]
fn open_wallet_attaches_and_unlocks_on_demand() {
    init_logging();
    let bus = Arc::new(MemoryBus::new());
    let (mut manager, _) =
        WalletManager::new(bus, Some("tree-test"), RecurseOpts::lazy()).expect("manager");
    assert_eq!(manager.app_id(), "tree-test");

    let wallet = manager.open_wallet(consts::DEFAULT_WALLET).expect("open");
    assert!(wallet.handle().is_some());
    assert!(wallet.is_unlocked());
}

#[test]
fn write_and_read_back_every_item_kind() {
    init_logging();
    let bus = Arc::new(MemoryBus::new());
    let (mut manager, _) =
        WalletManager::new(bus, None, RecurseOpts::lazy()).expect("manager");
    let wallet = manager.open_wallet(consts::DEFAULT_WALLET).expect("open");
    let folder = wallet.create_folder("vault").expect("create folder");

    folder.write_password("pw", "s3cret").expect("write password");
    assert_eq!(folder.read_password("pw").expect("read password").value(), "s3cret");

    let mut dict = BTreeMap::new();
    dict.insert("k".to_string(), "v".to_string());
    folder.write_map("m", Some(&dict)).expect("write map");
    let map = folder.read_map("m").expect("read map");
    assert_eq!(map.get("k"), Some("v"));

    folder.write_blob("b", &[9, 8, 7]).expect("write blob");
    assert_eq!(folder.read_blob("b").expect("read blob").value(), &[9, 8, 7]);

    let names = folder.entry_names().expect("entry names");
    assert_eq!(names, vec!["b".to_string(), "m".to_string(), "pw".to_string()]);
}

#[test]
fn writing_an_absent_map_is_refused_before_the_bus_sees_it() {
    init_logging();
    let bus = Arc::new(MemoryBus::new());
    let (mut manager, _) =
        WalletManager::new(bus, None, RecurseOpts::lazy()).expect("manager");
    let wallet = manager.open_wallet(consts::DEFAULT_WALLET).expect("open");
    let folder = wallet.create_folder("vault").expect("create folder");

    let err = folder.write_map("m", None).expect_err("absent map");
    assert!(matches!(err, Error::InvalidMap));
    assert!(!folder.has_entry("m").expect("has_entry"));
}

#[test]
fn empty_map_is_a_valid_write() {
    init_logging();
    let bus = Arc::new(MemoryBus::new());
    let (mut manager, _) =
        WalletManager::new(bus, None, RecurseOpts::lazy()).expect("manager");
    let wallet = manager.open_wallet(consts::DEFAULT_WALLET).expect("open");
    let folder = wallet.create_folder("vault").expect("create folder");

    let empty = BTreeMap::new();
    folder.write_map("m", Some(&empty)).expect("write empty map");
    let map = folder.read_map("m").expect("read empty map");
    assert_eq!(map.value().map(BTreeMap::len), Some(0));
}

#[test]
fn rename_and_remove_keep_caches_in_step() {
    init_logging();
    let bus = Arc::new(MemoryBus::new());
    let (mut manager, _) =
        WalletManager::new(bus, None, RecurseOpts::lazy()).expect("manager");
    let wallet = manager.open_wallet(consts::DEFAULT_WALLET).expect("open");
    let folder = wallet.create_folder("vault").expect("create folder");

    folder.write_password("old", "v").expect("write");
    folder.rename_entry("old", "new").expect("rename");
    assert!(folder.password("old").is_none());
    assert_eq!(folder.password("new").expect("renamed").value(), "v");
    assert!(!folder.has_entry("old").expect("has_entry"));
    assert!(folder.has_entry("new").expect("has_entry"));

    folder.remove_entry("new").expect("remove");
    assert!(folder.password("new").is_none());
    assert!(!folder.has_entry("new").expect("has_entry"));

    let err = folder.remove_entry("new").expect_err("double remove");
    assert!(matches!(err, Error::OperationFailed(-1)));
}

#[test]
fn stale_handles_surface_as_operation_failures() {
    init_logging();
    let bus = Arc::new(MemoryBus::new());
    let (mut manager, _) =
        WalletManager::new(bus, None, RecurseOpts::lazy()).expect("manager");
    let wallet = manager.open_wallet(consts::DEFAULT_WALLET).expect("open");
    let folder = wallet.create_folder("vault").expect("create folder");
    let mut orphan = folder.clone();

    wallet.close(true).expect("close");
    assert!(wallet.handle().is_none());

    let err = orphan.write_password("pw", "v").expect_err("stale write");
    assert!(matches!(err, Error::OperationFailed(-1)));
}

#[test]
fn close_all_and_delete_evict_cached_state() {
    init_logging();
    let bus = seeded_bus();
    let (mut manager, _) =
        WalletManager::new(bus, None, RecurseOpts::default()).expect("manager");
    assert_eq!(manager.wallets().len(), 1);

    manager.close_all_wallets().expect("close all");
    let wallet = manager
        .wallet(consts::DEFAULT_WALLET)
        .expect("still cached");
    assert!(wallet.handle().is_none());

    manager.delete_wallet(consts::DEFAULT_WALLET).expect("delete");
    assert!(manager.wallet(consts::DEFAULT_WALLET).is_none());
    assert!(!manager
        .list_wallets()
        .expect("list")
        .contains(&consts::DEFAULT_WALLET.to_string()));

    let err = manager
        .delete_wallet(consts::DEFAULT_WALLET)
        .expect_err("double delete");
    assert!(matches!(err, Error::OperationFailed(-1)));
}

#[test]
fn disconnecting_an_unknown_wallet_fails() {
    init_logging();
    let bus = Arc::new(MemoryBus::new());
    let (manager, _) =
        WalletManager::new(bus, None, RecurseOpts::lazy()).expect("manager");

    manager
        .disconnect_application(consts::DEFAULT_WALLET, "someone")
        .expect("disconnect known wallet");
    let err = manager
        .disconnect_application("no-such-wallet", "someone")
        .expect_err("disconnect unknown wallet");
    assert!(matches!(err, Error::DisconnectFailed { .. }));
}

#[test]
fn disabled_service_refuses_to_hand_out_handles() {
    init_logging();
    let bus = Arc::new(MemoryBus::new());
    bus.set_enabled(false).expect("disable");
    let (mut manager, _) =
        WalletManager::new(bus, None, RecurseOpts::lazy()).expect("manager");
    assert!(!manager.enabled());

    let err = manager
        .open_wallet(consts::DEFAULT_WALLET)
        .expect_err("open while disabled");
    assert!(matches!(err, Error::NoHandle(-1)));
}

#[test]
fn locked_wallet_failures_become_warnings_not_errors() {
    init_logging();
    let bus = Arc::new(MemoryBus::new());
    bus.set_enabled(false).expect("disable");
    // Eager recursion wants every wallet open; with the service disabled
    // each open is refused, and the walk reports rather than aborts.
    let (manager, warnings) =
        WalletManager::new(bus, None, RecurseOpts::default()).expect("manager");
    assert!(!warnings.is_empty());
    assert!(manager.wallets().is_empty());
}

#[test]
fn tree_serializes_with_wire_field_names() {
    init_logging();
    let bus = seeded_bus();
    let (manager, _) =
        WalletManager::new(bus, None, RecurseOpts::everything()).expect("manager");
    let json = serde_json::to_value(&manager).expect("serialize");

    assert_eq!(json["local_wallet"], consts::DEFAULT_WALLET);
    assert_eq!(json["network_wallet"], consts::DEFAULT_WALLET);
    let wallet = &json["wallets"][consts::DEFAULT_WALLET];
    assert_eq!(wallet["open"], true);
    let folder = &wallet["folders"]["creds"];
    assert!(folder["binary_data"]["certificate"].is_object());
    assert_eq!(folder["recurse_opts"]["all"], true);
    assert_eq!(
        folder["passwords"]["login"]["value"],
        "hunter2"
    );
}

#[test]
fn bulk_updates_rebuild_each_cache_by_kind() {
    init_logging();
    let bus = seeded_bus();
    let (mut manager, _) =
        WalletManager::new(bus, None, RecurseOpts::default()).expect("manager");
    let folder = manager
        .wallet_mut(consts::DEFAULT_WALLET)
        .expect("wallet cached")
        .folder_mut("creds")
        .expect("folder cached");

    let warnings = folder.update_passwords().expect("passwords");
    assert!(warnings.is_empty());
    assert_eq!(folder.password("login").expect("cached").value(), "hunter2");
    assert_eq!(folder.passwords().len(), 1);

    let warnings = folder.update_maps().expect("maps");
    assert!(warnings.is_empty());
    assert_eq!(folder.map("session").expect("cached").get("user"), Some("alice"));
    assert_eq!(folder.maps().len(), 1);

    let warnings = folder.update_blobs().expect("blobs");
    assert!(warnings.is_empty());
    assert_eq!(
        folder.blob("certificate").expect("cached").value(),
        &[0xde, 0xad, 0xbe, 0xef]
    );
    assert_eq!(folder.blobs().len(), 1);

    let warnings = folder.update_unknown().expect("unknown");
    assert!(warnings.is_empty());
    assert_eq!(folder.unknown_item("mystery").expect("cached").raw_type(), 77);
    assert_eq!(folder.unknown_items().len(), 1);
}

#[test]
fn undecodable_map_entries_are_skipped_with_a_warning() {
    init_logging();
    let bus = seeded_bus();
    // A map-typed entry whose bytes claim 2^32 - 1 entries and then end.
    bus.seed_raw_entry(
        consts::DEFAULT_WALLET,
        "creds",
        "mangled",
        i32::from(EntryType::Map),
        vec![0xff, 0xff, 0xff, 0xff],
    )
    .expect("seed mangled map");
    let (mut manager, _) =
        WalletManager::new(bus, None, RecurseOpts::default()).expect("manager");
    let folder = manager
        .wallet_mut(consts::DEFAULT_WALLET)
        .expect("wallet cached")
        .folder_mut("creds")
        .expect("folder cached");

    let warnings = folder.update_maps().expect("maps");
    assert_eq!(warnings.len(), 1);
    assert!(folder.map("mangled").is_none());
    assert_eq!(folder.map("session").expect("cached").get("user"), Some("alice"));
}

#[test]
fn local_and_network_wallets_resolve() {
    init_logging();
    let bus = Arc::new(MemoryBus::with_wallets(["kdewallet", "spare"]));
    let (mut manager, _) =
        WalletManager::new(bus, None, RecurseOpts::lazy()).expect("manager");
    assert_eq!(manager.local_wallet().expect("local"), "kdewallet");
    assert_eq!(manager.network_wallet().expect("network"), "kdewallet");
    assert_eq!(
        manager.list_wallets().expect("list"),
        vec!["kdewallet".to_string(), "spare".to_string()]
    );
}
