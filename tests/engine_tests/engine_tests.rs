//! Tests for Engine
//!
//! These tests verify:
//! - Table create/delete semantics
//! - Record get/set/delete operations
//! - Persistence after every mutation
//! - Export/import round trips
//! - Concurrent access patterns
//! - Persistence failure surfacing

use std::fs;
use std::sync::Arc;
use std::thread;

use gemdb::config::{Config, PersistStrategy};
use gemdb::engine::Engine;
use gemdb::storage::read_snapshot;
use gemdb::GemError;
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_temp_engine() -> (TempDir, Engine) {
    let temp_dir = TempDir::new().unwrap();
    let config = Config::builder()
        .data_file(temp_dir.path().join("data.json"))
        .build();
    let engine = Engine::open(config).unwrap();
    (temp_dir, engine)
}

fn reopen(temp_dir: &TempDir) -> Engine {
    Engine::open_path(&temp_dir.path().join("data.json")).unwrap()
}

// =============================================================================
// Table Operations Tests
// =============================================================================

#[test]
fn test_engine_open_without_file_is_empty() {
    let (temp, engine) = setup_temp_engine();

    assert!(engine.list_tables().is_empty());
    assert_eq!(engine.table_count(), 0);
    // Opening alone writes nothing
    assert!(!temp.path().join("data.json").exists());
}

#[test]
fn test_engine_create_table() {
    let (_temp, engine) = setup_temp_engine();

    engine.create_table("users").unwrap();

    assert_eq!(engine.list_tables(), vec!["users".to_string()]);
    assert!(engine.list_keys("users").unwrap().is_empty());
}

#[test]
fn test_engine_create_table_twice_fails() {
    let (_temp, engine) = setup_temp_engine();

    engine.create_table("users").unwrap();
    engine.set("users", "u1", "x").unwrap();

    let result = engine.create_table("users");
    assert!(matches!(result, Err(GemError::TableExists(ref name)) if name == "users"));

    // Existing contents untouched
    assert_eq!(engine.get("users", "u1").unwrap(), "x");
}

#[test]
fn test_engine_delete_table_removes_keys() {
    let (_temp, engine) = setup_temp_engine();

    engine.create_table("users").unwrap();
    engine.set("users", "u1", "a").unwrap();
    engine.set("users", "u2", "b").unwrap();

    engine.delete_table("users").unwrap();

    assert!(matches!(engine.get("users", "u1"), Err(GemError::TableNotFound(_))));
    assert!(matches!(engine.list_keys("users"), Err(GemError::TableNotFound(_))));
    assert!(engine.list_tables().is_empty());
}

#[test]
fn test_engine_delete_missing_table_fails() {
    let (_temp, engine) = setup_temp_engine();

    let result = engine.delete_table("ghost");
    assert!(matches!(result, Err(GemError::TableNotFound(_))));
}

#[test]
fn test_engine_recreate_deleted_table_is_empty() {
    let (_temp, engine) = setup_temp_engine();

    engine.create_table("t").unwrap();
    engine.set("t", "k", "v").unwrap();
    engine.delete_table("t").unwrap();
    engine.create_table("t").unwrap();

    assert!(engine.list_keys("t").unwrap().is_empty());
}

#[test]
fn test_engine_list_tables_sorted() {
    let (_temp, engine) = setup_temp_engine();

    engine.create_table("orders").unwrap();
    engine.create_table("accounts").unwrap();
    engine.create_table("users").unwrap();

    assert_eq!(engine.list_tables(), vec!["accounts", "orders", "users"]);
}

// =============================================================================
// Record Operations Tests
// =============================================================================

#[test]
fn test_engine_set_get() {
    let (_temp, engine) = setup_temp_engine();

    engine.create_table("users").unwrap();
    engine.set("users", "u1", r#"{"name":"John"}"#).unwrap();

    assert_eq!(engine.get("users", "u1").unwrap(), r#"{"name":"John"}"#);
}

#[test]
fn test_engine_set_overwrite() {
    let (_temp, engine) = setup_temp_engine();

    engine.create_table("t").unwrap();
    engine.set("t", "key", "value1").unwrap();
    engine.set("t", "key", "value2").unwrap();

    assert_eq!(engine.get("t", "key").unwrap(), "value2");
    assert_eq!(engine.list_keys("t").unwrap(), vec!["key"]);
}

#[test]
fn test_engine_set_missing_table_fails() {
    let (_temp, engine) = setup_temp_engine();

    let result = engine.set("ghost", "k", "v");
    assert!(matches!(result, Err(GemError::TableNotFound(_))));
    assert!(engine.list_tables().is_empty());
}

#[test]
fn test_engine_get_missing_key_fails() {
    let (_temp, engine) = setup_temp_engine();

    engine.create_table("t").unwrap();

    let result = engine.get("t", "nope");
    assert!(matches!(result, Err(GemError::KeyNotFound { .. })));
    assert!(result.unwrap_err().is_not_found());
}

#[test]
fn test_engine_delete_key() {
    let (_temp, engine) = setup_temp_engine();

    engine.create_table("t").unwrap();
    engine.set("t", "key", "value").unwrap();
    engine.delete("t", "key").unwrap();

    assert!(matches!(engine.get("t", "key"), Err(GemError::KeyNotFound { .. })));
}

#[test]
fn test_engine_delete_missing_key_fails() {
    let (_temp, engine) = setup_temp_engine();

    engine.create_table("t").unwrap();

    assert!(matches!(engine.delete("t", "nope"), Err(GemError::KeyNotFound { .. })));
    assert!(matches!(engine.delete("ghost", "k"), Err(GemError::TableNotFound(_))));
}

#[test]
fn test_engine_tables_are_independent() {
    let (_temp, engine) = setup_temp_engine();

    engine.create_table("a").unwrap();
    engine.create_table("b").unwrap();
    engine.set("a", "k", "from-a").unwrap();
    engine.set("b", "k", "from-b").unwrap();

    assert_eq!(engine.get("a", "k").unwrap(), "from-a");
    assert_eq!(engine.get("b", "k").unwrap(), "from-b");

    engine.delete_table("a").unwrap();
    assert_eq!(engine.get("b", "k").unwrap(), "from-b");
}

#[test]
fn test_engine_users_scenario() {
    let (_temp, engine) = setup_temp_engine();

    engine.create_table("users").unwrap();
    engine.set("users", "u1", "{\"name\":\"John\"}").unwrap();
    assert_eq!(engine.get("users", "u1").unwrap(), "{\"name\":\"John\"}");

    engine.delete_table("users").unwrap();
    assert!(engine.get("users", "u1").unwrap_err().is_not_found());
}

// =============================================================================
// Persistence Tests
// =============================================================================

#[test]
fn test_engine_every_mutation_persists() {
    let (temp, engine) = setup_temp_engine();
    let data_file = temp.path().join("data.json");

    engine.create_table("t").unwrap();
    assert_eq!(read_snapshot(&data_file).unwrap().names(), vec!["t"]);

    engine.set("t", "k", "v").unwrap();
    assert_eq!(read_snapshot(&data_file).unwrap().get("t", "k").unwrap(), "v");

    engine.delete("t", "k").unwrap();
    assert!(read_snapshot(&data_file).unwrap().table("t").unwrap().is_empty());

    engine.delete_table("t").unwrap();
    assert!(read_snapshot(&data_file).unwrap().is_empty());
}

#[test]
fn test_engine_snapshot_layout() {
    let (temp, engine) = setup_temp_engine();

    engine.create_table("users").unwrap();
    engine.set("users", "u1", "John").unwrap();
    engine.create_table("empty").unwrap();

    let raw = fs::read_to_string(temp.path().join("data.json")).unwrap();
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();

    assert_eq!(json, serde_json::json!({ "empty": {}, "users": { "u1": "John" } }));
}

#[test]
fn test_engine_reads_do_not_persist() {
    let (temp, engine) = setup_temp_engine();

    let _ = engine.get("t", "k");
    let _ = engine.list_keys("t");

    assert!(!temp.path().join("data.json").exists());
}

#[test]
fn test_engine_reopen_restores_state() {
    let temp = TempDir::new().unwrap();

    {
        let engine = reopen(&temp);
        engine.create_table("users").unwrap();
        engine.set("users", "u1", "one").unwrap();
        engine.set("users", "u2", "two").unwrap();
        engine.create_table("orders").unwrap();
        engine.delete("users", "u2").unwrap();
    }

    let engine = reopen(&temp);
    assert_eq!(engine.list_tables(), vec!["orders", "users"]);
    assert_eq!(engine.list_keys("users").unwrap(), vec!["u1"]);
    assert_eq!(engine.get("users", "u1").unwrap(), "one");
}

#[test]
fn test_engine_overwrite_strategy_persists() {
    let temp = TempDir::new().unwrap();
    let data_file = temp.path().join("data.json");
    let config = Config::builder()
        .data_file(&data_file)
        .persist_strategy(PersistStrategy::Overwrite)
        .build();

    let engine = Engine::open(config).unwrap();
    engine.create_table("t").unwrap();
    engine.set("t", "k", "v").unwrap();

    assert_eq!(read_snapshot(&data_file).unwrap().get("t", "k").unwrap(), "v");
}

#[test]
fn test_engine_open_malformed_file_fails() {
    let temp = TempDir::new().unwrap();
    let data_file = temp.path().join("data.json");
    fs::write(&data_file, "{ not json").unwrap();

    let result = Engine::open_path(&data_file);
    assert!(matches!(result, Err(GemError::Decode(_))));
}

#[test]
fn test_engine_persist_failure_is_returned_not_rolled_back() {
    let temp = TempDir::new().unwrap();
    // Parent directory does not exist, so every write fails
    let data_file = temp.path().join("missing-dir").join("data.json");
    let engine = Engine::open_path(&data_file).unwrap();

    let result = engine.create_table("t");
    assert!(matches!(result, Err(GemError::Io(_))));

    // Memory is ahead of disk
    assert_eq!(engine.list_tables(), vec!["t"]);
}

// =============================================================================
// Export / Import Tests
// =============================================================================

#[test]
fn test_engine_export_import_round_trip() {
    let (temp, engine) = setup_temp_engine();

    engine.create_table("users").unwrap();
    engine.set("users", "u1", "{\"name\":\"John\"}").unwrap();
    engine.set("users", "u2", "").unwrap();
    engine.create_table("orders").unwrap();
    engine.set("orders", "o1", "line1\nline2").unwrap();
    engine.create_table("empty").unwrap();

    let export_path = temp.path().join("export.json");
    engine.export_to_file(&export_path).unwrap();

    let fresh_dir = TempDir::new().unwrap();
    let fresh = Engine::open_path(&fresh_dir.path().join("data.json")).unwrap();
    fresh.import_from_file(&export_path).unwrap();

    assert_eq!(fresh.list_tables(), engine.list_tables());
    for table in engine.list_tables() {
        assert_eq!(fresh.list_keys(&table).unwrap(), engine.list_keys(&table).unwrap());
        for key in engine.list_keys(&table).unwrap() {
            assert_eq!(fresh.get(&table, &key).unwrap(), engine.get(&table, &key).unwrap());
        }
    }
}

#[test]
fn test_engine_export_does_not_touch_data_file() {
    let (temp, engine) = setup_temp_engine();

    engine.create_table("t").unwrap();
    let before = fs::read(temp.path().join("data.json")).unwrap();

    engine.export_to_file(&temp.path().join("export.json")).unwrap();

    assert_eq!(fs::read(temp.path().join("data.json")).unwrap(), before);
    assert_eq!(engine.list_tables(), vec!["t"]);
}

#[test]
fn test_engine_import_replaces_state_and_persists() {
    let (temp, engine) = setup_temp_engine();

    engine.create_table("old").unwrap();

    let import_path = temp.path().join("import.json");
    fs::write(&import_path, r#"{"new":{"k":"v"}}"#).unwrap();

    engine.import_from_file(&import_path).unwrap();

    assert_eq!(engine.list_tables(), vec!["new"]);
    assert_eq!(engine.get("new", "k").unwrap(), "v");

    // Survives a restart
    let reopened = reopen(&temp);
    assert_eq!(reopened.list_tables(), vec!["new"]);
}

#[test]
fn test_engine_import_malformed_file_leaves_state() {
    let (temp, engine) = setup_temp_engine();

    engine.create_table("keep").unwrap();
    engine.set("keep", "k", "v").unwrap();

    let import_path = temp.path().join("bad.json");
    fs::write(&import_path, r#"{"t": ["not", "a", "table"]}"#).unwrap();

    let result = engine.import_from_file(&import_path);
    assert!(matches!(result, Err(GemError::Decode(_))));
    assert_eq!(engine.get("keep", "k").unwrap(), "v");
}

#[test]
fn test_engine_import_missing_file_fails() {
    let (temp, engine) = setup_temp_engine();

    let result = engine.import_from_file(&temp.path().join("nope.json"));
    assert!(matches!(result, Err(GemError::Io(_))));
}

// =============================================================================
// Concurrent Access Tests
// =============================================================================

#[test]
fn test_engine_concurrent_reads() {
    let (_temp, engine) = setup_temp_engine();
    let engine = Arc::new(engine);

    engine.create_table("t").unwrap();
    for i in 0..50 {
        engine.set("t", &format!("key{}", i), &format!("value{}", i)).unwrap();
    }

    let mut handles = vec![];
    for _ in 0..4 {
        let engine_clone = Arc::clone(&engine);
        handles.push(thread::spawn(move || {
            for i in 0..50 {
                let value = engine_clone.get("t", &format!("key{}", i)).unwrap();
                assert_eq!(value, format!("value{}", i));
            }
        }));
    }

    for handle in handles {
        handle.join().unwrap();
    }
}

#[test]
fn test_engine_concurrent_writes() {
    let (temp, engine) = setup_temp_engine();
    let engine = Arc::new(engine);

    engine.create_table("t").unwrap();

    let mut handles = vec![];
    for t in 0..4 {
        let engine_clone = Arc::clone(&engine);
        handles.push(thread::spawn(move || {
            for i in 0..20 {
                let key = format!("thread{}_key{}", t, i);
                let value = format!("thread{}_value{}", t, i);
                engine_clone.set("t", &key, &value).unwrap();
            }
        }));
    }

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(engine.record_count(), 80);

    // The last persisted snapshot contains every write
    let on_disk = read_snapshot(&temp.path().join("data.json")).unwrap();
    assert_eq!(on_disk.record_count(), 80);
}

#[test]
fn test_engine_concurrent_create_same_table() {
    let (_temp, engine) = setup_temp_engine();
    let engine = Arc::new(engine);

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let engine_clone = Arc::clone(&engine);
            thread::spawn(move || engine_clone.create_table("shared").is_ok())
        })
        .collect();

    let successes = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(|ok| *ok)
        .count();

    assert_eq!(successes, 1);
}

#[test]
fn test_engine_concurrent_exports_same_path() {
    let (temp, engine) = setup_temp_engine();
    let engine = Arc::new(engine);

    engine.create_table("t").unwrap();
    for i in 0..200 {
        engine.set("t", &format!("key{}", i), &format!("value{}", i)).unwrap();
    }

    let export_path = Arc::new(temp.path().join("export.json"));
    for _ in 0..10 {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let engine_clone = Arc::clone(&engine);
                let path = Arc::clone(&export_path);
                thread::spawn(move || engine_clone.export_to_file(&path))
            })
            .collect();

        for handle in handles {
            handle.join().unwrap().unwrap();
        }

        assert_eq!(read_snapshot(&export_path).unwrap().record_count(), 200);
    }

    // Only the data file and the export remain
    let mut names: Vec<_> = fs::read_dir(temp.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().into_string().unwrap())
        .collect();
    names.sort();
    assert_eq!(names, vec!["data.json", "export.json"]);
}

#[test]
fn test_engine_concurrent_exports_overwrite_strategy() {
    let temp = TempDir::new().unwrap();
    let config = Config::builder()
        .data_file(temp.path().join("data.json"))
        .persist_strategy(PersistStrategy::Overwrite)
        .build();
    let engine = Arc::new(Engine::open(config).unwrap());

    engine.create_table("t").unwrap();
    for i in 0..200 {
        engine.set("t", &format!("key{}", i), "v").unwrap();
    }

    let export_path = Arc::new(temp.path().join("export.json"));
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let engine_clone = Arc::clone(&engine);
            let path = Arc::clone(&export_path);
            thread::spawn(move || engine_clone.export_to_file(&path))
        })
        .collect();

    for handle in handles {
        handle.join().unwrap().unwrap();
    }

    assert_eq!(read_snapshot(&export_path).unwrap().record_count(), 200);
}

// =============================================================================
// Edge Cases
// =============================================================================

#[test]
fn test_engine_empty_names_and_values() {
    let (_temp, engine) = setup_temp_engine();

    engine.create_table("").unwrap();
    engine.set("", "", "").unwrap();

    assert_eq!(engine.get("", "").unwrap(), "");
}

#[test]
fn test_engine_large_value() {
    let (temp, engine) = setup_temp_engine();

    let large_value = "x".repeat(100_000);
    engine.create_table("t").unwrap();
    engine.set("t", "large", &large_value).unwrap();

    assert_eq!(engine.get("t", "large").unwrap(), large_value);
    assert_eq!(reopen(&temp).get("t", "large").unwrap(), large_value);
}

#[test]
fn test_engine_unicode_round_trip() {
    let (temp, engine) = setup_temp_engine();

    engine.create_table("пользователи").unwrap();
    engine.set("пользователи", "ключ", "значение ✓").unwrap();

    let reopened = reopen(&temp);
    assert_eq!(reopened.get("пользователи", "ключ").unwrap(), "значение ✓");
}
