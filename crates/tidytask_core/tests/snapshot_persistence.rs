use chrono::DateTime;
use rusqlite::Connection;
use serde_json::Value;
use tidytask_core::db::{open_store, open_store_in_memory};
use tidytask_core::{SqliteSnapshotStore, TaskStore, TASKS_KEY};

fn raw_snapshot(conn: &Connection) -> Option<String> {
    conn.query_row(
        "SELECT value FROM local_store WHERE key = ?1;",
        [TASKS_KEY],
        |row| row.get(0),
    )
    .ok()
}

fn write_snapshot(conn: &Connection, value: &str) {
    conn.execute(
        "INSERT INTO local_store (key, value) VALUES (?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value;",
        [TASKS_KEY, value],
    )
    .unwrap();
}

#[test]
fn missing_snapshot_starts_an_empty_store_without_warning() {
    let conn = open_store_in_memory().unwrap();
    let store = TaskStore::open(SqliteSnapshotStore::new(&conn)).unwrap();

    assert!(store.is_empty());
    assert!(store.load_warning().is_none());
}

#[test]
fn persist_and_reload_reproduces_the_identical_collection() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("tasks.sqlite3");

    let saved = {
        let conn = open_store(&db_path).unwrap();
        let mut store = TaskStore::open(SqliteSnapshotStore::new(&conn)).unwrap();
        store.add("buy milk").unwrap();
        let second = store.add("walk the dog").unwrap();
        store.add("call grandma").unwrap();
        store.toggle(second).unwrap();
        store.tasks().to_vec()
    };

    let conn = open_store(&db_path).unwrap();
    let reloaded = TaskStore::open(SqliteSnapshotStore::new(&conn)).unwrap();

    assert!(reloaded.load_warning().is_none());
    assert_eq!(reloaded.tasks(), saved.as_slice());
}

#[test]
fn id_counter_continues_after_reload() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("tasks.sqlite3");

    let max_id = {
        let conn = open_store(&db_path).unwrap();
        let mut store = TaskStore::open(SqliteSnapshotStore::new(&conn)).unwrap();
        store.add("first task").unwrap();
        store.add("second task").unwrap()
    };

    let conn = open_store(&db_path).unwrap();
    let mut store = TaskStore::open(SqliteSnapshotStore::new(&conn)).unwrap();
    let next = store.add("third task").unwrap();

    assert!(next > max_id);
}

#[test]
fn every_mutation_writes_through_to_storage() {
    let conn = open_store_in_memory().unwrap();
    let mut store = TaskStore::open(SqliteSnapshotStore::new(&conn)).unwrap();

    let id = store.add("buy milk").unwrap();
    let after_add: Vec<Value> =
        serde_json::from_str(&raw_snapshot(&conn).expect("snapshot after add")).unwrap();
    assert_eq!(after_add.len(), 1);

    store.toggle(id).unwrap();
    let after_toggle: Vec<Value> =
        serde_json::from_str(&raw_snapshot(&conn).unwrap()).unwrap();
    assert_eq!(after_toggle[0]["completed"], Value::Bool(true));

    store.remove(id).unwrap();
    let after_remove: Vec<Value> =
        serde_json::from_str(&raw_snapshot(&conn).unwrap()).unwrap();
    assert!(after_remove.is_empty());
}

#[test]
fn snapshot_records_use_the_external_field_names() {
    let conn = open_store_in_memory().unwrap();
    let mut store = TaskStore::open(SqliteSnapshotStore::new(&conn)).unwrap();
    store.add("buy milk").unwrap();

    let records: Vec<Value> = serde_json::from_str(&raw_snapshot(&conn).unwrap()).unwrap();
    let record = records[0].as_object().unwrap();

    let mut keys: Vec<_> = record.keys().map(String::as_str).collect();
    keys.sort_unstable();
    assert_eq!(keys, vec!["completed", "createdAt", "id", "text"]);

    assert!(record["id"].is_u64());
    assert_eq!(record["text"], Value::String("buy milk".to_string()));
    assert_eq!(record["completed"], Value::Bool(false));

    let created_at = record["createdAt"].as_str().expect("createdAt is a string");
    DateTime::parse_from_rfc3339(created_at).expect("createdAt is ISO-8601");
}

#[test]
fn unparseable_snapshot_degrades_to_an_empty_store_with_a_warning() {
    let conn = open_store_in_memory().unwrap();
    write_snapshot(&conn, "definitely { not json");

    let mut store = TaskStore::open(SqliteSnapshotStore::new(&conn)).unwrap();
    assert!(store.is_empty());
    let warning = store.load_warning().expect("corrupt snapshot records a warning");
    assert!(warning.contains("unparseable"));

    // The store keeps working and the next write replaces the bad value.
    store.add("fresh start").unwrap();
    let records: Vec<Value> = serde_json::from_str(&raw_snapshot(&conn).unwrap()).unwrap();
    assert_eq!(records.len(), 1);
}

#[test]
fn snapshot_with_duplicate_ids_is_treated_as_corrupt() {
    let conn = open_store_in_memory().unwrap();
    write_snapshot(
        &conn,
        r#"[
            {"id": 1, "text": "buy milk", "completed": false, "createdAt": "2026-03-14T09:00:00Z"},
            {"id": 1, "text": "walk the dog", "completed": true, "createdAt": "2026-03-14T09:01:00Z"}
        ]"#,
    );

    let store = TaskStore::open(SqliteSnapshotStore::new(&conn)).unwrap();
    assert!(store.is_empty());
    assert!(store.load_warning().unwrap().contains("duplicate task id"));
}

#[test]
fn snapshot_written_by_an_external_tool_round_trips() {
    let conn = open_store_in_memory().unwrap();
    write_snapshot(
        &conn,
        r#"[{"id": 42, "text": "imported task", "completed": true, "createdAt": "2025-12-01T08:30:00.000Z"}]"#,
    );

    let store = TaskStore::open(SqliteSnapshotStore::new(&conn)).unwrap();
    assert!(store.load_warning().is_none());
    assert_eq!(store.tasks().len(), 1);

    let task = &store.tasks()[0];
    assert_eq!(task.id, 42);
    assert_eq!(task.text, "imported task");
    assert!(task.completed);
}
