#![cfg(feature = "test-utils")]

use std::time::Duration;

use sql_facade::prelude::*;
use sql_facade::test_utils::postgres::{setup_postgres_embedded, stop_postgres_embedded};

#[test]
fn test05_postgres_operations_against_a_live_server() -> Result<(), Box<dyn std::error::Error>> {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    let pg = setup_postgres_embedded("facade_test")?;
    let result = exercise(&pg.options);
    stop_postgres_embedded(pg);
    result
}

fn exercise(opts: &ConnectOptions) -> Result<(), Box<dyn std::error::Error>> {
    let mut db = PostgresDatabase::connect(opts.clone())?;

    let rows: Vec<DbRow> = db.select("SELECT 1 AS x", &[])?.collect();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get("x"), Some(&RowValues::Int(1)));

    db.perform(
        "CREATE TABLE users (id BIGINT PRIMARY KEY, name TEXT NOT NULL, score DOUBLE PRECISION, \
         active BOOLEAN, created TIMESTAMP)",
        &[],
    )?;
    assert_eq!(db.perform("UPDATE users SET name='x' WHERE 1=0", &[])?, 0);

    let created = chrono::NaiveDate::from_ymd_opt(2024, 5, 1)
        .and_then(|d| d.and_hms_opt(12, 30, 0))
        .ok_or("bad date")?;
    let inserted = db.perform(
        "INSERT INTO users (id, name, score, active, created) VALUES (?, ?, ?, ?, ?)",
        &params![1, "alice", 9.5, true, created],
    )?;
    assert_eq!(inserted, 1);
    db.perform(
        "INSERT INTO users (id, name, score, active, created) VALUES (?, ?, ?, ?, ?)",
        &params![2, "bob", None::<f64>, false, None::<chrono::NaiveDateTime>],
    )?;

    let rows: Vec<DbRow> = db
        .select("SELECT id, name, score, active, created FROM users ORDER BY id", &[])?
        .collect();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].get("name").and_then(RowValues::as_text), Some("alice"));
    assert_eq!(rows[0].get("score").and_then(RowValues::as_float), Some(9.5));
    assert_eq!(rows[0].get("active").and_then(RowValues::as_bool), Some(true));
    assert_eq!(rows[0].get("created").and_then(RowValues::as_timestamp), Some(created));
    assert_eq!(rows[1].get("score"), Some(&RowValues::Null));

    // Placeholders inside literals are left alone.
    let rows: Vec<DbRow> = db
        .select("SELECT '?' AS q, name FROM users WHERE id = ?", &params![2])?
        .collect();
    assert_eq!(rows[0].get("q").and_then(RowValues::as_text), Some("?"));

    // Untyped placeholders are bound in their text form.
    let rows: Vec<DbRow> = db.select("SELECT ? AS x", &params![1])?.collect();
    assert_eq!(rows[0].get("x"), Some(&RowValues::Text("1".into())));
    let rows: Vec<DbRow> = db.select("SELECT ?::int AS x, ? AS flag", &params![1, true])?.collect();
    assert_eq!(rows[0].get("x"), Some(&RowValues::Int(1)));
    assert_eq!(rows[0].get("flag"), Some(&RowValues::Text("true".into())));

    // Types without a dedicated variant.
    db.perform(
        "CREATE TABLE ledger (id BIGINT PRIMARY KEY, amount NUMERIC(10,2), token UUID, \
         starts_at TIME, doc JSONB, span INTERVAL DEFAULT 'P1M2DT3.5S', \
         addr INET DEFAULT '10.0.0.1', mood TEXT)",
        &[],
    )?;
    let token = "67e55044-10b1-426f-9247-bb680e5fe0c8";
    db.perform(
        "INSERT INTO ledger (id, amount, token, starts_at, doc) VALUES (?, ?, ?, ?, ?)",
        &params![1, 5, token, "12:30:00", serde_json::json!({"a": 1})],
    )?;
    db.perform(
        "INSERT INTO ledger (id, amount, token, starts_at, doc) VALUES (?, ?, ?, ?, ?)",
        &params![2, 12.34, None::<String>, None::<String>, r#"{"b": [1, 2]}"#],
    )?;

    let rows: Vec<DbRow> = db
        .select(
            "SELECT amount, token, starts_at, doc, span, addr FROM ledger ORDER BY id",
            &[],
        )?
        .collect();
    assert_eq!(rows[0].get("amount"), Some(&RowValues::Float(5.0)));
    assert_eq!(rows[0].get("token"), Some(&RowValues::Text(token.into())));
    assert_eq!(rows[0].get("starts_at"), Some(&RowValues::Text("12:30:00".into())));
    assert_eq!(
        rows[0].get("doc"),
        Some(&RowValues::JSON(serde_json::json!({"a": 1})))
    );
    assert_eq!(rows[0].get("span"), Some(&RowValues::Text("P1M2DT3.5S".into())));
    assert_eq!(rows[0].get("addr"), Some(&RowValues::Text("10.0.0.1".into())));
    assert_eq!(rows[1].get("amount"), Some(&RowValues::Float(12.34)));
    assert_eq!(rows[1].get("token"), Some(&RowValues::Null));
    assert_eq!(
        rows[1].get("doc"),
        Some(&RowValues::JSON(serde_json::json!({"b": [1, 2]})))
    );

    // Values read back bind again unchanged.
    let mut copy = vec![RowValues::Int(3)];
    copy.extend(rows[0].values().iter().cloned());
    db.perform(
        "INSERT INTO ledger (id, amount, token, starts_at, doc, span, addr) \
         VALUES (?, ?, ?, ?, ?, ?::text::interval, ?::text::inet)",
        &copy,
    )?;
    let again: Vec<DbRow> = db
        .select(
            "SELECT amount, token, starts_at, doc, span, addr FROM ledger WHERE id = ?",
            &params![3],
        )?
        .collect();
    assert_eq!(again[0], rows[0]);

    let rows: Vec<DbRow> = db
        .select(
            "SELECT avg(id) AS mean, sum(id) AS total, gen_random_uuid() AS fresh FROM ledger",
            &[],
        )?
        .collect();
    assert_eq!(rows[0].get("mean"), Some(&RowValues::Float(2.0)));
    assert_eq!(rows[0].get("total"), Some(&RowValues::Float(6.0)));
    assert_eq!(
        rows[0].get("fresh").and_then(RowValues::as_text).map(str::len),
        Some(36)
    );

    // Constraint violation: rolled back, same connection, handle still usable.
    let generation = db.connection_generation();
    let err = match db.perform(
        "INSERT INTO users (id, name) VALUES (?, ?)",
        &params![1, "dup"],
    ) {
        Err(err) => err,
        Ok(_) => panic!("duplicate key should fail"),
    };
    assert!(matches!(err, SqlFacadeError::PostgresError(_)));
    assert!(!err.is_operational());
    assert_eq!(db.last_call_state(), CallState::RolledBack);
    assert_eq!(db.connection_generation(), generation);
    assert_eq!(db.select("SELECT id FROM users", &[])?.len(), 2);

    // Stored routines through the native call.
    db.perform(
        "CREATE FUNCTION add_numbers(a integer, b integer) RETURNS integer \
         AS $$ SELECT a + b $$ LANGUAGE sql",
        &[],
    )?;
    db.perform(
        "CREATE FUNCTION rename_user(user_id bigint, new_name text) RETURNS void \
         AS $$ UPDATE users SET name = new_name WHERE id = user_id $$ LANGUAGE sql",
        &[],
    )?;
    let mut rows = db.function("add_numbers", &named_args! { "b" => 3, "a" => 2 })?;
    let row = rows.next().ok_or("no row from add_numbers")?;
    assert_eq!(row.get("add_numbers"), Some(&RowValues::Int(5)));

    db.procedure("rename_user", &named_args! { "user_id" => 2, "new_name" => "carol" })?;
    let rows: Vec<DbRow> = db.select("SELECT name FROM users WHERE id = ?", &params![2])?.collect();
    assert_eq!(rows[0].get("name").and_then(RowValues::as_text), Some("carol"));

    // Transport failure: the server drops the session, the handle reconnects.
    let victim_opts = ConnectOptions {
        application_name: Some("facade-victim".to_string()),
        ..opts.clone()
    };
    let mut victim = PostgresDatabase::connect(victim_opts)?;
    victim.select("SELECT 1", &[])?;
    db.select(
        "SELECT pg_terminate_backend(pid) FROM pg_stat_activity WHERE application_name = ?",
        &params!["facade-victim"],
    )?;
    std::thread::sleep(Duration::from_millis(300));

    let before = victim.connection_generation();
    let err = match victim.select("SELECT 1", &[]) {
        Err(err) => err,
        Ok(_) => panic!("terminated session should fail"),
    };
    assert!(err.is_operational(), "{err:?}");
    assert_eq!(victim.last_call_state(), CallState::ReconnectedAndFailed);
    assert_ne!(victim.connection_generation(), before);
    assert_eq!(victim.select("SELECT 1 AS x", &[])?.len(), 1);

    Ok(())
}
