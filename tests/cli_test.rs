use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use assert_cmd::Command;
use tempfile::tempdir;

const CATALOG: &str = "tests/fixtures/catalog.json";

fn finbot() -> Command {
    let mut cmd = Command::new(cargo_bin!("finbot"));
    for var in [
        "FINBOT_BASE_URL",
        "FINBOT_ADMIN_IDS",
        "FINBOT_DB_PATH",
        "FINBOT_PAYMENT_COMMENT",
        "FINBOT_CURRENCY",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

#[test]
fn test_chat_refuses_unregistered_user() -> Result<(), Box<dyn std::error::Error>> {
    finbot()
        .args(["chat", "--user", "5", "--catalog", CATALOG])
        .write_stdin("Add expense\nquit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Choose an operation type:"))
        .stdout(predicate::str::contains("[1] Add expense"))
        .stdout(predicate::str::contains("not registered"))
        .stdout(predicate::str::contains("Admin").not());

    Ok(())
}

#[test]
fn test_chat_admin_registers_then_records_and_exports() -> Result<(), Box<dyn std::error::Error>> {
    let reports = tempdir()?;
    let script = [
        "Admin",
        "Register user",
        "1",
        "secret-key",
        "-",
        "Back",
        "Add expense",
        "Warehouse",
        "Acme LLC",
        // Numbered answers pick from the offered options.
        "2",
        "250,75",
        "Office supplies",
        "Yes",
        "Admin",
        "Export operations (CSV)",
        "quit",
    ]
    .join("\n");

    finbot()
        .args(["--admin-ids", "1", "chat", "--user", "1", "--catalog", CATALOG])
        .arg("--report-dir")
        .arg(reports.path())
        .write_stdin(script)
        .assert()
        .success()
        .stdout(predicate::str::contains("User 1 registered."))
        .stdout(predicate::str::contains("[2] Reserve (5678)"))
        .stdout(predicate::str::contains("Amount: 250.75"))
        .stdout(predicate::str::contains("Expense recorded successfully!"))
        .stdout(predicate::str::contains("Report saved to"));

    let files: Vec<_> = fs::read_dir(reports.path())?.collect::<Result<_, _>>()?;
    assert_eq!(files.len(), 1);
    let report = fs::read_to_string(files[0].path())?;
    let mut lines = report.lines();
    assert_eq!(lines.next(), Some("user_id,operation_type,operation_date"));
    let row = lines.next().expect("one operation row");
    assert!(row.starts_with("1,expense,"), "unexpected row {:?}", row);
    assert_eq!(lines.next(), None);

    Ok(())
}

#[test]
fn test_export_needs_persistent_storage() -> Result<(), Box<dyn std::error::Error>> {
    finbot()
        .arg("export")
        .assert()
        .failure()
        .stderr(predicate::str::contains("`export` needs persistent storage"))
        .stdout(predicate::str::is_empty());

    Ok(())
}

#[test]
fn test_register_needs_persistent_storage() -> Result<(), Box<dyn std::error::Error>> {
    finbot()
        .args(["register", "--user", "7", "--api-key", "k-7"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("`register` needs persistent storage"))
        .stdout(predicate::str::contains("registered").not());

    Ok(())
}

#[test]
fn test_invalid_admin_ids_are_rejected() -> Result<(), Box<dyn std::error::Error>> {
    finbot()
        .args(["--admin-ids", "1,abc", "chat", "--user", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid user id"));

    Ok(())
}

#[cfg(not(feature = "storage-rocksdb"))]
#[test]
fn test_db_path_without_rocksdb_cannot_register() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;

    finbot()
        .arg("--db-path")
        .arg(dir.path().join("db"))
        .args(["register", "--user", "7", "--api-key", "k-7"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("'storage-rocksdb' feature is not enabled"))
        .stderr(predicate::str::contains("`register` needs persistent storage"));

    Ok(())
}

#[cfg(feature = "storage-rocksdb")]
#[test]
fn test_export_of_empty_database_prints_header() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;

    finbot()
        .arg("--db-path")
        .arg(dir.path().join("db"))
        .arg("export")
        .assert()
        .success()
        .stdout(predicate::eq("user_id,operation_type,operation_date\n"));

    Ok(())
}

#[cfg(feature = "storage-rocksdb")]
#[test]
fn test_registration_and_operations_persist_across_runs() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let db = dir.path().join("db");

    finbot()
        .arg("--db-path")
        .arg(&db)
        .args(["register", "--user", "7", "--api-key", "k-7"])
        .assert()
        .success()
        .stdout(predicate::str::contains("User 7 registered."));

    let script = [
        "Add income",
        "No project",
        "Globex",
        "Globex main (9999)",
        "42",
        "Consulting",
        "Yes",
        "quit",
    ]
    .join("\n");
    finbot()
        .arg("--db-path")
        .arg(&db)
        .args(["chat", "--user", "7", "--catalog", CATALOG])
        .write_stdin(script)
        .assert()
        .success()
        .stdout(predicate::str::contains("Income recorded successfully!"));

    finbot()
        .arg("--db-path")
        .arg(&db)
        .arg("export")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("user_id,operation_type,operation_date\n7,income,"));

    Ok(())
}
