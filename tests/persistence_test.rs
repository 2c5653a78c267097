#![cfg(feature = "storage-rocksdb")]

mod common;

use assert_cmd::cargo_bin;
use predicates::prelude::*;
use std::process::Command;
use tempfile::tempdir;

/// Balances must survive process restarts: the second run restores them
/// by replaying the persistent log before applying new transfers.
#[test]
fn balances_are_restored_from_the_log_across_runs() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("ledger_log");
    let accounts = dir.path().join("accounts.csv");
    common::write_accounts_csv(&accounts).unwrap();

    let transfers1 = dir.path().join("transfers1.csv");
    common::write_transfers_csv(&transfers1, &[("top_up", 4, 1, "100.00")]).unwrap();

    let output = Command::new(cargo_bin!("festipay"))
        .arg(&accounts)
        .arg(&transfers1)
        .arg("--db-path")
        .arg(&db_path)
        .output()
        .expect("first run failed to execute");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("1,private,customer,100.00"));

    let transfers2 = dir.path().join("transfers2.csv");
    common::write_transfers_csv(&transfers2, &[("sale", 1, 2, "30.00")]).unwrap();

    let output = Command::new(cargo_bin!("festipay"))
        .arg(&accounts)
        .arg(&transfers2)
        .arg("--db-path")
        .arg(&db_path)
        .output()
        .expect("second run failed to execute");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    // 100 restored from the log, minus the new sale.
    assert!(predicate::str::contains("1,private,customer,70.00").eval(&stdout));
    assert!(predicate::str::contains("2,sale_exit,sale exit,30.00").eval(&stdout));
}
