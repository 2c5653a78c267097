mod common;

use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;
use tempfile::tempdir;

#[test]
fn processes_transfers_and_prints_balances() {
    let dir = tempdir().unwrap();
    let accounts = dir.path().join("accounts.csv");
    let transfers = dir.path().join("transfers.csv");
    common::write_accounts_csv(&accounts).unwrap();
    common::write_transfers_csv(
        &transfers,
        &[
            ("top_up", 4, 1, "100.00"),
            ("sale", 1, 2, "37.50"),
            ("payout", 1, 3, "20.00"),
        ],
    )
    .unwrap();

    let mut cmd = Command::new(cargo_bin!("festipay"));
    cmd.arg(&accounts).arg(&transfers);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("account_id,type,name,balance"))
        .stdout(predicate::str::contains("1,private,customer,42.50"))
        .stdout(predicate::str::contains("2,sale_exit,sale exit,37.50"))
        .stdout(predicate::str::contains("4,cash_topup_source,top-up source,-100.00"));
}

#[test]
fn rejected_transfers_do_not_change_balances() {
    let dir = tempdir().unwrap();
    let accounts = dir.path().join("accounts.csv");
    let transfers = dir.path().join("transfers.csv");
    common::write_accounts_csv(&accounts).unwrap();
    common::write_transfers_csv(
        &transfers,
        &[
            ("top_up", 4, 1, "50.00"),
            // Overdraws the customer: rejected, balances untouched.
            ("sale", 1, 2, "80.00"),
            // A sale cannot credit cash_exit: pairing rejection.
            ("sale", 1, 3, "10.00"),
        ],
    )
    .unwrap();

    let mut cmd = Command::new(cargo_bin!("festipay"));
    cmd.arg(&accounts).arg(&transfers);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("1,private,customer,50.00"))
        .stderr(predicate::str::contains("insufficient funds"))
        .stderr(predicate::str::contains("not permitted"));
}

#[test]
fn missing_accounts_file_fails() {
    let dir = tempdir().unwrap();
    let transfers = dir.path().join("transfers.csv");
    common::write_transfers_csv(&transfers, &[]).unwrap();

    let mut cmd = Command::new(cargo_bin!("festipay"));
    cmd.arg(dir.path().join("nope.csv")).arg(&transfers);
    cmd.assert().failure();
}
