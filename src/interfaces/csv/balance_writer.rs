use std::io::Write;

use crate::domain::account::Account;
use crate::error::Result;

/// Writes final account balances as CSV.
pub struct BalanceWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> BalanceWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write_accounts(&mut self, accounts: Vec<Account>) -> Result<()> {
        self.writer
            .write_record(["account_id", "type", "name", "balance"])?;
        for account in accounts {
            self.writer.write_record([
                account.id.to_string(),
                account.account_type.to_string(),
                account.name,
                account.balance.to_string(),
            ])?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
