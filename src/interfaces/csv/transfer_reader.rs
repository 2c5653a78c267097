use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Read;

use crate::domain::transaction::{Leg, Transaction, TransactionKind, TransactionMetadata};
use crate::error::{LedgerError, Result};

#[derive(Debug, Deserialize)]
struct TransferRecord {
    kind: String,
    debit: u64,
    credit: u64,
    amount: Decimal,
}

/// Streams transfer instructions from a CSV source.
///
/// Expected header: `kind, debit, credit, amount`, with `amount` the
/// positive value moved from the debit to the credit account. Trims
/// whitespace and tolerates flexible record lengths.
pub struct TransferReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> TransferReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Lazily reads and converts records, so large files stream without
    /// loading everything into memory.
    pub fn transfers(self) -> impl Iterator<Item = Result<Transaction>> {
        self.reader
            .into_deserialize::<TransferRecord>()
            .map(|result| result.map_err(LedgerError::from).and_then(into_transaction))
    }
}

fn into_transaction(record: TransferRecord) -> Result<Transaction> {
    if record.amount <= Decimal::ZERO {
        return Err(LedgerError::Validation(format!(
            "transfer amount must be positive, got {}",
            record.amount
        )));
    }
    let kind: TransactionKind = record.kind.parse()?;
    Ok(Transaction::new(
        kind,
        vec![
            Leg::new(record.debit, -record.amount),
            Leg::new(record.credit, record.amount),
        ],
        TransactionMetadata::default(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn reads_valid_stream() {
        let data = "kind, debit, credit, amount\nsale, 1, 2, 3.50\ntop_up, 3, 1, 20";
        let reader = TransferReader::new(data.as_bytes());
        let transfers: Vec<Result<Transaction>> = reader.transfers().collect();

        assert_eq!(transfers.len(), 2);
        let tx = transfers[0].as_ref().unwrap();
        assert_eq!(tx.kind, TransactionKind::Sale);
        assert_eq!(tx.legs[0], Leg::new(1, dec!(-3.50)));
        assert_eq!(tx.legs[1], Leg::new(2, dec!(3.50)));
    }

    #[test]
    fn rejects_unknown_kind() {
        let data = "kind, debit, credit, amount\nrefund, 1, 2, 3.50";
        let reader = TransferReader::new(data.as_bytes());
        let transfers: Vec<Result<Transaction>> = reader.transfers().collect();
        assert!(matches!(transfers[0], Err(LedgerError::Validation(_))));
    }

    #[test]
    fn rejects_non_positive_amount() {
        let data = "kind, debit, credit, amount\nsale, 1, 2, -5";
        let reader = TransferReader::new(data.as_bytes());
        let transfers: Vec<Result<Transaction>> = reader.transfers().collect();
        assert!(matches!(transfers[0], Err(LedgerError::Validation(_))));
    }

    #[test]
    fn malformed_line_yields_csv_error() {
        let data = "kind, debit, credit, amount\nsale, x, 2, 3.50";
        let reader = TransferReader::new(data.as_bytes());
        let transfers: Vec<Result<Transaction>> = reader.transfers().collect();
        assert!(matches!(transfers[0], Err(LedgerError::Csv(_))));
    }
}
