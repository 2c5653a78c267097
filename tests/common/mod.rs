use std::fs::File;
use std::io::Error;
use std::path::Path;

/// Writes an accounts CSV with the standard event setup: customer (1),
/// sale_exit (2), cash_exit (3), cash_topup_source (4).
pub fn write_accounts_csv(path: &Path) -> Result<(), Error> {
    let file = File::create(path)?;
    let mut wtr = csv::WriterBuilder::new().from_writer(file);
    wtr.write_record(["type", "name"])?;
    wtr.write_record(["private", "customer"])?;
    wtr.write_record(["sale_exit", "sale exit"])?;
    wtr.write_record(["cash_exit", "cash exit"])?;
    wtr.write_record(["cash_topup_source", "top-up source"])?;
    wtr.flush()?;
    Ok(())
}

pub fn write_transfers_csv(path: &Path, rows: &[(&str, u64, u64, &str)]) -> Result<(), Error> {
    let file = File::create(path)?;
    let mut wtr = csv::WriterBuilder::new().from_writer(file);
    wtr.write_record(["kind", "debit", "credit", "amount"])?;
    for (kind, debit, credit, amount) in rows {
        wtr.write_record([
            kind.to_string(),
            debit.to_string(),
            credit.to_string(),
            amount.to_string(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}
