pub mod balance_writer;
pub mod transfer_reader;
