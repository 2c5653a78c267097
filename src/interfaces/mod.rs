//! Interface adapters: the logical request/response contracts the core
//! exposes to collaborator layers (transport left to them) and the CSV
//! adapters used by the CLI.

pub mod api;
pub mod csv;
