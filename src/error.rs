use crate::model::Table;
use thiserror::Error;

/// Domain failures raised by the seeder itself. Database failures travel as
/// `anyhow::Error` with context attached at the call site.
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("cannot generate {child} rows without any {parent} rows to reference")]
    MissingParent { child: Table, parent: Table },

    #[error("{table} references missing {referenced} key {key}")]
    ForeignKey {
        table: Table,
        referenced: Table,
        key: String,
    },

    #[error("no {table} row with key {key}")]
    MissingRow { table: Table, key: String },

    #[error("injected failure on {table} insert #{row}")]
    Injected { table: Table, row: usize },
}
