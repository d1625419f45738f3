use thiserror::Error;

use crate::domain::LedgerError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Ledger(#[from] LedgerError),

    #[error("Ledger state failed validation: {0}")]
    CorruptedState(LedgerError),

    #[error("Database error: {0}")]
    Database(#[from] anyhow::Error),
}
