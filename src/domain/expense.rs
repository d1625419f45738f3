use serde::{Deserialize, Serialize};

use super::Amount;

/// A shared expense: one person paid, a set of people split the cost evenly.
/// People are referenced by name; the owning ledger keeps the references valid.
/// Expenses have no identity of their own, their position in the ledger is
/// their handle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    /// Total amount paid (always positive)
    pub amount: Amount,
    /// Name of the person who paid
    pub paid_by: String,
    /// Names of the people sharing the cost (never empty, no duplicates)
    pub split_between: Vec<String>,
}

impl Expense {
    pub fn new(amount: Amount, paid_by: impl Into<String>, split_between: Vec<String>) -> Self {
        Self {
            amount,
            paid_by: paid_by.into(),
            split_between,
        }
    }

    /// The even per-person share of this expense.
    pub fn share(&self) -> Amount {
        self.amount / self.split_between.len() as Amount
    }

    /// Returns true if the person paid for or shares in this expense.
    pub fn involves(&self, name: &str) -> bool {
        self.paid_by == name || self.split_between.iter().any(|p| p == name)
    }
}
