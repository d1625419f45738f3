use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::{settle_balances, Amount, BalanceEntry, Expense, Payment};

/// The in-memory ledger: the people in the group and the expenses they split,
/// both in insertion order. Balances and settlement plans are recomputed from
/// the expense list on every query; nothing derived is stored.
///
/// Every mutation validates first and leaves the ledger untouched on failure.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ledger {
    people: Vec<String>,
    expenses: Vec<Expense>,
}

/// Plain serializable ledger state, the shape external stores and snapshot
/// files exchange. Going back through [`Ledger::from_snapshot`] re-validates
/// everything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub people: Vec<String>,
    pub expenses: Vec<Expense>,
}

/// What a person's removal did to the expense list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RemovalSummary {
    /// Expenses deleted because the removed person had paid them
    pub paid_dropped: usize,
    /// Surviving expenses that lost the removed person from their split
    pub trimmed: usize,
    /// Expenses deleted because their split became empty
    pub emptied: usize,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// People in insertion order.
    pub fn people(&self) -> &[String] {
        &self.people
    }

    /// Expenses in insertion order. Positions in this slice are the indices
    /// accepted by [`Ledger::remove_expense`].
    pub fn expenses(&self) -> &[Expense] {
        &self.expenses
    }

    /// Returns true if a person with this exact name is in the group.
    /// Names are case-sensitive.
    pub fn contains(&self, name: &str) -> bool {
        self.people.iter().any(|p| p == name)
    }

    /// Add a person to the group. The name is stored as given; callers that
    /// accept free-form input should trim it first.
    pub fn add_person(&mut self, name: &str) -> Result<(), LedgerError> {
        if name.trim().is_empty() {
            return Err(LedgerError::EmptyName);
        }
        if self.contains(name) {
            return Err(LedgerError::DuplicatePerson(name.to_string()));
        }
        self.people.push(name.to_string());
        Ok(())
    }

    /// Remove a person and cascade: expenses they paid are deleted, their
    /// name is stripped from every remaining split, and any expense whose
    /// split becomes empty is deleted too.
    pub fn remove_person(&mut self, name: &str) -> Result<RemovalSummary, LedgerError> {
        if !self.contains(name) {
            return Err(LedgerError::PersonNotFound(name.to_string()));
        }

        self.people.retain(|p| p != name);

        let before = self.expenses.len();
        self.expenses.retain(|e| e.paid_by != name);
        let paid_dropped = before - self.expenses.len();

        let mut stripped = 0;
        for expense in &mut self.expenses {
            let members = expense.split_between.len();
            expense.split_between.retain(|p| p != name);
            if expense.split_between.len() < members {
                stripped += 1;
            }
        }

        let before = self.expenses.len();
        self.expenses.retain(|e| !e.split_between.is_empty());
        let emptied = before - self.expenses.len();

        Ok(RemovalSummary {
            paid_dropped,
            trimmed: stripped - emptied,
            emptied,
        })
    }

    /// Record an expense paid by one person and split evenly among the given
    /// people. Returns the index of the new expense.
    pub fn add_expense(
        &mut self,
        amount: Amount,
        paid_by: &str,
        split_between: &[String],
    ) -> Result<usize, LedgerError> {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(LedgerError::InvalidAmount(amount));
        }
        if !self.contains(paid_by) {
            return Err(LedgerError::UnknownParticipant(paid_by.to_string()));
        }
        if split_between.is_empty() {
            return Err(LedgerError::EmptySplit);
        }
        for (i, member) in split_between.iter().enumerate() {
            if !self.contains(member) {
                return Err(LedgerError::UnknownParticipant(member.clone()));
            }
            if split_between[..i].contains(member) {
                return Err(LedgerError::DuplicateSplitMember(member.clone()));
            }
        }

        self.expenses
            .push(Expense::new(amount, paid_by, split_between.to_vec()));
        Ok(self.expenses.len() - 1)
    }

    /// Remove the expense at `index` and return it. Later expenses shift
    /// down one slot, so indices must be re-read after a removal.
    pub fn remove_expense(&mut self, index: usize) -> Result<Expense, LedgerError> {
        if index >= self.expenses.len() {
            return Err(LedgerError::ExpenseOutOfRange {
                index,
                count: self.expenses.len(),
            });
        }
        Ok(self.expenses.remove(index))
    }

    /// Net balance per person, in person insertion order.
    pub fn balances(&self) -> Vec<BalanceEntry> {
        compute_balances(&self.people, &self.expenses)
    }

    /// Settlement plan for the current balances.
    pub fn settlement(&self) -> Vec<Payment> {
        settle_balances(&self.balances())
    }

    /// Plain-data copy of the current state.
    pub fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            people: self.people.clone(),
            expenses: self.expenses.clone(),
        }
    }

    /// Rebuild a ledger from stored state by replaying it through the normal
    /// mutations, so every invariant is re-checked. State that no sequence of
    /// ledger operations could have produced is rejected with the first
    /// violation found, never repaired.
    pub fn from_snapshot(snapshot: &LedgerSnapshot) -> Result<Self, LedgerError> {
        let mut ledger = Ledger::new();
        for name in &snapshot.people {
            ledger.add_person(name)?;
        }
        for expense in &snapshot.expenses {
            ledger.add_expense(expense.amount, &expense.paid_by, &expense.split_between)?;
        }
        Ok(ledger)
    }
}

/// Compute net balances for the given people over the given expenses.
///
/// Everyone starts at zero. For each expense, every split member other than
/// the payer owes one share; the payer is credited the same shares. A payer
/// who is also a split member carries their own share implicitly (it nets to
/// zero), so money never moves from a person to themselves.
///
/// Free function so integrity scans can run it over raw, unvalidated data;
/// references to unknown people are skipped there, which keeps the total
/// conserved.
pub fn compute_balances(people: &[String], expenses: &[Expense]) -> Vec<BalanceEntry> {
    let mut entries: Vec<BalanceEntry> = people
        .iter()
        .map(|name| BalanceEntry {
            person: name.clone(),
            balance: 0.0,
        })
        .collect();

    let index: HashMap<&str, usize> = people
        .iter()
        .enumerate()
        .map(|(i, name)| (name.as_str(), i))
        .collect();

    for expense in expenses {
        let payer = match index.get(expense.paid_by.as_str()) {
            Some(&i) => i,
            None => continue,
        };
        let share = expense.share();

        for member in &expense.split_between {
            if *member == expense.paid_by {
                continue;
            }
            let member = match index.get(member.as_str()) {
                Some(&i) => i,
                None => continue,
            };
            entries[member].balance -= share;
            entries[payer].balance += share;
        }
    }

    entries
}

#[derive(Debug, Clone, PartialEq)]
pub enum LedgerError {
    EmptyName,
    DuplicatePerson(String),
    PersonNotFound(String),
    InvalidAmount(Amount),
    EmptySplit,
    UnknownParticipant(String),
    DuplicateSplitMember(String),
    ExpenseOutOfRange { index: usize, count: usize },
}

impl std::fmt::Display for LedgerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LedgerError::EmptyName => {
                write!(f, "Person name must not be empty")
            }
            LedgerError::DuplicatePerson(name) => {
                write!(f, "Person already exists: {}", name)
            }
            LedgerError::PersonNotFound(name) => {
                write!(f, "Person not found: {}", name)
            }
            LedgerError::InvalidAmount(amount) => {
                write!(f, "Amount must be a positive number, got {}", amount)
            }
            LedgerError::EmptySplit => {
                write!(f, "An expense must be split between at least one person")
            }
            LedgerError::UnknownParticipant(name) => {
                write!(f, "Unknown person in expense: {}", name)
            }
            LedgerError::DuplicateSplitMember(name) => {
                write!(f, "Person listed twice in split: {}", name)
            }
            LedgerError::ExpenseOutOfRange { index, count } => {
                write!(f, "No expense at index {} ({} recorded)", index, count)
            }
        }
    }
}

impl std::error::Error for LedgerError {}
