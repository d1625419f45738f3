use crate::domain::{
    verify_snapshot, Amount, BalanceEntry, Expense, IntegrityReport, Ledger, LedgerError,
    LedgerSnapshot, Payment, RemovalSummary,
};
use crate::storage::Repository;

use super::AppError;

/// Application service providing high-level operations for the shared-expense
/// ledger. This is the primary interface for any client (CLI, API, TUI, etc.).
///
/// Every call loads the stored ledger and re-validates it before acting, so
/// corrupted state surfaces immediately instead of poisoning later math.
pub struct LedgerService {
    repo: Repository,
}

/// Result of recording an expense
#[derive(Debug)]
pub struct ExpenseResult {
    pub index: usize,
    pub expense: Expense,
}

/// Detailed view of one person's position in the ledger
#[derive(Debug)]
pub struct PersonInfo {
    pub name: String,
    pub balance: Amount,
    pub expenses_paid: usize,
    pub total_paid: Amount,
    pub expenses_shared: usize,
    pub total_share: Amount,
}

impl LedgerService {
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    /// Create the database file (if needed) and migrate it.
    pub async fn init(database_path: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}?mode=rwc", database_path);
        let repo = Repository::init(&db_url).await?;
        Ok(Self::new(repo))
    }

    /// Open an existing database.
    pub async fn connect(database_path: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}", database_path);
        let repo = Repository::connect(&db_url).await?;
        Ok(Self::new(repo))
    }

    /// Load and re-validate the stored ledger.
    async fn load_ledger(&self) -> Result<Ledger, AppError> {
        let snapshot = self.repo.load().await?;
        Ledger::from_snapshot(&snapshot).map_err(AppError::CorruptedState)
    }

    // ========================
    // Person operations
    // ========================

    /// Add a person to the group.
    pub async fn add_person(&self, name: &str) -> Result<(), AppError> {
        let mut ledger = self.load_ledger().await?;
        ledger.add_person(name)?;
        self.repo.append_person(name).await?;
        Ok(())
    }

    /// Remove a person and cascade the removal through the expense list.
    pub async fn remove_person(&self, name: &str) -> Result<RemovalSummary, AppError> {
        let mut ledger = self.load_ledger().await?;
        let summary = ledger.remove_person(name)?;
        self.repo.remove_person(name, ledger.expenses()).await?;
        Ok(summary)
    }

    /// List everyone in the group, in insertion order.
    pub async fn list_people(&self) -> Result<Vec<String>, AppError> {
        Ok(self.load_ledger().await?.people().to_vec())
    }

    /// Get one person's balance and activity.
    pub async fn person_info(&self, name: &str) -> Result<PersonInfo, AppError> {
        let ledger = self.load_ledger().await?;
        if !ledger.contains(name) {
            return Err(LedgerError::PersonNotFound(name.to_string()).into());
        }

        let balance = ledger
            .balances()
            .into_iter()
            .find(|e| e.person == name)
            .map(|e| e.balance)
            .unwrap_or(0.0);

        let mut info = PersonInfo {
            name: name.to_string(),
            balance,
            expenses_paid: 0,
            total_paid: 0.0,
            expenses_shared: 0,
            total_share: 0.0,
        };

        for expense in ledger.expenses().iter().filter(|e| e.involves(name)) {
            if expense.paid_by == name {
                info.expenses_paid += 1;
                info.total_paid += expense.amount;
            }
            if expense.split_between.iter().any(|p| p == name) {
                info.expenses_shared += 1;
                info.total_share += expense.share();
            }
        }

        Ok(info)
    }

    // ========================
    // Expense operations
    // ========================

    /// Record a new expense.
    pub async fn add_expense(
        &self,
        amount: Amount,
        paid_by: &str,
        split_between: &[String],
    ) -> Result<ExpenseResult, AppError> {
        let mut ledger = self.load_ledger().await?;
        let index = ledger.add_expense(amount, paid_by, split_between)?;
        let expense = ledger.expenses()[index].clone();

        self.repo.append_expense(&expense).await?;

        Ok(ExpenseResult { index, expense })
    }

    /// Remove the expense at the given index and return it. Later expenses
    /// shift down one slot.
    pub async fn remove_expense(&self, index: usize) -> Result<Expense, AppError> {
        let mut ledger = self.load_ledger().await?;
        let removed = ledger.remove_expense(index)?;
        self.repo.replace_expenses(ledger.expenses()).await?;
        Ok(removed)
    }

    /// List all expenses, in insertion order.
    pub async fn list_expenses(&self) -> Result<Vec<Expense>, AppError> {
        Ok(self.load_ledger().await?.expenses().to_vec())
    }

    /// Get the expense at the given index.
    pub async fn get_expense(&self, index: usize) -> Result<Expense, AppError> {
        let ledger = self.load_ledger().await?;
        ledger.expenses().get(index).cloned().ok_or_else(|| {
            LedgerError::ExpenseOutOfRange {
                index,
                count: ledger.expenses().len(),
            }
            .into()
        })
    }

    // ========================
    // Balance and settlement
    // ========================

    /// Net balance per person, in person insertion order.
    pub async fn balances(&self) -> Result<Vec<BalanceEntry>, AppError> {
        Ok(self.load_ledger().await?.balances())
    }

    /// Settlement plan for the current balances.
    pub async fn settlement(&self) -> Result<Vec<Payment>, AppError> {
        Ok(self.load_ledger().await?.settlement())
    }

    // ========================
    // Snapshot operations
    // ========================

    /// Validated copy of the current ledger state.
    pub async fn snapshot(&self) -> Result<LedgerSnapshot, AppError> {
        Ok(self.load_ledger().await?.snapshot())
    }

    /// Replace the entire stored ledger with the given snapshot. The
    /// snapshot is validated as a whole first; nothing is written if any part
    /// of it is invalid.
    pub async fn restore(&self, snapshot: &LedgerSnapshot) -> Result<(), AppError> {
        let ledger = Ledger::from_snapshot(snapshot).map_err(AppError::CorruptedState)?;
        self.repo.replace_all(&ledger.snapshot()).await?;
        Ok(())
    }

    // ========================
    // Integrity operations
    // ========================

    /// Scan the stored data for invariant violations. Unlike the other
    /// operations this never fails on corrupted state; it reports it.
    pub async fn check_integrity(&self) -> Result<IntegrityReport, AppError> {
        let snapshot = self.repo.load().await?;
        Ok(verify_snapshot(&snapshot))
    }
}
