use super::{compute_balances, Amount, LedgerSnapshot, SETTLE_TOLERANCE};

/// Outcome of scanning raw ledger data for invariant violations.
/// Unlike [`super::Ledger::from_snapshot`], which stops at the first problem,
/// the scan collects every issue it finds so a health check can show the
/// whole picture.
#[derive(Debug, Clone)]
pub struct IntegrityReport {
    pub person_count: usize,
    pub expense_count: usize,
    /// Sum of all net balances; conserved systems stay within tolerance of zero
    pub total_balance: Amount,
    pub is_balanced: bool,
    pub issues: Vec<String>,
}

impl IntegrityReport {
    pub fn is_healthy(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Scan a snapshot without rejecting it. Every violation that
/// [`super::Ledger::from_snapshot`] would refuse shows up here as an issue,
/// plus a conservation check over the computed balances.
pub fn verify_snapshot(snapshot: &LedgerSnapshot) -> IntegrityReport {
    let mut issues = Vec::new();

    for (i, name) in snapshot.people.iter().enumerate() {
        if name.trim().is_empty() {
            issues.push(format!("person #{} has a blank name", i));
        }
        if snapshot.people[..i].contains(name) {
            issues.push(format!("duplicate person name: {}", name));
        }
    }

    for (i, expense) in snapshot.expenses.iter().enumerate() {
        if !expense.amount.is_finite() || expense.amount <= 0.0 {
            issues.push(format!(
                "expense #{} has a non-positive amount: {}",
                i, expense.amount
            ));
        }
        if !snapshot.people.contains(&expense.paid_by) {
            issues.push(format!(
                "expense #{} paid by unknown person: {}",
                i, expense.paid_by
            ));
        }
        if expense.split_between.is_empty() {
            issues.push(format!("expense #{} has an empty split", i));
        }
        for (j, member) in expense.split_between.iter().enumerate() {
            if !snapshot.people.contains(member) {
                issues.push(format!(
                    "expense #{} split includes unknown person: {}",
                    i, member
                ));
            }
            if expense.split_between[..j].contains(member) {
                issues.push(format!(
                    "expense #{} lists {} twice in its split",
                    i, member
                ));
            }
        }
    }

    let balances = compute_balances(&snapshot.people, &snapshot.expenses);
    let total_balance: Amount = balances.iter().map(|e| e.balance).sum();
    let is_balanced = total_balance.abs() <= SETTLE_TOLERANCE;
    if !is_balanced {
        issues.push(format!(
            "balances do not sum to zero (off by {})",
            total_balance
        ));
    }

    IntegrityReport {
        person_count: snapshot.people.len(),
        expense_count: snapshot.expenses.len(),
        total_balance,
        is_balanced,
        issues,
    }
}
