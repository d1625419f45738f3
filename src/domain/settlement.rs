use serde::{Deserialize, Serialize};

use super::{Amount, SETTLE_TOLERANCE};

/// Net balance for one person.
/// Positive means the group owes them, negative means they owe the group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceEntry {
    pub person: String,
    pub balance: Amount,
}

/// One leg of a settlement plan: `from` pays `to` the given amount.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub from: String,
    pub to: String,
    pub amount: Amount,
}

/// Turn net balances into pairwise payments that zero every balance (within
/// tolerance).
///
/// Debtors and creditors are matched greedily in the order the balances are
/// given, not by magnitude. The plan is deterministic and never longer than
/// debtors + creditors - 1 payments, but it is not guaranteed to be the
/// shortest plan possible.
pub fn settle_balances(balances: &[BalanceEntry]) -> Vec<Payment> {
    let mut debtors: Vec<(&str, Amount)> = Vec::new();
    let mut creditors: Vec<(&str, Amount)> = Vec::new();

    for entry in balances {
        if entry.balance < -SETTLE_TOLERANCE {
            debtors.push((entry.person.as_str(), -entry.balance));
        } else if entry.balance > SETTLE_TOLERANCE {
            creditors.push((entry.person.as_str(), entry.balance));
        }
    }

    let mut payments = Vec::new();
    let mut i = 0;
    let mut j = 0;

    while i < debtors.len() && j < creditors.len() {
        let amount = debtors[i].1.min(creditors[j].1);

        payments.push(Payment {
            from: debtors[i].0.to_string(),
            to: creditors[j].0.to_string(),
            amount,
        });

        debtors[i].1 -= amount;
        creditors[j].1 -= amount;

        if debtors[i].1 < SETTLE_TOLERANCE {
            i += 1;
        }
        if creditors[j].1 < SETTLE_TOLERANCE {
            j += 1;
        }
    }

    payments
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(person: &str, balance: Amount) -> BalanceEntry {
        BalanceEntry {
            person: person.to_string(),
            balance,
        }
    }

    /// Apply a plan back onto the balances and return the leftovers.
    fn apply_plan(balances: &[BalanceEntry], payments: &[Payment]) -> Vec<Amount> {
        let mut remaining: Vec<(String, Amount)> = balances
            .iter()
            .map(|e| (e.person.clone(), e.balance))
            .collect();

        for payment in payments {
            for (person, balance) in remaining.iter_mut() {
                if *person == payment.from {
                    *balance += payment.amount;
                } else if *person == payment.to {
                    *balance -= payment.amount;
                }
            }
        }

        remaining.into_iter().map(|(_, b)| b).collect()
    }

    #[test]
    fn test_settle_empty() {
        assert!(settle_balances(&[]).is_empty());
    }

    #[test]
    fn test_settle_all_zero() {
        let balances = vec![entry("anna", 0.0), entry("ben", 0.0)];
        assert!(settle_balances(&balances).is_empty());
    }

    #[test]
    fn test_settle_within_tolerance_is_ignored() {
        let balances = vec![entry("anna", 0.005), entry("ben", -0.005)];
        assert!(settle_balances(&balances).is_empty());
    }

    #[test]
    fn test_settle_single_pair() {
        let balances = vec![entry("anna", 20.0), entry("ben", -20.0)];
        let payments = settle_balances(&balances);

        assert_eq!(payments.len(), 1);
        assert_eq!(payments[0].from, "ben");
        assert_eq!(payments[0].to, "anna");
        assert_eq!(payments[0].amount, 20.0);
    }

    #[test]
    fn test_settle_one_creditor_many_debtors() {
        let balances = vec![entry("anna", 20.0), entry("ben", -10.0), entry("carl", -10.0)];
        let payments = settle_balances(&balances);

        assert_eq!(payments.len(), 2);
        assert_eq!(payments[0].from, "ben");
        assert_eq!(payments[0].to, "anna");
        assert_eq!(payments[0].amount, 10.0);
        assert_eq!(payments[1].from, "carl");
        assert_eq!(payments[1].to, "anna");
        assert_eq!(payments[1].amount, 10.0);
    }

    #[test]
    fn test_settle_matches_in_listed_order() {
        // Greedy matching walks both lists in the order given, so the first
        // debtor pays the first creditor even when magnitudes pair up better
        // another way.
        let balances = vec![
            entry("anna", 5.0),
            entry("ben", -30.0),
            entry("carl", 25.0),
        ];
        let payments = settle_balances(&balances);

        assert_eq!(payments.len(), 2);
        assert_eq!(payments[0].from, "ben");
        assert_eq!(payments[0].to, "anna");
        assert_eq!(payments[0].amount, 5.0);
        assert_eq!(payments[1].from, "ben");
        assert_eq!(payments[1].to, "carl");
        assert_eq!(payments[1].amount, 25.0);
    }

    #[test]
    fn test_settle_exact_tie_advances_both_sides() {
        let balances = vec![
            entry("anna", 10.0),
            entry("ben", -10.0),
            entry("carl", 7.0),
            entry("dora", -7.0),
        ];
        let payments = settle_balances(&balances);

        assert_eq!(payments.len(), 2);
        assert_eq!(payments[0].from, "ben");
        assert_eq!(payments[0].to, "anna");
        assert_eq!(payments[1].from, "dora");
        assert_eq!(payments[1].to, "carl");
    }

    #[test]
    fn test_settle_zeroes_all_balances() {
        let balances = vec![
            entry("anna", 33.4),
            entry("ben", -12.15),
            entry("carl", -21.25),
            entry("dora", 0.0),
        ];
        let payments = settle_balances(&balances);

        for leftover in apply_plan(&balances, &payments) {
            assert!(
                leftover.abs() <= SETTLE_TOLERANCE,
                "leftover balance {} exceeds tolerance",
                leftover
            );
        }
    }

    #[test]
    fn test_settle_payment_count_bound() {
        let balances = vec![
            entry("a", -10.0),
            entry("b", -20.0),
            entry("c", -30.0),
            entry("d", 25.0),
            entry("e", 35.0),
        ];
        let payments = settle_balances(&balances);

        // 3 debtors + 2 creditors => at most 4 payments
        assert!(payments.len() <= 4);

        for leftover in apply_plan(&balances, &payments) {
            assert!(leftover.abs() <= SETTLE_TOLERANCE);
        }
    }

    #[test]
    fn test_settle_amounts_are_positive() {
        let balances = vec![entry("anna", 12.3), entry("ben", -10.0), entry("carl", -2.3)];

        for payment in settle_balances(&balances) {
            assert!(payment.amount > 0.0);
        }
    }
}
