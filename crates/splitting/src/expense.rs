use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use splitledger_core::{DomainError, DomainResult, GroupId, Money, SharedExpenseId, UserId};

/// How an expense was divided across the roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SplitType {
    Equal,
    Manual,
}

/// A portion of a shared expense attributed to one member as an obligation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Split {
    pub user_id: UserId,
    pub amount_owed: Money,
}

/// A group expense: one payer, obligations spread over the roster.
///
/// The domain expects `splits` to sum to `amount`; the balance engine does
/// not check this (creation is the trust boundary) and tolerates drift.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedExpense {
    pub id: SharedExpenseId,
    pub group_id: GroupId,
    pub paid_by: UserId,
    pub amount: Money,
    pub description: String,
    pub split_type: SplitType,
    pub splits: Vec<Split>,
    pub date: DateTime<Utc>,
}

impl SharedExpense {
    /// Create an expense divided evenly across `roster`.
    pub fn split_equally(
        id: SharedExpenseId,
        group_id: GroupId,
        paid_by: UserId,
        amount: Money,
        description: impl Into<String>,
        roster: &[UserId],
        date: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let description = description.into();
        validate(amount, &description)?;
        if roster.is_empty() {
            return Err(DomainError::validation("roster cannot be empty"));
        }

        Ok(Self {
            id,
            group_id,
            paid_by,
            amount,
            description,
            split_type: SplitType::Equal,
            splits: equal_splits(amount, roster),
            date,
        })
    }

    /// Create an expense with caller-provided splits.
    ///
    /// Splits are checked for shape (non-empty, non-negative amounts) but
    /// not against the expense total.
    pub fn with_manual_splits(
        id: SharedExpenseId,
        group_id: GroupId,
        paid_by: UserId,
        amount: Money,
        description: impl Into<String>,
        splits: Vec<Split>,
        date: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let description = description.into();
        validate(amount, &description)?;
        if splits.is_empty() {
            return Err(DomainError::validation("splits cannot be empty"));
        }
        if splits.iter().any(|s| s.amount_owed.is_negative()) {
            return Err(DomainError::validation("split amounts cannot be negative"));
        }

        Ok(Self {
            id,
            group_id,
            paid_by,
            amount,
            description,
            split_type: SplitType::Manual,
            splits,
            date,
        })
    }

    pub fn splits_total(&self) -> Money {
        self.splits.iter().map(|s| s.amount_owed).sum()
    }
}

fn validate(amount: Money, description: &str) -> DomainResult<()> {
    if !amount.is_positive() {
        return Err(DomainError::validation("amount must be positive"));
    }
    if description.trim().is_empty() {
        return Err(DomainError::validation("description cannot be empty"));
    }
    Ok(())
}

/// Divide `amount` evenly across `members` at cent granularity.
///
/// Leftover cents are dealt one per member from the front of the roster, so
/// the splits always sum exactly to `amount` (largest-remainder scheme).
pub fn equal_splits(amount: Money, members: &[UserId]) -> Vec<Split> {
    if members.is_empty() {
        return Vec::new();
    }

    let count = Decimal::from(members.len());
    let base = (amount.amount() / count).round_dp_with_strategy(2, RoundingStrategy::ToZero);
    let mut splits: Vec<Split> = members
        .iter()
        .map(|&user_id| Split {
            user_id,
            amount_owed: Money::new(base),
        })
        .collect();

    let cent = Decimal::new(1, 2);
    let mut leftover = amount.amount() - base * count;
    let mut idx = 0;
    while leftover >= cent {
        splits[idx].amount_owed += Money::new(cent);
        leftover -= cent;
        idx = (idx + 1) % splits.len();
    }
    if !leftover.is_zero() {
        // Amounts finer than minor units: the sub-cent residue lands on the
        // first split so the total still matches.
        splits[0].amount_owed += Money::new(leftover);
    }

    splits
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn money(d: Decimal) -> Money {
        Money::new(d)
    }

    fn roster(n: usize) -> Vec<UserId> {
        (0..n).map(|_| UserId::new()).collect()
    }

    #[test]
    fn equal_splits_divides_exactly_when_possible() {
        let members = roster(3);
        let splits = equal_splits(Money::from_major(90), &members);

        assert_eq!(splits.len(), 3);
        for split in &splits {
            assert_eq!(split.amount_owed, money(dec!(30)));
        }
    }

    #[test]
    fn equal_splits_deals_leftover_cents_from_the_front() {
        let members = roster(3);
        let splits = equal_splits(money(dec!(100)), &members);

        assert_eq!(splits[0].amount_owed, money(dec!(33.34)));
        assert_eq!(splits[1].amount_owed, money(dec!(33.33)));
        assert_eq!(splits[2].amount_owed, money(dec!(33.33)));

        let total: Money = splits.iter().map(|s| s.amount_owed).sum();
        assert_eq!(total, money(dec!(100)));
    }

    #[test]
    fn equal_splits_keeps_sub_cent_residue_on_first_split() {
        let members = roster(2);
        let splits = equal_splits(money(dec!(0.015)), &members);

        let total: Money = splits.iter().map(|s| s.amount_owed).sum();
        assert_eq!(total, money(dec!(0.015)));
    }

    #[test]
    fn equal_splits_of_empty_roster_is_empty() {
        assert!(equal_splits(Money::from_major(10), &[]).is_empty());
    }

    #[test]
    fn split_equally_builds_summing_splits() {
        let members = roster(4);
        let expense = SharedExpense::split_equally(
            SharedExpenseId::new(),
            GroupId::new(),
            members[0],
            money(dec!(101.50)),
            "Dinner",
            &members,
            Utc::now(),
        )
        .unwrap();

        assert_eq!(expense.split_type, SplitType::Equal);
        assert_eq!(expense.splits.len(), 4);
        assert_eq!(expense.splits_total(), money(dec!(101.50)));
    }

    #[test]
    fn split_equally_rejects_empty_roster() {
        let err = SharedExpense::split_equally(
            SharedExpenseId::new(),
            GroupId::new(),
            UserId::new(),
            Money::from_major(10),
            "Dinner",
            &[],
            Utc::now(),
        )
        .unwrap_err();
        match err {
            DomainError::Validation(msg) => assert!(msg.contains("roster")),
            _ => panic!("Expected Validation error for empty roster"),
        }
    }

    #[test]
    fn constructors_reject_non_positive_amount_and_blank_description() {
        let members = roster(2);

        let err = SharedExpense::split_equally(
            SharedExpenseId::new(),
            GroupId::new(),
            members[0],
            Money::ZERO,
            "Dinner",
            &members,
            Utc::now(),
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        let err = SharedExpense::split_equally(
            SharedExpenseId::new(),
            GroupId::new(),
            members[0],
            Money::from_major(10),
            "  ",
            &members,
            Utc::now(),
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn manual_splits_are_trusted_but_shape_checked() {
        let members = roster(2);

        // Splits that do not sum to the amount are accepted as given.
        let expense = SharedExpense::with_manual_splits(
            SharedExpenseId::new(),
            GroupId::new(),
            members[0],
            Money::from_major(100),
            "Groceries",
            vec![
                Split {
                    user_id: members[0],
                    amount_owed: money(dec!(30)),
                },
                Split {
                    user_id: members[1],
                    amount_owed: money(dec!(30)),
                },
            ],
            Utc::now(),
        )
        .unwrap();
        assert_eq!(expense.splits_total(), money(dec!(60)));

        let err = SharedExpense::with_manual_splits(
            SharedExpenseId::new(),
            GroupId::new(),
            members[0],
            Money::from_major(100),
            "Groceries",
            vec![],
            Utc::now(),
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        let err = SharedExpense::with_manual_splits(
            SharedExpenseId::new(),
            GroupId::new(),
            members[0],
            Money::from_major(100),
            "Groceries",
            vec![Split {
                user_id: members[1],
                amount_owed: money(dec!(-5)),
            }],
            Utc::now(),
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn serializes_with_boundary_field_names() {
        let members = roster(2);
        let expense = SharedExpense::split_equally(
            SharedExpenseId::new(),
            GroupId::new(),
            members[0],
            Money::from_major(10),
            "Taxi",
            &members,
            Utc::now(),
        )
        .unwrap();

        let json = serde_json::to_value(&expense).unwrap();
        assert!(json.get("paidBy").is_some());
        assert!(json.get("splitType").is_some());
        assert!(json["splits"][0].get("amountOwed").is_some());
        assert!(json["splits"][0].get("userId").is_some());
    }
}
