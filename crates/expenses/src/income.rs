use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use splitledger_core::{DomainError, DomainResult, IncomeId, Money, UserId};

use crate::period::month_window;

/// Where an income record came from.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum IncomeSource {
    Salary,
    Freelance,
    Investment,
    Bonus,
    Gift,
    Other,
}

/// A personal income record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Income {
    pub id: IncomeId,
    pub user_id: UserId,
    pub amount: Money,
    pub source: IncomeSource,
    pub date: DateTime<Utc>,
    pub note: String,
    pub tags: Vec<String>,
}

impl Income {
    pub fn new(
        id: IncomeId,
        user_id: UserId,
        amount: Money,
        source: IncomeSource,
        date: DateTime<Utc>,
        note: impl Into<String>,
        tags: Vec<String>,
    ) -> DomainResult<Self> {
        if !amount.is_positive() {
            return Err(DomainError::validation("amount must be positive"));
        }

        Ok(Self {
            id,
            user_id,
            amount,
            source,
            date,
            note: note.into(),
            tags,
        })
    }
}

/// One user's income over a calendar month, with a per-source breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyIncomeSummary {
    pub year: i32,
    /// 1-based.
    pub month: u32,
    pub total: Money,
    pub by_source: BTreeMap<IncomeSource, Money>,
}

impl MonthlyIncomeSummary {
    pub fn compute(
        user_id: UserId,
        year: i32,
        month: u32,
        incomes: &[Income],
    ) -> DomainResult<Self> {
        let (start, end) = month_window(year, month)?;

        let mut total = Money::ZERO;
        let mut by_source: BTreeMap<IncomeSource, Money> = BTreeMap::new();

        for income in incomes {
            if income.user_id != user_id || income.date < start || income.date >= end {
                continue;
            }
            total += income.amount;
            *by_source.entry(income.source).or_insert(Money::ZERO) += income.amount;
        }

        Ok(Self {
            year,
            month,
            total,
            by_source,
        })
    }
}
