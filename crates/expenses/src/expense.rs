use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use splitledger_core::{DomainError, DomainResult, ExpenseId, GroupId, Money, UserId};

use crate::category::{Category, CategorySpec};
use crate::period::month_window;

/// A personal expense record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: ExpenseId,
    pub user_id: UserId,
    pub amount: Money,
    pub category: Category,
    pub date: DateTime<Utc>,
    pub note: String,
    pub tags: Vec<String>,
    /// Set when the expense mirrors a share of a group expense.
    pub shared_group: Option<GroupId>,
}

impl Expense {
    pub fn new(
        id: ExpenseId,
        user_id: UserId,
        amount: Money,
        category: CategorySpec,
        date: DateTime<Utc>,
        note: impl Into<String>,
        tags: Vec<String>,
        shared_group: Option<GroupId>,
    ) -> DomainResult<Self> {
        if !amount.is_positive() {
            return Err(DomainError::validation("amount must be positive"));
        }
        let note = note.into();

        Ok(Self {
            id,
            user_id,
            amount,
            category: category.resolve(&note),
            date,
            note,
            tags,
            shared_group,
        })
    }
}

/// Pure listing filter over expense records.
///
/// `None`/empty fields impose no constraint; date and amount bounds are
/// inclusive; `tags` matches when the record carries any of them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseFilter {
    pub category: Option<Category>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub min_amount: Option<Money>,
    pub max_amount: Option<Money>,
    pub tags: Vec<String>,
}

impl ExpenseFilter {
    pub fn matches(&self, expense: &Expense) -> bool {
        if let Some(category) = self.category
            && expense.category != category
        {
            return false;
        }
        if let Some(start) = self.start_date
            && expense.date < start
        {
            return false;
        }
        if let Some(end) = self.end_date
            && expense.date > end
        {
            return false;
        }
        if let Some(min) = self.min_amount
            && expense.amount < min
        {
            return false;
        }
        if let Some(max) = self.max_amount
            && expense.amount > max
        {
            return false;
        }
        if !self.tags.is_empty() && !self.tags.iter().any(|tag| expense.tags.contains(tag)) {
            return false;
        }
        true
    }

    /// Select matching records, newest first (the listing order).
    pub fn apply<'a>(&self, expenses: &'a [Expense]) -> Vec<&'a Expense> {
        let mut selected: Vec<&Expense> = expenses.iter().filter(|e| self.matches(e)).collect();
        selected.sort_by(|a, b| b.date.cmp(&a.date));
        selected
    }
}

/// One user's spending over a calendar month, with a per-category breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyExpenseSummary {
    pub year: i32,
    /// 1-based.
    pub month: u32,
    pub total: Money,
    pub by_category: BTreeMap<Category, Money>,
}

impl MonthlyExpenseSummary {
    pub fn compute(
        user_id: UserId,
        year: i32,
        month: u32,
        expenses: &[Expense],
    ) -> DomainResult<Self> {
        let (start, end) = month_window(year, month)?;

        let mut total = Money::ZERO;
        let mut by_category: BTreeMap<Category, Money> = BTreeMap::new();

        for expense in expenses {
            if expense.user_id != user_id || expense.date < start || expense.date >= end {
                continue;
            }
            total += expense.amount;
            *by_category.entry(expense.category).or_insert(Money::ZERO) += expense.amount;
        }

        Ok(Self {
            year,
            month,
            total,
            by_category,
        })
    }
}
