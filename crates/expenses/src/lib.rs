//! Personal ledger: expense and income records with derived views.
//!
//! Pure domain logic only: records are supplied by the caller (storage is
//! an external collaborator); this crate categorizes, filters, and
//! summarizes them.

pub mod category;
pub mod expense;
pub mod income;
pub mod period;

pub use category::{Category, CategorySpec};
pub use expense::{Expense, ExpenseFilter, MonthlyExpenseSummary};
pub use income::{Income, IncomeSource, MonthlyIncomeSummary};
