//! Shared-expense splitting and group settlement.
//!
//! Pure domain logic only: the caller supplies the roster snapshot and the
//! expense records (storage is an external collaborator) and gets back
//! derived balances plus settle-up suggestions.

pub mod balance;
pub mod expense;

pub use balance::{BalanceSheet, MemberBalance, Settlement};
pub use expense::{SharedExpense, Split, SplitType, equal_splits};
