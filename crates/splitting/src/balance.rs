use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use splitledger_core::{Money, UserId};
use splitledger_groups::Member;

use crate::expense::SharedExpense;

/// Per-member derived position over a group's shared expenses.
///
/// `balance` is the **pre-settlement** net position (`total_paid -
/// total_owed`): positive means the member is owed money. Totals carry full
/// input precision; callers round for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberBalance {
    pub user_id: UserId,
    pub name: String,
    pub total_paid: Money,
    pub total_owed: Money,
    pub balance: Money,
}

/// One suggested transfer between two members.
///
/// Advisory output: a plan to resolve the balances, not a changed state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    pub from: String,
    pub to: String,
    pub amount: Money,
}

/// Derived balance sheet for a group: net positions plus settle-up
/// suggestions. Recomputed from scratch per call; nothing is persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceSheet {
    pub balances: Vec<MemberBalance>,
    pub settlements: Vec<Settlement>,
}

impl BalanceSheet {
    /// Compute balances and settlement suggestions for one group.
    ///
    /// `members` is the roster snapshot (order drives settlement matching);
    /// `expenses` are that group's shared expenses. Inputs are never
    /// mutated. An expense or split naming a user absent from the roster is
    /// skipped (per contribution, independently) with a warning; the other
    /// members' totals are unaffected.
    pub fn compute(members: &[Member], expenses: &[SharedExpense]) -> BalanceSheet {
        let mut balances: Vec<MemberBalance> = members
            .iter()
            .map(|member| MemberBalance {
                user_id: member.user_id,
                name: member.name.clone(),
                total_paid: Money::ZERO,
                total_owed: Money::ZERO,
                balance: Money::ZERO,
            })
            .collect();

        let index: HashMap<UserId, usize> = members
            .iter()
            .enumerate()
            .map(|(i, member)| (member.user_id, i))
            .collect();

        for expense in expenses {
            match index.get(&expense.paid_by) {
                Some(&i) => balances[i].total_paid += expense.amount,
                None => {
                    tracing::warn!(
                        payer = %expense.paid_by,
                        expense = %expense.id,
                        "payer is not in the roster; skipping paid contribution"
                    );
                }
            }

            for split in &expense.splits {
                match index.get(&split.user_id) {
                    Some(&i) => balances[i].total_owed += split.amount_owed,
                    None => {
                        tracing::warn!(
                            member = %split.user_id,
                            expense = %expense.id,
                            "split names a user not in the roster; skipping owed contribution"
                        );
                    }
                }
            }
        }

        for entry in &mut balances {
            entry.balance = entry.total_paid - entry.total_owed;
        }

        let settlements = suggest_settlements(&balances);

        BalanceSheet {
            balances,
            settlements,
        }
    }
}

/// Greedy pairwise matching over the roster order.
///
/// Each ordered pair (i, j), i before j, is visited exactly once. Whenever
/// one side is strictly positive and the other strictly negative, the
/// overlap `min(|bi|, |bj|)` moves from debtor to creditor. The emitted
/// amount is rounded to cents; the scratch remainders are updated with the
/// unrounded amount so later pairs see exact values. Single pass, O(n^2):
/// valid zero-sum plan, not a minimum-transaction solver.
fn suggest_settlements(balances: &[MemberBalance]) -> Vec<Settlement> {
    let mut remaining: Vec<Money> = balances.iter().map(|b| b.balance).collect();
    let mut settlements = Vec::new();

    for i in 0..remaining.len() {
        for j in (i + 1)..remaining.len() {
            let (debtor, creditor) = if remaining[i].is_positive() && remaining[j].is_negative() {
                (j, i)
            } else if remaining[i].is_negative() && remaining[j].is_positive() {
                (i, j)
            } else {
                continue;
            };

            let amount = remaining[debtor].abs().min(remaining[creditor].abs());
            settlements.push(Settlement {
                from: balances[debtor].name.clone(),
                to: balances[creditor].name.clone(),
                amount: amount.round_to_cents(),
            });
            remaining[debtor] += amount;
            remaining[creditor] -= amount;
        }
    }

    settlements
}
