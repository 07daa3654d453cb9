use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::chart::{AccountId, AccountType, ChartAccount};
use crate::entry::AccountingEntry;

/// Per-account totals for a trial balance.
///
/// `balance` is signed, debit-positive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountBalance {
    pub account_id: AccountId,
    pub account_code: String,
    pub account_name: String,
    pub account_type: Option<AccountType>,
    pub debit: Decimal,
    pub credit: Decimal,
    pub balance: Decimal,
}

/// Sum debits and credits per account, ordered by account code.
///
/// Accounts without entries are included with zero totals so the trial
/// balance lists the whole chart. Entries for accounts missing from `chart`
/// are labelled from their embedded account, if any.
pub fn trial_balance(chart: &[ChartAccount], entries: &[AccountingEntry]) -> Vec<AccountBalance> {
    let mut by_account: HashMap<AccountId, AccountBalance> = chart
        .iter()
        .map(|a| {
            (
                a.id,
                AccountBalance {
                    account_id: a.id,
                    account_code: a.code.clone(),
                    account_name: a.name.clone(),
                    account_type: Some(a.account_type),
                    debit: Decimal::ZERO,
                    credit: Decimal::ZERO,
                    balance: Decimal::ZERO,
                },
            )
        })
        .collect();

    for entry in entries {
        let row = by_account.entry(entry.account_id).or_insert_with(|| {
            let (code, name, account_type) = match &entry.account {
                Some(a) => (a.code.clone(), a.name.clone(), a.account_type),
                None => (entry.account_id.to_string(), String::new(), None),
            };
            AccountBalance {
                account_id: entry.account_id,
                account_code: code,
                account_name: name,
                account_type,
                debit: Decimal::ZERO,
                credit: Decimal::ZERO,
                balance: Decimal::ZERO,
            }
        });
        row.debit += entry.debit;
        row.credit += entry.credit;
        row.balance = row.debit - row.credit;
    }

    let mut out: Vec<AccountBalance> = by_account.into_values().collect();
    out.sort_by(|a, b| a.account_code.cmp(&b.account_code));
    out
}
