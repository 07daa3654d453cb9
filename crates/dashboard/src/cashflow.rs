use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;

use ceramerp_accounting::{FinancialTransaction, TransactionType};

/// Days before and after today covered by the projection.
pub const DEFAULT_CASHFLOW_DAYS: i64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CashflowWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl CashflowWindow {
    pub fn around(today: NaiveDate, days: i64) -> Self {
        Self {
            start: today - Duration::days(days),
            end: today + Duration::days(days),
        }
    }
}

/// One day of the cashflow chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CashflowPoint {
    pub date: NaiveDate,
    pub inflow: Decimal,
    pub outflow: Decimal,
    /// `inflow - outflow`.
    pub net: Decimal,
    /// Running sum of `net` up to and including this day.
    pub cumulative: Decimal,
}

/// Group rows by date and accumulate net flow in date order.
///
/// Pending and completed rows both count; this is a projection.
pub fn cashflow_projection(rows: &[FinancialTransaction]) -> Vec<CashflowPoint> {
    let mut by_date: BTreeMap<NaiveDate, (Decimal, Decimal)> = BTreeMap::new();
    for row in rows {
        let (inflow, outflow) = by_date.entry(row.transaction_date).or_default();
        match row.transaction_type {
            TransactionType::Income => *inflow += row.amount,
            TransactionType::Expense => *outflow += row.amount,
        }
    }

    let mut cumulative = Decimal::ZERO;
    by_date
        .into_iter()
        .map(|(date, (inflow, outflow))| {
            let net = inflow - outflow;
            cumulative += net;
            CashflowPoint {
                date,
                inflow,
                outflow,
                net,
                cumulative,
            }
        })
        .collect()
}
