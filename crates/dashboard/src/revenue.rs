use std::collections::BTreeMap;

use chrono::{Datelike, Months, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;

use ceramerp_accounting::{FinancialTransaction, TransactionStatus, TransactionType};

/// Months of history shown by the revenue chart, current month included.
pub const DEFAULT_REVENUE_MONTHS: u32 = 5;

/// Date range the revenue rows are fetched for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevenueWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl RevenueWindow {
    /// From the first day of the month `months - 1` before `today`, to `today`.
    pub fn trailing(today: NaiveDate, months: u32) -> Self {
        let first_of_month = today.with_day(1).unwrap_or(today);
        let start = first_of_month
            .checked_sub_months(Months::new(months.saturating_sub(1)))
            .unwrap_or(first_of_month);
        Self { start, end: today }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Revenue of one calendar month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RevenuePoint {
    pub year: i32,
    pub month: u32,
    /// Display label, e.g. `"Mar 2024"`.
    pub label: String,
    pub revenue: Decimal,
}

/// Completed income summed per month, oldest month first.
///
/// Months without completed income produce no point.
pub fn monthly_revenue(rows: &[FinancialTransaction]) -> Vec<RevenuePoint> {
    let mut by_month: BTreeMap<(i32, u32), Decimal> = BTreeMap::new();
    for row in rows {
        if row.transaction_type != TransactionType::Income
            || row.status != TransactionStatus::Completed
        {
            continue;
        }
        let key = (row.transaction_date.year(), row.transaction_date.month());
        *by_month.entry(key).or_default() += row.amount;
    }

    by_month
        .into_iter()
        .map(|((year, month), revenue)| RevenuePoint {
            year,
            month,
            label: month_label(year, month),
            revenue,
        })
        .collect()
}

fn month_label(year: i32, month: u32) -> String {
    match NaiveDate::from_ymd_opt(year, month, 1) {
        Some(date) => date.format("%b %Y").to_string(),
        None => format!("{year:04}-{month:02}"),
    }
}
