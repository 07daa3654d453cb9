use rust_decimal::Decimal;
use serde::Serialize;

use ceramerp_accounting::{FinancialTransaction, TransactionType};

/// Pending money in and out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PendingTotals {
    /// Pending income.
    pub receivables: Decimal,
    /// Pending expenses.
    pub payables: Decimal,
}

impl PendingTotals {
    pub fn from_transactions<'a>(rows: impl IntoIterator<Item = &'a FinancialTransaction>) -> Self {
        rows.into_iter()
            .filter(|row| !row.is_completed())
            .fold(Self::default(), |mut acc, row| {
                match row.transaction_type {
                    TransactionType::Income => acc.receivables += row.amount,
                    TransactionType::Expense => acc.payables += row.amount,
                }
                acc
            })
    }

    pub fn net(&self) -> Decimal {
        self.receivables - self.payables
    }
}

/// Headline figures shown above the dashboard charts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DashboardSummary {
    pub active_customers: usize,
    pub active_items: usize,
    pub low_stock: usize,
    pub open_purchase_orders: usize,
    pub open_sales_orders: usize,
    pub pending_receivables: Decimal,
    pub pending_payables: Decimal,
}

impl DashboardSummary {
    pub fn with_pending(mut self, pending: PendingTotals) -> Self {
        self.pending_receivables = pending.receivables;
        self.pending_payables = pending.payables;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ceramerp_accounting::{TransactionId, TransactionStatus};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn tx(kind: TransactionType, status: TransactionStatus, amount: Decimal) -> FinancialTransaction {
        FinancialTransaction {
            id: TransactionId::new(),
            transaction_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            description: "fatura".into(),
            transaction_type: kind,
            category: None,
            amount,
            status,
            bank_account_id: None,
            created_at: None,
            bank_account: None,
        }
    }

    #[test]
    fn only_pending_rows_count() {
        use TransactionStatus::*;
        use TransactionType::*;
        let rows = vec![
            tx(Income, Pending, dec!(1200)),
            tx(Income, Completed, dec!(9999)),
            tx(Expense, Pending, dec!(300)),
            tx(Expense, Pending, dec!(50)),
        ];
        let pending = PendingTotals::from_transactions(&rows);
        assert_eq!(pending.receivables, dec!(1200));
        assert_eq!(pending.payables, dec!(350));
        assert_eq!(pending.net(), dec!(850));

        let summary = DashboardSummary {
            active_customers: 3,
            ..DashboardSummary::default()
        }
        .with_pending(pending);
        assert_eq!(summary.pending_payables, dec!(350));
        assert_eq!(summary.active_customers, 3);
    }
}
