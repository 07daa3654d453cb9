use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::Serialize;

use ceramerp_accounting::{FinancialTransaction, TransactionStatus, TransactionType};

/// Bucket for expenses recorded without a category.
pub const UNCATEGORIZED: &str = "uncategorized";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryTotal {
    pub category: String,
    pub total: Decimal,
}

/// Completed expenses per category, largest total first. Ties are ordered by
/// category name.
pub fn expenses_by_category(rows: &[FinancialTransaction]) -> Vec<CategoryTotal> {
    let mut totals: HashMap<&str, Decimal> = HashMap::new();
    for row in rows {
        if row.transaction_type != TransactionType::Expense
            || row.status != TransactionStatus::Completed
        {
            continue;
        }
        let category = row
            .category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(UNCATEGORIZED);
        *totals.entry(category).or_default() += row.amount;
    }

    let mut out: Vec<CategoryTotal> = totals
        .into_iter()
        .map(|(category, total)| CategoryTotal {
            category: category.to_string(),
            total,
        })
        .collect();
    out.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.category.cmp(&b.category)));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use ceramerp_accounting::TransactionId;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn expense(category: Option<&str>, amount: Decimal, status: TransactionStatus) -> FinancialTransaction {
        FinancialTransaction {
            id: TransactionId::new(),
            transaction_date: NaiveDate::from_ymd_opt(2024, 4, 2).unwrap(),
            description: "despesa".into(),
            transaction_type: TransactionType::Expense,
            category: category.map(Into::into),
            amount,
            status,
            bank_account_id: None,
            created_at: None,
            bank_account: None,
        }
    }

    #[test]
    fn largest_category_first() {
        use TransactionStatus::*;
        let rows = vec![
            expense(Some("energia"), dec!(500), Completed),
            expense(Some("argila"), dec!(800), Completed),
            expense(Some("energia"), dec!(400), Completed),
            expense(None, dec!(20), Completed),
            expense(Some("  "), dec!(5), Completed),
            expense(Some("argila"), dec!(10_000), Pending),
        ];
        let totals = expenses_by_category(&rows);
        let names: Vec<&str> = totals.iter().map(|t| t.category.as_str()).collect();
        assert_eq!(names, ["energia", "argila", UNCATEGORIZED]);
        assert_eq!(totals[0].total, dec!(900));
        assert_eq!(totals[2].total, dec!(25));
    }

    #[test]
    fn ties_break_by_name() {
        use TransactionStatus::*;
        let rows = vec![
            expense(Some("vidrados"), dec!(100), Completed),
            expense(Some("moldes"), dec!(100), Completed),
        ];
        let names: Vec<String> = expenses_by_category(&rows).into_iter().map(|t| t.category).collect();
        assert_eq!(names, ["moldes", "vidrados"]);
    }
}
