use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use ceramerp_core::validation::invalid;
use ceramerp_core::{Entity, define_id, positive};

define_id!(BankAccountId, "BankAccountId");
define_id!(TransactionId, "TransactionId");

/// Bank account row (`bank_accounts`). Deactivated rather than deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankAccount {
    pub id: BankAccountId,
    pub name: String,
    #[serde(default)]
    pub bank_name: Option<String>,
    #[serde(default)]
    pub iban: Option<String>,
    /// Opening balance, entered by the user.
    #[serde(default)]
    pub balance: Decimal,
    #[serde(default = "active_default")]
    pub active: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

fn active_default() -> bool {
    true
}

impl Entity for BankAccount {
    type Id = BankAccountId;
    const TABLE: &'static str = "bank_accounts";

    fn id(&self) -> BankAccountId {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankAccountRef {
    pub id: BankAccountId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[validate(schema(function = "iban_checksum"))]
pub struct BankAccountInput {
    #[validate(length(min = 1, max = 100, message = "name is required"))]
    pub name: String,
    #[serde(default)]
    pub bank_name: Option<String>,
    #[serde(default)]
    pub iban: Option<String>,
    #[serde(default)]
    pub balance: Decimal,
    #[serde(default = "active_default")]
    pub active: bool,
}

fn iban_checksum(input: &BankAccountInput) -> Result<(), ValidationError> {
    match input.iban.as_deref() {
        Some(iban) if !iban.trim().is_empty() && !is_valid_iban(iban) => {
            Err(invalid("iban", "IBAN is not valid"))
        }
        _ => Ok(()),
    }
}

/// ISO 13616 mod-97 check; spaces are ignored.
fn is_valid_iban(raw: &str) -> bool {
    let iban: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    if !(15..=34).contains(&iban.len()) || !iban.chars().all(|c| c.is_ascii_alphanumeric()) {
        return false;
    }
    let (head, tail) = iban.split_at(4);
    let mut remainder: u32 = 0;
    for c in tail.chars().chain(head.chars()) {
        let Some(value) = c.to_digit(36) else {
            return false;
        };
        let factor = if value >= 10 { 100 } else { 10 };
        remainder = (remainder * factor + value) % 97;
    }
    remainder == 1
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    Expense,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    #[default]
    Pending,
    Completed,
}

/// Dated income or expense (`financial_transactions`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinancialTransaction {
    pub id: TransactionId,
    pub transaction_date: NaiveDate,
    pub description: String,
    pub transaction_type: TransactionType,
    #[serde(default)]
    pub category: Option<String>,
    pub amount: Decimal,
    #[serde(default)]
    pub status: TransactionStatus,
    #[serde(default)]
    pub bank_account_id: Option<BankAccountId>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bank_account: Option<BankAccountRef>,
}

impl Entity for FinancialTransaction {
    type Id = TransactionId;
    const TABLE: &'static str = "financial_transactions";

    fn id(&self) -> TransactionId {
        self.id
    }
}

impl FinancialTransaction {
    /// Income positive, expense negative.
    pub fn signed_amount(&self) -> Decimal {
        match self.transaction_type {
            TransactionType::Income => self.amount,
            TransactionType::Expense => -self.amount,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == TransactionStatus::Completed
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct TransactionInput {
    pub transaction_date: NaiveDate,
    #[validate(length(min = 1, max = 500, message = "description is required"))]
    pub description: String,
    pub transaction_type: TransactionType,
    #[serde(default)]
    #[validate(length(max = 100, message = "category is too long"))]
    pub category: Option<String>,
    #[validate(custom(function = "positive"))]
    pub amount: Decimal,
    #[serde(default)]
    pub status: TransactionStatus,
    #[serde(default)]
    pub bank_account_id: Option<BankAccountId>,
}

/// Balance of one bank account after its transactions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BankBalance {
    pub bank_account_id: BankAccountId,
    pub name: String,
    pub opening: Decimal,
    /// Opening plus completed transactions.
    pub current: Decimal,
    /// Net of pending transactions.
    pub pending: Decimal,
    /// Current plus pending.
    pub projected: Decimal,
}

/// Per-account balances in account-name order. Transactions without a bank
/// account are ignored.
pub fn bank_balances(
    accounts: &[BankAccount],
    transactions: &[FinancialTransaction],
) -> Vec<BankBalance> {
    let mut completed: HashMap<BankAccountId, Decimal> = HashMap::new();
    let mut pending: HashMap<BankAccountId, Decimal> = HashMap::new();
    for tx in transactions {
        let Some(account) = tx.bank_account_id else {
            continue;
        };
        let bucket = if tx.is_completed() {
            &mut completed
        } else {
            &mut pending
        };
        *bucket.entry(account).or_default() += tx.signed_amount();
    }

    let mut out: Vec<BankBalance> = accounts
        .iter()
        .map(|a| {
            let current = a.balance + completed.get(&a.id).copied().unwrap_or_default();
            let pending = pending.get(&a.id).copied().unwrap_or_default();
            BankBalance {
                bank_account_id: a.id,
                name: a.name.clone(),
                opening: a.balance,
                current,
                pending,
                projected: current + pending,
            }
        })
        .collect();
    out.sort_by(|a, b| a.name.cmp(&b.name));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn account(name: &str, opening: Decimal) -> BankAccount {
        BankAccount {
            id: BankAccountId::new(),
            name: name.into(),
            bank_name: None,
            iban: None,
            balance: opening,
            active: true,
            created_at: None,
        }
    }

    fn tx(
        account: Option<BankAccountId>,
        kind: TransactionType,
        amount: Decimal,
        status: TransactionStatus,
    ) -> FinancialTransaction {
        FinancialTransaction {
            id: TransactionId::new(),
            transaction_date: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
            description: "mov".into(),
            transaction_type: kind,
            category: None,
            amount,
            status,
            bank_account_id: account,
            created_at: None,
            bank_account: None,
        }
    }

    #[test]
    fn iban_checksum_is_verified() {
        assert!(is_valid_iban("GB82 WEST 1234 5698 7654 32"));
        assert!(is_valid_iban("PT50000201231234567890154"));
        assert!(!is_valid_iban("PT50000201231234567890155"));
        assert!(!is_valid_iban("PT50"));
    }

    #[test]
    fn blank_iban_is_accepted() {
        let input = BankAccountInput {
            name: "Conta à ordem".into(),
            bank_name: None,
            iban: Some(" ".into()),
            balance: dec!(0),
            active: true,
        };
        assert!(input.validate().is_ok());
    }

    #[test]
    fn balances_split_completed_and_pending() {
        let cgd = account("CGD", dec!(1000));
        let bpi = account("BPI", dec!(0));
        let transactions = vec![
            tx(Some(cgd.id), TransactionType::Income, dec!(200), TransactionStatus::Completed),
            tx(Some(cgd.id), TransactionType::Expense, dec!(50), TransactionStatus::Completed),
            tx(Some(cgd.id), TransactionType::Expense, dec!(300), TransactionStatus::Pending),
            tx(None, TransactionType::Income, dec!(999), TransactionStatus::Completed),
        ];
        let balances = bank_balances(&[cgd.clone(), bpi], &transactions);
        assert_eq!(balances[0].name, "BPI");
        assert_eq!(balances[0].projected, dec!(0));
        let cgd_balance = &balances[1];
        assert_eq!(cgd_balance.current, dec!(1150));
        assert_eq!(cgd_balance.pending, dec!(-300));
        assert_eq!(cgd_balance.projected, dec!(850));
    }

    #[test]
    fn signed_amount_follows_type() {
        let expense = tx(None, TransactionType::Expense, dec!(12.5), TransactionStatus::Pending);
        assert_eq!(expense.signed_amount(), dec!(-12.5));
    }
}
