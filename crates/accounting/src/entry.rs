use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use ceramerp_core::validation::invalid;
use ceramerp_core::{Entity, define_id, non_negative};

use crate::chart::{AccountId, AccountRef};

define_id!(EntryId, "EntryId");

/// Journal entry row (`accounting_entries`): one account, one side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountingEntry {
    pub id: EntryId,
    pub entry_date: NaiveDate,
    pub account_id: AccountId,
    pub description: String,
    #[serde(default)]
    pub debit: Decimal,
    #[serde(default)]
    pub credit: Decimal,
    #[serde(default)]
    pub document_number: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account: Option<AccountRef>,
}

impl Entity for AccountingEntry {
    type Id = EntryId;
    const TABLE: &'static str = "accounting_entries";

    fn id(&self) -> EntryId {
        self.id
    }
}

impl AccountingEntry {
    /// Debit-positive signed amount.
    pub fn signed_amount(&self) -> Decimal {
        self.debit - self.credit
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[validate(schema(function = "one_side"))]
pub struct AccountingEntryInput {
    pub entry_date: NaiveDate,
    pub account_id: AccountId,
    #[validate(length(min = 1, max = 500, message = "description is required"))]
    pub description: String,
    #[validate(custom(function = "non_negative"))]
    pub debit: Decimal,
    #[validate(custom(function = "non_negative"))]
    pub credit: Decimal,
    #[serde(default)]
    #[validate(length(max = 50, message = "document number is too long"))]
    pub document_number: Option<String>,
}

impl AccountingEntryInput {
    pub fn debit(
        entry_date: NaiveDate,
        account_id: AccountId,
        description: impl Into<String>,
        amount: Decimal,
    ) -> Self {
        Self {
            entry_date,
            account_id,
            description: description.into(),
            debit: amount,
            credit: Decimal::ZERO,
            document_number: None,
        }
    }

    pub fn credit(
        entry_date: NaiveDate,
        account_id: AccountId,
        description: impl Into<String>,
        amount: Decimal,
    ) -> Self {
        Self {
            debit: Decimal::ZERO,
            credit: amount,
            ..Self::debit(entry_date, account_id, description, Decimal::ZERO)
        }
    }
}

fn one_side(input: &AccountingEntryInput) -> Result<(), ValidationError> {
    let debit = input.debit > Decimal::ZERO;
    let credit = input.credit > Decimal::ZERO;
    if debit == credit {
        return Err(invalid(
            "one_side",
            "enter either a debit or a credit amount",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ceramerp_core::FieldErrors;
    use ceramerp_core::validation::FORM_LEVEL;
    use rust_decimal_macros::dec;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
    }

    #[test]
    fn exactly_one_side_must_be_positive() {
        let account = AccountId::new();
        assert!(AccountingEntryInput::debit(day(), account, "Venda", dec!(10)).validate().is_ok());
        assert!(AccountingEntryInput::credit(day(), account, "Venda", dec!(10)).validate().is_ok());

        let mut both = AccountingEntryInput::debit(day(), account, "Venda", dec!(10));
        both.credit = dec!(10);
        let errors: FieldErrors = both.validate().unwrap_err().into();
        assert!(errors.contains(FORM_LEVEL));

        let neither = AccountingEntryInput::debit(day(), account, "Venda", dec!(0));
        assert!(neither.validate().is_err());
    }

    #[test]
    fn negative_amount_is_a_field_error() {
        let mut input = AccountingEntryInput::debit(day(), AccountId::new(), "Acerto", dec!(5));
        input.credit = dec!(-5);
        let errors: FieldErrors = input.validate().unwrap_err().into();
        assert!(errors.contains("credit"));
    }

    #[test]
    fn decodes_with_embedded_account() {
        let row = serde_json::json!({
            "id": "3e2d1c0b-9a8f-4e7d-8c6b-5a4f3e2d1c0b",
            "entry_date": "2024-03-15",
            "account_id": "4f3e2d1c-0b9a-4f8e-9d7c-6b5a4f3e2d1c",
            "description": "Fatura FT 2024/15",
            "debit": "0",
            "credit": "150.00",
            "document_number": "FT 2024/15",
            "account": { "id": "4f3e2d1c-0b9a-4f8e-9d7c-6b5a4f3e2d1c", "code": "71", "name": "Vendas" }
        });
        let entry: AccountingEntry = serde_json::from_value(row).unwrap();
        assert_eq!(entry.signed_amount(), dec!(-150));
        assert_eq!(entry.account.unwrap().code, "71");
    }
}
