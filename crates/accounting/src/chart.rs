use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use ceramerp_core::{Entity, define_id};

define_id!(AccountId, "AccountId");

/// High-level account type (determines the normal balance side).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    Asset,
    Liability,
    Equity,
    Revenue,
    Expense,
}

impl AccountType {
    /// Assets and expenses grow on the debit side.
    pub fn is_debit_normal(&self) -> bool {
        matches!(self, AccountType::Asset | AccountType::Expense)
    }
}

/// Chart of accounts row (`chart_of_accounts`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartAccount {
    pub id: AccountId,
    pub code: String,
    pub name: String,
    pub account_type: AccountType,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Entity for ChartAccount {
    type Id = AccountId;
    const TABLE: &'static str = "chart_of_accounts";

    fn id(&self) -> AccountId {
        self.id
    }
}

/// Account as embedded in entry reads (`account:chart_of_accounts(id,code,name)`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRef {
    pub id: AccountId,
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub account_type: Option<AccountType>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct ChartAccountInput {
    #[validate(length(min = 1, max = 20, message = "code is required"))]
    pub code: String,
    #[validate(length(min = 1, max = 200, message = "name is required"))]
    pub name: String,
    pub account_type: AccountType,
}
