use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use ceramerp_core::{Entity, define_id};

use crate::contact::ContactInfo;

define_id!(CustomerId, "CustomerId");

/// Customer row (`customers`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub tax_id: Option<String>,
    #[serde(flatten)]
    pub contact: ContactInfo,
    #[serde(default = "active_default")]
    pub active: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

pub(crate) fn active_default() -> bool {
    true
}

impl Entity for Customer {
    type Id = CustomerId;
    const TABLE: &'static str = "customers";

    fn id(&self) -> CustomerId {
        self.id
    }
}

/// Customer as embedded in sales order reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerRef {
    pub id: CustomerId,
    pub code: String,
    pub name: String,
}

/// Create/edit form for a customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct CustomerInput {
    #[validate(length(min = 1, max = 20, message = "code is required (max 20 characters)"))]
    pub code: String,
    #[validate(length(min = 1, max = 200, message = "name is required"))]
    pub name: String,
    #[serde(default)]
    #[validate(length(min = 5, max = 20, message = "tax id must have 5 to 20 characters"))]
    pub tax_id: Option<String>,
    #[serde(flatten)]
    #[validate(nested)]
    pub contact: ContactInfo,
    #[serde(default = "active_default")]
    pub active: bool,
}

impl CustomerInput {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            tax_id: None,
            contact: ContactInfo::default(),
            active: true,
        }
    }

    /// Trimmed copy ready to send.
    pub fn normalized(self) -> Self {
        Self {
            code: self.code.trim().to_uppercase(),
            name: self.name.trim().to_string(),
            tax_id: self
                .tax_id
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty()),
            contact: self.contact.normalized(),
            active: self.active,
        }
    }
}
