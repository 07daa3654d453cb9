use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use ceramerp_core::{Entity, define_id};

use crate::contact::ContactInfo;
use crate::customer::active_default;

define_id!(SupplierId, "SupplierId");

/// Supplier row (`suppliers`).
///
/// Suppliers are referenced by purchase orders, so they are deactivated
/// instead of deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Supplier {
    pub id: SupplierId,
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub tax_id: Option<String>,
    #[serde(flatten)]
    pub contact: ContactInfo,
    /// Payment terms in days.
    #[serde(default)]
    pub payment_terms: Option<i32>,
    #[serde(default = "active_default")]
    pub active: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Entity for Supplier {
    type Id = SupplierId;
    const TABLE: &'static str = "suppliers";

    fn id(&self) -> SupplierId {
        self.id
    }
}

/// Supplier as embedded in purchase order reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplierRef {
    pub id: SupplierId,
    pub code: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct SupplierInput {
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
    #[serde(default)]
    #[validate(range(min = 0, max = 365, message = "payment terms must be 0 to 365 days"))]
    pub payment_terms: Option<i32>,
    #[serde(default = "active_default")]
    pub active: bool,
}

impl SupplierInput {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            tax_id: None,
            contact: ContactInfo::default(),
            payment_terms: None,
            active: true,
        }
    }

    pub fn normalized(self) -> Self {
        Self {
            code: self.code.trim().to_uppercase(),
            name: self.name.trim().to_string(),
            tax_id: self
                .tax_id
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty()),
            contact: self.contact.normalized(),
            ..self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payment_terms_are_bounded() {
        let mut input = SupplierInput::new("F01", "Argilas do Centro");
        input.payment_terms = Some(400);
        assert!(input.validate().is_err());
        input.payment_terms = Some(60);
        assert!(input.validate().is_ok());
    }

    #[test]
    fn inactive_row_decodes() {
        let row = serde_json::json!({
            "id": "2f0b1d9e-7c1a-4f51-9a43-11c0a8e2b7d3",
            "code": "F01",
            "name": "Argilas do Centro",
            "payment_terms": 30,
            "active": false
        });
        let supplier: Supplier = serde_json::from_value(row).unwrap();
        assert!(!supplier.active);
        assert_eq!(supplier.payment_terms, Some(30));
    }
}
