use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use ceramerp_core::{Entity, define_id, non_negative};

use crate::category::{CategoryId, CategoryRef};

define_id!(ItemId, "ItemId");

/// Unit of measure an item is stocked and priced in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Unit {
    #[default]
    #[serde(rename = "un")]
    Piece,
    #[serde(rename = "kg")]
    Kilogram,
    #[serde(rename = "m2")]
    SquareMeter,
    #[serde(rename = "cx")]
    Box,
    #[serde(rename = "l")]
    Liter,
}

impl Unit {
    pub fn as_str(&self) -> &'static str {
        match self {
            Unit::Piece => "un",
            Unit::Kilogram => "kg",
            Unit::SquareMeter => "m2",
            Unit::Box => "cx",
            Unit::Liter => "l",
        }
    }
}

impl core::fmt::Display for Unit {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Item row (`items`), optionally with its category expanded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub code: String,
    pub description: String,
    #[serde(default)]
    pub unit: Unit,
    pub unit_price: Decimal,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<CategoryRef>,
    #[serde(default = "active_default")]
    pub active: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

fn active_default() -> bool {
    true
}

impl Item {
    pub fn category_name(&self) -> Option<&str> {
        self.category.as_ref().map(|c| c.name.as_str())
    }
}

impl Entity for Item {
    type Id = ItemId;
    const TABLE: &'static str = "items";

    fn id(&self) -> ItemId {
        self.id
    }
}

/// Item as embedded in stock, movement and order-line reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRef {
    pub id: ItemId,
    pub code: String,
    pub description: String,
    #[serde(default)]
    pub unit: Unit,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct ItemInput {
    #[validate(length(min = 1, max = 30, message = "code is required (max 30 characters)"))]
    pub code: String,
    #[validate(length(min = 1, max = 200, message = "description is required"))]
    pub description: String,
    #[serde(default)]
    pub unit: Unit,
    #[validate(custom(function = "non_negative"))]
    pub unit_price: Decimal,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    #[serde(default = "active_default")]
    pub active: bool,
}

impl ItemInput {
    pub fn new(code: impl Into<String>, description: impl Into<String>, unit_price: Decimal) -> Self {
        Self {
            code: code.into(),
            description: description.into(),
            unit: Unit::default(),
            unit_price,
            category_id: None,
            active: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ceramerp_core::FieldErrors;
    use rust_decimal_macros::dec;

    #[test]
    fn decodes_embedded_category() {
        let row = serde_json::json!({
            "id": "8a1d6c2e-55f0-4c1e-bb0e-3f8f4a9d2c10",
            "code": "PR-001",
            "description": "Prato raso 27cm",
            "unit": "un",
            "unit_price": "4.90",
            "category_id": "1c9e7b44-2a3d-4e8f-9b61-0d2c5e7f8a93",
            "category": { "id": "1c9e7b44-2a3d-4e8f-9b61-0d2c5e7f8a93", "name": "Louça de mesa" },
            "active": true
        });
        let item: Item = serde_json::from_value(row).unwrap();
        assert_eq!(item.unit_price, dec!(4.90));
        assert_eq!(item.category_name(), Some("Louça de mesa"));
    }

    #[test]
    fn uncategorised_item_decodes_without_embed() {
        let row = serde_json::json!({
            "id": "8a1d6c2e-55f0-4c1e-bb0e-3f8f4a9d2c10",
            "code": "ARG-10",
            "description": "Argila vermelha",
            "unit": "kg",
            "unit_price": "0.35",
            "category_id": null,
            "category": null
        });
        let item: Item = serde_json::from_value(row).unwrap();
        assert_eq!(item.unit, Unit::Kilogram);
        assert!(item.category.is_none());
        assert!(item.active);
    }

    #[test]
    fn negative_price_is_a_field_error() {
        let input = ItemInput::new("PR-002", "Prato fundo", dec!(-1));
        let errors: FieldErrors = input.validate().unwrap_err().into();
        assert_eq!(
            errors.get("unit_price"),
            Some(&["must not be negative".to_string()][..])
        );
    }
}
