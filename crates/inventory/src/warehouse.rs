use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use ceramerp_core::{Entity, define_id};

define_id!(WarehouseId, "WarehouseId");

/// Warehouse row (`warehouses`). Deactivated rather than deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warehouse {
    pub id: WarehouseId,
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default = "active_default")]
    pub active: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

fn active_default() -> bool {
    true
}

impl Entity for Warehouse {
    type Id = WarehouseId;
    const TABLE: &'static str = "warehouses";

    fn id(&self) -> WarehouseId {
        self.id
    }
}

/// Warehouse as embedded in stock and movement reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarehouseRef {
    pub id: WarehouseId,
    pub code: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct WarehouseInput {
    #[validate(length(min = 1, max = 20, message = "code is required (max 20 characters)"))]
    pub code: String,
    #[validate(length(min = 1, max = 100, message = "name is required"))]
    pub name: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default = "active_default")]
    pub active: bool,
}

impl WarehouseInput {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            location: None,
            active: true,
        }
    }
}
