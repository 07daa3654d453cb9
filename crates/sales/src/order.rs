use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use ceramerp_core::validation::invalid;
use ceramerp_core::{
    DocumentTotals, DomainError, DomainResult, Entity, define_id, line_total, non_negative,
    positive,
};
use ceramerp_parties::{CustomerId, CustomerRef};
use ceramerp_products::{ItemId, ItemRef};

define_id!(SalesOrderId, "SalesOrderId");
define_id!(SalesOrderLineId, "SalesOrderLineId");

/// Sales order status lifecycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SalesOrderStatus {
    #[default]
    Draft,
    Confirmed,
    Shipped,
    Invoiced,
    Cancelled,
}

impl SalesOrderStatus {
    /// Not yet shipped or cancelled.
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Draft | Self::Confirmed)
    }

    pub fn can_transition_to(&self, next: Self) -> bool {
        use SalesOrderStatus::*;
        matches!(
            (self, next),
            (Draft, Confirmed)
                | (Draft, Shipped)
                | (Confirmed, Shipped)
                | (Shipped, Invoiced)
                | (Draft, Cancelled)
                | (Confirmed, Cancelled)
        )
    }
}

/// Sales order header (`sales_orders`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesOrder {
    pub id: SalesOrderId,
    pub order_number: String,
    pub customer_id: CustomerId,
    pub order_date: NaiveDate,
    #[serde(default)]
    pub delivery_date: Option<NaiveDate>,
    #[serde(default)]
    pub status: SalesOrderStatus,
    pub subtotal: Decimal,
    pub tax_amount: Decimal,
    pub total: Decimal,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer: Option<CustomerRef>,
    #[serde(default, rename = "sales_order_items", skip_serializing_if = "Vec::is_empty")]
    pub lines: Vec<SalesOrderLine>,
}

impl Entity for SalesOrder {
    type Id = SalesOrderId;
    const TABLE: &'static str = "sales_orders";

    fn id(&self) -> SalesOrderId {
        self.id
    }
}

impl SalesOrder {
    pub fn ensure_transition(&self, next: SalesOrderStatus) -> DomainResult<()> {
        if self.status == next || self.status.can_transition_to(next) {
            return Ok(());
        }
        Err(DomainError::conflict(format!(
            "sales order {} cannot go from {:?} to {:?}",
            self.order_number, self.status, next
        )))
    }

    pub fn ensure_shippable(&self) -> DomainResult<()> {
        if !self.status.is_open() {
            return Err(DomainError::conflict(format!(
                "sales order {} is {:?} and cannot be shipped",
                self.order_number, self.status
            )));
        }
        if self.lines.is_empty() {
            return Err(DomainError::invariant(format!(
                "sales order {} has no lines",
                self.order_number
            )));
        }
        Ok(())
    }

    /// Quantity to ship per item.
    pub fn shipment_quantities(&self) -> BTreeMap<ItemId, Decimal> {
        let mut out: BTreeMap<ItemId, Decimal> = BTreeMap::new();
        for line in &self.lines {
            *out.entry(line.item_id).or_default() += line.quantity;
        }
        out
    }
}

/// Sales order line (`sales_order_items`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesOrderLine {
    pub id: SalesOrderLineId,
    pub sales_order_id: SalesOrderId,
    pub item_id: ItemId,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub total: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item: Option<ItemRef>,
}

impl Entity for SalesOrderLine {
    type Id = SalesOrderLineId;
    const TABLE: &'static str = "sales_order_items";

    fn id(&self) -> SalesOrderLineId {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct SalesLineInput {
    pub item_id: ItemId,
    #[validate(custom(function = "positive"))]
    pub quantity: Decimal,
    #[validate(custom(function = "non_negative"))]
    pub unit_price: Decimal,
}

fn default_tax_rate() -> Decimal {
    Decimal::from(23)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[validate(schema(function = "sales_order_rules"))]
pub struct SalesOrderInput {
    #[validate(length(min = 1, max = 30, message = "order number is required"))]
    pub order_number: String,
    pub customer_id: CustomerId,
    pub order_date: NaiveDate,
    #[serde(default)]
    pub delivery_date: Option<NaiveDate>,
    #[serde(default = "default_tax_rate")]
    pub tax_rate: Decimal,
    #[serde(default)]
    pub notes: Option<String>,
    #[validate(length(min = 1, message = "add at least one line"), nested)]
    pub lines: Vec<SalesLineInput>,
}

fn sales_order_rules(input: &SalesOrderInput) -> Result<(), ValidationError> {
    if input.tax_rate < Decimal::ZERO || input.tax_rate > Decimal::ONE_HUNDRED {
        return Err(invalid("tax_rate", "tax rate must be between 0 and 100"));
    }
    if input.delivery_date.is_some_and(|d| d < input.order_date) {
        return Err(invalid(
            "delivery_date",
            "delivery date cannot be before the order date",
        ));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewSalesOrder {
    pub order_number: String,
    pub customer_id: CustomerId,
    pub order_date: NaiveDate,
    pub delivery_date: Option<NaiveDate>,
    pub status: SalesOrderStatus,
    #[serde(flatten)]
    pub totals: DocumentTotals,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewSalesOrderLine {
    pub sales_order_id: SalesOrderId,
    pub item_id: ItemId,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SalesOrderDraft {
    pub header: NewSalesOrder,
    lines: Vec<(SalesLineInput, Decimal)>,
}

impl SalesOrderDraft {
    pub fn totals(&self) -> DocumentTotals {
        self.header.totals
    }

    pub fn lines_for(&self, order_id: SalesOrderId) -> Vec<NewSalesOrderLine> {
        self.lines
            .iter()
            .map(|(line, total)| NewSalesOrderLine {
                sales_order_id: order_id,
                item_id: line.item_id,
                quantity: line.quantity,
                unit_price: line.unit_price,
                total: *total,
            })
            .collect()
    }
}

impl SalesOrderInput {
    pub fn draft(&self) -> SalesOrderDraft {
        let lines: Vec<(SalesLineInput, Decimal)> = self
            .lines
            .iter()
            .map(|l| (l.clone(), line_total(l.quantity, l.unit_price)))
            .collect();
        let totals = DocumentTotals::from_lines(lines.iter().map(|(_, t)| *t), self.tax_rate);
        SalesOrderDraft {
            header: NewSalesOrder {
                order_number: self.order_number.trim().to_string(),
                customer_id: self.customer_id,
                order_date: self.order_date,
                delivery_date: self.delivery_date,
                status: SalesOrderStatus::Draft,
                totals,
                notes: self.notes.clone().filter(|n| !n.trim().is_empty()),
            },
            lines,
        }
    }
}
