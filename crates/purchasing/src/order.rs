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
use ceramerp_parties::{SupplierId, SupplierRef};
use ceramerp_products::{ItemId, ItemRef};

define_id!(PurchaseOrderId, "PurchaseOrderId");
define_id!(PurchaseOrderLineId, "PurchaseOrderLineId");

/// Purchase order status lifecycle.
///
/// `draft → sent → received`, with `cancelled` reachable from any open state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PurchaseOrderStatus {
    #[default]
    Draft,
    Sent,
    Received,
    Cancelled,
}

impl PurchaseOrderStatus {
    /// Still expecting goods.
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Draft | Self::Sent)
    }

    pub fn can_transition_to(&self, next: Self) -> bool {
        use PurchaseOrderStatus::*;
        matches!(
            (self, next),
            (Draft, Sent)
                | (Draft, Received)
                | (Sent, Received)
                | (Draft, Cancelled)
                | (Sent, Cancelled)
        )
    }
}

/// Purchase order header (`purchase_orders`), with supplier and lines when
/// the read expanded them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseOrder {
    pub id: PurchaseOrderId,
    pub order_number: String,
    pub supplier_id: SupplierId,
    pub order_date: NaiveDate,
    #[serde(default)]
    pub expected_date: Option<NaiveDate>,
    #[serde(default)]
    pub status: PurchaseOrderStatus,
    pub subtotal: Decimal,
    pub tax_amount: Decimal,
    pub total: Decimal,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supplier: Option<SupplierRef>,
    #[serde(
        default,
        rename = "purchase_order_items",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub lines: Vec<PurchaseOrderLine>,
}

impl Entity for PurchaseOrder {
    type Id = PurchaseOrderId;
    const TABLE: &'static str = "purchase_orders";

    fn id(&self) -> PurchaseOrderId {
        self.id
    }
}

impl PurchaseOrder {
    pub fn ensure_transition(&self, next: PurchaseOrderStatus) -> DomainResult<()> {
        if self.status == next || self.status.can_transition_to(next) {
            return Ok(());
        }
        Err(DomainError::conflict(format!(
            "purchase order {} cannot go from {:?} to {:?}",
            self.order_number, self.status, next
        )))
    }

    pub fn ensure_receivable(&self) -> DomainResult<()> {
        if !self.status.is_open() {
            return Err(DomainError::conflict(format!(
                "purchase order {} is {:?} and cannot be received",
                self.order_number, self.status
            )));
        }
        if self.lines.is_empty() {
            return Err(DomainError::invariant(format!(
                "purchase order {} has no lines",
                self.order_number
            )));
        }
        Ok(())
    }

    /// Quantity to receive per item, lines for the same item merged.
    pub fn receipt_quantities(&self) -> BTreeMap<ItemId, Decimal> {
        let mut out: BTreeMap<ItemId, Decimal> = BTreeMap::new();
        for line in &self.lines {
            *out.entry(line.item_id).or_default() += line.quantity;
        }
        out
    }
}

/// Purchase order line (`purchase_order_items`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseOrderLine {
    pub id: PurchaseOrderLineId,
    pub purchase_order_id: PurchaseOrderId,
    pub item_id: ItemId,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub total: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item: Option<ItemRef>,
}

impl Entity for PurchaseOrderLine {
    type Id = PurchaseOrderLineId;
    const TABLE: &'static str = "purchase_order_items";

    fn id(&self) -> PurchaseOrderLineId {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct PurchaseLineInput {
    pub item_id: ItemId,
    #[validate(custom(function = "positive"))]
    pub quantity: Decimal,
    #[validate(custom(function = "non_negative"))]
    pub unit_price: Decimal,
}

fn default_tax_rate() -> Decimal {
    Decimal::from(23)
}

/// Create/edit form for a purchase order with its lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[validate(schema(function = "purchase_order_rules"))]
pub struct PurchaseOrderInput {
    #[validate(length(min = 1, max = 30, message = "order number is required"))]
    pub order_number: String,
    pub supplier_id: SupplierId,
    pub order_date: NaiveDate,
    #[serde(default)]
    pub expected_date: Option<NaiveDate>,
    /// VAT percent applied to the subtotal.
    #[serde(default = "default_tax_rate")]
    pub tax_rate: Decimal,
    #[serde(default)]
    pub notes: Option<String>,
    #[validate(length(min = 1, message = "add at least one line"), nested)]
    pub lines: Vec<PurchaseLineInput>,
}

fn purchase_order_rules(input: &PurchaseOrderInput) -> Result<(), ValidationError> {
    if input.tax_rate < Decimal::ZERO || input.tax_rate > Decimal::ONE_HUNDRED {
        return Err(invalid("tax_rate", "tax rate must be between 0 and 100"));
    }
    if input.expected_date.is_some_and(|d| d < input.order_date) {
        return Err(invalid(
            "expected_date",
            "expected date cannot be before the order date",
        ));
    }
    Ok(())
}

/// Header row as inserted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewPurchaseOrder {
    pub order_number: String,
    pub supplier_id: SupplierId,
    pub order_date: NaiveDate,
    pub expected_date: Option<NaiveDate>,
    pub status: PurchaseOrderStatus,
    #[serde(flatten)]
    pub totals: DocumentTotals,
    pub notes: Option<String>,
}

/// Line row as inserted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewPurchaseOrderLine {
    pub purchase_order_id: PurchaseOrderId,
    pub item_id: ItemId,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub total: Decimal,
}

/// Header and priced lines computed from a validated input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchaseOrderDraft {
    pub header: NewPurchaseOrder,
    lines: Vec<(PurchaseLineInput, Decimal)>,
}

impl PurchaseOrderDraft {
    pub fn totals(&self) -> DocumentTotals {
        self.header.totals
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Line rows pointing at the inserted header.
    pub fn lines_for(&self, order_id: PurchaseOrderId) -> Vec<NewPurchaseOrderLine> {
        self.lines
            .iter()
            .map(|(line, total)| NewPurchaseOrderLine {
                purchase_order_id: order_id,
                item_id: line.item_id,
                quantity: line.quantity,
                unit_price: line.unit_price,
                total: *total,
            })
            .collect()
    }
}

impl PurchaseOrderInput {
    /// Price the lines and build the header. New orders start as drafts.
    pub fn draft(&self) -> PurchaseOrderDraft {
        let lines: Vec<(PurchaseLineInput, Decimal)> = self
            .lines
            .iter()
            .map(|l| (l.clone(), line_total(l.quantity, l.unit_price)))
            .collect();
        let totals = DocumentTotals::from_lines(lines.iter().map(|(_, t)| *t), self.tax_rate);
        PurchaseOrderDraft {
            header: NewPurchaseOrder {
                order_number: self.order_number.trim().to_string(),
                supplier_id: self.supplier_id,
                order_date: self.order_date,
                expected_date: self.expected_date,
                status: PurchaseOrderStatus::Draft,
                totals,
                notes: self.notes.clone().filter(|n| !n.trim().is_empty()),
            },
            lines,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ceramerp_core::FieldErrors;
    use ceramerp_core::validation::FORM_LEVEL;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 4, d).unwrap()
    }

    fn input(lines: Vec<PurchaseLineInput>) -> PurchaseOrderInput {
        PurchaseOrderInput {
            order_number: "PO-2024-001".into(),
            supplier_id: SupplierId::new(),
            order_date: date(10),
            expected_date: Some(date(20)),
            tax_rate: dec!(23),
            notes: None,
            lines,
        }
    }

    fn line(quantity: Decimal, unit_price: Decimal) -> PurchaseLineInput {
        PurchaseLineInput {
            item_id: ItemId::new(),
            quantity,
            unit_price,
        }
    }

    #[test]
    fn draft_prices_lines_and_header() {
        let draft = input(vec![line(dec!(100), dec!(0.35)), line(dec!(2), dec!(12.50))]).draft();
        assert_eq!(draft.header.status, PurchaseOrderStatus::Draft);
        assert_eq!(draft.totals().subtotal, dec!(60.00));
        assert_eq!(draft.totals().tax_amount, dec!(13.80));
        assert_eq!(draft.totals().total, dec!(73.80));

        let order_id = PurchaseOrderId::new();
        let rows = draft.lines_for(order_id);
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.purchase_order_id == order_id));
        assert_eq!(rows[0].total, dec!(35.00));
    }

    #[test]
    fn header_serializes_totals_as_columns() {
        let draft = input(vec![line(dec!(1), dec!(10))]).draft();
        let body = serde_json::to_value(&draft.header).unwrap();
        let amount = |key: &str| body[key].as_str().unwrap().parse::<Decimal>().unwrap();
        assert_eq!(amount("subtotal"), dec!(10));
        assert_eq!(amount("total"), dec!(12.30));
        assert_eq!(body["status"], "draft");
        assert!(body.get("totals").is_none());
    }

    #[test]
    fn empty_order_and_bad_lines_are_rejected() {
        let errors: FieldErrors = input(vec![]).validate().unwrap_err().into();
        assert!(errors.contains("lines"));

        let errors: FieldErrors = input(vec![line(dec!(0), dec!(1))])
            .validate()
            .unwrap_err()
            .into();
        assert!(errors.contains("lines[0].quantity"));
    }

    #[test]
    fn expected_date_before_order_date_is_rejected() {
        let mut form = input(vec![line(dec!(1), dec!(1))]);
        form.expected_date = Some(date(1));
        let errors: FieldErrors = form.validate().unwrap_err().into();
        assert!(errors.contains(FORM_LEVEL));
    }

    #[test]
    fn status_transitions() {
        use PurchaseOrderStatus::*;
        assert!(Draft.can_transition_to(Sent));
        assert!(Sent.can_transition_to(Received));
        assert!(!Received.can_transition_to(Cancelled));
        assert!(!Cancelled.can_transition_to(Draft));
        assert!(!Sent.can_transition_to(Draft));
    }

    #[test]
    fn receipt_merges_lines_of_the_same_item() {
        let item = ItemId::new();
        let order_id = PurchaseOrderId::new();
        let line = |q: Decimal| PurchaseOrderLine {
            id: PurchaseOrderLineId::new(),
            purchase_order_id: order_id,
            item_id: item,
            quantity: q,
            unit_price: dec!(1),
            total: q,
            item: None,
        };
        let order = PurchaseOrder {
            id: order_id,
            order_number: "PO-1".into(),
            supplier_id: SupplierId::new(),
            order_date: date(1),
            expected_date: None,
            status: PurchaseOrderStatus::Sent,
            subtotal: dec!(5),
            tax_amount: dec!(0),
            total: dec!(5),
            notes: None,
            created_at: None,
            supplier: None,
            lines: vec![line(dec!(2)), line(dec!(3))],
        };
        assert!(order.ensure_receivable().is_ok());
        assert_eq!(order.receipt_quantities().get(&item), Some(&dec!(5)));

        let received = PurchaseOrder {
            status: PurchaseOrderStatus::Received,
            ..order
        };
        assert!(matches!(
            received.ensure_receivable(),
            Err(DomainError::Conflict(_))
        ));
    }

    proptest! {
        #![proptest_config(ProptestConfig { cases: 256, .. ProptestConfig::default() })]

        #[test]
        fn totals_are_consistent(
            raw in proptest::collection::vec((1i64..10_000, 0i64..100_000), 1..12),
            rate in 0u32..=30,
        ) {
            let mut form = input(
                raw.iter()
                    .map(|(q, p)| line(Decimal::new(*q, 1), Decimal::new(*p, 2)))
                    .collect(),
            );
            form.tax_rate = Decimal::from(rate);
            let draft = form.draft();
            let lines = draft.lines_for(PurchaseOrderId::new());
            let sum: Decimal = lines.iter().map(|l| l.total).sum();
            let totals = draft.totals();
            prop_assert_eq!(totals.subtotal, sum);
            prop_assert_eq!(totals.total, totals.subtotal + totals.tax_amount);
            prop_assert!(totals.tax_amount >= Decimal::ZERO);
        }
    }
}
