use chrono::NaiveDate;
use serde_json::json;

use ceramerp_accounting::{Period, TaxId, TaxInput, TaxObligation, TaxStatus, VatSummary};
use ceramerp_backend::schema::{PURCHASE_ORDERS, SALES_ORDERS, TAXES};
use ceramerp_backend::{Filter, Query};
use ceramerp_purchasing::{PurchaseOrder, PurchaseOrderStatus};
use ceramerp_sales::{SalesOrder, SalesOrderStatus};

use crate::cache::QueryKey;
use crate::client::ErpClient;
use crate::error::ClientResult;
use crate::hooks::{Mutation, ensure_deleted, validate};

const WRITE: Mutation = Mutation {
    success: "Tax saved",
    failure: "Could not save tax",
    invalidates: &[TAXES],
};
const DELETE: Mutation = Mutation {
    success: "Tax deleted",
    failure: "Could not delete tax",
    invalidates: &[TAXES],
};
const PAY: Mutation = Mutation {
    success: "Tax marked as paid",
    failure: "Could not mark tax as paid",
    invalidates: &[TAXES],
};

const VAT_SALES: &[SalesOrderStatus] = &[
    SalesOrderStatus::Confirmed,
    SalesOrderStatus::Shipped,
    SalesOrderStatus::Invoiced,
];
const VAT_PURCHASES: &[PurchaseOrderStatus] =
    &[PurchaseOrderStatus::Sent, PurchaseOrderStatus::Received];

pub struct TaxHooks<'a> {
    client: &'a ErpClient,
}

impl<'a> TaxHooks<'a> {
    pub(crate) fn new(client: &'a ErpClient) -> Self {
        Self { client }
    }

    /// Obligations, earliest due first.
    pub async fn list(&self) -> ClientResult<Vec<TaxObligation>> {
        self.client
            .cached_rows(
                QueryKey::new(TAXES),
                TAXES,
                Query::new().order_asc("due_date"),
            )
            .await
    }

    pub async fn create(&self, input: TaxInput) -> ClientResult<TaxObligation> {
        validate(&input)?;
        self.client
            .mutate(&WRITE, async {
                Ok(self.client.table(TAXES).insert(&input).await?)
            })
            .await
    }

    pub async fn update(&self, id: TaxId, input: TaxInput) -> ClientResult<TaxObligation> {
        validate(&input)?;
        self.client
            .mutate(&WRITE, async {
                Ok(self
                    .client
                    .table(TAXES)
                    .update_one(&[Filter::eq("id", id)], &input)
                    .await?)
            })
            .await
    }

    pub async fn delete(&self, id: TaxId) -> ClientResult<()> {
        self.client
            .mutate(&DELETE, async {
                let removed = self.client.table(TAXES).delete(&[Filter::eq("id", id)]).await?;
                ensure_deleted(removed, format!("tax {id}"))
            })
            .await
    }

    pub async fn mark_paid(&self, id: TaxId, paid_on: NaiveDate) -> ClientResult<TaxObligation> {
        self.client
            .mutate(&PAY, async {
                Ok(self
                    .client
                    .table(TAXES)
                    .update_one(
                        &[Filter::eq("id", id)],
                        &json!({ "status": TaxStatus::Paid, "paid_date": paid_on }),
                    )
                    .await?)
            })
            .await
    }

    /// Pending obligations due within `days` of `today`, overdue ones included.
    pub async fn upcoming(&self, today: NaiveDate, days: i64) -> ClientResult<Vec<TaxObligation>> {
        Ok(self
            .list()
            .await?
            .into_iter()
            .filter(|tax| tax.is_due_within(today, days))
            .collect())
    }

    /// VAT charged on sales minus VAT paid on purchases dated in `period`.
    ///
    /// Drafts and cancelled orders are left out.
    pub async fn vat_summary(&self, period: Period) -> ClientResult<VatSummary> {
        let sales: Vec<SalesOrder> = self
            .client
            .table(SALES_ORDERS)
            .fetch(
                &Query::new()
                    .gte("order_date", period.first_day())
                    .lte("order_date", period.last_day())
                    .filter(Filter::in_list("status", VAT_SALES)),
            )
            .await?;
        let purchases: Vec<PurchaseOrder> = self
            .client
            .table(PURCHASE_ORDERS)
            .fetch(
                &Query::new()
                    .gte("order_date", period.first_day())
                    .lte("order_date", period.last_day())
                    .filter(Filter::in_list("status", VAT_PURCHASES)),
            )
            .await?;
        tracing::debug!(
            %period,
            sales = sales.len(),
            purchases = purchases.len(),
            "vat summary inputs"
        );
        Ok(VatSummary::compute(
            period,
            sales.iter().map(|o| o.tax_amount),
            purchases.iter().map(|o| o.tax_amount),
        ))
    }
}
