use chrono::NaiveDate;
use serde::de::IgnoredAny;

use ceramerp_accounting::{FinancialTransaction, TransactionStatus, TransactionType};
use ceramerp_backend::schema::{
    CUSTOMERS, FINANCIAL_TRANSACTIONS, ITEMS, PURCHASE_ORDERS, SALES_ORDERS,
};
use ceramerp_backend::{Filter, Query};
use ceramerp_dashboard::{
    CashflowPoint, CashflowWindow, CategoryTotal, DEFAULT_CASHFLOW_DAYS, DEFAULT_REVENUE_MONTHS,
    DashboardSummary, PendingTotals, RevenuePoint, RevenueWindow, cashflow_projection,
    expenses_by_category, monthly_revenue,
};
use ceramerp_purchasing::PurchaseOrderStatus;
use ceramerp_sales::SalesOrderStatus;

use crate::cache::{DASHBOARD, QueryKey};
use crate::client::ErpClient;
use crate::error::{ClientError, ClientResult};
use crate::hooks::StockHooks;

/// Dashboard figures. Rows are fetched for the window and reduced locally.
///
/// Every method takes `today` so the windows are reproducible.
pub struct DashboardHooks<'a> {
    client: &'a ErpClient,
}

impl<'a> DashboardHooks<'a> {
    pub(crate) fn new(client: &'a ErpClient) -> Self {
        Self { client }
    }

    /// Completed income per month over the trailing window ending `today`.
    pub async fn revenue(&self, today: NaiveDate) -> ClientResult<Vec<RevenuePoint>> {
        let window = RevenueWindow::trailing(today, DEFAULT_REVENUE_MONTHS);
        let key = QueryKey::new(DASHBOARD)
            .with("revenue")
            .with(window.start.to_string())
            .with(window.end.to_string());
        self.client
            .cache
            .fetch(key, || async move {
                let rows = self
                    .transactions(
                        Query::new()
                            .eq("transaction_type", TransactionType::Income)
                            .eq("status", TransactionStatus::Completed)
                            .gte("transaction_date", window.start)
                            .lte("transaction_date", window.end),
                    )
                    .await?;
                Ok(monthly_revenue(&rows))
            })
            .await
    }

    /// Daily inflow, outflow and running total from 30 days before `today`
    /// to 30 days after. Pending rows count, so the tail is a projection.
    pub async fn cashflow(&self, today: NaiveDate) -> ClientResult<Vec<CashflowPoint>> {
        let window = CashflowWindow::around(today, DEFAULT_CASHFLOW_DAYS);
        let key = QueryKey::new(DASHBOARD)
            .with("cashflow")
            .with(window.start.to_string())
            .with(window.end.to_string());
        self.client
            .cache
            .fetch(key, || async move {
                let rows = self
                    .transactions(
                        Query::new()
                            .gte("transaction_date", window.start)
                            .lte("transaction_date", window.end),
                    )
                    .await?;
                Ok(cashflow_projection(&rows))
            })
            .await
    }

    /// Completed expenses per category over the revenue window.
    pub async fn expenses(&self, today: NaiveDate) -> ClientResult<Vec<CategoryTotal>> {
        let window = RevenueWindow::trailing(today, DEFAULT_REVENUE_MONTHS);
        let key = QueryKey::new(DASHBOARD)
            .with("expenses")
            .with(window.start.to_string())
            .with(window.end.to_string());
        self.client
            .cache
            .fetch(key, || async move {
                let rows = self
                    .transactions(
                        Query::new()
                            .eq("transaction_type", TransactionType::Expense)
                            .eq("status", TransactionStatus::Completed)
                            .gte("transaction_date", window.start)
                            .lte("transaction_date", window.end),
                    )
                    .await?;
                Ok(expenses_by_category(&rows))
            })
            .await
    }

    pub async fn summary(&self) -> ClientResult<DashboardSummary> {
        let key = QueryKey::new(DASHBOARD).with("summary");
        self.client
            .cache
            .fetch(key, || async move {
                let active = Query::new().select("id").eq("active", true);
                let active_customers = self.count(CUSTOMERS, active.clone()).await?;
                let active_items = self.count(ITEMS, active).await?;
                let low_stock = StockHooks::new(self.client).low_stock().await?.len();
                let open_purchase_orders = self
                    .count(
                        PURCHASE_ORDERS,
                        Query::new().select("id").filter(Filter::in_list(
                            "status",
                            &[PurchaseOrderStatus::Draft, PurchaseOrderStatus::Sent],
                        )),
                    )
                    .await?;
                let open_sales_orders = self
                    .count(
                        SALES_ORDERS,
                        Query::new().select("id").filter(Filter::in_list(
                            "status",
                            &[SalesOrderStatus::Draft, SalesOrderStatus::Confirmed],
                        )),
                    )
                    .await?;
                let pending = self
                    .transactions(Query::new().eq("status", TransactionStatus::Pending))
                    .await?;

                Ok(DashboardSummary {
                    active_customers,
                    active_items,
                    low_stock,
                    open_purchase_orders,
                    open_sales_orders,
                    ..DashboardSummary::default()
                }
                .with_pending(PendingTotals::from_transactions(&pending)))
            })
            .await
    }

    async fn transactions(&self, query: Query) -> ClientResult<Vec<FinancialTransaction>> {
        self.client
            .table(FINANCIAL_TRANSACTIONS)
            .fetch(&query)
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "dashboard read failed");
                ClientError::from(e)
            })
    }

    async fn count(&self, table: &'static str, query: Query) -> ClientResult<usize> {
        let rows: Vec<IgnoredAny> = self.client.table(table).fetch(&query).await?;
        Ok(rows.len())
    }
}
