//! Client for the ceramics ERP backend.
//!
//! An [`ErpClient`] owns the data API handle, the query cache, the notifier
//! and the session. Per-entity hooks borrow it:
//!
//! ```no_run
//! # async fn demo(client: &ceramerp_client::ErpClient) -> ceramerp_client::ClientResult<()> {
//! let low = client.stock().low_stock().await?;
//! println!("{} rows below minimum", low.len());
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod hooks;
pub mod notify;
pub mod session;

pub use cache::{DASHBOARD, QueryCache, QueryKey};
pub use client::{ErpClient, ErpClientBuilder};
pub use config::{AdjustmentGuard, ClientConfig};
pub use error::{ClientError, ClientResult};
pub use hooks::{
    AccountingHooks, CategoryHooks, CustomerHooks, DashboardHooks, ItemHooks,
    PurchaseOrderHooks, SalesOrderHooks, StockHooks, SupplierHooks, TaxHooks, TransferHooks,
    TreasuryHooks, WarehouseHooks,
};
pub use notify::{Level, Notification, Notifier, RecordingNotifier, TracingNotifier};
pub use session::{AuthContext, AuthState};
