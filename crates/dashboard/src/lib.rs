//! Client-side dashboard aggregation.
//!
//! Transaction rows are fetched for a bounded window and reduced here into
//! chart-ready, ordered series. Nothing in this crate performs IO.

pub mod cashflow;
pub mod category;
pub mod revenue;
pub mod summary;

pub use cashflow::{CashflowPoint, CashflowWindow, DEFAULT_CASHFLOW_DAYS, cashflow_projection};
pub use category::{CategoryTotal, UNCATEGORIZED, expenses_by_category};
pub use revenue::{DEFAULT_REVENUE_MONTHS, RevenuePoint, RevenueWindow, monthly_revenue};
pub use summary::{DashboardSummary, PendingTotals};
