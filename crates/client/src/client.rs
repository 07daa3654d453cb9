use std::sync::Arc;
use std::time::Duration;

use ceramerp_backend::{AuthService, DataApi, RestAuthService, RestDataApi};

use crate::cache::QueryCache;
use crate::config::{AdjustmentGuard, ClientConfig};
use crate::error::ClientResult;
use crate::hooks::{
    AccountingHooks, CategoryHooks, CustomerHooks, DashboardHooks, ItemHooks,
    PurchaseOrderHooks, SalesOrderHooks, StockHooks, SupplierHooks, TaxHooks, TransferHooks,
    TreasuryHooks, WarehouseHooks,
};
use crate::notify::{Notifier, TracingNotifier};
use crate::session::AuthContext;

const DEFAULT_STALE_AFTER: Duration = Duration::from_secs(30);

/// Client context: data API, query cache, notifications and session.
///
/// Constructed once and passed explicitly; every hook borrows it.
pub struct ErpClient {
    pub(crate) data: Arc<dyn DataApi>,
    pub(crate) cache: Arc<QueryCache>,
    pub(crate) notifier: Arc<dyn Notifier>,
    pub(crate) adjustment_guard: AdjustmentGuard,
    session: AuthContext,
}

impl ErpClient {
    pub fn builder(data: Arc<dyn DataApi>, auth: Arc<dyn AuthService>) -> ErpClientBuilder {
        ErpClientBuilder {
            data,
            auth,
            notifier: Arc::new(TracingNotifier),
            stale_after: DEFAULT_STALE_AFTER,
            adjustment_guard: AdjustmentGuard::default(),
        }
    }

    /// Client for the hosted backend described by `config`.
    pub fn connect(config: &ClientConfig) -> ClientResult<Self> {
        let data = Arc::new(RestDataApi::new(&config.backend)?);
        let auth = Arc::new(RestAuthService::new(&config.backend)?);
        Ok(Self::builder(data, auth)
            .stale_after(config.cache.stale_after())
            .adjustment_guard(config.inventory.adjustment_guard)
            .build())
    }

    pub fn session(&self) -> &AuthContext {
        &self.session
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    pub fn customers(&self) -> CustomerHooks<'_> {
        CustomerHooks::new(self)
    }

    pub fn suppliers(&self) -> SupplierHooks<'_> {
        SupplierHooks::new(self)
    }

    pub fn categories(&self) -> CategoryHooks<'_> {
        CategoryHooks::new(self)
    }

    pub fn items(&self) -> ItemHooks<'_> {
        ItemHooks::new(self)
    }

    pub fn warehouses(&self) -> WarehouseHooks<'_> {
        WarehouseHooks::new(self)
    }

    pub fn stock(&self) -> StockHooks<'_> {
        StockHooks::new(self)
    }

    pub fn transfers(&self) -> TransferHooks<'_> {
        TransferHooks::new(self)
    }

    pub fn purchase_orders(&self) -> PurchaseOrderHooks<'_> {
        PurchaseOrderHooks::new(self)
    }

    pub fn sales_orders(&self) -> SalesOrderHooks<'_> {
        SalesOrderHooks::new(self)
    }

    pub fn accounting(&self) -> AccountingHooks<'_> {
        AccountingHooks::new(self)
    }

    pub fn treasury(&self) -> TreasuryHooks<'_> {
        TreasuryHooks::new(self)
    }

    pub fn taxes(&self) -> TaxHooks<'_> {
        TaxHooks::new(self)
    }

    pub fn dashboard(&self) -> DashboardHooks<'_> {
        DashboardHooks::new(self)
    }
}

impl core::fmt::Debug for ErpClient {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ErpClient")
            .field("cache", &self.cache)
            .field("adjustment_guard", &self.adjustment_guard)
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

pub struct ErpClientBuilder {
    data: Arc<dyn DataApi>,
    auth: Arc<dyn AuthService>,
    notifier: Arc<dyn Notifier>,
    stale_after: Duration,
    adjustment_guard: AdjustmentGuard,
}

impl ErpClientBuilder {
    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn stale_after(mut self, stale_after: Duration) -> Self {
        self.stale_after = stale_after;
        self
    }

    pub fn adjustment_guard(mut self, guard: AdjustmentGuard) -> Self {
        self.adjustment_guard = guard;
        self
    }

    pub fn build(self) -> ErpClient {
        let cache = Arc::new(QueryCache::new(self.stale_after));
        let session = AuthContext::new(
            self.auth,
            self.data.clone(),
            cache.clone(),
            self.notifier.clone(),
        );
        ErpClient {
            data: self.data,
            cache,
            notifier: self.notifier,
            adjustment_guard: self.adjustment_guard,
            session,
        }
    }
}
