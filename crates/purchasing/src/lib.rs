//! Purchasing: purchase orders, their lines and goods receipt.

pub mod order;

pub use order::{
    NewPurchaseOrder, NewPurchaseOrderLine, PurchaseLineInput, PurchaseOrder,
    PurchaseOrderDraft, PurchaseOrderId, PurchaseOrderInput, PurchaseOrderLine,
    PurchaseOrderLineId, PurchaseOrderStatus,
};
