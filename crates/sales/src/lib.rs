//! Sales: sales orders, their lines and shipment.

pub mod order;

pub use order::{
    NewSalesOrder, NewSalesOrderLine, SalesLineInput, SalesOrder, SalesOrderDraft, SalesOrderId,
    SalesOrderInput, SalesOrderLine, SalesOrderLineId, SalesOrderStatus,
};
