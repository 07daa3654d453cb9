//! Inventory domain: warehouses, per-warehouse stock rows, the movement audit
//! trail and stock transfers.
//!
//! Everything here is pure; the client crate performs the remote reads and
//! writes and uses these types to decide what to write.

pub mod movement;
pub mod stock;
pub mod transfer;
pub mod warehouse;

pub use movement::{InventoryMovement, MovementFilter, MovementId, MovementReason, NewMovement};
pub use stock::{InventoryStock, StockAdjustment, StockId, StockUpsert};
pub use transfer::{StockTransfer, TransferId, TransferInput, TransferPlan, TransferStatus};
pub use warehouse::{Warehouse, WarehouseId, WarehouseInput, WarehouseRef};
