//! Parties: customers and suppliers.
//!
//! Rows mirror the backend tables; inputs are the validated form payloads the
//! client sends on create/update.

pub mod contact;
pub mod customer;
pub mod supplier;

pub use contact::ContactInfo;
pub use customer::{Customer, CustomerId, CustomerInput, CustomerRef};
pub use supplier::{Supplier, SupplierId, SupplierInput, SupplierRef};
