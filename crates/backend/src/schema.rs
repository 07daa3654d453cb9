//! Table names and declared constraints of the hosted schema.
//!
//! The backend enforces these; the client needs the names to address tables
//! and the conflict targets to phrase upserts.

pub const CUSTOMERS: &str = "customers";
pub const SUPPLIERS: &str = "suppliers";
pub const ITEMS: &str = "items";
pub const ITEM_CATEGORIES: &str = "item_categories";
pub const WAREHOUSES: &str = "warehouses";
pub const INVENTORY_STOCK: &str = "inventory_stock";
pub const INVENTORY_MOVEMENTS: &str = "inventory_movements";
pub const STOCK_TRANSFERS: &str = "stock_transfers";
pub const CHART_OF_ACCOUNTS: &str = "chart_of_accounts";
pub const ACCOUNTING_ENTRIES: &str = "accounting_entries";
pub const PURCHASE_ORDERS: &str = "purchase_orders";
pub const PURCHASE_ORDER_ITEMS: &str = "purchase_order_items";
pub const SALES_ORDERS: &str = "sales_orders";
pub const SALES_ORDER_ITEMS: &str = "sales_order_items";
pub const BANK_ACCOUNTS: &str = "bank_accounts";
pub const FINANCIAL_TRANSACTIONS: &str = "financial_transactions";
pub const TAXES: &str = "taxes";
pub const USER_ROLES: &str = "user_roles";

/// One stock row per (item, warehouse).
pub const INVENTORY_STOCK_CONFLICT: &[&str] = &["item_id", "warehouse_id"];

/// Unique keys declared by the schema besides the primary key.
pub const UNIQUE_KEYS: &[(&str, &[&str])] = &[
    (CUSTOMERS, &["code"]),
    (SUPPLIERS, &["code"]),
    (ITEMS, &["code"]),
    (WAREHOUSES, &["code"]),
    (CHART_OF_ACCOUNTS, &["code"]),
    (INVENTORY_STOCK, INVENTORY_STOCK_CONFLICT),
    (PURCHASE_ORDERS, &["order_number"]),
    (SALES_ORDERS, &["order_number"]),
    (USER_ROLES, &["user_id"]),
];
