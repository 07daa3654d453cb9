//! Catalog: items and item categories.

pub mod category;
pub mod item;

pub use category::{CategoryId, CategoryInput, CategoryRef, ItemCategory};
pub use item::{Item, ItemId, ItemInput, ItemRef, Unit};
