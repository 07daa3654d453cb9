//! `ceramerp-core`: shared building blocks for the ERP client.
//!
//! This crate contains **pure** primitives (no IO): identifiers, row identity,
//! error types, field validation and money helpers.

pub mod entity;
pub mod error;
pub mod id;
pub mod money;
pub mod validation;

pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::UserId;
pub use money::{DocumentTotals, line_total, percent_of, round_money};
pub use validation::{FieldErrors, non_negative, positive};

// Used by `define_id!` expansions.
#[doc(hidden)]
pub use uuid::Uuid;
