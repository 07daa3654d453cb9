//! `ceramerp-backend`: contract with the hosted backend.
//!
//! The backend owns persistence, row-level security and authentication. This
//! crate describes what the client asks of it:
//!
//! - [`DataApi`]: table-oriented select/insert/update/upsert/delete over JSON rows
//! - [`Query`]/[`Filter`]: filter predicates, ordering, limits and relation embedding
//! - [`AuthService`]: password sign-in, sign-up, sign-out and user lookup
//!
//! Two implementations of each seam are provided: REST clients for the hosted
//! service and in-memory doubles for tests and offline demos.

pub mod api;
pub mod auth;
pub mod error;
pub mod memory;
pub mod query;
pub mod rest;
pub mod schema;

pub use api::{DataApi, Table};
pub use auth::{AuthService, InMemoryAuthService, RestAuthService, SignUp};
pub use error::{BackendError, BackendResult};
pub use memory::{InMemoryDataApi, Operation};
pub use query::{Filter, Op, Order, Query, SelectItem};
pub use rest::{BackendConfig, RestDataApi};
