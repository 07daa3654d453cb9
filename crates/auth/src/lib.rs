//! `ceramerp-auth`: roles, permissions and authenticated identity.
//!
//! Authentication itself is performed by the external auth service; this crate
//! only models what the client holds once a user is signed in.

pub mod permissions;
pub mod principal;
pub mod roles;

pub use permissions::{Access, Area, Permission, authorize};
pub use principal::{AuthSession, AuthUser, Principal};
pub use roles::{Role, UnknownRole};
