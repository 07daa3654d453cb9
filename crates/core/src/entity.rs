//! Entity trait: a row persisted in a named backend table.

/// Persisted row with a stable identifier.
pub trait Entity {
    /// Strongly-typed row identifier.
    type Id: Copy + Eq + core::hash::Hash + core::fmt::Debug + core::fmt::Display;

    /// Backend table the row lives in.
    const TABLE: &'static str;

    /// Returns the row identifier.
    fn id(&self) -> Self::Id;
}
