//! Compile-time capacity limits and error policy.
//!
//! A [`QueryBuilder`](crate::QueryBuilder) is generic over a [`CapacityPolicy`].
//! Every bounded list in the builder pre-allocates the matching limit once and
//! never grows past it.
//!
//! # Example
//! ```
//! use sqlforge::{CapacityPolicy, QueryBuilder};
//!
//! struct Wide;
//!
//! impl CapacityPolicy for Wide {
//!     const MAX_COLUMNS: usize = 64;
//!     const MAX_CONDITIONS: usize = 32;
//! }
//!
//! let mut qb = QueryBuilder::<Wide>::default();
//! qb.select(["id"]).from("users");
//! assert_eq!(qb.build(), "SELECT id FROM users");
//! ```

/// Limits and error policy for a builder.
///
/// All constants have defaults, so a custom policy only overrides what it needs.
pub trait CapacityPolicy {
    /// Max select columns, and max INSERT/UPDATE value pairs.
    const MAX_COLUMNS: usize = 32;
    /// Max WHERE predicates.
    const MAX_CONDITIONS: usize = 16;
    /// Max JOIN clauses.
    const MAX_JOINS: usize = 4;
    /// Max ORDER BY entries.
    const MAX_ORDER_BY: usize = 8;
    /// Max GROUP BY entries.
    const MAX_GROUP_BY: usize = 8;
    /// Max values kept in an IN / NOT IN list; extra values are truncated.
    const MAX_IN_VALUES: usize = 64;
    /// Max common table expressions.
    const MAX_CTES: usize = 4;
    /// Panic at the offending call instead of recording the error.
    const THROW_ON_ERROR: bool = false;
}

/// Default limits; errors are recorded and surfaced by `build_result`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultPolicy;

impl CapacityPolicy for DefaultPolicy {}

/// Default limits with fail-fast errors.
#[derive(Debug, Clone, Copy, Default)]
pub struct StrictPolicy;

impl CapacityPolicy for StrictPolicy {
    const THROW_ON_ERROR: bool = true;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Tiny;

    impl CapacityPolicy for Tiny {
        const MAX_JOINS: usize = 1;
    }

    #[test]
    fn defaults_are_inherited() {
        assert_eq!(Tiny::MAX_JOINS, 1);
        assert_eq!(Tiny::MAX_CONDITIONS, DefaultPolicy::MAX_CONDITIONS);
        assert!(!Tiny::THROW_ON_ERROR);
    }

    #[test]
    fn strict_policy_fails_fast() {
        assert!(StrictPolicy::THROW_ON_ERROR);
        assert_eq!(StrictPolicy::MAX_COLUMNS, DefaultPolicy::MAX_COLUMNS);
    }
}
