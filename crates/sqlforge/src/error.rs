//! Error types for sqlforge

use thiserror::Error;

/// Result type alias for sqlforge operations
pub type QbResult<T> = Result<T, QbError>;

/// Error types for query assembly.
///
/// Capacity errors carry the limit that was hit so callers can tell which
/// [`CapacityPolicy`](crate::CapacityPolicy) constant to raise.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QbError {
    /// Select list or INSERT/UPDATE value list is full
    #[error("Too many columns (max {max})")]
    TooManyColumns { max: usize },

    /// WHERE predicate list is full
    #[error("Too many conditions (max {max})")]
    TooManyConditions { max: usize },

    /// JOIN list is full
    #[error("Too many joins (max {max})")]
    TooManyJoins { max: usize },

    /// ORDER BY list is full
    #[error("Too many ORDER BY entries (max {max})")]
    TooManyOrderBy { max: usize },

    /// GROUP BY list is full
    #[error("Too many GROUP BY entries (max {max})")]
    TooManyGroupBy { max: usize },

    /// WITH list is full
    #[error("Too many common table expressions (max {max})")]
    TooManyCtes { max: usize },

    /// Statement has no target table
    #[error("Table name is empty")]
    EmptyTable,

    /// Column or table name cannot be rendered
    #[error("Invalid column: {0}")]
    InvalidColumn(String),

    /// Predicate or value list is malformed
    #[error("Invalid condition: {0}")]
    InvalidCondition(String),

    /// Call does not apply to the current statement kind
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
}

impl QbError {
    /// Create an invalid column error
    pub fn invalid_column(message: impl Into<String>) -> Self {
        Self::InvalidColumn(message.into())
    }

    /// Create an invalid condition error
    pub fn invalid_condition(message: impl Into<String>) -> Self {
        Self::InvalidCondition(message.into())
    }

    /// Create an invalid operation error
    pub fn invalid_operation(message: impl Into<String>) -> Self {
        Self::InvalidOperation(message.into())
    }

    /// Check if this error came from a bounded list overflowing
    pub fn is_capacity_error(&self) -> bool {
        matches!(
            self,
            Self::TooManyColumns { .. }
                | Self::TooManyConditions { .. }
                | Self::TooManyJoins { .. }
                | Self::TooManyOrderBy { .. }
                | Self::TooManyGroupBy { .. }
                | Self::TooManyCtes { .. }
        )
    }

    /// Check if this is an empty table error
    pub fn is_empty_table(&self) -> bool {
        matches!(self, Self::EmptyTable)
    }

    /// Render the error as an inert SQL comment.
    ///
    /// `*/` inside the message is broken up so the comment cannot be closed early.
    pub fn to_sql_comment(&self) -> String {
        let message = self.to_string().replace("*/", "* /");
        format!("/* sqlforge error: {message} */")
    }
}
