//! # sqlforge
//!
//! A bounded, allocation-conscious SQL statement builder.
//!
//! ## Features
//!
//! - **Fluent**: mutators take `&mut self` and return `&mut Self`
//! - **Bounded**: every list has a compile-time limit set by a [`CapacityPolicy`]
//! - **Two error policies**: record-and-continue ([`DefaultPolicy`]) or
//!   fail-fast ([`StrictPolicy`])
//! - **Escaped literals**: text is single-quoted with embedded quotes doubled;
//!   placeholders (`?`, `:name`, `@name`, `$name`) pass through
//! - **Typed tables**: [`sql_table!`] declares columns that only accept their
//!   own value type
//!
//! sqlforge only produces SQL text. It does not connect to or execute against
//! a database.
//!
//! ## Example
//!
//! ```
//! use sqlforge::{col, QueryBuilder};
//!
//! let mut qb = QueryBuilder::new();
//! qb.update("users")
//!     .set("name", "Jane")
//!     .where_(col("id").eq(42));
//! assert_eq!(qb.build(), "UPDATE users SET name = 'Jane' WHERE id = 42");
//!
//! qb.reset();
//! qb.insert("users").value("name", "O'Brien");
//! assert_eq!(qb.build(), "INSERT INTO users (name) VALUES ('O''Brien')");
//! ```
//!
//! ## Errors
//!
//! ```
//! use sqlforge::{QbError, QueryBuilder};
//!
//! let mut qb = QueryBuilder::new();
//! qb.select_all().from("");
//! assert_eq!(qb.build_result(), Err(QbError::EmptyTable));
//! assert_eq!(qb.build(), "/* sqlforge error: Table name is empty */");
//! ```

pub mod builder;
pub mod column;
pub mod error;
pub mod join;
pub mod policy;
pub mod predicate;
pub mod value;

pub use builder::{QueryBuilder, StatementKind, StrictQueryBuilder};
pub use column::{Aggregate, Column, IntoColumn, IntoTable, Table, TypedColumn, col};
pub use error::{QbError, QbResult};
pub use join::{Join, JoinKind};
pub use policy::{CapacityPolicy, DefaultPolicy, StrictPolicy};
pub use predicate::{CompareOp, IntoFragment, Logic, Predicate, PredicateType};
pub use value::{IntoValue, Placeholder, PlaceholderStyle, Value, escape_text, quote_text};

/// Common imports.
pub mod prelude {
    pub use crate::{
        col, CapacityPolicy, Column, DefaultPolicy, IntoValue, Predicate, QbError, QbResult,
        QueryBuilder, StrictPolicy, StrictQueryBuilder, Table, TypedColumn, Value,
    };
}
