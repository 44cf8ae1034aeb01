//! Bounded, fluent SQL statement builder.
//!
//! One [`QueryBuilder`] assembles one statement at a time: SELECT, INSERT,
//! INSERT OR REPLACE, UPDATE, DELETE or TRUNCATE. Values are rendered as
//! escaped literals; nothing is executed.
//!
//! ## Design
//!
//! - Every list (columns, values, predicates, joins, ORDER BY, GROUP BY, CTEs)
//!   is bounded by the builder's [`CapacityPolicy`]. An overflowing append is
//!   skipped and recorded; nothing grows past its limit.
//! - Errors are recorded in a single slot. A later error replaces an earlier
//!   one. `build_result` reports it; `build` turns it into an SQL comment.
//! - With a fail-fast policy ([`StrictPolicy`]) the offending call panics with
//!   the [`QbError`] as payload instead.
//! - Calling `select`/`insert`/`update`/... changes the statement kind but keeps
//!   accumulated clauses. Call [`QueryBuilder::reset`] between unrelated
//!   statements.
//!
//! ## Example
//! ```
//! use sqlforge::{col, QueryBuilder};
//!
//! let mut qb = QueryBuilder::new();
//! qb.select(["id", "name"])
//!     .from("users")
//!     .where_(col("active").eq(true))
//!     .order_by("created_at", false)
//!     .limit(10);
//!
//! assert_eq!(
//!     qb.build(),
//!     "SELECT id, name FROM users WHERE active = 1 ORDER BY created_at DESC LIMIT 10"
//! );
//! ```

mod bounded;
mod render;

use std::fmt;
use std::marker::PhantomData;

use crate::column::{Column, IntoColumn, IntoTable, Table};
use crate::error::{QbError, QbResult};
use crate::join::{Join, JoinKind};
use crate::policy::{CapacityPolicy, DefaultPolicy, StrictPolicy};
use crate::predicate::{CompareOp, IntoFragment, Predicate};
use crate::value::{IntoValue, Value};

use bounded::BoundedVec;

/// The statement a builder is currently assembling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatementKind {
    #[default]
    Select,
    Insert,
    InsertOrReplace,
    Update,
    Delete,
    Truncate,
}

impl StatementKind {
    fn takes_values(self) -> bool {
        matches!(
            self,
            StatementKind::Insert | StatementKind::InsertOrReplace | StatementKind::Update
        )
    }
}

/// Builder with fail-fast errors.
pub type StrictQueryBuilder = QueryBuilder<StrictPolicy>;

/// Fluent SQL builder bounded by a [`CapacityPolicy`].
pub struct QueryBuilder<P: CapacityPolicy = DefaultPolicy> {
    kind: StatementKind,
    table: Table,
    distinct: bool,
    columns: BoundedVec<Column, 8>,
    /// INSERT/UPDATE (column, value) pairs
    values: BoundedVec<(Column, Value), 8>,
    /// WHERE predicates, AND-joined in insertion order; OR groups and raw
    /// fragments are parenthesised when there is more than one
    conditions: BoundedVec<Predicate, 4>,
    joins: BoundedVec<Join, 2>,
    /// (column, ascending)
    order_by: BoundedVec<(Column, bool), 2>,
    group_by: BoundedVec<Column, 2>,
    having: Option<String>,
    limit: Option<u64>,
    offset: Option<u64>,
    /// (name, rendered subquery)
    ctes: BoundedVec<(String, String), 1>,
    last_error: Option<QbError>,
    _policy: PhantomData<fn() -> P>,
}

impl QueryBuilder {
    /// Create a builder with the [`DefaultPolicy`].
    ///
    /// Use `QueryBuilder::<P>::default()` for other policies.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<P: CapacityPolicy> Default for QueryBuilder<P> {
    fn default() -> Self {
        Self {
            kind: StatementKind::Select,
            table: Table::new(""),
            distinct: false,
            columns: BoundedVec::new(P::MAX_COLUMNS),
            values: BoundedVec::new(P::MAX_COLUMNS),
            conditions: BoundedVec::new(P::MAX_CONDITIONS),
            joins: BoundedVec::new(P::MAX_JOINS),
            order_by: BoundedVec::new(P::MAX_ORDER_BY),
            group_by: BoundedVec::new(P::MAX_GROUP_BY),
            having: None,
            limit: None,
            offset: None,
            ctes: BoundedVec::new(P::MAX_CTES),
            last_error: None,
            _policy: PhantomData,
        }
    }
}

impl<P: CapacityPolicy> Clone for QueryBuilder<P> {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            table: self.table.clone(),
            distinct: self.distinct,
            columns: self.columns.clone(),
            values: self.values.clone(),
            conditions: self.conditions.clone(),
            joins: self.joins.clone(),
            order_by: self.order_by.clone(),
            group_by: self.group_by.clone(),
            having: self.having.clone(),
            limit: self.limit,
            offset: self.offset,
            ctes: self.ctes.clone(),
            last_error: self.last_error.clone(),
            _policy: PhantomData,
        }
    }
}

impl<P: CapacityPolicy> fmt::Debug for QueryBuilder<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryBuilder")
            .field("kind", &self.kind)
            .field("table", &self.table)
            .field("distinct", &self.distinct)
            .field("columns", &self.columns.as_slice())
            .field("values", &self.values.as_slice())
            .field("conditions", &self.conditions.as_slice())
            .field("joins", &self.joins.as_slice())
            .field("order_by", &self.order_by.as_slice())
            .field("group_by", &self.group_by.as_slice())
            .field("having", &self.having)
            .field("limit", &self.limit)
            .field("offset", &self.offset)
            .field("ctes", &self.ctes.as_slice())
            .field("last_error", &self.last_error)
            .finish()
    }
}

impl<P: CapacityPolicy> QueryBuilder<P> {
    // ==================== Error slot ====================

    fn record(&mut self, err: QbError) {
        tracing::warn!(error = %err, kind = ?self.kind, "query builder rejected a call");
        self.last_error = Some(err.clone());
        if P::THROW_ON_ERROR {
            std::panic::panic_any(err);
        }
    }

    /// The most recently recorded error, if any.
    pub fn last_error(&self) -> Option<&QbError> {
        self.last_error.as_ref()
    }

    // ==================== Statement kind ====================

    /// Start a SELECT with the given columns, replacing any previous select list.
    pub fn select<I>(&mut self, columns: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: IntoColumn,
    {
        self.kind = StatementKind::Select;
        self.columns.clear();
        for column in columns {
            if !self.push_column(column.into_column()) {
                break;
            }
        }
        self
    }

    /// Start a `SELECT *`.
    pub fn select_all(&mut self) -> &mut Self {
        self.kind = StatementKind::Select;
        self.columns.clear();
        self
    }

    /// Append one column to the select list.
    pub fn add_select(&mut self, column: impl IntoColumn) -> &mut Self {
        self.push_column(column.into_column());
        self
    }

    fn push_column(&mut self, column: Column) -> bool {
        if let Err(err) = column.validate() {
            self.record(err);
            return false;
        }
        if self.columns.try_push(column).is_err() {
            self.record(QbError::TooManyColumns {
                max: P::MAX_COLUMNS,
            });
            return false;
        }
        true
    }

    /// Set the FROM table.
    pub fn from(&mut self, table: impl IntoTable) -> &mut Self {
        self.table = table.into_table();
        self
    }

    /// Emit `SELECT DISTINCT`.
    pub fn distinct(&mut self) -> &mut Self {
        self.distinct = true;
        self
    }

    /// Start an `INSERT INTO table`.
    pub fn insert(&mut self, table: impl IntoTable) -> &mut Self {
        self.kind = StatementKind::Insert;
        self.table = table.into_table();
        self
    }

    /// Start an `INSERT OR REPLACE INTO table`.
    pub fn insert_or_replace(&mut self, table: impl IntoTable) -> &mut Self {
        self.kind = StatementKind::InsertOrReplace;
        self.table = table.into_table();
        self
    }

    /// Start an `UPDATE table`.
    pub fn update(&mut self, table: impl IntoTable) -> &mut Self {
        self.kind = StatementKind::Update;
        self.table = table.into_table();
        self
    }

    /// Start a `DELETE FROM table`. Without a WHERE clause every row is deleted.
    pub fn delete_from(&mut self, table: impl IntoTable) -> &mut Self {
        self.kind = StatementKind::Delete;
        self.table = table.into_table();
        self
    }

    /// Start a `TRUNCATE TABLE table`.
    pub fn truncate(&mut self, table: impl IntoTable) -> &mut Self {
        self.kind = StatementKind::Truncate;
        self.table = table.into_table();
        self
    }

    // ==================== Values ====================

    /// Add an INSERT column/value pair.
    pub fn value(&mut self, column: impl IntoColumn, value: impl IntoValue) -> &mut Self {
        self.push_value("value", column.into_column(), value.into_value())
    }

    /// Add an UPDATE `column = value` assignment.
    pub fn set(&mut self, column: impl IntoColumn, value: impl IntoValue) -> &mut Self {
        self.push_value("set", column.into_column(), value.into_value())
    }

    fn push_value(&mut self, method: &str, column: Column, value: Value) -> &mut Self {
        if !self.kind.takes_values() {
            self.record(QbError::invalid_operation(format!(
                "{method}() requires an INSERT or UPDATE statement, found {:?}",
                self.kind
            )));
            return self;
        }
        if let Err(err) = column.validate() {
            self.record(err);
            return self;
        }
        if column.aggregate().is_some() {
            self.record(QbError::invalid_column(format!(
                "cannot assign to aggregate column {}",
                column.name()
            )));
            return self;
        }
        if self.values.try_push((column, value)).is_err() {
            self.record(QbError::TooManyColumns {
                max: P::MAX_COLUMNS,
            });
        }
        self
    }

    // ==================== Conditions ====================

    /// Add a WHERE predicate (AND-joined with the others).
    #[doc(alias = "where")]
    pub fn where_(&mut self, predicate: Predicate) -> &mut Self {
        if let Err(err) = predicate.validate() {
            self.record(err);
            return self;
        }
        if self.conditions.try_push(predicate).is_err() {
            self.record(QbError::TooManyConditions {
                max: P::MAX_CONDITIONS,
            });
        }
        self
    }

    /// Add `column BETWEEN low AND high`.
    pub fn where_between(
        &mut self,
        column: impl IntoColumn,
        low: impl IntoValue,
        high: impl IntoValue,
    ) -> &mut Self {
        self.where_(Predicate::between(column, low, high))
    }

    /// Add `column IN (...)`, keeping at most `P::MAX_IN_VALUES` values.
    pub fn where_in<V: IntoValue>(
        &mut self,
        column: impl IntoColumn,
        values: impl IntoIterator<Item = V>,
    ) -> &mut Self {
        self.where_(Predicate::value_list(
            column,
            values,
            false,
            P::MAX_IN_VALUES,
        ))
    }

    /// Add `column NOT IN (...)`, keeping at most `P::MAX_IN_VALUES` values.
    pub fn where_not_in<V: IntoValue>(
        &mut self,
        column: impl IntoColumn,
        values: impl IntoIterator<Item = V>,
    ) -> &mut Self {
        self.where_(Predicate::value_list(
            column,
            values,
            true,
            P::MAX_IN_VALUES,
        ))
    }

    /// Add `column LIKE pattern`.
    pub fn where_like(&mut self, column: impl IntoColumn, pattern: impl IntoValue) -> &mut Self {
        self.where_(Predicate::compare(column, CompareOp::Like, pattern))
    }

    /// Add `column IS NULL`.
    pub fn where_null(&mut self, column: impl IntoColumn) -> &mut Self {
        self.where_(Predicate::is_null(column))
    }

    /// Add `column IS NOT NULL`.
    pub fn where_not_null(&mut self, column: impl IntoColumn) -> &mut Self {
        self.where_(Predicate::is_not_null(column))
    }

    /// Add `EXISTS (subquery)` from raw SQL text.
    pub fn where_exists(&mut self, subquery: &str) -> &mut Self {
        if subquery.trim().is_empty() {
            self.record(QbError::invalid_condition("EXISTS subquery is empty"));
            return self;
        }
        self.where_(Predicate::exists(subquery))
    }

    /// Add `EXISTS (subquery)` from another builder.
    ///
    /// The subquery is built now; if it fails its error is recorded here.
    pub fn where_exists_query<Q: CapacityPolicy>(
        &mut self,
        subquery: &QueryBuilder<Q>,
    ) -> &mut Self {
        match subquery.build_result() {
            Ok(sql) => self.where_(Predicate::exists(&sql)),
            Err(err) => {
                self.record(err);
                self
            }
        }
    }

    /// Add a raw WHERE fragment. The caller is responsible for escaping.
    pub fn where_raw(&mut self, sql: impl Into<String>) -> &mut Self {
        self.where_(Predicate::raw(sql))
    }

    // ==================== Joins ====================

    /// Add `INNER JOIN table ON ...`.
    pub fn inner_join(&mut self, table: impl IntoTable, on: impl IntoFragment) -> &mut Self {
        self.push_join(JoinKind::Inner, table.into_table(), on)
    }

    /// Add `LEFT JOIN table ON ...`.
    pub fn left_join(&mut self, table: impl IntoTable, on: impl IntoFragment) -> &mut Self {
        self.push_join(JoinKind::Left, table.into_table(), on)
    }

    /// Add `RIGHT JOIN table ON ...`.
    pub fn right_join(&mut self, table: impl IntoTable, on: impl IntoFragment) -> &mut Self {
        self.push_join(JoinKind::Right, table.into_table(), on)
    }

    /// Add `FULL JOIN table ON ...`.
    pub fn full_join(&mut self, table: impl IntoTable, on: impl IntoFragment) -> &mut Self {
        self.push_join(JoinKind::Full, table.into_table(), on)
    }

    /// Add `CROSS JOIN table`.
    pub fn cross_join(&mut self, table: impl IntoTable) -> &mut Self {
        let table = table.into_table();
        if table.name().trim().is_empty() {
            self.record(QbError::EmptyTable);
            return self;
        }
        self.add_join(Join::cross(table.to_sql()))
    }

    fn push_join(&mut self, kind: JoinKind, table: Table, on: impl IntoFragment) -> &mut Self {
        if table.name().trim().is_empty() {
            self.record(QbError::EmptyTable);
            return self;
        }
        let on = match on.into_fragment() {
            Ok(on) => on,
            Err(err) => {
                self.record(err);
                return self;
            }
        };
        if on.trim().is_empty() {
            self.record(QbError::invalid_condition(format!(
                "{} requires an ON condition",
                kind.as_str()
            )));
            return self;
        }
        self.add_join(Join::new(kind, table.to_sql(), on))
    }

    fn add_join(&mut self, join: Join) -> &mut Self {
        if self.joins.try_push(join).is_err() {
            self.record(QbError::TooManyJoins { max: P::MAX_JOINS });
        }
        self
    }

    // ==================== Grouping / ordering / paging ====================

    /// Add an ORDER BY entry.
    pub fn order_by(&mut self, column: impl IntoColumn, ascending: bool) -> &mut Self {
        let column = column.into_column();
        if let Err(err) = column.validate() {
            self.record(err);
            return self;
        }
        if self.order_by.try_push((column, ascending)).is_err() {
            self.record(QbError::TooManyOrderBy {
                max: P::MAX_ORDER_BY,
            });
        }
        self
    }

    /// Add `column ASC`.
    pub fn order_by_asc(&mut self, column: impl IntoColumn) -> &mut Self {
        self.order_by(column, true)
    }

    /// Add `column DESC`.
    pub fn order_by_desc(&mut self, column: impl IntoColumn) -> &mut Self {
        self.order_by(column, false)
    }

    /// Add a GROUP BY column.
    pub fn group_by(&mut self, column: impl IntoColumn) -> &mut Self {
        let column = column.into_column();
        if let Err(err) = column.validate() {
            self.record(err);
            return self;
        }
        if self.group_by.try_push(column).is_err() {
            self.record(QbError::TooManyGroupBy {
                max: P::MAX_GROUP_BY,
            });
        }
        self
    }

    /// Set the HAVING clause. It is only emitted together with GROUP BY.
    pub fn having(&mut self, condition: impl IntoFragment) -> &mut Self {
        match condition.into_fragment() {
            Ok(sql) if sql.trim().is_empty() => self.having = None,
            Ok(sql) => self.having = Some(sql),
            Err(err) => self.record(err),
        }
        self
    }

    /// Set LIMIT.
    pub fn limit(&mut self, limit: u64) -> &mut Self {
        self.limit = Some(limit);
        self
    }

    /// Set OFFSET.
    pub fn offset(&mut self, offset: u64) -> &mut Self {
        self.offset = Some(offset);
        self
    }

    // ==================== CTEs ====================

    /// Prepend `WITH name AS (subquery)`.
    ///
    /// The subquery is built now; if it fails its error is recorded here.
    pub fn with<Q: CapacityPolicy>(
        &mut self,
        name: impl Into<String>,
        subquery: &QueryBuilder<Q>,
    ) -> &mut Self {
        let name = name.into();
        if name.trim().is_empty() {
            self.record(QbError::invalid_operation("CTE name cannot be empty"));
            return self;
        }
        let sql = match subquery.build_result() {
            Ok(sql) => sql,
            Err(err) => {
                self.record(err);
                return self;
            }
        };
        if self.ctes.try_push((name, sql)).is_err() {
            self.record(QbError::TooManyCtes { max: P::MAX_CTES });
        }
        self
    }

    // ==================== Lifecycle ====================

    /// Restore the empty state. List allocations are kept for reuse.
    pub fn reset(&mut self) -> &mut Self {
        self.kind = StatementKind::Select;
        self.table = Table::new("");
        self.distinct = false;
        self.columns.clear();
        self.values.clear();
        self.conditions.clear();
        self.joins.clear();
        self.order_by.clear();
        self.group_by.clear();
        self.having = None;
        self.limit = None;
        self.offset = None;
        self.ctes.clear();
        self.last_error = None;
        self
    }

    /// Build the statement, or return the error that prevents it.
    ///
    /// Never panics, whatever the policy.
    pub fn build_result(&self) -> QbResult<String> {
        let result = self.validate().map(|()| {
            let mut sql = String::with_capacity(256);
            self.render(&mut sql);
            sql
        });
        match &result {
            Ok(sql) => tracing::trace!(sql = %sql, "built SQL"),
            Err(err) => tracing::debug!(error = %err, kind = ?self.kind, "SQL build failed"),
        }
        result
    }

    /// Build the statement, rendering a failure as `/* sqlforge error: ... */`.
    pub fn build(&self) -> String {
        self.build_result()
            .unwrap_or_else(|err| err.to_sql_comment())
    }

    fn validate(&self) -> QbResult<()> {
        if let Some(err) = &self.last_error {
            return Err(err.clone());
        }
        if self.table.name().trim().is_empty() {
            return Err(QbError::EmptyTable);
        }
        if self.kind.takes_values() && self.values.is_empty() {
            return Err(QbError::invalid_condition(format!(
                "{:?} requires at least one value",
                self.kind
            )));
        }
        Ok(())
    }

    // ==================== Accessors ====================

    pub fn statement_kind(&self) -> StatementKind {
        self.kind
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn is_distinct(&self) -> bool {
        self.distinct
    }

    pub fn select_columns(&self) -> &[Column] {
        self.columns.as_slice()
    }

    pub fn values(&self) -> &[(Column, Value)] {
        self.values.as_slice()
    }

    pub fn conditions(&self) -> &[Predicate] {
        self.conditions.as_slice()
    }

    pub fn joins(&self) -> &[Join] {
        self.joins.as_slice()
    }

    pub fn order_by_entries(&self) -> &[(Column, bool)] {
        self.order_by.as_slice()
    }

    pub fn group_by_columns(&self) -> &[Column] {
        self.group_by.as_slice()
    }

    pub fn having_clause(&self) -> Option<&str> {
        self.having.as_deref()
    }

    pub fn limit_value(&self) -> Option<u64> {
        self.limit
    }

    pub fn offset_value(&self) -> Option<u64> {
        self.offset
    }

    /// CTEs as (name, rendered subquery).
    pub fn ctes(&self) -> &[(String, String)] {
        self.ctes.as_slice()
    }
}
