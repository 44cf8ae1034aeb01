//! Column and table references.
//!
//! [`Column`] and [`Table`] are lightweight named handles that render to plain
//! SQL text. They can be built from strings at runtime or declared as consts
//! (see [`sql_table!`](crate::sql_table)), in which case no allocation happens.
//!
//! Unlike a parsed identifier, a column name is passed through verbatim so
//! expressions such as `u.id` or `COUNT(o.id) as order_count` keep working.
//! Only names that cannot be rendered at all (empty, or containing NUL) are
//! rejected.

use std::borrow::Cow;
use std::fmt;
use std::marker::PhantomData;

use crate::error::{QbError, QbResult};
use crate::predicate::{CompareOp, Predicate};
use crate::value::IntoValue;

/// Aggregate function wrapping a selected column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregate {
    Count,
    Sum,
    Avg,
    Min,
    Max,
    GroupConcat,
}

impl Aggregate {
    pub fn as_str(self) -> &'static str {
        match self {
            Aggregate::Count => "COUNT",
            Aggregate::Sum => "SUM",
            Aggregate::Avg => "AVG",
            Aggregate::Min => "MIN",
            Aggregate::Max => "MAX",
            Aggregate::GroupConcat => "GROUP_CONCAT",
        }
    }
}

/// A column reference, optionally table-qualified, aggregated and aliased.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    table: Option<Cow<'static, str>>,
    name: Cow<'static, str>,
    aggregate: Option<Aggregate>,
    alias: Option<Cow<'static, str>>,
}

/// Shorthand for [`Column::named`].
///
/// ```
/// use sqlforge::col;
///
/// assert_eq!(col("active").eq(true).to_sql(), "active = 1");
/// ```
pub fn col(name: impl Into<Cow<'static, str>>) -> Column {
    Column::named(name)
}

impl Column {
    /// Create an unqualified column from a static name.
    pub const fn new(name: &'static str) -> Self {
        Self {
            table: None,
            name: Cow::Borrowed(name),
            aggregate: None,
            alias: None,
        }
    }

    /// Create a table-qualified column from static names.
    pub const fn qualified(table: &'static str, name: &'static str) -> Self {
        Self {
            table: Some(Cow::Borrowed(table)),
            name: Cow::Borrowed(name),
            aggregate: None,
            alias: None,
        }
    }

    /// Create an unqualified column from any string.
    pub fn named(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            table: None,
            name: name.into(),
            aggregate: None,
            alias: None,
        }
    }

    /// Qualify the column with a table name or alias.
    pub fn of(mut self, table: impl Into<Cow<'static, str>>) -> Self {
        self.table = Some(table.into());
        self
    }

    /// Render as `expr AS alias` in a select list.
    pub fn alias(mut self, alias: impl Into<Cow<'static, str>>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    fn wrap(mut self, aggregate: Aggregate) -> Self {
        self.aggregate = Some(aggregate);
        self
    }

    pub fn count(self) -> Self {
        self.wrap(Aggregate::Count)
    }

    pub fn sum(self) -> Self {
        self.wrap(Aggregate::Sum)
    }

    pub fn avg(self) -> Self {
        self.wrap(Aggregate::Avg)
    }

    pub fn min(self) -> Self {
        self.wrap(Aggregate::Min)
    }

    pub fn max(self) -> Self {
        self.wrap(Aggregate::Max)
    }

    pub fn group_concat(self) -> Self {
        self.wrap(Aggregate::GroupConcat)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn table(&self) -> Option<&str> {
        self.table.as_deref()
    }

    pub fn alias_name(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    pub fn aggregate(&self) -> Option<Aggregate> {
        self.aggregate
    }

    /// Check the column can be rendered.
    pub fn validate(&self) -> QbResult<()> {
        check_name("column", &self.name)?;
        if let Some(table) = &self.table {
            check_name("table qualifier", table)?;
        }
        if let Some(alias) = &self.alias {
            check_name("alias", alias)?;
        }
        Ok(())
    }

    /// `table.name` or `name`.
    pub(crate) fn write_qualified(&self, out: &mut String) {
        if let Some(table) = &self.table {
            out.push_str(table);
            out.push('.');
        }
        out.push_str(&self.name);
    }

    /// Bare name, ignoring the table qualifier.
    pub(crate) fn write_bare(&self, out: &mut String) {
        self.write_wrapped(out, false);
    }

    /// Qualified name wrapped in its aggregate, without the alias.
    pub(crate) fn write_expr(&self, out: &mut String) {
        self.write_wrapped(out, true);
    }

    fn write_wrapped(&self, out: &mut String, qualified: bool) {
        if let Some(aggregate) = self.aggregate {
            out.push_str(aggregate.as_str());
            out.push('(');
        }
        if qualified {
            self.write_qualified(out);
        } else {
            out.push_str(&self.name);
        }
        if self.aggregate.is_some() {
            out.push(')');
        }
    }

    /// Select-list form: expression plus ` AS alias`.
    pub(crate) fn write_select(&self, out: &mut String) {
        self.write_expr(out);
        if let Some(alias) = &self.alias {
            out.push_str(" AS ");
            out.push_str(alias);
        }
    }

    /// Render the select-list form of the column.
    pub fn to_sql(&self) -> String {
        let mut out = String::new();
        self.write_select(&mut out);
        out
    }

    // ==================== Predicate helpers ====================

    /// column OP value
    pub fn compare(&self, op: CompareOp, value: impl IntoValue) -> Predicate {
        Predicate::compare(self.clone(), op, value)
    }

    /// column = value
    pub fn eq(&self, value: impl IntoValue) -> Predicate {
        self.compare(CompareOp::Eq, value)
    }

    /// column != value
    pub fn ne(&self, value: impl IntoValue) -> Predicate {
        self.compare(CompareOp::Ne, value)
    }

    /// column < value
    pub fn lt(&self, value: impl IntoValue) -> Predicate {
        self.compare(CompareOp::Lt, value)
    }

    /// column <= value
    pub fn lte(&self, value: impl IntoValue) -> Predicate {
        self.compare(CompareOp::Lte, value)
    }

    /// column > value
    pub fn gt(&self, value: impl IntoValue) -> Predicate {
        self.compare(CompareOp::Gt, value)
    }

    /// column >= value
    pub fn gte(&self, value: impl IntoValue) -> Predicate {
        self.compare(CompareOp::Gte, value)
    }

    /// column LIKE pattern
    pub fn like(&self, pattern: impl IntoValue) -> Predicate {
        self.compare(CompareOp::Like, pattern)
    }

    /// column NOT LIKE pattern
    pub fn not_like(&self, pattern: impl IntoValue) -> Predicate {
        self.compare(CompareOp::NotLike, pattern)
    }

    /// column IS NULL
    pub fn is_null(&self) -> Predicate {
        Predicate::is_null(self.clone())
    }

    /// column IS NOT NULL
    pub fn is_not_null(&self) -> Predicate {
        Predicate::is_not_null(self.clone())
    }

    /// column BETWEEN low AND high
    pub fn between(&self, low: impl IntoValue, high: impl IntoValue) -> Predicate {
        Predicate::between(self.clone(), low, high)
    }

    /// column IN (values...)
    pub fn in_list<V: IntoValue>(&self, values: impl IntoIterator<Item = V>) -> Predicate {
        Predicate::in_list(self.clone(), values)
    }

    /// column NOT IN (values...)
    pub fn not_in<V: IntoValue>(&self, values: impl IntoIterator<Item = V>) -> Predicate {
        Predicate::not_in(self.clone(), values)
    }

    /// column OP other_column
    pub fn compare_col(&self, op: CompareOp, other: impl IntoColumn) -> Predicate {
        Predicate::compare_columns(self.clone(), op, other)
    }

    /// column = other_column
    pub fn eq_col(&self, other: impl IntoColumn) -> Predicate {
        self.compare_col(CompareOp::Eq, other)
    }

    /// column != other_column
    pub fn ne_col(&self, other: impl IntoColumn) -> Predicate {
        self.compare_col(CompareOp::Ne, other)
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_sql())
    }
}

fn check_name(what: &str, name: &str) -> QbResult<()> {
    if name.trim().is_empty() {
        return Err(QbError::invalid_column(format!("{what} name cannot be empty")));
    }
    if name.contains('\0') {
        return Err(QbError::invalid_column(format!(
            "{what} name cannot contain NUL character"
        )));
    }
    Ok(())
}

/// A table reference with an optional alias.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    name: Cow<'static, str>,
    alias: Option<Cow<'static, str>>,
}

impl Table {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name: Cow::Borrowed(name),
            alias: None,
        }
    }

    pub fn named(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            alias: None,
        }
    }

    /// Render as `name alias`.
    pub fn alias(mut self, alias: impl Into<Cow<'static, str>>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn alias_name(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    /// A column of this table, qualified by the alias when one is set.
    pub fn col(&self, name: impl Into<Cow<'static, str>>) -> Column {
        let qualifier = self.alias.as_ref().unwrap_or(&self.name).clone();
        Column::named(name).of(qualifier)
    }

    pub fn to_sql(&self) -> String {
        match &self.alias {
            Some(alias) => format!("{} {}", self.name, alias),
            None => self.name.to_string(),
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_sql())
    }
}

/// A table-qualified column that only accepts values of type `T`.
///
/// Declared by [`sql_table!`](crate::sql_table); converts to a plain [`Column`]
/// wherever one is expected.
pub struct TypedColumn<T> {
    column: Column,
    _marker: PhantomData<fn() -> T>,
}

impl<T> TypedColumn<T> {
    pub const fn new(table: &'static str, name: &'static str) -> Self {
        Self {
            column: Column::qualified(table, name),
            _marker: PhantomData,
        }
    }

    pub fn column(&self) -> &Column {
        &self.column
    }

    pub fn name(&self) -> &str {
        self.column.name()
    }

    pub fn alias(&self, alias: impl Into<Cow<'static, str>>) -> Column {
        self.column.clone().alias(alias)
    }

    pub fn count(&self) -> Column {
        self.column.clone().count()
    }

    pub fn sum(&self) -> Column {
        self.column.clone().sum()
    }

    pub fn avg(&self) -> Column {
        self.column.clone().avg()
    }

    pub fn min(&self) -> Column {
        self.column.clone().min()
    }

    pub fn max(&self) -> Column {
        self.column.clone().max()
    }

    pub fn is_null(&self) -> Predicate {
        self.column.is_null()
    }

    pub fn is_not_null(&self) -> Predicate {
        self.column.is_not_null()
    }

    pub fn eq_col(&self, other: impl IntoColumn) -> Predicate {
        self.column.eq_col(other)
    }

    pub fn ne_col(&self, other: impl IntoColumn) -> Predicate {
        self.column.ne_col(other)
    }

    pub fn compare_col(&self, op: CompareOp, other: impl IntoColumn) -> Predicate {
        self.column.compare_col(op, other)
    }
}

impl<T: IntoValue> TypedColumn<T> {
    pub fn eq(&self, value: impl Into<T>) -> Predicate {
        let value: T = value.into();
        self.column.eq(value)
    }

    pub fn ne(&self, value: impl Into<T>) -> Predicate {
        let value: T = value.into();
        self.column.ne(value)
    }

    pub fn lt(&self, value: impl Into<T>) -> Predicate {
        let value: T = value.into();
        self.column.lt(value)
    }

    pub fn lte(&self, value: impl Into<T>) -> Predicate {
        let value: T = value.into();
        self.column.lte(value)
    }

    pub fn gt(&self, value: impl Into<T>) -> Predicate {
        let value: T = value.into();
        self.column.gt(value)
    }

    pub fn gte(&self, value: impl Into<T>) -> Predicate {
        let value: T = value.into();
        self.column.gte(value)
    }

    pub fn between(&self, low: impl Into<T>, high: impl Into<T>) -> Predicate {
        let (low, high): (T, T) = (low.into(), high.into());
        self.column.between(low, high)
    }

    pub fn in_list(&self, values: impl IntoIterator<Item = T>) -> Predicate {
        self.column.in_list(values)
    }

    pub fn not_in(&self, values: impl IntoIterator<Item = T>) -> Predicate {
        self.column.not_in(values)
    }

    /// Compare against a placeholder instead of a `T` literal.
    pub fn eq_param(&self, name: &str) -> Predicate {
        self.column.eq(crate::Value::placeholder(name))
    }
}

impl TypedColumn<String> {
    pub fn like(&self, pattern: impl Into<String>) -> Predicate {
        let pattern: String = pattern.into();
        self.column.like(pattern)
    }

    pub fn not_like(&self, pattern: impl Into<String>) -> Predicate {
        let pattern: String = pattern.into();
        self.column.not_like(pattern)
    }
}

impl<T> Clone for TypedColumn<T> {
    fn clone(&self) -> Self {
        Self {
            column: self.column.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T> fmt::Debug for TypedColumn<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TypedColumn").field(&self.column).finish()
    }
}

/// Convert an input into a [`Column`].
///
/// This is mainly for ergonomics in builder APIs.
pub trait IntoColumn {
    fn into_column(self) -> Column;
}

impl IntoColumn for Column {
    fn into_column(self) -> Column {
        self
    }
}

impl IntoColumn for &Column {
    fn into_column(self) -> Column {
        self.clone()
    }
}

impl IntoColumn for &'static str {
    fn into_column(self) -> Column {
        Column::new(self)
    }
}

impl IntoColumn for String {
    fn into_column(self) -> Column {
        Column::named(self)
    }
}

impl IntoColumn for &String {
    fn into_column(self) -> Column {
        Column::named(self.clone())
    }
}

impl<T> IntoColumn for TypedColumn<T> {
    fn into_column(self) -> Column {
        self.column
    }
}

impl<T> IntoColumn for &TypedColumn<T> {
    fn into_column(self) -> Column {
        self.column.clone()
    }
}

/// Convert an input into a [`Table`].
pub trait IntoTable {
    fn into_table(self) -> Table;
}

impl IntoTable for Table {
    fn into_table(self) -> Table {
        self
    }
}

impl IntoTable for &Table {
    fn into_table(self) -> Table {
        self.clone()
    }
}

impl IntoTable for &'static str {
    fn into_table(self) -> Table {
        Table::new(self)
    }
}

impl IntoTable for String {
    fn into_table(self) -> Table {
        Table::named(self)
    }
}

impl IntoTable for &String {
    fn into_table(self) -> Table {
        Table::named(self.clone())
    }
}

/// Declare a table and its typed columns.
///
/// Expands to a module holding a `TABLE` const and one [`TypedColumn`] const
/// per column. Items from the enclosing module are in scope, so column types
/// can refer to local enums.
///
/// ```
/// use sqlforge::{sql_table, QueryBuilder};
///
/// sql_table! {
///     pub mod users = "users" {
///         id: i64,
///         name: String,
///         active: bool,
///     }
/// }
///
/// let mut qb = QueryBuilder::new();
/// qb.select([users::id.column(), users::name.column()])
///     .from(&users::TABLE)
///     .where_(users::active.eq(true));
/// assert_eq!(
///     qb.build(),
///     "SELECT users.id, users.name FROM users WHERE users.active = 1"
/// );
/// ```
#[macro_export]
macro_rules! sql_table {
    ($vis:vis mod $module:ident = $table:literal { $($column:ident : $ty:ty),* $(,)? }) => {
        #[allow(non_upper_case_globals, dead_code)]
        $vis mod $module {
            #[allow(unused_imports)]
            use super::*;

            pub const TABLE: $crate::Table = $crate::Table::new($table);

            $(
                pub const $column: $crate::TypedColumn<$ty> =
                    $crate::TypedColumn::new($table, stringify!($column));
            )*
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_plain() {
        assert_eq!(col("id").to_sql(), "id");
        assert_eq!(col("id").of("u").to_sql(), "u.id");
    }

    #[test]
    fn column_aggregate_and_alias() {
        let c = col("id").of("o").count().alias("order_count");
        assert_eq!(c.to_sql(), "COUNT(o.id) AS order_count");
        assert_eq!(col("name").group_concat().to_sql(), "GROUP_CONCAT(name)");
        assert_eq!(col("total").sum().to_sql(), "SUM(total)");
    }

    #[test]
    fn column_validation() {
        assert!(col("id").validate().is_ok());
        assert!(col("").validate().is_err());
        assert!(col("   ").validate().is_err());
        assert!(col("a\0b").validate().is_err());
        assert!(col("id").of("").validate().is_err());
    }

    #[test]
    fn table_alias() {
        let t = Table::new("users").alias("u");
        assert_eq!(t.to_sql(), "users u");
        assert_eq!(t.col("id").to_sql(), "u.id");
        assert_eq!(Table::new("users").col("id").to_sql(), "users.id");
    }

    #[test]
    fn typed_column_converts() {
        const ID: TypedColumn<i64> = TypedColumn::new("users", "id");
        assert_eq!(ID.column().to_sql(), "users.id");
        assert_eq!(ID.eq(42).to_sql(), "users.id = 42");
        assert_eq!((&ID).into_column(), Column::qualified("users", "id"));
        assert_eq!(ID.count().alias("n").to_sql(), "COUNT(users.id) AS n");
    }
}
