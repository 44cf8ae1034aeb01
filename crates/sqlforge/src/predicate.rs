//! Boolean predicates for WHERE / HAVING / JOIN ON clauses.
//!
//! A [`Predicate`] is a single node: a comparison, BETWEEN, IN, NULL check or
//! raw fragment. AND/OR composition renders both sides to text at the moment of
//! composition and keeps only the two strings, so a composed predicate is
//! self-contained and cannot be re-inspected afterwards.
//!
//! # Example
//! ```
//! use sqlforge::col;
//!
//! let a = col("status").eq(1);
//! let b = col("role").eq("admin");
//! let c = col("score").gt(100);
//!
//! assert_eq!((a.clone() & b.clone()).to_sql(), "(status = 1) AND (role = 'admin')");
//! assert_eq!(
//!     ((a & b) | c).to_sql(),
//!     "((status = 1) AND (role = 'admin')) OR (score > 100)"
//! );
//! ```

use std::fmt;
use std::ops::{BitAnd, BitOr, Not};

use smallvec::SmallVec;

use crate::column::{Column, IntoColumn};
use crate::error::{QbError, QbResult};
use crate::policy::{CapacityPolicy, DefaultPolicy};
use crate::value::{IntoValue, Value};

/// IN list storage; short lists stay inline.
type InValues = SmallVec<[Value; 8]>;

/// Marker rendered in place of a predicate that was never built.
pub const INVALID_CONDITION: &str = "/* INVALID CONDITION */";

/// Comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Lte,
    Gt,
    Gte,
    Like,
    NotLike,
}

impl CompareOp {
    pub fn as_str(self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::Ne => "!=",
            CompareOp::Lt => "<",
            CompareOp::Lte => "<=",
            CompareOp::Gt => ">",
            CompareOp::Gte => ">=",
            CompareOp::Like => "LIKE",
            CompareOp::NotLike => "NOT LIKE",
        }
    }
}

/// AND / OR connective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Logic {
    And,
    Or,
}

impl Logic {
    pub fn as_str(self) -> &'static str {
        match self {
            Logic::And => "AND",
            Logic::Or => "OR",
        }
    }
}

/// Discriminant of a [`Predicate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredicateType {
    Invalid,
    SimpleValue,
    ColumnColumn,
    Between,
    IsNull,
    IsNotNull,
    Raw,
    And,
    Or,
    In,
    NotIn,
}

#[derive(Debug, Clone, PartialEq, Default)]
enum PredicateKind {
    #[default]
    Invalid,
    Simple {
        column: Column,
        op: CompareOp,
        value: Value,
    },
    ColumnColumn {
        left: Column,
        op: CompareOp,
        right: Column,
    },
    Between {
        column: Column,
        low: Value,
        high: Value,
    },
    IsNull(Column),
    IsNotNull(Column),
    In {
        column: Column,
        values: InValues,
        negated: bool,
    },
    Raw(String),
    Exists(String),
    Compound {
        logic: Logic,
        left: String,
        right: String,
    },
}

/// A boolean expression node.
///
/// `Predicate::default()` is the invalid predicate; it renders as
/// [`INVALID_CONDITION`] and is rejected by the builder.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Predicate {
    kind: PredicateKind,
    negated: bool,
}

impl Predicate {
    fn from_kind(kind: PredicateKind) -> Self {
        Self {
            kind,
            negated: false,
        }
    }

    /// column OP value
    pub fn compare(column: impl IntoColumn, op: CompareOp, value: impl IntoValue) -> Self {
        Self::from_kind(PredicateKind::Simple {
            column: column.into_column(),
            op,
            value: value.into_value(),
        })
    }

    /// left OP right, qualified only when both sides carry a table.
    pub fn compare_columns(left: impl IntoColumn, op: CompareOp, right: impl IntoColumn) -> Self {
        Self::from_kind(PredicateKind::ColumnColumn {
            left: left.into_column(),
            op,
            right: right.into_column(),
        })
    }

    /// column BETWEEN low AND high
    pub fn between(column: impl IntoColumn, low: impl IntoValue, high: impl IntoValue) -> Self {
        Self::from_kind(PredicateKind::Between {
            column: column.into_column(),
            low: low.into_value(),
            high: high.into_value(),
        })
    }

    /// column IS NULL
    pub fn is_null(column: impl IntoColumn) -> Self {
        Self::from_kind(PredicateKind::IsNull(column.into_column()))
    }

    /// column IS NOT NULL
    pub fn is_not_null(column: impl IntoColumn) -> Self {
        Self::from_kind(PredicateKind::IsNotNull(column.into_column()))
    }

    /// column IN (values...), truncated to `DefaultPolicy::MAX_IN_VALUES`.
    pub fn in_list<V: IntoValue>(
        column: impl IntoColumn,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        Self::value_list(column, values, false, DefaultPolicy::MAX_IN_VALUES)
    }

    /// column NOT IN (values...), truncated to `DefaultPolicy::MAX_IN_VALUES`.
    pub fn not_in<V: IntoValue>(
        column: impl IntoColumn,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        Self::value_list(column, values, true, DefaultPolicy::MAX_IN_VALUES)
    }

    /// IN / NOT IN list keeping at most `max` values; the rest are dropped.
    pub fn value_list<V: IntoValue>(
        column: impl IntoColumn,
        values: impl IntoIterator<Item = V>,
        negated: bool,
        max: usize,
    ) -> Self {
        let column = column.into_column();
        let mut iter = values.into_iter();
        let kept: InValues = iter
            .by_ref()
            .take(max)
            .map(IntoValue::into_value)
            .collect();
        // One look past the cap; the rest of the input is never pulled.
        let truncated = kept.len() == max && iter.next().is_some();
        if truncated {
            tracing::debug!(
                column = column.name(),
                kept = kept.len(),
                truncated,
                "IN list truncated"
            );
        }
        Self::from_kind(PredicateKind::In {
            column,
            values: kept,
            negated,
        })
    }

    /// Passthrough SQL fragment. The caller is responsible for escaping.
    pub fn raw(sql: impl Into<String>) -> Self {
        Self::from_kind(PredicateKind::Raw(sql.into()))
    }

    /// EXISTS (subquery)
    pub fn exists(subquery: &str) -> Self {
        Self::from_kind(PredicateKind::Exists(subquery.to_string()))
    }

    fn combine(self, logic: Logic, other: Predicate) -> Self {
        if !self.is_valid() || !other.is_valid() {
            return Self::default();
        }
        Self::from_kind(PredicateKind::Compound {
            logic,
            left: self.to_sql(),
            right: other.to_sql(),
        })
    }

    /// `(self) AND (other)`; invalid if either side is invalid.
    pub fn and(self, other: Predicate) -> Self {
        self.combine(Logic::And, other)
    }

    /// `(self) OR (other)`; invalid if either side is invalid.
    pub fn or(self, other: Predicate) -> Self {
        self.combine(Logic::Or, other)
    }

    /// Toggle negation; a negated predicate renders as `NOT (...)`.
    pub fn negate(mut self) -> Self {
        self.negated = !self.negated;
        self
    }

    pub fn is_negated(&self) -> bool {
        self.negated
    }

    pub fn is_valid(&self) -> bool {
        !matches!(self.kind, PredicateKind::Invalid)
    }

    pub fn predicate_type(&self) -> PredicateType {
        match &self.kind {
            PredicateKind::Invalid => PredicateType::Invalid,
            PredicateKind::Simple { .. } => PredicateType::SimpleValue,
            PredicateKind::ColumnColumn { .. } => PredicateType::ColumnColumn,
            PredicateKind::Between { .. } => PredicateType::Between,
            PredicateKind::IsNull(_) => PredicateType::IsNull,
            PredicateKind::IsNotNull(_) => PredicateType::IsNotNull,
            PredicateKind::In { negated: false, .. } => PredicateType::In,
            PredicateKind::In { negated: true, .. } => PredicateType::NotIn,
            PredicateKind::Raw(_) | PredicateKind::Exists(_) => PredicateType::Raw,
            PredicateKind::Compound {
                logic: Logic::And, ..
            } => PredicateType::And,
            PredicateKind::Compound {
                logic: Logic::Or, ..
            } => PredicateType::Or,
        }
    }

    /// Number of values held by an IN / NOT IN predicate.
    pub fn value_count(&self) -> usize {
        match &self.kind {
            PredicateKind::Simple { .. } => 1,
            PredicateKind::Between { .. } => 2,
            PredicateKind::In { values, .. } => values.len(),
            _ => 0,
        }
    }

    /// Check the predicate can be added to a statement.
    pub fn validate(&self) -> QbResult<()> {
        match &self.kind {
            PredicateKind::Invalid => Err(QbError::invalid_condition(
                "predicate was never built",
            )),
            PredicateKind::Simple { column, .. }
            | PredicateKind::Between { column, .. }
            | PredicateKind::IsNull(column)
            | PredicateKind::IsNotNull(column)
            | PredicateKind::In { column, .. } => column.validate(),
            PredicateKind::ColumnColumn { left, right, .. } => {
                left.validate()?;
                right.validate()
            }
            PredicateKind::Raw(sql) if sql.trim().is_empty() => {
                Err(QbError::invalid_condition("raw condition is empty"))
            }
            PredicateKind::Exists(sql) if sql.trim().is_empty() => {
                Err(QbError::invalid_condition("EXISTS subquery is empty"))
            }
            PredicateKind::Raw(_) | PredicateKind::Exists(_) | PredicateKind::Compound { .. } => {
                Ok(())
            }
        }
    }

    /// Render the predicate as SQL.
    pub fn to_sql(&self) -> String {
        let mut out = String::new();
        self.write_sql(&mut out);
        out
    }

    /// Whether the rendered text must be parenthesised when AND-joined with
    /// siblings: a top-level OR, or a raw fragment of unknown precedence.
    pub(crate) fn needs_grouping(&self) -> bool {
        !self.negated
            && matches!(
                self.kind,
                PredicateKind::Raw(_)
                    | PredicateKind::Compound {
                        logic: Logic::Or,
                        ..
                    }
            )
    }

    pub(crate) fn write_sql(&self, out: &mut String) {
        if !self.is_valid() {
            out.push_str(INVALID_CONDITION);
            return;
        }
        if self.negated {
            out.push_str("NOT (");
        }
        match &self.kind {
            PredicateKind::Invalid => {}
            PredicateKind::Simple { column, op, value } => {
                column.write_expr(out);
                out.push(' ');
                out.push_str(op.as_str());
                out.push(' ');
                value.write_sql(out);
            }
            PredicateKind::ColumnColumn { left, op, right } => {
                if left.table().is_some() && right.table().is_some() {
                    left.write_expr(out);
                    out.push(' ');
                    out.push_str(op.as_str());
                    out.push(' ');
                    right.write_expr(out);
                } else {
                    left.write_bare(out);
                    out.push(' ');
                    out.push_str(op.as_str());
                    out.push(' ');
                    right.write_bare(out);
                }
            }
            PredicateKind::Between { column, low, high } => {
                column.write_expr(out);
                out.push_str(" BETWEEN ");
                low.write_sql(out);
                out.push_str(" AND ");
                high.write_sql(out);
            }
            PredicateKind::IsNull(column) => {
                column.write_expr(out);
                out.push_str(" IS NULL");
            }
            PredicateKind::IsNotNull(column) => {
                column.write_expr(out);
                out.push_str(" IS NOT NULL");
            }
            PredicateKind::In {
                values, negated, ..
            } if values.is_empty() => {
                // Empty IN matches nothing; empty NOT IN matches everything.
                out.push_str(if *negated { "1=1" } else { "1=0" });
            }
            PredicateKind::In {
                column,
                values,
                negated,
            } => {
                column.write_expr(out);
                out.push_str(if *negated { " NOT IN (" } else { " IN (" });
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    value.write_sql(out);
                }
                out.push(')');
            }
            PredicateKind::Raw(sql) => out.push_str(sql),
            PredicateKind::Exists(sql) => {
                out.push_str("EXISTS (");
                out.push_str(sql);
                out.push(')');
            }
            PredicateKind::Compound { logic, left, right } => {
                out.push('(');
                out.push_str(left);
                out.push_str(") ");
                out.push_str(logic.as_str());
                out.push_str(" (");
                out.push_str(right);
                out.push(')');
            }
        }
        if self.negated {
            out.push(')');
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_sql())
    }
}

impl BitAnd for Predicate {
    type Output = Predicate;

    fn bitand(self, rhs: Predicate) -> Predicate {
        self.and(rhs)
    }
}

impl BitOr for Predicate {
    type Output = Predicate;

    fn bitor(self, rhs: Predicate) -> Predicate {
        self.or(rhs)
    }
}

impl Not for Predicate {
    type Output = Predicate;

    fn not(self) -> Predicate {
        self.negate()
    }
}

/// Convert an input into SQL text for JOIN ON / HAVING clauses.
pub trait IntoFragment {
    fn into_fragment(self) -> QbResult<String>;
}

impl IntoFragment for &str {
    fn into_fragment(self) -> QbResult<String> {
        Ok(self.to_string())
    }
}

impl IntoFragment for String {
    fn into_fragment(self) -> QbResult<String> {
        Ok(self)
    }
}

impl IntoFragment for &String {
    fn into_fragment(self) -> QbResult<String> {
        Ok(self.clone())
    }
}

impl IntoFragment for Predicate {
    fn into_fragment(self) -> QbResult<String> {
        (&self).into_fragment()
    }
}

impl IntoFragment for &Predicate {
    fn into_fragment(self) -> QbResult<String> {
        self.validate()?;
        Ok(self.to_sql())
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::column::col;

    #[test]
    fn simple_comparisons() {
        assert_eq!(col("age").gte(18).to_sql(), "age >= 18");
        assert_eq!(col("status").ne("banned").to_sql(), "status != 'banned'");
        assert_eq!(col("name").like("J%").to_sql(), "name LIKE 'J%'");
        assert_eq!(col("name").not_like("%x").to_sql(), "name NOT LIKE '%x'");
        assert_eq!(col("deleted_at").eq(Value::Null).to_sql(), "deleted_at = NULL");
    }

    #[test]
    fn qualified_column_in_predicate() {
        let p = col("id").of("u").eq(7);
        assert_eq!(p.to_sql(), "u.id = 7");
    }

    #[test]
    fn column_to_column_qualifies_only_when_both_sides_do() {
        let joined = col("id").of("u").eq_col(col("user_id").of("o"));
        assert_eq!(joined.to_sql(), "u.id = o.user_id");
        assert_eq!(joined.predicate_type(), PredicateType::ColumnColumn);

        let mixed = col("id").of("u").eq_col("user_id");
        assert_eq!(mixed.to_sql(), "id = user_id");
    }

    #[test]
    fn between_and_null_checks() {
        assert_eq!(col("age").between(18, 65).to_sql(), "age BETWEEN 18 AND 65");
        assert_eq!(col("email").is_null().to_sql(), "email IS NULL");
        assert_eq!(col("email").is_not_null().to_sql(), "email IS NOT NULL");
    }

    #[test]
    fn in_lists() {
        assert_eq!(col("id").in_list([1, 2, 3]).to_sql(), "id IN (1, 2, 3)");
        assert_eq!(
            col("role").not_in(["a", "b"]).to_sql(),
            "role NOT IN ('a', 'b')"
        );
        assert_eq!(col("id").in_list(Vec::<i64>::new()).to_sql(), "1=0");
        assert_eq!(col("id").not_in(Vec::<i64>::new()).to_sql(), "1=1");
    }

    #[test]
    fn in_list_is_truncated_at_capacity() {
        let p = col("id").in_list(0..200i64);
        assert_eq!(p.value_count(), DefaultPolicy::MAX_IN_VALUES);
        assert!(p.to_sql().ends_with(", 63)"));

        let small = Predicate::value_list("id", 0..10i64, false, 3);
        assert_eq!(small.to_sql(), "id IN (0, 1, 2)");
    }

    #[test]
    fn in_list_stops_pulling_past_capacity() {
        let pulled = Cell::new(0usize);
        let counted = (0i64..).inspect(|_| pulled.set(pulled.get() + 1));
        let p = col("id").in_list(counted);
        assert_eq!(p.value_count(), DefaultPolicy::MAX_IN_VALUES);
        assert!(pulled.get() <= DefaultPolicy::MAX_IN_VALUES + 1);

        pulled.set(0);
        let counted = (0..3i64).inspect(|_| pulled.set(pulled.get() + 1));
        let short = Predicate::value_list("id", counted, false, 8);
        assert_eq!(short.value_count(), 3);
        assert_eq!(pulled.get(), 3);
    }

    #[test]
    fn composition_wraps_each_side() {
        let a = col("a").eq(1);
        let b = col("b").eq(2);
        let c = col("c").eq(3);

        let and = a.clone().and(b.clone());
        assert_eq!(and.to_sql(), "(a = 1) AND (b = 2)");
        assert_eq!(and.predicate_type(), PredicateType::And);

        let nested = (a & b) | c;
        assert_eq!(nested.to_sql(), "((a = 1) AND (b = 2)) OR (c = 3)");
        assert_eq!(nested.predicate_type(), PredicateType::Or);
    }

    #[test]
    fn negation_wraps_in_not() {
        let p = !col("active").eq(true);
        assert_eq!(p.to_sql(), "NOT (active = 1)");
        assert!(p.is_negated());

        let twice = !!col("active").eq(true);
        assert_eq!(twice.to_sql(), "active = 1");

        let compound = !(col("a").eq(1) | col("b").eq(2));
        assert_eq!(compound.to_sql(), "NOT ((a = 1) OR (b = 2))");
    }

    #[test]
    fn invalid_predicate_renders_marker_and_poisons_composition() {
        let invalid = Predicate::default();
        assert!(!invalid.is_valid());
        assert_eq!(invalid.to_sql(), INVALID_CONDITION);
        assert!(invalid.validate().is_err());

        let combined = col("a").eq(1).and(Predicate::default());
        assert!(!combined.is_valid());
        assert_eq!(combined.predicate_type(), PredicateType::Invalid);
    }

    #[test]
    fn raw_and_exists() {
        assert_eq!(Predicate::raw("x > y + 1").to_sql(), "x > y + 1");
        assert!(Predicate::raw("   ").validate().is_err());
        assert_eq!(
            Predicate::exists("SELECT 1 FROM t").to_sql(),
            "EXISTS (SELECT 1 FROM t)"
        );
    }

    #[test]
    fn grouping_applies_to_or_and_raw_only() {
        assert!((col("a").eq(1) | col("b").eq(2)).needs_grouping());
        assert!(Predicate::raw("a = 1 OR b = 2").needs_grouping());
        assert!(!(col("a").eq(1) & col("b").eq(2)).needs_grouping());
        assert!(!(!(col("a").eq(1) | col("b").eq(2))).needs_grouping());
        assert!(!Predicate::exists("SELECT 1").needs_grouping());
        assert!(!col("a").in_list([1, 2]).needs_grouping());
    }

    #[test]
    fn validate_checks_column_names() {
        assert!(col("").eq(1).validate().is_err());
        assert!(col("ok").eq(1).validate().is_ok());
        assert!(col("ok").eq_col(col(" ")).validate().is_err());
    }

    #[test]
    fn fragments() {
        assert_eq!("a = b".into_fragment().unwrap(), "a = b");
        assert_eq!(col("x").eq(1).into_fragment().unwrap(), "x = 1");
        assert!(Predicate::default().into_fragment().is_err());
    }
}
