//! Statement renderers. Clauses are emitted in a fixed order and empty clauses
//! are skipped.

use std::fmt::Write as _;

use super::{QueryBuilder, StatementKind};
use crate::policy::CapacityPolicy;

impl<P: CapacityPolicy> QueryBuilder<P> {
    pub(super) fn render(&self, sql: &mut String) {
        if self.kind != StatementKind::Truncate {
            self.render_ctes(sql);
        }
        match self.kind {
            StatementKind::Select => self.render_select(sql),
            StatementKind::Insert => self.render_insert("INSERT INTO ", sql),
            StatementKind::InsertOrReplace => self.render_insert("INSERT OR REPLACE INTO ", sql),
            StatementKind::Update => self.render_update(sql),
            StatementKind::Delete => self.render_delete(sql),
            StatementKind::Truncate => self.render_truncate(sql),
        }
    }

    fn render_ctes(&self, sql: &mut String) {
        if self.ctes.is_empty() {
            return;
        }
        sql.push_str("WITH ");
        for (i, (name, subquery)) in self.ctes.iter().enumerate() {
            if i > 0 {
                sql.push_str(", ");
            }
            sql.push_str(name);
            sql.push_str(" AS (");
            sql.push_str(subquery);
            sql.push(')');
        }
        sql.push(' ');
    }

    fn render_select(&self, sql: &mut String) {
        sql.push_str("SELECT ");
        if self.distinct {
            sql.push_str("DISTINCT ");
        }

        if self.columns.is_empty() {
            sql.push('*');
        } else {
            for (i, column) in self.columns.iter().enumerate() {
                if i > 0 {
                    sql.push_str(", ");
                }
                column.write_select(sql);
            }
        }

        sql.push_str(" FROM ");
        sql.push_str(&self.table.to_sql());

        for join in self.joins.iter() {
            sql.push(' ');
            join.write_sql(sql);
        }

        self.render_where(sql);

        if !self.group_by.is_empty() {
            sql.push_str(" GROUP BY ");
            for (i, column) in self.group_by.iter().enumerate() {
                if i > 0 {
                    sql.push_str(", ");
                }
                column.write_expr(sql);
            }

            if let Some(having) = &self.having {
                sql.push_str(" HAVING ");
                sql.push_str(having);
            }
        }

        if !self.order_by.is_empty() {
            sql.push_str(" ORDER BY ");
            for (i, (column, ascending)) in self.order_by.iter().enumerate() {
                if i > 0 {
                    sql.push_str(", ");
                }
                column.write_expr(sql);
                sql.push_str(if *ascending { " ASC" } else { " DESC" });
            }
        }

        if let Some(limit) = self.limit {
            let _ = write!(sql, " LIMIT {limit}");
        }
        if let Some(offset) = self.offset {
            let _ = write!(sql, " OFFSET {offset}");
        }
    }

    fn render_insert(&self, verb: &str, sql: &mut String) {
        sql.push_str(verb);
        sql.push_str(self.table.name());

        sql.push_str(" (");
        for (i, (column, _)) in self.values.iter().enumerate() {
            if i > 0 {
                sql.push_str(", ");
            }
            sql.push_str(column.name());
        }

        sql.push_str(") VALUES (");
        for (i, (_, value)) in self.values.iter().enumerate() {
            if i > 0 {
                sql.push_str(", ");
            }
            value.write_sql(sql);
        }
        sql.push(')');
    }

    fn render_update(&self, sql: &mut String) {
        sql.push_str("UPDATE ");
        sql.push_str(&self.table.to_sql());
        sql.push_str(" SET ");
        for (i, (column, value)) in self.values.iter().enumerate() {
            if i > 0 {
                sql.push_str(", ");
            }
            sql.push_str(column.name());
            sql.push_str(" = ");
            value.write_sql(sql);
        }
        self.render_where(sql);
    }

    fn render_delete(&self, sql: &mut String) {
        sql.push_str("DELETE FROM ");
        sql.push_str(&self.table.to_sql());
        self.render_where(sql);
    }

    fn render_truncate(&self, sql: &mut String) {
        sql.push_str("TRUNCATE TABLE ");
        sql.push_str(self.table.name());
    }

    fn render_where(&self, sql: &mut String) {
        if self.conditions.is_empty() {
            return;
        }
        sql.push_str(" WHERE ");
        // OR groups and raw fragments bind looser than AND.
        let grouped = self.conditions.as_slice().len() > 1;
        for (i, predicate) in self.conditions.iter().enumerate() {
            if i > 0 {
                sql.push_str(" AND ");
            }
            if grouped && predicate.needs_grouping() {
                sql.push('(');
                predicate.write_sql(sql);
                sql.push(')');
            } else {
                predicate.write_sql(sql);
            }
        }
    }
}
