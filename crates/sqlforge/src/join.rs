//! JOIN clauses.

use std::fmt;

/// Join flavor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    Left,
    Right,
    Full,
    Cross,
}

impl JoinKind {
    pub fn as_str(self) -> &'static str {
        match self {
            JoinKind::Inner => "INNER JOIN",
            JoinKind::Left => "LEFT JOIN",
            JoinKind::Right => "RIGHT JOIN",
            JoinKind::Full => "FULL JOIN",
            JoinKind::Cross => "CROSS JOIN",
        }
    }
}

/// A join against a table with a pre-rendered ON condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Join {
    kind: JoinKind,
    table: String,
    on: String,
}

impl Join {
    pub fn new(kind: JoinKind, table: impl Into<String>, on: impl Into<String>) -> Self {
        Self {
            kind,
            table: table.into(),
            on: on.into(),
        }
    }

    /// CROSS JOIN has no ON clause.
    pub fn cross(table: impl Into<String>) -> Self {
        Self::new(JoinKind::Cross, table, String::new())
    }

    pub fn kind(&self) -> JoinKind {
        self.kind
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn on(&self) -> &str {
        &self.on
    }

    pub(crate) fn write_sql(&self, out: &mut String) {
        out.push_str(self.kind.as_str());
        out.push(' ');
        out.push_str(&self.table);
        if self.kind != JoinKind::Cross {
            out.push_str(" ON ");
            out.push_str(&self.on);
        }
    }

    pub fn to_sql(&self) -> String {
        let mut out = String::new();
        self.write_sql(&mut out);
        out
    }
}

impl fmt::Display for Join {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_sql())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_each_kind() {
        let on = "users.id = orders.user_id";
        assert_eq!(
            Join::new(JoinKind::Inner, "orders", on).to_sql(),
            "INNER JOIN orders ON users.id = orders.user_id"
        );
        assert_eq!(
            Join::new(JoinKind::Left, "orders", on).to_sql(),
            "LEFT JOIN orders ON users.id = orders.user_id"
        );
        assert_eq!(
            Join::new(JoinKind::Right, "orders", on).to_sql(),
            "RIGHT JOIN orders ON users.id = orders.user_id"
        );
        assert_eq!(
            Join::new(JoinKind::Full, "orders", on).to_sql(),
            "FULL JOIN orders ON users.id = orders.user_id"
        );
    }

    #[test]
    fn cross_join_has_no_on() {
        let join = Join::cross("sizes");
        assert_eq!(join.kind(), JoinKind::Cross);
        assert_eq!(join.to_sql(), "CROSS JOIN sizes");
        assert!(join.on().is_empty());
    }
}
