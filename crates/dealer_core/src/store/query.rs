//! Minimal parameterized `SELECT` builder.
//!
//! # Responsibility
//! - Assemble SQL text and a positional argument list from parts.
//! - Reject malformed queries before they reach SQLite.
//!
//! # Invariants
//! - Each `WHERE` clause carries exactly as many args as `?` placeholders.
//! - Clauses are joined with `AND` in insertion order.

use rusqlite::types::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq)]
pub enum QueryBuildError {
    NoColumns,
    NoTable,
    PlaceholderMismatch {
        clause: String,
        placeholders: usize,
        args: usize,
    },
}

impl Display for QueryBuildError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoColumns => write!(f, "select statement must have at least one column"),
            Self::NoTable => write!(f, "select statement must have a FROM table"),
            Self::PlaceholderMismatch {
                clause,
                placeholders,
                args,
            } => write!(
                f,
                "clause `{clause}` has {placeholders} placeholder(s) but {args} arg(s)"
            ),
        }
    }
}

impl Error for QueryBuildError {}

#[derive(Debug, Clone)]
struct Clause {
    sql: String,
    args: Vec<Value>,
}

/// Immutable-style builder; every step consumes and returns the builder so a
/// base query can be cloned and narrowed per call.
#[derive(Debug, Clone, Default)]
pub struct SelectBuilder {
    columns: Vec<String>,
    from: Option<String>,
    wheres: Vec<Clause>,
    order_by: Vec<String>,
}

impl SelectBuilder {
    pub fn select<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn from(mut self, table: impl Into<String>) -> Self {
        self.from = Some(table.into());
        self
    }

    /// Adds a raw predicate using `?` placeholders bound to `args`.
    pub fn where_clause(mut self, sql: impl Into<String>, args: Vec<Value>) -> Self {
        self.wheres.push(Clause {
            sql: sql.into(),
            args,
        });
        self
    }

    /// Adds `column = ?`.
    pub fn where_eq(self, column: &str, value: impl Into<Value>) -> Self {
        self.where_clause(format!("{column} = ?"), vec![value.into()])
    }

    pub fn order_by(mut self, expr: impl Into<String>) -> Self {
        self.order_by.push(expr.into());
        self
    }

    /// Renders SQL text and the bound argument list.
    pub fn to_sql(&self) -> Result<(String, Vec<Value>), QueryBuildError> {
        if self.columns.is_empty() {
            return Err(QueryBuildError::NoColumns);
        }
        let from = self.from.as_deref().ok_or(QueryBuildError::NoTable)?;

        let mut sql = format!("SELECT {} FROM {from}", self.columns.join(", "));
        let mut args = Vec::new();

        for (index, clause) in self.wheres.iter().enumerate() {
            let placeholders = clause.sql.matches('?').count();
            if placeholders != clause.args.len() {
                return Err(QueryBuildError::PlaceholderMismatch {
                    clause: clause.sql.clone(),
                    placeholders,
                    args: clause.args.len(),
                });
            }
            sql.push_str(if index == 0 { " WHERE " } else { " AND " });
            sql.push('(');
            sql.push_str(&clause.sql);
            sql.push(')');
            args.extend(clause.args.iter().cloned());
        }

        if !self.order_by.is_empty() {
            sql.push_str(" ORDER BY ");
            sql.push_str(&self.order_by.join(", "));
        }

        Ok((sql, args))
    }
}
