//! Parameterized SQL fragments.

use crate::value::SqlValue;
use tokio_postgres::types::ToSql;

/// How the fragments of a clause are joined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connective {
    /// `a = $1, b = $2` (SET lists)
    Comma,
    /// `a >= $1 AND b ILIKE $2` (WHERE predicates)
    And,
}

impl Connective {
    pub fn as_str(self) -> &'static str {
        match self {
            Connective::Comma => ", ",
            Connective::And => " AND ",
        }
    }
}

/// Ordered SQL fragments plus the values bound to their `$n` placeholders.
///
/// Every fragment ends in exactly one placeholder. Placeholders are numbered
/// from `$1` in fragment order, so value `i` binds to placeholder `$(i + 1)`.
/// When spliced into a larger statement via [`Sql::push_clause`](crate::Sql::push_clause)
/// the numbering continues from the statement's existing binds.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterizedClause {
    connective: Connective,
    /// SQL preceding each fragment's placeholder, e.g. `salary >= `.
    heads: Vec<String>,
    values: Vec<SqlValue>,
}

impl ParameterizedClause {
    pub(crate) fn new(connective: Connective) -> Self {
        Self {
            connective,
            heads: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Append `<head>$n`, binding `value` to the next placeholder.
    pub(crate) fn push_bound(&mut self, head: impl Into<String>, value: SqlValue) -> &mut Self {
        self.heads.push(head.into());
        self.values.push(value);
        self
    }

    pub fn connective(&self) -> Connective {
        self.connective
    }

    /// Fragments rendered with placeholders starting at `$1`.
    pub fn fragments(&self) -> Vec<String> {
        self.heads
            .iter()
            .enumerate()
            .map(|(i, head)| format!("{head}${}", i + 1))
            .collect()
    }

    pub(crate) fn parts(&self) -> impl Iterator<Item = (&str, &SqlValue)> {
        self.heads.iter().map(String::as_str).zip(self.values.iter())
    }

    pub fn values(&self) -> &[SqlValue] {
        &self.values
    }

    pub fn into_values(self) -> Vec<SqlValue> {
        self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// `true` when no fragment was produced; callers must not emit an empty `WHERE`.
    pub fn is_empty(&self) -> bool {
        self.heads.is_empty()
    }

    /// Render the joined clause.
    pub fn to_sql(&self) -> String {
        self.fragments().join(self.connective.as_str())
    }

    /// Parameter refs compatible with `tokio-postgres`.
    pub fn params_ref(&self) -> Vec<&(dyn ToSql + Sync)> {
        self.values.iter().map(|v| v as &(dyn ToSql + Sync)).collect()
    }
}

impl std::fmt::Display for ParameterizedClause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_sql())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_with_connective() {
        let mut c = ParameterizedClause::new(Connective::And);
        c.push_bound("a >= ", SqlValue::Int(1))
            .push_bound("b <= ", SqlValue::Int(2));
        assert_eq!(c.to_sql(), "a >= $1 AND b <= $2");
        assert_eq!(c.fragments(), vec!["a >= $1", "b <= $2"]);
        assert_eq!(c.params_ref().len(), 2);
    }

    #[test]
    fn empty_clause_renders_empty() {
        let c = ParameterizedClause::new(Connective::Comma);
        assert!(c.is_empty());
        assert_eq!(c.to_sql(), "");
    }
}
