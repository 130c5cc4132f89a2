//! Statement builder that numbers placeholders for you.
//!
//! The record-access layer assembles every statement with [`Sql`] so that the
//! placeholders of an embedded [`ParameterizedClause`] keep lining up with
//! their values, whatever was bound before them.
//!
//! # Example
//!
//! ```ignore
//! use jobly::sql;
//!
//! let mut q = sql("UPDATE companies SET ");
//! q.push_clause(&set_clause);
//! q.push(" WHERE handle = ").push_bind("c1");
//! q.push(" RETURNING handle, name");
//!
//! let company: Company = q.fetch_one_as(&conn).await?;
//! ```

use crate::client::GenericClient;
use crate::clause::ParameterizedClause;
use crate::error::{JoblyError, JoblyResult};
use crate::ident::Ident;
use crate::row::FromRow;
use crate::value::SqlValue;
use tokio_postgres::Row;
use tokio_postgres::types::ToSql;

#[derive(Debug, Clone)]
enum SqlPart {
    Raw(String),
    Param,
}

/// A parameter-safe dynamic SQL builder.
///
/// `Sql` stores SQL pieces and parameters separately and generates `$1, $2, ...`
/// placeholders in the final SQL string.
#[derive(Debug, Clone)]
pub struct Sql {
    parts: Vec<SqlPart>,
    params: Vec<SqlValue>,
}

/// Start building a SQL statement.
pub fn sql(initial_sql: impl Into<String>) -> Sql {
    Sql::new(initial_sql)
}

impl Sql {
    /// Create a new builder with an initial SQL fragment.
    pub fn new(initial_sql: impl Into<String>) -> Self {
        Self {
            parts: vec![SqlPart::Raw(initial_sql.into())],
            params: Vec::new(),
        }
    }

    /// Append raw SQL (no parameters).
    pub fn push(&mut self, sql: &str) -> &mut Self {
        if sql.is_empty() {
            return self;
        }

        match self.parts.last_mut() {
            Some(SqlPart::Raw(last)) => last.push_str(sql),
            _ => self.parts.push(SqlPart::Raw(sql.to_string())),
        }
        self
    }

    /// Append a parameter placeholder and bind its value.
    pub fn push_bind(&mut self, value: impl Into<SqlValue>) -> &mut Self {
        self.parts.push(SqlPart::Param);
        self.params.push(value.into());
        self
    }

    /// Append a validated, unquoted identifier.
    pub fn push_ident(&mut self, ident: &str) -> JoblyResult<&mut Self> {
        let ident = Ident::parse(ident)?;
        let mut out = String::new();
        ident.write_sql(&mut out);
        Ok(self.push(&out))
    }

    /// Append a clause, continuing placeholder numbering after existing binds.
    pub fn push_clause(&mut self, clause: &ParameterizedClause) -> &mut Self {
        let sep = clause.connective().as_str();
        for (i, (head, value)) in clause.parts().enumerate() {
            if i > 0 {
                self.push(sep);
            }
            self.push(head);
            self.push_bind(value.clone());
        }
        self
    }

    /// Append ` WHERE <clause>`; no-op when the clause is empty.
    pub fn push_where(&mut self, clause: &ParameterizedClause) -> &mut Self {
        if clause.is_empty() {
            return self;
        }
        self.push(" WHERE ");
        self.push_clause(clause)
    }

    /// Render SQL with `$1, $2, ...` placeholders.
    pub fn to_sql(&self) -> String {
        let mut out = String::new();
        let mut idx: usize = 0;

        for part in &self.parts {
            match part {
                SqlPart::Raw(s) => out.push_str(s),
                SqlPart::Param => {
                    idx += 1;
                    use std::fmt::Write;
                    let _ = write!(&mut out, "${idx}");
                }
            }
        }
        out
    }

    /// Bound values in placeholder order.
    pub fn params(&self) -> &[SqlValue] {
        &self.params
    }

    /// Parameter refs compatible with `tokio-postgres`.
    pub fn params_ref(&self) -> Vec<&(dyn ToSql + Sync)> {
        self.params
            .iter()
            .map(|p| p as &(dyn ToSql + Sync))
            .collect()
    }

    fn validate(&self) -> JoblyResult<()> {
        let placeholder_count = self
            .parts
            .iter()
            .filter(|p| matches!(p, SqlPart::Param))
            .count();

        if placeholder_count != self.params.len() {
            return Err(JoblyError::invalid_argument(format!(
                "Sql: placeholders({}) and params({}) differ",
                placeholder_count,
                self.params.len()
            )));
        }
        Ok(())
    }

    /// Execute the built SQL and return all rows.
    pub async fn fetch_all(&self, conn: &impl GenericClient) -> JoblyResult<Vec<Row>> {
        self.validate()?;
        let sql = self.to_sql();
        let params = self.params_ref();
        conn.query(&sql, &params).await
    }

    /// Execute the built SQL and return all rows mapped to `T`.
    pub async fn fetch_all_as<T: FromRow>(&self, conn: &impl GenericClient) -> JoblyResult<Vec<T>> {
        let rows = self.fetch_all(conn).await?;
        rows.iter().map(T::from_row).collect()
    }

    /// Execute the built SQL and return exactly the first row.
    pub async fn fetch_one(&self, conn: &impl GenericClient) -> JoblyResult<Row> {
        self.validate()?;
        let sql = self.to_sql();
        let params = self.params_ref();
        conn.query_one(&sql, &params).await
    }

    /// Execute the built SQL and return the first row mapped to `T`.
    pub async fn fetch_one_as<T: FromRow>(&self, conn: &impl GenericClient) -> JoblyResult<T> {
        let row = self.fetch_one(conn).await?;
        T::from_row(&row)
    }

    /// Execute the built SQL and return at most one row.
    pub async fn fetch_opt(&self, conn: &impl GenericClient) -> JoblyResult<Option<Row>> {
        self.validate()?;
        let sql = self.to_sql();
        let params = self.params_ref();
        conn.query_opt(&sql, &params).await
    }

    /// Execute the built SQL and return at most one row mapped to `T`.
    pub async fn fetch_opt_as<T: FromRow>(
        &self,
        conn: &impl GenericClient,
    ) -> JoblyResult<Option<T>> {
        let row = self.fetch_opt(conn).await?;
        row.as_ref().map(T::from_row).transpose()
    }

    /// Execute the built SQL and return affected row count.
    pub async fn execute(&self, conn: &impl GenericClient) -> JoblyResult<u64> {
        self.validate()?;
        let sql = self.to_sql();
        let params = self.params_ref();
        conn.execute(&sql, &params).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{Criterion, CriterionKind, CriterionSpec, FilterCriteria, build_filter};
    use crate::update::{FieldMap, UpdatePayload, sql_for_partial_update};

    #[test]
    fn builds_placeholders_in_order() {
        let mut q = sql("SELECT * FROM jobs WHERE salary = ");
        q.push_bind(1).push(" AND title = ").push_bind("x");

        assert_eq!(q.to_sql(), "SELECT * FROM jobs WHERE salary = $1 AND title = $2");
        assert_eq!(q.params_ref().len(), 2);
    }

    #[test]
    fn push_clause_continues_numbering() {
        let set = sql_for_partial_update(
            UpdatePayload::new().set("name", "New").set("numEmployees", 3),
            &FieldMap::new(&[("numEmployees", "num_employees")]),
        )
        .unwrap();

        let mut q = sql("UPDATE companies SET ");
        q.push_clause(&set);
        q.push(" WHERE handle = ").push_bind("c1");

        assert_eq!(
            q.to_sql(),
            r#"UPDATE companies SET "name"=$1, "num_employees"=$2 WHERE handle = $3"#
        );
        assert_eq!(
            q.params(),
            &[
                SqlValue::Text("New".into()),
                SqlValue::Int(3),
                SqlValue::Text("c1".into())
            ]
        );
    }

    #[test]
    fn push_clause_after_existing_bind_renumbers() {
        const SPEC: CriterionSpec = CriterionSpec::new(&[Criterion::new(
            "minSalary",
            "salary",
            CriterionKind::LowerBound,
        )]);
        let clause = build_filter(&FilterCriteria::new().with("minSalary", "3"), &SPEC).unwrap();

        let mut q = sql("SELECT id FROM jobs WHERE company_handle = ");
        q.push_bind("c1").push(" AND ");
        q.push_clause(&clause);

        assert_eq!(
            q.to_sql(),
            "SELECT id FROM jobs WHERE company_handle = $1 AND salary >= $2"
        );
    }

    #[test]
    fn push_where_skips_empty_clause() {
        let clause = build_filter(&FilterCriteria::new(), &CriterionSpec::NONE).unwrap();
        let mut q = sql("SELECT handle FROM companies");
        q.push_where(&clause).push(" ORDER BY name");
        assert_eq!(q.to_sql(), "SELECT handle FROM companies ORDER BY name");
        assert!(q.params().is_empty());
    }

    #[test]
    fn push_ident_rejects_unsafe() {
        let mut q = sql("SELECT 1 FROM ");
        assert!(q.push_ident("jobs; drop table jobs; --").is_err());
        assert!(q.push_ident("1jobs").is_err());
        q.push_ident("jobs").unwrap();
        assert_eq!(q.to_sql(), "SELECT 1 FROM jobs");
    }
}
