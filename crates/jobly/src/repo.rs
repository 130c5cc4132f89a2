//! Generic record access.
//!
//! [`Repo`] runs create/get/find/update/remove for any [`Entity`]. Every
//! statement is assembled with [`Sql`], so filter and update clauses are
//! spliced in with their placeholders renumbered after any earlier binds.
//!
//! ```ignore
//! use jobly::{Companies, FilterCriteria, UpdatePayload};
//!
//! let found = Companies::find_all(&conn, &FilterCriteria::new().with("name", "net")).await?;
//! let c1 = Companies::update(&conn, "c1", UpdatePayload::new().set("numEmployees", 10)).await?;
//! Companies::remove(&conn, "c1").await?;
//! ```

use crate::client::GenericClient;
use crate::entity::{Entity, NewRecord};
use crate::error::{JoblyError, JoblyResult};
use crate::filter::{FilterCriteria, build_filter};
use crate::sql::{Sql, sql};
use crate::update::{UpdatePayload, sql_for_partial_update};
use crate::value::SqlValue;
use std::marker::PhantomData;

/// Record access for the table described by `E`.
pub struct Repo<E>(PhantomData<fn() -> E>);

impl<E: Entity> Repo<E> {
    /// Insert a record and return it as stored.
    ///
    /// Fails with `Duplicate` when the record's probe column already holds the
    /// value, or when the insert hits a unique constraint.
    pub async fn create(conn: &impl GenericClient, new: &impl NewRecord<E>) -> JoblyResult<E> {
        if let Some((column, value)) = new.duplicate_probe() {
            let duplicate = format!("Duplicate {}: {}", E::LABEL, value);
            if probe_sql::<E>(column, value)?.fetch_opt(conn).await?.is_some() {
                return Err(JoblyError::duplicate(duplicate));
            }
        }

        let record = insert_sql::<E>(new.columns())?.fetch_one_as(conn).await?;
        tracing::debug!(table = E::TABLE, "created record");
        Ok(record)
    }

    /// Fetch one record by key.
    pub async fn get(conn: &impl GenericClient, key: impl Into<E::Key>) -> JoblyResult<E> {
        let key = key.into();
        let missing = format!("No {}: {}", E::LABEL, key);
        by_key_sql::<E>(key.into())?
            .fetch_opt_as(conn)
            .await?
            .ok_or_else(|| JoblyError::not_found(missing))
    }

    /// Whether a record with `key` exists.
    pub async fn exists(conn: &impl GenericClient, key: impl Into<E::Key>) -> JoblyResult<bool> {
        let key: E::Key = key.into();
        let row = probe_sql::<E>(E::KEY_COLUMN, key.into())?
            .fetch_opt(conn)
            .await?;
        Ok(row.is_some())
    }

    /// Fetch all records matching `criteria`, in the entity's order.
    ///
    /// Criteria are validated before any query runs.
    pub async fn find_all(
        conn: &impl GenericClient,
        criteria: &FilterCriteria,
    ) -> JoblyResult<Vec<E>> {
        let q = find_all_sql::<E>(criteria)?;
        tracing::debug!(
            table = E::TABLE,
            criteria = criteria.len(),
            "finding records"
        );
        q.fetch_all_as(conn).await
    }

    /// Apply a partial update and return the updated record.
    ///
    /// Only fields present in `payload` change. Read-only columns are rejected.
    pub async fn update(
        conn: &impl GenericClient,
        key: impl Into<E::Key>,
        payload: UpdatePayload,
    ) -> JoblyResult<E> {
        let key = key.into();
        let missing = format!("No {}: {}", E::LABEL, key);
        let fields = payload.len();
        let record = update_sql::<E>(key.into(), payload)?
            .fetch_opt_as(conn)
            .await?
            .ok_or_else(|| JoblyError::not_found(missing))?;
        tracing::debug!(table = E::TABLE, fields, "updated record");
        Ok(record)
    }

    /// Delete a record by key.
    pub async fn remove(conn: &impl GenericClient, key: impl Into<E::Key>) -> JoblyResult<()> {
        let key = key.into();
        let missing = format!("No {}: {}", E::LABEL, key);

        let mut q = sql("DELETE FROM ");
        q.push_ident(E::TABLE)?.push(" WHERE ");
        q.push_ident(E::KEY_COLUMN)?.push(" = ").push_bind(key);

        if q.execute(conn).await? == 0 {
            return Err(JoblyError::not_found(missing));
        }
        tracing::debug!(table = E::TABLE, "removed record");
        Ok(())
    }
}

fn probe_sql<E: Entity>(column: &str, value: SqlValue) -> JoblyResult<Sql> {
    let mut q = sql("SELECT 1 FROM ");
    q.push_ident(E::TABLE)?.push(" WHERE ");
    q.push_ident(column)?.push(" = ").push_bind(value);
    Ok(q)
}

fn by_key_sql<E: Entity>(key: SqlValue) -> JoblyResult<Sql> {
    let mut q = sql(format!("SELECT {} FROM ", E::SELECT_LIST));
    q.push_ident(E::TABLE)?.push(" WHERE ");
    q.push_ident(E::KEY_COLUMN)?.push(" = ").push_bind(key);
    Ok(q)
}

fn insert_sql<E: Entity>(columns: Vec<(&'static str, SqlValue)>) -> JoblyResult<Sql> {
    if columns.is_empty() {
        return Err(JoblyError::invalid_argument("No data"));
    }

    let mut q = sql("INSERT INTO ");
    q.push_ident(E::TABLE)?.push(" (");
    for (i, (column, _)) in columns.iter().enumerate() {
        if i > 0 {
            q.push(", ");
        }
        q.push_ident(column)?;
    }
    q.push(") VALUES (");
    for (i, (_, value)) in columns.into_iter().enumerate() {
        if i > 0 {
            q.push(", ");
        }
        q.push_bind(value);
    }
    q.push(") RETURNING ").push(E::SELECT_LIST);
    Ok(q)
}

fn find_all_sql<E: Entity>(criteria: &FilterCriteria) -> JoblyResult<Sql> {
    let clause = build_filter(criteria, &E::CRITERIA)?;

    let mut q = sql(format!("SELECT {} FROM ", E::SELECT_LIST));
    q.push_ident(E::TABLE)?;
    q.push_where(&clause);
    q.push(" ORDER BY ").push(E::ORDER_BY);
    Ok(q)
}

fn update_sql<E: Entity>(key: SqlValue, payload: UpdatePayload) -> JoblyResult<Sql> {
    for (field, _) in payload.iter() {
        let column = E::FIELD_MAP.resolve(field);
        if !E::COLUMNS.contains(&column) {
            return Err(JoblyError::invalid_argument(format!(
                "unknown {} field: {field}",
                E::LABEL
            )));
        }
        if E::READ_ONLY.contains(&column) {
            return Err(JoblyError::invalid_argument(format!(
                "{field} cannot be updated"
            )));
        }
    }
    let set = sql_for_partial_update(payload, &E::FIELD_MAP)?;

    let mut q = sql("UPDATE ");
    q.push_ident(E::TABLE)?.push(" SET ");
    q.push_clause(&set);
    q.push(" WHERE ");
    q.push_ident(E::KEY_COLUMN)?.push(" = ").push_bind(key);
    q.push(" RETURNING ").push(E::SELECT_LIST);
    Ok(q)
}
