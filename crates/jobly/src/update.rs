//! Partial-update `SET` clause construction.
//!
//! ```ignore
//! use jobly::{FieldMap, UpdatePayload, sql_for_partial_update};
//!
//! const USER_FIELDS: FieldMap = FieldMap::new(&[("firstName", "first_name")]);
//!
//! let payload = UpdatePayload::new().set("firstName", "Aliya").set("age", 32);
//! let set = sql_for_partial_update(payload, &USER_FIELDS)?;
//! assert_eq!(set.to_sql(), r#""first_name"=$1, "age"=$2"#);
//! ```

use crate::clause::{Connective, ParameterizedClause};
use crate::error::{JoblyError, JoblyResult};
use crate::ident::Ident;
use crate::value::SqlValue;
use std::collections::HashSet;

/// Maps API-facing field names to storage column names.
///
/// Fields without an entry are used as the column name unchanged.
#[derive(Debug, Clone, Copy)]
pub struct FieldMap(&'static [(&'static str, &'static str)]);

impl FieldMap {
    pub const EMPTY: FieldMap = FieldMap(&[]);

    pub const fn new(pairs: &'static [(&'static str, &'static str)]) -> Self {
        Self(pairs)
    }

    /// Resolve `field` to its column name.
    pub fn resolve<'a>(&self, field: &'a str) -> &'a str {
        self.0
            .iter()
            .find(|(from, _)| *from == field)
            .map_or(field, |&(_, to)| to)
    }

    pub fn pairs(&self) -> &'static [(&'static str, &'static str)] {
        self.0
    }
}

/// An ordered set of field assignments for a partial update.
///
/// Order is preserved so that placeholder `$i` always binds entry `i`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdatePayload {
    entries: Vec<(String, SqlValue)>,
}

impl UpdatePayload {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an assignment (chainable).
    pub fn set(mut self, field: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        self.push(field, value);
        self
    }

    pub fn push(&mut self, field: impl Into<String>, value: impl Into<SqlValue>) -> &mut Self {
        self.entries.push((field.into(), value.into()));
        self
    }

    /// Build from a JSON object body. Values must be scalars (or `null`).
    pub fn from_json(body: &serde_json::Value) -> JoblyResult<Self> {
        let obj = body
            .as_object()
            .ok_or_else(|| JoblyError::invalid_argument("update body must be a JSON object"))?;

        let mut payload = Self::new();
        for (field, value) in obj {
            let value = SqlValue::from_json(value).map_err(|e| {
                JoblyError::invalid_argument(format!("field '{field}': {e}"))
            })?;
            payload.push(field.as_str(), value);
        }
        Ok(payload)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SqlValue)> {
        self.entries.iter().map(|(f, v)| (f.as_str(), v))
    }
}

impl<K: Into<String>, V: Into<SqlValue>> FromIterator<(K, V)> for UpdatePayload {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut payload = Self::new();
        for (k, v) in iter {
            payload.push(k, v);
        }
        payload
    }
}

/// Build the `SET` list for a partial update.
///
/// Each entry becomes `"<column>"=$i` in payload order. Fails with
/// [`JoblyError::InvalidArgument`] when the payload is empty or assigns the same
/// column twice.
pub fn sql_for_partial_update(
    payload: UpdatePayload,
    field_map: &FieldMap,
) -> JoblyResult<ParameterizedClause> {
    if payload.is_empty() {
        return Err(JoblyError::invalid_argument("No data"));
    }

    let mut seen = HashSet::with_capacity(payload.len());
    let mut clause = ParameterizedClause::new(Connective::Comma);

    for (field, value) in payload.entries {
        let column = field_map.resolve(&field);
        if !seen.insert(column.to_string()) {
            return Err(JoblyError::invalid_argument(format!(
                "column '{column}' assigned more than once"
            )));
        }
        let ident = Ident::quoted(column)?.to_sql();
        clause.push_bound(format!("{ident}="), value);
    }

    Ok(clause)
}
