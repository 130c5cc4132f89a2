//! Static table metadata consumed by [`Repo`](crate::Repo).

use crate::filter::CriterionSpec;
use crate::row::FromRow;
use crate::update::FieldMap;
use crate::value::SqlValue;

/// Describes one table for the generic record-access layer.
///
/// All SQL text in `TABLE`, `KEY_COLUMN`, `SELECT_LIST` and `ORDER_BY` is
/// static and trusted; caller data only ever reaches the database as bind
/// values.
pub trait Entity: FromRow + Send + Sync {
    /// Table name.
    const TABLE: &'static str;
    /// Human-readable name used in error messages ("company", "job").
    const LABEL: &'static str;
    /// Primary key column.
    const KEY_COLUMN: &'static str;
    /// Columns returned by reads and `RETURNING`.
    const SELECT_LIST: &'static str;
    /// Ordering for `find_all`.
    const ORDER_BY: &'static str;
    /// External field name to column mapping for partial updates.
    const FIELD_MAP: FieldMap;
    /// Recognized search criteria, in fragment precedence order.
    const CRITERIA: CriterionSpec;
    /// Every column of the table. A partial update may only name these.
    const COLUMNS: &'static [&'static str];
    /// Columns that may not be changed by a partial update.
    const READ_ONLY: &'static [&'static str] = &[];

    /// Key value type (`String` handle, `i32` id, ...).
    type Key: Into<SqlValue> + std::fmt::Display + Send;
}

/// A record about to be inserted into `E::TABLE`.
pub trait NewRecord<E: Entity>: Send + Sync {
    /// Column/value pairs in insertion order.
    fn columns(&self) -> Vec<(&'static str, SqlValue)>;

    /// Column and value to check for an existing row before inserting.
    ///
    /// `None` for tables whose key is generated by the database.
    fn duplicate_probe(&self) -> Option<(&'static str, SqlValue)> {
        None
    }
}
