//! Search criteria → parameterized `WHERE` predicate.
//!
//! Each entity declares a [`CriterionSpec`]: the criterion names it accepts,
//! the column each one constrains and how. Raw values arrive as strings (query
//! parameters) and are validated before any SQL is produced.
//!
//! ```ignore
//! use jobly::{FilterCriteria, build_filter};
//! use jobly::models::JOB_CRITERIA;
//!
//! let criteria = FilterCriteria::new().with("title", "j2").with("minSalary", "2");
//! let clause = build_filter(&criteria, &JOB_CRITERIA)?;
//! assert_eq!(clause.to_sql(), "title ILIKE $1 AND salary >= $2");
//! ```

use crate::clause::{Connective, ParameterizedClause};
use crate::error::{JoblyError, JoblyResult};
use crate::ident::Ident;
use crate::value::SqlValue;
use serde::Deserialize;
use std::collections::BTreeMap;

/// How a criterion constrains its column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CriterionKind {
    /// Case-insensitive substring match: `column ILIKE '%raw%'`
    Substring,
    /// Integer lower bound: `column >= raw`
    LowerBound,
    /// Integer upper bound: `column <= raw`
    UpperBound,
    /// `"true"` restricts to `column > 0`; `"false"` adds nothing.
    Flag,
}

/// A single recognized search criterion.
#[derive(Debug, Clone, Copy)]
pub struct Criterion {
    pub name: &'static str,
    pub column: &'static str,
    pub kind: CriterionKind,
}

impl Criterion {
    pub const fn new(name: &'static str, column: &'static str, kind: CriterionKind) -> Self {
        Self { name, column, kind }
    }
}

/// The criteria an entity accepts, in the order their fragments are emitted.
#[derive(Debug, Clone, Copy)]
pub struct CriterionSpec(&'static [Criterion]);

impl CriterionSpec {
    /// Accepts no criteria at all.
    pub const NONE: CriterionSpec = CriterionSpec(&[]);

    pub const fn new(criteria: &'static [Criterion]) -> Self {
        Self(criteria)
    }

    pub fn get(&self, name: &str) -> Option<&'static Criterion> {
        self.0.iter().find(|c| c.name == name)
    }

    pub fn criteria(&self) -> &'static [Criterion] {
        self.0
    }
}

/// Raw search criteria as received from an untyped boundary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct FilterCriteria(BTreeMap<String, String>);

impl FilterCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a criterion (chainable). A repeated name replaces the earlier value.
    pub fn with(mut self, name: impl Into<String>, raw: impl Into<String>) -> Self {
        self.insert(name, raw);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, raw: impl Into<String>) -> &mut Self {
        self.0.insert(name.into(), raw.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FilterCriteria {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Escape `LIKE` metacharacters so user text matches literally.
///
/// Postgres uses `\` as the default `LIKE` escape character.
pub fn escape_like(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

// Bounded columns are `INTEGER`, so the value must fit in an `i32`.
// Only an optional `-` followed by digits is accepted.
fn parse_bound(criterion: &Criterion, raw: &str) -> JoblyResult<i64> {
    let invalid = || {
        JoblyError::invalid_criteria(format!(
            "{} must be an integer between {} and {}, got '{raw}'",
            criterion.name,
            i32::MIN,
            i32::MAX
        ))
    };

    let digits = raw.strip_prefix('-').unwrap_or(raw);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    raw.parse::<i32>().map(i64::from).map_err(|_| invalid())
}

fn parse_flag(criterion: &Criterion, raw: &str) -> JoblyResult<bool> {
    match raw {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(JoblyError::invalid_criteria(format!(
            "{} must be 'true' or 'false', got '{raw}'",
            criterion.name
        ))),
    }
}

/// A criterion whose raw value has been validated.
enum Checked {
    Substring(String),
    Bound(i64),
    Flag(bool),
}

fn validate(
    criteria: &FilterCriteria,
    spec: &CriterionSpec,
) -> JoblyResult<Vec<(&'static Criterion, Checked)>> {
    if let Some(unknown) = criteria.keys().find(|k| spec.get(k).is_none()) {
        return Err(JoblyError::invalid_criteria(format!(
            "unrecognized search parameter '{unknown}'"
        )));
    }

    let mut checked = Vec::with_capacity(criteria.len());
    for criterion in spec.criteria() {
        let Some(raw) = criteria.get(criterion.name) else {
            continue;
        };
        let value = match criterion.kind {
            CriterionKind::Substring => Checked::Substring(raw.to_string()),
            CriterionKind::LowerBound | CriterionKind::UpperBound => {
                Checked::Bound(parse_bound(criterion, raw)?)
            }
            CriterionKind::Flag => Checked::Flag(parse_flag(criterion, raw)?),
        };
        checked.push((criterion, value));
    }

    for (lower, lo) in &checked {
        let (CriterionKind::LowerBound, Checked::Bound(lo)) = (lower.kind, lo) else {
            continue;
        };
        for (upper, hi) in &checked {
            let (CriterionKind::UpperBound, Checked::Bound(hi)) = (upper.kind, hi) else {
                continue;
            };
            if upper.column == lower.column && lo > hi {
                return Err(JoblyError::invalid_criteria(format!(
                    "{} cannot be greater than {}",
                    lower.name, upper.name
                )));
            }
        }
    }

    Ok(checked)
}

/// Build the `WHERE` predicate (without the keyword) for `criteria`.
///
/// Validation runs first: unknown names, malformed values and an inverted
/// bound pair fail with [`JoblyError::InvalidCriteria`]. Values are taken
/// literally: bounds are an optional `-` and digits within `i32` range, flags
/// are exactly `true` or `false`, and neither is trimmed. Fragments follow the
/// order of `spec` and are joined with `AND`. An empty result means "no
/// constraint"; the caller must then leave the `WHERE` keyword out.
pub fn build_filter(
    criteria: &FilterCriteria,
    spec: &CriterionSpec,
) -> JoblyResult<ParameterizedClause> {
    let checked = validate(criteria, spec)?;
    let mut clause = ParameterizedClause::new(Connective::And);

    for (criterion, value) in checked {
        let column = Ident::parse(criterion.column)?.to_sql();
        match (criterion.kind, value) {
            (CriterionKind::Substring, Checked::Substring(raw)) => {
                let pattern = format!("%{}%", escape_like(&raw));
                clause.push_bound(format!("{column} ILIKE "), SqlValue::Text(pattern));
            }
            (CriterionKind::LowerBound, Checked::Bound(n)) => {
                clause.push_bound(format!("{column} >= "), SqlValue::Int(n));
            }
            (CriterionKind::UpperBound, Checked::Bound(n)) => {
                clause.push_bound(format!("{column} <= "), SqlValue::Int(n));
            }
            (CriterionKind::Flag, Checked::Flag(true)) => {
                clause.push_bound(format!("{column} > "), SqlValue::Int(0));
            }
            _ => {}
        }
    }

    Ok(clause)
}
