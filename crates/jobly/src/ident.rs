//! SQL identifier handling.
//!
//! Column names cannot be bound as parameters, so every column that ends up in
//! generated SQL passes through [`Ident`] first:
//!
//! - [`Ident::parse`] accepts plain (optionally dotted) names matching
//!   `[A-Za-z_][A-Za-z0-9_$]*` and renders them unquoted.
//! - [`Ident::quoted`] accepts any name without NUL and renders it double-quoted,
//!   escaping `"` as `""`.

use crate::error::{JoblyError, JoblyResult};

/// A part of a SQL identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentPart {
    /// Unquoted identifier: must match `[A-Za-z_][A-Za-z0-9_$]*`.
    Unquoted(String),
    /// Quoted identifier: allows any characters except NUL.
    Quoted(String),
}

/// A validated SQL identifier (column or table name).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    pub parts: Vec<IdentPart>,
}

impl Ident {
    /// Create a single quoted identifier.
    pub fn quoted(name: &str) -> JoblyResult<Self> {
        if name.is_empty() {
            return Err(JoblyError::invalid_argument("Empty quoted identifier"));
        }
        if name.contains('\0') {
            return Err(JoblyError::invalid_argument(
                "Identifier cannot contain NUL character",
            ));
        }
        Ok(Self {
            parts: vec![IdentPart::Quoted(name.to_string())],
        })
    }

    /// Parse an unquoted identifier, allowing `table.column` notation.
    pub fn parse(s: &str) -> JoblyResult<Self> {
        if s.is_empty() {
            return Err(JoblyError::invalid_argument("Identifier cannot be empty"));
        }

        let mut parts = Vec::new();
        for seg in s.split('.') {
            if !is_plain_segment(seg) {
                return Err(JoblyError::invalid_argument(format!(
                    "Invalid identifier '{s}'"
                )));
            }
            parts.push(IdentPart::Unquoted(seg.to_string()));
        }

        Ok(Self { parts })
    }

    /// Render the identifier as SQL.
    pub fn to_sql(&self) -> String {
        let mut out = String::new();
        self.write_sql(&mut out);
        out
    }

    pub(crate) fn write_sql(&self, out: &mut String) {
        for (i, part) in self.parts.iter().enumerate() {
            if i > 0 {
                out.push('.');
            }
            match part {
                IdentPart::Unquoted(s) => out.push_str(s),
                IdentPart::Quoted(s) => {
                    out.push('"');
                    for ch in s.chars() {
                        if ch == '"' {
                            out.push('"');
                        }
                        out.push(ch);
                    }
                    out.push('"');
                }
            }
        }
    }
}

fn is_plain_segment(seg: &str) -> bool {
    let mut chars = seg.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first == '_' || first.is_ascii_alphabetic())
        && chars.all(|c| c == '_' || c == '$' || c.is_ascii_alphanumeric())
}
