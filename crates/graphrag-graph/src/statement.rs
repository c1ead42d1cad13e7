//! Parameterized Cypher statements and identifier validation.
//!
//! Values always travel as bound parameters. Labels and relationship types
//! cannot be parameterized in Cypher, so they must pass [`Identifier::parse`]
//! and are backtick-quoted when spliced into statement text.

use std::collections::BTreeSet;

use serde_json::{Map, Value};

use crate::client::GraphError;
use crate::records;

/// Longest label or relationship type accepted from callers.
const MAX_IDENTIFIER_LEN: usize = 64;

/// A label or relationship type that is safe to splice into Cypher text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identifier(String);

impl Identifier {
    /// Validate `raw` against `[A-Za-z_][A-Za-z0-9_]*`.
    ///
    /// `kind` names what is being validated ("label", "relationship type")
    /// and only shows up in the error.
    pub fn parse(kind: &'static str, raw: &str) -> Result<Self, GraphError> {
        let mut chars = raw.chars();
        let valid_start = chars
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
        let valid_rest = chars.all(|c| c.is_ascii_alphanumeric() || c == '_');

        if !valid_start || !valid_rest || raw.len() > MAX_IDENTIFIER_LEN {
            return Err(GraphError::InvalidIdentifier {
                kind,
                value: raw.to_string(),
            });
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Backtick-quoted form for use in statement text.
    pub fn quoted(&self) -> String {
        format!("`{}`", self.0)
    }
}

impl std::fmt::Display for Identifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A Cypher statement with its bound parameters and the result columns to
/// read back from each row.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub text: String,
    pub params: Map<String, Value>,
    pub columns: Vec<String>,
}

impl Statement {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            params: Map::new(),
            columns: Vec::new(),
        }
    }

    /// Bind a parameter referenced as `$key` in the statement text.
    pub fn param(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.params.insert(key.to_string(), value.into());
        self
    }

    /// Declare a result column to collect from each row.
    pub fn returns(mut self, column: &str) -> Self {
        self.columns.push(column.to_string());
        self
    }

    /// Every `$name` placeholder in the statement text.
    pub fn placeholders(&self) -> BTreeSet<String> {
        let mut found = BTreeSet::new();
        let mut chars = self.text.char_indices().peekable();

        while let Some((_, c)) = chars.next() {
            if c != '$' {
                continue;
            }
            let mut name = String::new();
            while let Some(&(_, next)) = chars.peek() {
                if next.is_ascii_alphanumeric() || next == '_' {
                    name.push(next);
                    chars.next();
                } else {
                    break;
                }
            }
            if !name.is_empty() {
                found.insert(name);
            }
        }
        found
    }

    /// Placeholders that have no bound parameter.
    pub fn unbound_placeholders(&self) -> Vec<String> {
        self.placeholders()
            .into_iter()
            .filter(|name| !self.params.contains_key(name))
            .collect()
    }

    /// Build the neo4rs query, converting JSON parameters to Bolt values.
    pub fn to_query(&self) -> neo4rs::Query {
        self.params
            .iter()
            .fold(neo4rs::query(&self.text), |q, (key, value)| {
                q.param(key, records::json_to_bolt(value))
            })
    }
}
