//! Schema templates.
//!
//! Stored schemas are JSON. They are parsed once into [`SchemaTemplate`]
//! before generation so the walker never re-inspects raw strings.

use crate::directive::DirectiveKind;
use serde_json::Value;
use thiserror::Error;

/// A parsed response template.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaTemplate {
    /// Copied into the output verbatim
    Literal(Value),
    /// Replaced by a generated value
    Directive(DirectiveKind),
    /// Keys in stored order
    Object(Vec<(String, SchemaTemplate)>),
    Array(Vec<SchemaTemplate>),
}

/// Raised when a stored schema cannot be read as JSON.
#[derive(Debug, Error)]
#[error("schema definition is not valid JSON: {0}")]
pub struct SchemaError(#[from] serde_json::Error);

impl SchemaTemplate {
    /// Build a template from a JSON value.
    ///
    /// String leaves that are known directives become [`SchemaTemplate::Directive`];
    /// every other string, including unknown directives, stays literal.
    pub fn parse(value: &Value) -> Self {
        match value {
            Value::String(s) => match DirectiveKind::parse_token(s) {
                Some(kind) => SchemaTemplate::Directive(kind),
                None => SchemaTemplate::Literal(value.clone()),
            },
            Value::Array(items) => SchemaTemplate::Array(items.iter().map(Self::parse).collect()),
            Value::Object(map) => SchemaTemplate::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), Self::parse(v)))
                    .collect(),
            ),
            _ => SchemaTemplate::Literal(value.clone()),
        }
    }

    /// Build a template from a stored schema definition.
    ///
    /// A top-level string holds the JSON document as text and must parse.
    pub fn from_stored(stored: &Value) -> Result<Self, SchemaError> {
        match stored {
            Value::String(text) => {
                let value: Value = serde_json::from_str(text)?;
                Ok(Self::parse(&value))
            }
            other => Ok(Self::parse(other)),
        }
    }

    /// Number of directive leaves in the template.
    pub fn directive_count(&self) -> usize {
        match self {
            SchemaTemplate::Literal(_) => 0,
            SchemaTemplate::Directive(_) => 1,
            SchemaTemplate::Object(fields) => fields.iter().map(|(_, t)| t.directive_count()).sum(),
            SchemaTemplate::Array(items) => items.iter().map(Self::directive_count).sum(),
        }
    }
}
