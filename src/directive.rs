//! Directive resolution.
//!
//! A directive is a string leaf of the form `(random:<type>)`. Known types
//! produce a fresh value; anything else is returned as the literal text.

use crate::faker;
use once_cell::sync::Lazy;
use rand::Rng;
use regex::Regex;
use serde_json::Value;

static DIRECTIVE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\(random:(\w+)\)$").unwrap());

/// The supported directive types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectiveKind {
    Uuid,
    Id,
    ObjectId,
    String,
    Name,
    Email,
    Integer,
    Float,
    Boolean,
    Date,
    DateTime,
    Url,
    Image,
    Company,
    Address,
    Phone,
    Paragraph,
    Sentences,
}

impl DirectiveKind {
    /// Look up a type name, case-insensitively. Aliases map onto one kind.
    pub fn from_name(name: &str) -> Option<Self> {
        let kind = match name.to_ascii_lowercase().as_str() {
            "uuid" => DirectiveKind::Uuid,
            "id" => DirectiveKind::Id,
            "objectid" => DirectiveKind::ObjectId,
            "string" => DirectiveKind::String,
            "name" | "fullname" => DirectiveKind::Name,
            "email" => DirectiveKind::Email,
            "number" | "integer" => DirectiveKind::Integer,
            "float" => DirectiveKind::Float,
            "boolean" => DirectiveKind::Boolean,
            "date" => DirectiveKind::Date,
            "datetime" | "timestamp" => DirectiveKind::DateTime,
            "url" => DirectiveKind::Url,
            "image" => DirectiveKind::Image,
            "company" => DirectiveKind::Company,
            "address" => DirectiveKind::Address,
            "phone" => DirectiveKind::Phone,
            "paragraph" => DirectiveKind::Paragraph,
            "sentences" => DirectiveKind::Sentences,
            _ => return None,
        };
        Some(kind)
    }

    /// Parse a whole `(random:<type>)` token.
    ///
    /// Returns `None` for text that is not a directive and for unknown types.
    pub fn parse_token(token: &str) -> Option<Self> {
        let captures = DIRECTIVE.captures(token)?;
        Self::from_name(captures.get(1)?.as_str())
    }

    /// Produce a fresh value of this kind.
    pub fn generate<R: Rng>(self, rng: &mut R) -> Value {
        match self {
            DirectiveKind::Uuid | DirectiveKind::Id => Value::String(faker::uuid(rng)),
            DirectiveKind::ObjectId => Value::String(faker::object_id(rng)),
            DirectiveKind::String => Value::String(faker::alphanumeric(rng, 10)),
            DirectiveKind::Name => Value::String(faker::full_name(rng)),
            DirectiveKind::Email => Value::String(faker::email(rng)),
            DirectiveKind::Integer => Value::from(faker::integer(rng)),
            DirectiveKind::Float => Value::from(faker::float(rng)),
            DirectiveKind::Boolean => Value::Bool(rng.gen_bool(0.5)),
            DirectiveKind::Date => Value::String(faker::date(rng)),
            DirectiveKind::DateTime => Value::String(faker::datetime(rng)),
            DirectiveKind::Url => Value::String(faker::url(rng)),
            DirectiveKind::Image => Value::String(faker::image(rng)),
            DirectiveKind::Company => Value::String(faker::company(rng)),
            DirectiveKind::Address => Value::String(faker::address(rng)),
            DirectiveKind::Phone => Value::String(faker::phone(rng)),
            DirectiveKind::Paragraph => Value::String(faker::paragraph(rng)),
            DirectiveKind::Sentences => {
                let count = rng.gen_range(2..=3);
                Value::String(faker::sentences(rng, count))
            }
        }
    }
}

/// Resolve a string leaf.
///
/// Non-directives and unknown directive types come back unchanged.
pub fn resolve<R: Rng>(token: &str, rng: &mut R) -> Value {
    match DirectiveKind::parse_token(token) {
        Some(kind) => kind.generate(rng),
        None => Value::String(token.to_string()),
    }
}
