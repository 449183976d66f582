//! Template walker.
//!
//! Rebuilds a template's structure with every directive replaced by a
//! freshly generated value.

use crate::schema::SchemaTemplate;
use rand::Rng;
use serde_json::{Map, Value};

/// Generate one value from a template.
pub fn generate<R: Rng>(template: &SchemaTemplate, rng: &mut R) -> Value {
    match template {
        SchemaTemplate::Literal(value) => value.clone(),
        SchemaTemplate::Directive(kind) => kind.generate(rng),
        SchemaTemplate::Array(items) => {
            Value::Array(items.iter().map(|item| generate(item, rng)).collect())
        }
        SchemaTemplate::Object(fields) => {
            let mut map = Map::with_capacity(fields.len());
            for (key, field) in fields {
                map.insert(key.clone(), generate(field, rng));
            }
            Value::Object(map)
        }
    }
}

/// Generate `count` independent values from a template.
pub fn generate_many<R: Rng>(template: &SchemaTemplate, count: usize, rng: &mut R) -> Vec<Value> {
    (0..count).map(|_| generate(template, rng)).collect()
}
