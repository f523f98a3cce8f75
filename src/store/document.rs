use serde_json::{Map, Value};
use uuid::Uuid;

use super::StoreError;

/// A stored document: the store-assigned id plus its JSON fields. Field
/// content is opaque here; the collection schema decides what is accepted.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: Uuid,
    pub fields: Map<String, Value>,
}

impl Document {
    /// Serialize for API responses, with the id alongside the fields.
    pub fn into_value(self) -> Value {
        let mut out = Map::with_capacity(self.fields.len() + 1);
        out.insert("id".to_string(), Value::String(self.id.to_string()));
        out.extend(self.fields);
        Value::Object(out)
    }

    /// Expand a reference field into the full target document. The reference
    /// is weak: a dangling one expands to null. Documents without the field
    /// are left untouched.
    pub fn populate(mut self, field: &str, target: Option<&Document>) -> Self {
        if self.fields.contains_key(field) {
            let expanded = target
                .map(|doc| doc.clone().into_value())
                .unwrap_or(Value::Null);
            self.fields.insert(field.to_string(), expanded);
        }
        self
    }

    /// Extract the field map from a client payload. The body must be a JSON
    /// object and may not carry an `id` (ids are assigned by the store).
    pub fn fields_from_input(body: Value) -> Result<Map<String, Value>, StoreError> {
        match body {
            Value::Object(fields) => {
                if fields.contains_key("id") {
                    return Err(StoreError::IdNotAssignable);
                }
                Ok(fields)
            }
            _ => Err(StoreError::NotAnObject),
        }
    }
}
