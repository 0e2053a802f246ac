//! Object reading: declared fields in declaration order, optional
//! strict rejection of undeclared keys.

use serde_json::{Map, Value};

use crate::path::Seg;
use crate::reader::Reader;
use crate::traverse::{Outcome, Traversal};

/// One declared field: `source_key` is looked up in the input fragment,
/// the result lands under `result_key` (they differ when renaming).
#[derive(Debug, Clone)]
pub struct Field {
    pub result_key: String,
    pub source_key: String,
    pub reader: Reader,
}

#[derive(Debug, Clone)]
pub struct ObjectReader {
    pub(crate) fields: Vec<Field>,
    pub(crate) strict: bool,
}

impl ObjectReader {
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    pub(crate) fn apply(&self, fragment: &Value, traversal: &mut Traversal) -> Outcome {
        let map = match fragment {
            Value::Object(m) => m,
            _ => return traversal.flunk("expected an Object"),
        };
        let mut record = Map::with_capacity(self.fields.len());
        for field in &self.fields {
            if traversal.pruned() {
                break;
            }
            // A missing key reads as null, so nullable fields may be
            // absent and required ones flunk at their own path.
            let sub = map.get(&field.source_key).unwrap_or(&Value::Null);
            let value = traversal
                .descend(Seg::Key(field.source_key.clone()), |t| field.reader.apply(sub, t))?;
            if let Some(value) = value {
                record.insert(field.result_key.clone(), value);
            }
        }
        // Runs after all declared fields so a collecting pass reports
        // field errors and the excess-key error together.
        if self.strict {
            let excess: Vec<&str> = map
                .keys()
                .filter(|key| !self.fields.iter().any(|f| &f.source_key == *key))
                .map(String::as_str)
                .collect();
            if !excess.is_empty() {
                return traversal
                    .flunk(format!("found strictly forbidden keys [{}]", excess.join(", ")));
            }
        }
        traversal.accept(Value::Object(record))
    }
}
