//! Serde model of a schema file.
//!
//! Lets a reader tree be declared as data instead of code (the CLI's
//! `--schema` input). Internally tagged on `"type"`; a field inlines its
//! member shape next to `name`/`from`/`nullable`:
//!
//! ```json
//! {
//!   "type": "object",
//!   "fields": [
//!     { "name": "name", "type": "string" },
//!     { "name": "price", "type": "number", "nullable": true },
//!     { "name": "tags", "type": "array", "of": { "type": "string" } }
//!   ]
//! }
//! ```
//!
//! Building goes through the same builder layer as code declarations, so
//! descriptor files hit identical declaration-time validation.

use serde::Deserialize;
use serde_json::Value;

use crate::error::{DeclarationError, ReadError};
use crate::reader::Reader;
use crate::registry::ReaderSet;

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Descriptor {
    Null,
    Literal {
        value: Value,
    },
    String,
    Number,
    Raw,
    Object {
        fields: Vec<FieldDescriptor>,
        #[serde(default)]
        strict: bool,
    },
    Array {
        #[serde(default)]
        of: Option<Box<Descriptor>>,
    },
    Collection {
        fields: Vec<FieldDescriptor>,
        #[serde(default)]
        strict: bool,
    },
    OneOf {
        options: Vec<Descriptor>,
    },
    /// A keyword registered on the reader set (built-in, custom, or alias).
    /// Spelled `keyword`, not `name`, so it can sit flattened next to a
    /// field's own `name`.
    Named {
        keyword: String,
    },
}

#[derive(Debug, Clone, Deserialize)]
pub struct FieldDescriptor {
    pub name: String,
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub nullable: bool,
    #[serde(flatten)]
    pub shape: Descriptor,
}

impl Descriptor {
    /// Decode a descriptor document, with JSON-path context on failure.
    pub fn parse(source: &str) -> Result<Self, ReadError> {
        crate::decode::from_str_with_path(source)
    }

    /// Build the reader this descriptor declares against `set`.
    pub fn build(&self, set: &ReaderSet) -> Result<Reader, DeclarationError> {
        match self {
            Descriptor::Null => Ok(Reader::Null),
            Descriptor::Literal { value } => Ok(Reader::Literal(value.clone())),
            Descriptor::String => Ok(Reader::String),
            Descriptor::Number => Ok(Reader::Number),
            Descriptor::Raw => Ok(Reader::Raw),
            Descriptor::Array { of } => match of {
                Some(of) => Ok(Reader::array(of.build(set)?)),
                None => Err(DeclarationError::EmptyArray),
            },
            Descriptor::Object { fields, strict } => build_object(set, fields, *strict),
            Descriptor::Collection { fields, strict } => {
                Ok(Reader::array(build_object(set, fields, *strict)?))
            }
            Descriptor::OneOf { options } => {
                let options = options
                    .iter()
                    .map(|option| option.build(set))
                    .collect::<Result<Vec<_>, _>>()?;
                Reader::one_of(options)
            }
            Descriptor::Named { keyword } => set.lookup(keyword),
        }
    }
}

fn build_object(
    set: &ReaderSet,
    fields: &[FieldDescriptor],
    strict: bool,
) -> Result<Reader, DeclarationError> {
    // Pre-build member readers so a nested descriptor error surfaces
    // directly instead of through the builder's latch.
    let mut built = Vec::with_capacity(fields.len());
    for field in fields {
        built.push((field, field.shape.build(set)?));
    }
    set.object(|o| {
        if strict {
            o.strict();
        }
        for (field, reader) in &built {
            let decl = o.with(&field.name, reader.clone());
            if let Some(from) = &field.from {
                decl.from(from);
            }
            if field.nullable {
                decl.nullable();
            }
        }
    })
}

// -------------------------------- Tests ------------------------------------ //
