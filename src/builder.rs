//! Declaration-time surface: assemble an immutable reader tree.
//!
//! A declaration closure receives an [`ObjectBuilder`], names its fields,
//! and finishes; the build call then freezes the tree. Malformed
//! composites (an object with no fields, a union with no options, an
//! unknown type keyword) fail when the declaration block finishes
//! evaluating, never at first read. Errors raised inside the closure are
//! latched and surfaced by the build call, first error wins.

use serde_json::Value;

use crate::error::DeclarationError;
use crate::reader::{Field, ObjectReader, Reader};
use crate::registry::ReaderSet;

// ---------------------------- Entry points --------------------------------- //

impl ReaderSet {
    /// Declare an object reader.
    pub fn object(
        &self,
        decl: impl FnOnce(&mut ObjectBuilder),
    ) -> Result<Reader, DeclarationError> {
        let mut builder = ObjectBuilder::new(self);
        decl(&mut builder);
        Ok(Reader::Object(builder.build()?))
    }

    /// Declare a collection: an array whose member is an object built
    /// from the nested declaration.
    pub fn collection(
        &self,
        decl: impl FnOnce(&mut ObjectBuilder),
    ) -> Result<Reader, DeclarationError> {
        let mut builder = ObjectBuilder::new(self);
        decl(&mut builder);
        Ok(Reader::array(Reader::Object(builder.build()?)))
    }

    /// Declare an array of a registered scalar/alias keyword.
    pub fn array_of(&self, keyword: &str) -> Result<Reader, DeclarationError> {
        Ok(Reader::array(self.lookup(keyword)?))
    }
}

// ------------------------------- Builder ----------------------------------- //

/// Collects field declarations for one object reader.
pub struct ObjectBuilder<'set> {
    set: &'set ReaderSet,
    fields: Vec<FieldDecl>,
    strict: bool,
    error: Option<DeclarationError>,
}

/// One pending field; finished into a [`Field`] when the object builds.
pub struct FieldDecl {
    result_key: String,
    source_key: Option<String>,
    reader: Reader,
    nullable: bool,
}

impl FieldDecl {
    /// Look the value up under a different key than the result attribute.
    pub fn from(&mut self, source_key: &str) -> &mut Self {
        self.source_key = Some(source_key.to_string());
        self
    }

    /// Also accept null (wraps the reader in a null-or-declared union).
    pub fn nullable(&mut self) -> &mut Self {
        self.nullable = true;
        self
    }

    fn finish(self) -> Field {
        let source_key = self.source_key.unwrap_or_else(|| self.result_key.clone());
        let reader = if self.nullable { self.reader.nullable() } else { self.reader };
        Field { result_key: self.result_key, source_key, reader }
    }
}

impl<'set> ObjectBuilder<'set> {
    fn new(set: &'set ReaderSet) -> Self {
        Self { set, fields: Vec::new(), strict: false, error: None }
    }

    /// Reject input keys that no declared field sources from.
    pub fn strict(&mut self) -> &mut Self {
        self.strict = true;
        self
    }

    /// Declare a field by registered type keyword.
    pub fn field(&mut self, name: &str, keyword: &str) -> &mut FieldDecl {
        let reader = self.looked_up(keyword);
        self.push(name, reader)
    }

    pub fn string(&mut self, name: &str) -> &mut FieldDecl {
        self.push(name, Reader::String)
    }

    pub fn number(&mut self, name: &str) -> &mut FieldDecl {
        self.push(name, Reader::Number)
    }

    pub fn raw(&mut self, name: &str) -> &mut FieldDecl {
        self.push(name, Reader::Raw)
    }

    pub fn null(&mut self, name: &str) -> &mut FieldDecl {
        self.push(name, Reader::Null)
    }

    pub fn literal(&mut self, name: &str, value: impl Into<Value>) -> &mut FieldDecl {
        self.push(name, Reader::Literal(value.into()))
    }

    /// Declare a nested object field.
    pub fn object(&mut self, name: &str, decl: impl FnOnce(&mut ObjectBuilder)) -> &mut FieldDecl {
        let reader = match self.set.object(decl) {
            Ok(reader) => reader,
            Err(err) => self.latched(err),
        };
        self.push(name, reader)
    }

    /// Declare an array-of-object field from a nested declaration.
    pub fn collection(
        &mut self,
        name: &str,
        decl: impl FnOnce(&mut ObjectBuilder),
    ) -> &mut FieldDecl {
        let reader = match self.set.collection(decl) {
            Ok(reader) => reader,
            Err(err) => self.latched(err),
        };
        self.push(name, reader)
    }

    /// Declare an array field by member keyword (the `of:` shorthand).
    pub fn array_of(&mut self, name: &str, keyword: &str) -> &mut FieldDecl {
        let member = self.looked_up(keyword);
        self.push(name, Reader::array(member))
    }

    /// Declare an array field with an explicit member reader.
    pub fn array(&mut self, name: &str, member: Reader) -> &mut FieldDecl {
        self.push(name, Reader::array(member))
    }

    /// Declare a union field; options are tried in the given order.
    pub fn one_of(&mut self, name: &str, options: Vec<Reader>) -> &mut FieldDecl {
        let reader = match Reader::one_of(options) {
            Ok(reader) => reader,
            Err(err) => self.latched(err),
        };
        self.push(name, reader)
    }

    /// Escape hatch: declare a field with any pre-built reader.
    pub fn with(&mut self, name: &str, reader: Reader) -> &mut FieldDecl {
        self.push(name, reader)
    }

    fn looked_up(&mut self, keyword: &str) -> Reader {
        match self.set.lookup(keyword) {
            Ok(reader) => reader,
            Err(err) => self.latched(err),
        }
    }

    // Placeholder reader for a failed declaration; the latched error
    // makes the build fail before the placeholder could ever run.
    fn latched(&mut self, err: DeclarationError) -> Reader {
        self.error.get_or_insert(err);
        Reader::Raw
    }

    fn push(&mut self, name: &str, reader: Reader) -> &mut FieldDecl {
        self.fields.push(FieldDecl {
            result_key: name.to_string(),
            source_key: None,
            reader,
            nullable: false,
        });
        self.fields.last_mut().unwrap()
    }

    fn build(self) -> Result<ObjectReader, DeclarationError> {
        if let Some(err) = self.error {
            return Err(err);
        }
        if self.fields.is_empty() {
            return Err(DeclarationError::EmptyObject);
        }
        let fields = self.fields.into_iter().map(FieldDecl::finish).collect();
        Ok(ObjectReader { fields, strict: self.strict })
    }
}

// -------------------------------- Tests ------------------------------------ //
