//! The reader set: type keyword → reader constructor.
//!
//! Mutable while a declaration scope is still registering custom types
//! and object aliases, read-only once readers are built from it. Lookups
//! of unregistered keywords fail loudly with the known keywords listed;
//! there is no silent fallback. A built reader tree keeps no reference
//! back to the set.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use serde_json::Value;

use crate::builder::ObjectBuilder;
use crate::error::DeclarationError;
use crate::reader::Reader;
use crate::traverse::{Outcome, Traversal};

pub type Constructor =
    Arc<dyn Fn(&ReaderSet) -> Result<Reader, DeclarationError> + Send + Sync>;

static CORE_TYPES: Lazy<IndexMap<&'static str, Constructor>> = Lazy::new(|| {
    let mut table: IndexMap<&'static str, Constructor> = IndexMap::new();
    table.insert("null", Arc::new(|_: &ReaderSet| Ok(Reader::Null)) as Constructor);
    table.insert("string", Arc::new(|_: &ReaderSet| Ok(Reader::String)) as Constructor);
    table.insert("number", Arc::new(|_: &ReaderSet| Ok(Reader::Number)) as Constructor);
    table.insert("raw", Arc::new(|_: &ReaderSet| Ok(Reader::Raw)) as Constructor);
    // A string that must parse as RFC 3339; produced unchanged.
    table.insert(
        "time",
        Arc::new(|_: &ReaderSet| {
            Ok(Reader::custom(|fragment: &Value, t| match fragment {
                Value::String(s) if chrono::DateTime::parse_from_rfc3339(s).is_ok() => {
                    t.accept(fragment.clone())
                }
                _ => t.flunk("expected an RFC 3339 time String"),
            }))
        }) as Constructor,
    );
    table
});

/// Registration-ordered keyword table. Cloning is cheap (constructors
/// are shared), and a clone extended with further registrations never
/// affects the original: nested declaration scopes get copy-on-extend
/// semantics instead of ambient shared state.
#[derive(Clone)]
pub struct ReaderSet {
    constructors: IndexMap<String, Constructor>,
}

impl ReaderSet {
    /// The built-in scalar keywords: `null`, `string`, `number`, `raw`,
    /// and `time` (an RFC 3339 string).
    pub fn core() -> Self {
        let constructors = CORE_TYPES
            .iter()
            .map(|(keyword, constructor)| ((*keyword).to_string(), Arc::clone(constructor)))
            .collect();
        Self { constructors }
    }

    /// Associate `keyword` with a user callback reader.
    pub fn register_custom(
        &mut self,
        keyword: &str,
        callback: impl Fn(&Value, &mut Traversal) -> Outcome + Send + Sync + 'static,
    ) -> Result<(), DeclarationError> {
        let reader = Reader::custom(callback);
        self.insert(keyword, Arc::new(move |_: &ReaderSet| Ok(reader.clone())))
    }

    /// Associate `keyword` with a named object schema, reusable across
    /// declarations. The declaration is built eagerly against the set's
    /// current state, so its validity is checked here and later
    /// registrations cannot retroactively change it.
    pub fn register_object(
        &mut self,
        keyword: &str,
        decl: impl FnOnce(&mut ObjectBuilder),
    ) -> Result<(), DeclarationError> {
        let reader = self.object(decl)?;
        self.insert(keyword, Arc::new(move |_: &ReaderSet| Ok(reader.clone())))
    }

    /// Build the reader registered under `keyword`.
    pub fn lookup(&self, keyword: &str) -> Result<Reader, DeclarationError> {
        match self.constructors.get(keyword) {
            Some(constructor) => constructor(self),
            None => Err(DeclarationError::UnknownType {
                keyword: keyword.to_string(),
                known: self
                    .constructors
                    .keys()
                    .map(String::as_str)
                    .collect::<Vec<_>>()
                    .join(", "),
            }),
        }
    }

    pub fn keywords(&self) -> impl Iterator<Item = &str> {
        self.constructors.keys().map(String::as_str)
    }

    fn insert(&mut self, keyword: &str, constructor: Constructor) -> Result<(), DeclarationError> {
        if self.constructors.contains_key(keyword) {
            return Err(DeclarationError::DuplicateType(keyword.to_string()));
        }
        self.constructors.insert(keyword.to_string(), constructor);
        Ok(())
    }
}

impl fmt::Debug for ReaderSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReaderSet")
            .field("keywords", &self.constructors.keys().collect::<Vec<_>>())
            .finish()
    }
}

// -------------------------------- Tests ------------------------------------ //
