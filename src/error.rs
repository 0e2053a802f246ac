//! Error types: schema-author mistakes vs data-shape mismatches.
//!
//! `DeclarationError` surfaces while a reader tree is being built and is
//! always fatal to that declaration. `WrongTypeError` surfaces during
//! traversal; whether it raises, is recorded, or is suppressed depends on
//! the active traversal policy.

use thiserror::Error;

/// A malformed schema declaration. Raised when the declaration block
/// finishes evaluating, never deferred to read time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeclarationError {
    #[error("object declared with no fields")]
    EmptyObject,

    #[error("array declared with no member reader")]
    EmptyArray,

    #[error("one_of declared with no options")]
    EmptyOneOf,

    #[error("unknown type keyword `{keyword}` (known: {known})")]
    UnknownType { keyword: String, known: String },

    #[error("type keyword `{0}` is already registered")]
    DuplicateType(String),
}

/// A data-shape mismatch at one node of the input document.
///
/// `path` is the dotted/bracketed position of the failing fragment
/// (`""` for the document root, e.g. `.widgets[0].price` below it).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("at `{path}`: {reason}")]
pub struct WrongTypeError {
    pub path: String,
    pub reason: String,
}

/// Failure of a string entry point: either the document could not be
/// decoded at all, or the decoded tree failed the schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReadError {
    #[error(transparent)]
    WrongType(#[from] WrongTypeError),

    #[error("invalid JSON: {0}")]
    Decode(String),
}

/// A malformed select pattern, e.g. an unclosed `[` or a non-numeric index.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid select pattern: {0}")]
pub struct PatternError(pub String);
