//! Schema-directed reading of loosely-typed JSON.
//!
//! Declare the shape you expect once (an immutable [`Reader`] tree), then
//! run documents through it three ways with the same schema and the same
//! recursive walk:
//!
//! - [`Reader::read`] fails fast with a path-annotated [`WrongTypeError`];
//! - [`Reader::validate`] collects every violation into a [`Report`];
//! - [`Reader::select`] extracts the first fragment whose path matches a
//!   glob pattern such as `.widgets[*].price`.
//!
//! Design goals:
//! - One recursive contract; the traversal policy decides whether a bad
//!   fragment raises, is recorded, or is silently skipped.
//! - Union matching backtracks through disposable trial traversals, so a
//!   rejected candidate never leaks side effects.
//! - A built reader is deeply immutable and `Send + Sync`; every call
//!   allocates its own traversal state.
//!
//! Recursion depth follows input nesting depth and is bounded by the call
//! stack; guarding against adversarially deep documents is the caller's
//! concern.

pub mod builder;
pub mod cli;
pub mod decode;
pub mod descriptor;
pub mod error;
pub mod path;
pub mod reader;
pub mod registry;
pub mod traverse;

pub use builder::{FieldDecl, ObjectBuilder};
pub use descriptor::Descriptor;
pub use error::{DeclarationError, PatternError, ReadError, WrongTypeError};
pub use path::{Path, PathPattern, Seg};
pub use reader::Reader;
pub use registry::ReaderSet;
pub use traverse::{Outcome, Report, Traversal, Violation};
