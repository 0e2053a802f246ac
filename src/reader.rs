//! The polymorphic schema node and the read entry points.
//!
//! A `Reader` is immutable once built and cheap to clone; a built tree is
//! `Send + Sync` and may serve unlimited concurrent calls, each of which
//! allocates its own [`Traversal`].

pub mod object;
pub mod one_of;

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::error::{DeclarationError, ReadError, WrongTypeError};
use crate::path::{PathPattern, Seg};
use crate::traverse::{Outcome, Report, Traversal, Violation};

pub use object::{Field, ObjectReader};
pub use one_of::OneOfReader;

// ------------------------------- Variants ---------------------------------- //

/// An immutable schema node describing how to read one fragment shape.
#[derive(Debug, Clone)]
pub enum Reader {
    /// Exactly null (a missing object key also reads as null).
    Null,
    /// Exactly the given value, compared without coercion.
    Literal(Value),
    String,
    Number,
    /// Accepts anything, unchanged, without recursing into it.
    Raw,
    Object(ObjectReader),
    Array(ArrayReader),
    OneOf(OneOfReader),
    Custom(CustomReader),
}

#[derive(Debug, Clone)]
pub struct ArrayReader {
    pub(crate) member: Box<Reader>,
}

/// User-supplied reader body. Must call the traversal's `accept` or
/// `flunk` exactly once and return its result.
pub type CustomFn = dyn Fn(&Value, &mut Traversal) -> Outcome + Send + Sync;

#[derive(Clone)]
pub struct CustomReader(pub(crate) Arc<CustomFn>);

impl fmt::Debug for CustomReader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Custom(..)")
    }
}

// ----------------------------- Constructors -------------------------------- //

impl Reader {
    pub fn literal(value: impl Into<Value>) -> Self {
        Reader::Literal(value.into())
    }

    pub fn array(member: Reader) -> Self {
        Reader::Array(ArrayReader { member: Box::new(member) })
    }

    pub fn one_of(options: Vec<Reader>) -> Result<Self, DeclarationError> {
        if options.is_empty() {
            return Err(DeclarationError::EmptyOneOf);
        }
        Ok(Reader::OneOf(OneOfReader { options }))
    }

    pub fn custom(
        f: impl Fn(&Value, &mut Traversal) -> Outcome + Send + Sync + 'static,
    ) -> Self {
        Reader::Custom(CustomReader(Arc::new(f)))
    }

    /// Null-or-self: the `nullable` modifier is sugar for a two-option union.
    pub fn nullable(self) -> Self {
        Reader::OneOf(OneOfReader { options: vec![Reader::Null, self] })
    }
}

// ------------------------------ Traversal ---------------------------------- //

impl Reader {
    /// Read one fragment against this node, signalling acceptance or
    /// failure through `traversal`. This is the uniform recursive
    /// contract shared by all three policies; custom readers may call it
    /// to delegate to an inner reader.
    pub fn apply(&self, fragment: &Value, traversal: &mut Traversal) -> Outcome {
        match self {
            Reader::Null => match fragment {
                Value::Null => traversal.accept(Value::Null),
                _ => traversal.flunk("expected null"),
            },
            Reader::Literal(expected) => {
                if fragment == expected {
                    traversal.accept(fragment.clone())
                } else {
                    traversal.flunk(format!("expected literal `{expected}`"))
                }
            }
            Reader::String => match fragment {
                Value::String(_) => traversal.accept(fragment.clone()),
                _ => traversal.flunk("expected a String"),
            },
            Reader::Number => match fragment {
                Value::Number(_) => traversal.accept(fragment.clone()),
                _ => traversal.flunk("expected a Number"),
            },
            Reader::Raw => traversal.accept(fragment.clone()),
            Reader::Object(reader) => reader.apply(fragment, traversal),
            Reader::Array(reader) => reader.apply(fragment, traversal),
            Reader::OneOf(reader) => reader.apply(fragment, traversal),
            Reader::Custom(reader) => (reader.0)(fragment, traversal),
        }
    }
}

impl ArrayReader {
    fn apply(&self, fragment: &Value, traversal: &mut Traversal) -> Outcome {
        let elements = match fragment {
            Value::Array(xs) => xs,
            _ => return traversal.flunk("expected an Array"),
        };
        let mut produced = Vec::with_capacity(elements.len());
        for (index, element) in elements.iter().enumerate() {
            if traversal.pruned() {
                break;
            }
            let value =
                traversal.descend(Seg::Index(index), |t| self.member.apply(element, t))?;
            // A flunked member keeps its slot so order stays 1:1.
            produced.push(value.unwrap_or(Value::Null));
        }
        traversal.accept(Value::Array(produced))
    }
}

// ----------------------------- Entry points -------------------------------- //

impl Reader {
    /// Fail-fast read: the first mismatch anywhere in the tree surfaces
    /// as a path-annotated error.
    pub fn read(&self, document: &Value) -> Result<Value, WrongTypeError> {
        let mut traversal = Traversal::throwing();
        let value = self.apply(document, &mut traversal)?;
        // Only a custom callback that produced neither accept nor flunk
        // can leave the value absent here.
        value.ok_or_else(|| WrongTypeError {
            path: String::new(),
            reason: "reader produced no value".into(),
        })
    }

    /// Decode a serialized document, then [`Reader::read`] it.
    pub fn read_str(&self, source: &str) -> Result<Value, ReadError> {
        let document: Value = crate::decode::from_str_with_path(source)?;
        Ok(self.read(&document)?)
    }

    /// Collect every violation in one pass. Never raises; `object` is
    /// present if and only if `errors` is empty.
    pub fn validate(&self, document: &Value) -> Report {
        let mut traversal = Traversal::collecting();
        let value = match self.apply(document, &mut traversal) {
            Ok(value) => value,
            // A custom callback hand-built an error under a collecting
            // policy; contain it as a violation.
            Err(err) => {
                traversal.record(err);
                None
            }
        };
        let mut errors = traversal.into_violations();
        let object = if errors.is_empty() { value } else { None };
        if object.is_none() && errors.is_empty() {
            errors.push(Violation {
                path: String::new(),
                reason: "reader produced no value".into(),
            });
        }
        Report { object, errors }
    }

    /// Decode a serialized document, then [`Reader::validate`] it.
    pub fn validate_str(&self, source: &str) -> Result<Report, ReadError> {
        let document: Value = crate::decode::from_str_with_path(source)?;
        Ok(self.validate(&document))
    }

    /// Best-effort extraction of the first fragment whose path matches
    /// `pattern`. Mismatching data elsewhere in the document is ignored.
    pub fn select(&self, document: &Value, pattern: &PathPattern) -> Option<Value> {
        let mut traversal = Traversal::selecting(pattern.clone());
        let _ = self.apply(document, &mut traversal);
        traversal.into_found()
    }
}

// -------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use serde_json::{Value, json};

    use super::Reader;
    use crate::path::PathPattern;
    use crate::registry::ReaderSet;
    use crate::traverse::Violation;

    fn widgets_schema() -> Reader {
        let set = ReaderSet::core();
        set.object(|o| {
            o.collection("widgets", |w| {
                w.string("name");
                w.number("price");
            });
        })
        .unwrap()
    }

    #[test]
    fn reader_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Reader>();
    }

    #[test]
    fn scalar_mismatch_reports_exact_path() {
        let set = ReaderSet::core();
        let schema = set
            .object(|o| {
                o.object("a", |a| {
                    a.string("b");
                });
            })
            .unwrap();
        let err = schema.read(&json!({"a": {"b": 5}})).unwrap_err();
        assert_eq!(err.path, ".a.b");
        assert_eq!(err.reason, "expected a String");
    }

    #[test]
    fn validate_agrees_with_read_when_clean() {
        let schema = widgets_schema();
        let doc = json!({"widgets": [{"name": "bolt", "price": 3}]});
        let report = schema.validate(&doc);
        assert!(report.is_valid());
        assert_eq!(report.object, Some(schema.read(&doc).unwrap()));
    }

    #[test]
    fn report_invariant_object_iff_no_errors() {
        let schema = widgets_schema();
        for doc in [
            json!({"widgets": []}),
            json!({"widgets": [{"name": 1, "price": "x"}]}),
            json!(null),
        ] {
            let report = schema.validate(&doc);
            assert_eq!(report.errors.is_empty(), report.object.is_some());
        }
    }

    #[test]
    fn collecting_reports_every_field_error_in_order() {
        let set = ReaderSet::core();
        let schema = set
            .object(|o| {
                o.string("first");
                o.string("last");
            })
            .unwrap();
        let report = schema.validate(&json!({}));
        assert_eq!(
            report.errors,
            vec![
                Violation { path: ".first".into(), reason: "expected a String".into() },
                Violation { path: ".last".into(), reason: "expected a String".into() },
            ]
        );
        assert_eq!(report.object, None);
    }

    #[test]
    fn undeclared_keys_ignored_unless_strict() {
        let set = ReaderSet::core();
        let lax = set
            .object(|o| {
                o.string("a");
            })
            .unwrap();
        let doc = json!({"a": "x", "b": 1, "c": 2});
        assert_eq!(lax.read(&doc).unwrap(), json!({"a": "x"}));

        let strict = set
            .object(|o| {
                o.strict();
                o.string("a");
            })
            .unwrap();
        let err = strict.read(&doc).unwrap_err();
        assert_eq!(err.path, "");
        assert_eq!(err.reason, "found strictly forbidden keys [b, c]");
    }

    #[test]
    fn strict_excess_is_one_error_alongside_field_errors() {
        let set = ReaderSet::core();
        let schema = set
            .object(|o| {
                o.strict();
                o.string("a");
            })
            .unwrap();
        let report = schema.validate(&json!({"a": 5, "b": 1, "c": 2}));
        assert_eq!(
            report.errors,
            vec![
                Violation { path: ".a".into(), reason: "expected a String".into() },
                Violation {
                    path: "".into(),
                    reason: "found strictly forbidden keys [b, c]".into()
                },
            ]
        );
    }

    #[test]
    fn one_of_picks_first_declared_match_without_coercion() {
        let set = ReaderSet::core();
        let schema = set
            .object(|o| {
                o.one_of("v", vec![Reader::String, Reader::Number]);
            })
            .unwrap();
        let out = schema.read(&json!({"v": "5"})).unwrap();
        assert_eq!(out["v"], json!("5"));
        assert!(out["v"].is_string());

        let out = schema.read(&json!({"v": 5})).unwrap();
        assert!(out["v"].is_number());

        let err = schema.read(&json!({"v": true})).unwrap_err();
        assert_eq!(err.path, ".v");
        assert_eq!(err.reason, "is not any of the expected options");
    }

    #[test]
    fn nullable_field_accepts_null_and_declared_type_only() {
        let set = ReaderSet::core();
        let schema = set
            .object(|o| {
                o.string("x").nullable();
            })
            .unwrap();
        assert_eq!(schema.read(&json!({"x": null})).unwrap(), json!({"x": null}));
        assert_eq!(schema.read(&json!({})).unwrap(), json!({"x": null}));
        assert_eq!(schema.read(&json!({"x": "a"})).unwrap(), json!({"x": "a"}));
        let err = schema.read(&json!({"x": 5})).unwrap_err();
        assert_eq!(err.path, ".x");
    }

    #[test]
    fn array_preserves_order_and_length() {
        let set = ReaderSet::core();
        let schema = set
            .object(|o| {
                o.array_of("tags", "string");
            })
            .unwrap();
        let out = schema.read(&json!({"tags": ["a", "b", "c"]})).unwrap();
        assert_eq!(out["tags"], json!(["a", "b", "c"]));
        let err = schema.read(&json!({"tags": ["a", 2, "c"]})).unwrap_err();
        assert_eq!(err.path, ".tags[1]");
    }

    #[test]
    fn numbers_keep_integer_float_distinction() {
        let set = ReaderSet::core();
        let schema = set
            .object(|o| {
                o.number("n");
            })
            .unwrap();
        assert!(schema.read(&json!({"n": 5})).unwrap()["n"].is_i64());
        assert!(schema.read(&json!({"n": 5.5})).unwrap()["n"].is_f64());
    }

    #[test]
    fn literal_compares_exactly() {
        let set = ReaderSet::core();
        let schema = set
            .object(|o| {
                o.literal("kind", "circle");
            })
            .unwrap();
        assert!(schema.read(&json!({"kind": "circle"})).is_ok());
        let err = schema.read(&json!({"kind": "square"})).unwrap_err();
        assert_eq!(err.reason, "expected literal `\"circle\"`");
    }

    #[test]
    fn raw_accepts_anything_unchanged() {
        let set = ReaderSet::core();
        let schema = set
            .object(|o| {
                o.raw("blob");
            })
            .unwrap();
        let doc = json!({"blob": {"deep": [1, {"x": null}]}});
        assert_eq!(schema.read(&doc).unwrap()["blob"], doc["blob"]);
    }

    #[test]
    fn field_renaming_reads_source_key_into_result_key() {
        let set = ReaderSet::core();
        let schema = set
            .object(|o| {
                o.string("last_name").from("surname");
            })
            .unwrap();
        let out = schema.read(&json!({"surname": "Ada"})).unwrap();
        assert_eq!(out, json!({"last_name": "Ada"}));
        // The error path uses the source key, where the data actually is.
        let err = schema.read(&json!({"surname": 7})).unwrap_err();
        assert_eq!(err.path, ".surname");
    }

    #[test]
    fn discriminated_union_exposes_only_its_own_shape() {
        let set = ReaderSet::core();
        let circle = set
            .object(|o| {
                o.literal("type", "circle");
                o.number("radius");
            })
            .unwrap();
        let rect = set
            .object(|o| {
                o.literal("type", "rect");
                o.number("w");
                o.number("h");
            })
            .unwrap();
        let label = set
            .object(|o| {
                o.literal("type", "label");
                o.string("text");
            })
            .unwrap();
        let schema = Reader::array(Reader::one_of(vec![circle, rect, label]).unwrap());

        let doc = json!([
            {"type": "rect", "w": 2, "h": 3},
            {"type": "circle", "radius": 1.5},
            {"type": "label", "text": "hi"},
        ]);
        let out = schema.read(&doc).unwrap();
        assert_eq!(out[0], json!({"type": "rect", "w": 2, "h": 3}));
        assert_eq!(out[1], json!({"type": "circle", "radius": 1.5}));
        assert_eq!(out[2], json!({"type": "label", "text": "hi"}));
        assert!(out[1].get("w").is_none());
        assert!(out[2].get("radius").is_none());

        let err = schema.read(&json!([{"type": "circle", "radius": "big"}])).unwrap_err();
        assert_eq!(err.path, "[0]");
    }

    #[test]
    fn one_of_trial_leaks_no_errors_into_the_real_report() {
        let set = ReaderSet::core();
        let schema = set
            .object(|o| {
                o.one_of("v", vec![Reader::String, Reader::Number]);
            })
            .unwrap();
        // The string option flunks in its trial; the number option wins.
        let report = schema.validate(&json!({"v": 5}));
        assert!(report.is_valid());
        assert!(report.errors.is_empty());
    }

    #[test]
    fn select_extracts_first_match_in_preorder() {
        let schema = widgets_schema();
        let doc = json!({"widgets": [
            {"name": "bolt", "price": 1},
            {"name": "nut", "price": 2},
        ]});
        let pattern = PathPattern::parse(".widgets[*].price").unwrap();
        assert_eq!(schema.select(&doc, &pattern), Some(json!(1)));
        let pattern = PathPattern::parse(".widgets[1].price").unwrap();
        assert_eq!(schema.select(&doc, &pattern), Some(json!(2)));
        let pattern = PathPattern::parse(".widgets[9].price").unwrap();
        assert_eq!(schema.select(&doc, &pattern), None);
    }

    #[test]
    fn select_ignores_mismatches_elsewhere() {
        let set = ReaderSet::core();
        let schema = set
            .object(|o| {
                o.number("a");
                o.number("b");
            })
            .unwrap();
        let pattern = PathPattern::parse(".b").unwrap();
        let doc = json!({"a": "not a number", "b": 2});
        assert_eq!(schema.select(&doc, &pattern), Some(json!(2)));
    }

    #[test]
    fn select_prunes_descent_after_the_match() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);
        let set = ReaderSet::core();
        let counting = Reader::custom(move |fragment: &Value, t| {
            seen.fetch_add(1, Ordering::SeqCst);
            t.accept(fragment.clone())
        });
        let schema = set
            .object(|o| {
                o.array("xs", counting);
            })
            .unwrap();
        let pattern = PathPattern::parse(".xs[0]").unwrap();
        let doc = json!({"xs": [1, 2, 3, 4]});
        assert_eq!(schema.select(&doc, &pattern), Some(json!(1)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn custom_reader_delegates_through_the_traversal_contract() {
        let mut set = ReaderSet::core();
        set.register_custom("id", |fragment: &Value, t| match fragment {
            Value::String(s) if !s.is_empty() => t.accept(fragment.clone()),
            _ => t.flunk("expected a non-empty id String"),
        })
        .unwrap();
        let schema = set
            .object(|o| {
                o.field("id", "id");
            })
            .unwrap();
        assert!(schema.read(&json!({"id": "w-1"})).is_ok());
        let err = schema.read(&json!({"id": ""})).unwrap_err();
        assert_eq!(err.path, ".id");
        assert_eq!(err.reason, "expected a non-empty id String");
        // The same reader collects instead of raising under validate.
        let report = schema.validate(&json!({"id": 9}));
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].path, ".id");
    }

    #[test]
    fn read_str_decodes_then_reads() {
        let schema = widgets_schema();
        let out = schema
            .read_str(r#"{"widgets": [{"name": "bolt", "price": 3}]}"#)
            .unwrap();
        assert_eq!(out["widgets"][0]["price"], json!(3));

        let err = schema.read_str(r#"{"widgets": ["#).unwrap_err();
        assert!(matches!(err, crate::error::ReadError::Decode(_)));
    }

    #[test]
    fn validate_str_surfaces_decode_failure_separately() {
        let schema = widgets_schema();
        let report = schema
            .validate_str(r#"{"widgets": "oops"}"#)
            .unwrap();
        assert_eq!(report.errors[0].path, ".widgets");
        assert!(schema.validate_str("not json").is_err());
    }
}
