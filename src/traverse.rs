//! The traversal: one recursive-descent walk, three effect policies.
//!
//! Every reader signals acceptance or failure through the [`Traversal`] it
//! was handed, never through its own error channel, because the same
//! `apply` call must be able to raise, record, or silently skip a failure
//! depending on the policy:
//!
//! - **Throwing**: `flunk` returns a [`WrongTypeError`] that unwinds the
//!   whole call via `?`; at most one error, pre-order first failure wins.
//! - **Collecting**: `flunk` appends `(path, reason)` to the violation
//!   list and yields the absence marker; siblings keep being visited so
//!   one pass reports everything.
//! - **Selecting**: `accept` records the first value whose path matches
//!   the target pattern; `flunk` is a harmless absence; descent is pruned
//!   once a match exists.
//!
//! The uniform outcome is `Result<Option<Value>, WrongTypeError>`: `Err`
//! only ever originates from the Throwing policy, `Ok(None)` is the
//! absence marker for a flunked subtree.

use serde_json::Value;

use crate::error::WrongTypeError;
use crate::path::{Path, PathPattern, Seg};

/// What one reader application produced.
pub type Outcome = Result<Option<Value>, WrongTypeError>;

// ------------------------------ Traversal ---------------------------------- //

/// Per-call strategy object carrying the current path and the effect
/// policy. Never shared across separate read/validate/select calls.
pub struct Traversal {
    path: Path,
    policy: Policy,
}

enum Policy {
    Throwing,
    Collecting { violations: Vec<Violation> },
    Selecting { pattern: PathPattern, found: Option<Value> },
}

impl Traversal {
    pub fn throwing() -> Self {
        Self { path: Path::root(), policy: Policy::Throwing }
    }

    pub fn collecting() -> Self {
        Self { path: Path::root(), policy: Policy::Collecting { violations: Vec::new() } }
    }

    pub fn selecting(pattern: PathPattern) -> Self {
        Self { path: Path::root(), policy: Policy::Selecting { pattern, found: None } }
    }

    /// A disposable error-collecting traversal rooted at `path`, used to
    /// trial a union option without committing any side effects.
    pub(crate) fn trial(path: Path) -> Self {
        Self { path, policy: Policy::Collecting { violations: Vec::new() } }
    }

    /// The position of the fragment currently being read.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Violations recorded so far (always empty outside Collecting).
    pub fn violations(&self) -> &[Violation] {
        match &self.policy {
            Policy::Collecting { violations } => violations,
            _ => &[],
        }
    }

    /// The fragment is valid here; returns the value to propagate upward.
    pub fn accept(&mut self, value: Value) -> Outcome {
        match &mut self.policy {
            Policy::Throwing | Policy::Collecting { .. } => Ok(Some(value)),
            Policy::Selecting { pattern, found } => {
                if found.is_none() && pattern.matches(&self.path) {
                    *found = Some(value.clone());
                    Ok(Some(value))
                } else if let Some(hit) = found {
                    // Propagate the match unchanged so ancestors don't fail.
                    Ok(Some(hit.clone()))
                } else {
                    Ok(Some(value))
                }
            }
        }
    }

    /// The fragment is invalid here; the policy decides what that means.
    pub fn flunk(&mut self, reason: impl Into<String>) -> Outcome {
        match &mut self.policy {
            Policy::Throwing => Err(WrongTypeError {
                path: self.path.render(),
                reason: reason.into(),
            }),
            Policy::Collecting { violations } => {
                violations.push(Violation {
                    path: self.path.render(),
                    reason: reason.into(),
                });
                Ok(None)
            }
            Policy::Selecting { .. } => Ok(None),
        }
    }

    /// Run `f` with the path extended by `seg`, restoring it afterwards.
    /// Sibling branches never observe each other's path suffix.
    pub fn descend<R>(&mut self, seg: Seg, f: impl FnOnce(&mut Self) -> R) -> R {
        self.path.push(seg);
        let result = f(self);
        self.path.pop();
        result
    }

    /// True once a Selecting traversal has its match; composite readers
    /// stop visiting children for the remainder of the traversal.
    pub fn pruned(&self) -> bool {
        matches!(&self.policy, Policy::Selecting { found: Some(_), .. })
    }

    /// Record a stray error as a violation (only meaningful when
    /// collecting; used by `validate` to contain misbehaving callbacks).
    pub(crate) fn record(&mut self, err: WrongTypeError) {
        if let Policy::Collecting { violations } = &mut self.policy {
            violations.push(Violation { path: err.path, reason: err.reason });
        }
    }

    pub(crate) fn into_violations(self) -> Vec<Violation> {
        match self.policy {
            Policy::Collecting { violations } => violations,
            _ => Vec::new(),
        }
    }

    pub(crate) fn into_found(self) -> Option<Value> {
        match self.policy {
            Policy::Selecting { found, .. } => found,
            _ => None,
        }
    }
}

// ------------------------------- Report ------------------------------------ //

/// One recorded data-shape violation: where, and why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub path: String,
    pub reason: String,
}

/// The outcome of `validate`: either a produced object, or the complete
/// ordered list of violations. `errors` is empty if and only if `object`
/// is present.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub object: Option<Value>,
    pub errors: Vec<Violation>,
}

impl Report {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

// -------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn throwing_flunk_carries_rendered_path() {
        let mut t = Traversal::throwing();
        let err = t
            .descend(Seg::Key("a".into()), |t| {
                t.descend(Seg::Index(2), |t| t.flunk("expected a String"))
            })
            .unwrap_err();
        assert_eq!(err.path, ".a[2]");
        assert_eq!(err.reason, "expected a String");
    }

    #[test]
    fn collecting_flunk_records_and_continues() {
        let mut t = Traversal::collecting();
        let first = t.descend(Seg::Key("x".into()), |t| t.flunk("expected a Number"));
        let second = t.descend(Seg::Key("y".into()), |t| t.flunk("expected a String"));
        assert_eq!(first, Ok(None));
        assert_eq!(second, Ok(None));
        assert_eq!(
            t.violations(),
            &[
                Violation { path: ".x".into(), reason: "expected a Number".into() },
                Violation { path: ".y".into(), reason: "expected a String".into() },
            ]
        );
    }

    #[test]
    fn selecting_records_first_match_then_prunes() {
        let pattern = PathPattern::parse(".a[*]").unwrap();
        let mut t = Traversal::selecting(pattern);
        assert!(!t.pruned());
        let out = t.descend(Seg::Key("a".into()), |t| {
            t.descend(Seg::Index(0), |t| t.accept(json!(1)))
        });
        assert_eq!(out, Ok(Some(json!(1))));
        assert!(t.pruned());
        // A later accept at a non-matching path propagates the match.
        let out = t.descend(Seg::Key("b".into()), |t| t.accept(json!("other")));
        assert_eq!(out, Ok(Some(json!(1))));
        assert_eq!(t.into_found(), Some(json!(1)));
    }

    #[test]
    fn selecting_flunk_is_harmless() {
        let pattern = PathPattern::parse(".a").unwrap();
        let mut t = Traversal::selecting(pattern);
        let out = t.descend(Seg::Key("b".into()), |t| t.flunk("expected a Number"));
        assert_eq!(out, Ok(None));
        assert!(!t.pruned());
    }
}
