//! Union reading with backtracking.
//!
//! Each option is first run against a fresh, disposable collecting
//! traversal rooted at the current path. A clean trial selects the
//! option, which is then re-run against the real enclosing traversal so
//! the real policy's effects (raising, recording, path matching) happen
//! exactly once. The trial is a necessary part of the algorithm: merging
//! it with the real traversal would leak partial side effects from
//! rejected candidates.
//!
//! Declaration order is part of the schema's observable contract: the
//! first clean option wins, and every option may be fully trialled for a
//! non-matching fragment, so authors should order options from most to
//! least specific.

use serde_json::Value;

use crate::reader::Reader;
use crate::traverse::{Outcome, Traversal};

#[derive(Debug, Clone)]
pub struct OneOfReader {
    pub(crate) options: Vec<Reader>,
}

impl OneOfReader {
    pub fn options(&self) -> &[Reader] {
        &self.options
    }

    pub(crate) fn apply(&self, fragment: &Value, traversal: &mut Traversal) -> Outcome {
        for option in &self.options {
            let mut trial = Traversal::trial(traversal.path().clone());
            let outcome = option.apply(fragment, &mut trial);
            let clean = outcome.is_ok() && trial.violations().is_empty();
            if clean {
                return option.apply(fragment, traversal);
            }
        }
        traversal.flunk("is not any of the expected options")
    }
}
