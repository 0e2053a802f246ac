//! Paths into a document and glob patterns over them.
//!
//! A path renders in the dotted/bracketed form used by every error
//! message: the root is `""`, object descent appends `.<key>`, array
//! descent appends `[<index>]`. A [`PathPattern`] is the same shape with
//! wildcards: key segments are matched with `glob::Pattern` (so `.wid*`
//! works), index segments are `[*]` or an exact `[<digits>]`.

use std::fmt;

use crate::error::PatternError;

// ------------------------------- Paths ------------------------------------ //

/// One step of a path: object-key descent or array-index descent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Seg {
    Key(String),
    Index(usize),
}

/// Append-only segment stack identifying one fragment of a document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Path {
    segs: Vec<Seg>,
}

impl Path {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn push(&mut self, seg: Seg) {
        self.segs.push(seg);
    }

    pub fn pop(&mut self) {
        self.segs.pop();
    }

    pub fn segs(&self) -> &[Seg] {
        &self.segs
    }

    /// The dotted/bracketed form, `""` for the root.
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for seg in &self.segs {
            match seg {
                Seg::Key(key) => write!(f, ".{key}")?,
                Seg::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}

// ------------------------------ Patterns ---------------------------------- //

#[derive(Debug, Clone)]
enum IndexPat {
    Any,
    Exact(usize),
}

#[derive(Debug, Clone)]
enum PatSeg {
    Key(glob::Pattern),
    Index(IndexPat),
}

/// A parsed glob over the rendered path shape, e.g. `.widgets[*].price`.
///
/// Matching is segment-wise and full-length: a pattern of three segments
/// only ever matches a path of exactly three segments. `[` always
/// introduces an index segment, so glob character-class syntax is not
/// available inside key segments; key globbing supports `*` and `?`.
#[derive(Debug, Clone)]
pub struct PathPattern {
    segs: Vec<PatSeg>,
    source: String,
}

impl PathPattern {
    pub fn parse(src: &str) -> Result<Self, PatternError> {
        let mut segs = Vec::new();
        let mut rest = src;
        while !rest.is_empty() {
            if let Some(tail) = rest.strip_prefix('.') {
                let end = tail.find(['.', '[']).unwrap_or(tail.len());
                let key = &tail[..end];
                if key.is_empty() {
                    return Err(PatternError(format!("empty key segment in `{src}`")));
                }
                let pat = glob::Pattern::new(key)
                    .map_err(|e| PatternError(format!("bad key glob `{key}`: {e}")))?;
                segs.push(PatSeg::Key(pat));
                rest = &tail[end..];
            } else if let Some(tail) = rest.strip_prefix('[') {
                let end = tail
                    .find(']')
                    .ok_or_else(|| PatternError(format!("unclosed `[` in `{src}`")))?;
                let body = &tail[..end];
                let index = if body == "*" {
                    IndexPat::Any
                } else {
                    let n = body
                        .parse::<usize>()
                        .map_err(|_| PatternError(format!("bad index `{body}` in `{src}`")))?;
                    IndexPat::Exact(n)
                };
                segs.push(PatSeg::Index(index));
                rest = &tail[end + 1..];
            } else {
                return Err(PatternError(format!(
                    "expected `.` or `[` at `{rest}` in `{src}`"
                )));
            }
        }
        Ok(Self {
            segs,
            source: src.to_string(),
        })
    }

    pub fn matches(&self, path: &Path) -> bool {
        let segs = path.segs();
        if segs.len() != self.segs.len() {
            return false;
        }
        self.segs.iter().zip(segs).all(|(pat, seg)| match (pat, seg) {
            (PatSeg::Key(glob), Seg::Key(key)) => glob.matches(key),
            (PatSeg::Index(IndexPat::Any), Seg::Index(_)) => true,
            (PatSeg::Index(IndexPat::Exact(n)), Seg::Index(i)) => n == i,
            _ => false,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

// -------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;

    fn path(segs: &[Seg]) -> Path {
        let mut p = Path::root();
        for seg in segs {
            p.push(seg.clone());
        }
        p
    }

    #[test]
    fn renders_dotted_bracketed_form() {
        assert_eq!(Path::root().render(), "");
        let p = path(&[
            Seg::Key("widgets".into()),
            Seg::Index(0),
            Seg::Key("price".into()),
        ]);
        assert_eq!(p.render(), ".widgets[0].price");
    }

    #[test]
    fn push_pop_restores_parent_view() {
        let mut p = path(&[Seg::Key("a".into())]);
        p.push(Seg::Index(3));
        assert_eq!(p.render(), ".a[3]");
        p.pop();
        assert_eq!(p.render(), ".a");
    }

    #[test]
    fn exact_pattern_matches_exact_path() {
        let pat = PathPattern::parse(".widgets[0].price").unwrap();
        assert!(pat.matches(&path(&[
            Seg::Key("widgets".into()),
            Seg::Index(0),
            Seg::Key("price".into()),
        ])));
        assert!(!pat.matches(&path(&[
            Seg::Key("widgets".into()),
            Seg::Index(1),
            Seg::Key("price".into()),
        ])));
    }

    #[test]
    fn wildcards_match_any_index_and_glob_keys() {
        let pat = PathPattern::parse(".wid*[*].price").unwrap();
        for i in 0..3 {
            assert!(pat.matches(&path(&[
                Seg::Key("widgets".into()),
                Seg::Index(i),
                Seg::Key("price".into()),
            ])));
        }
        assert!(!pat.matches(&path(&[
            Seg::Key("gadgets".into()),
            Seg::Index(0),
            Seg::Key("price".into()),
        ])));
    }

    #[test]
    fn length_mismatch_never_matches() {
        let pat = PathPattern::parse(".a.b").unwrap();
        assert!(!pat.matches(&path(&[Seg::Key("a".into())])));
        assert!(!pat.matches(&path(&[
            Seg::Key("a".into()),
            Seg::Key("b".into()),
            Seg::Key("c".into()),
        ])));
    }

    #[test]
    fn empty_pattern_matches_only_root() {
        let pat = PathPattern::parse("").unwrap();
        assert!(pat.matches(&Path::root()));
        assert!(!pat.matches(&path(&[Seg::Key("a".into())])));
    }

    #[test]
    fn index_pattern_rejects_key_segment_and_vice_versa() {
        let pat = PathPattern::parse(".a[*]").unwrap();
        assert!(!pat.matches(&path(&[Seg::Key("a".into()), Seg::Key("b".into())])));
        let pat = PathPattern::parse(".a.b").unwrap();
        assert!(!pat.matches(&path(&[Seg::Key("a".into()), Seg::Index(0)])));
    }

    #[test]
    fn malformed_patterns_fail_to_parse() {
        assert!(PathPattern::parse(".a[").is_err());
        assert!(PathPattern::parse(".a[x]").is_err());
        assert!(PathPattern::parse("..a").is_err());
        assert!(PathPattern::parse("widgets").is_err());
    }
}
