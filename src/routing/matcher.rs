//! Path pattern matching.
//!
//! # Responsibilities
//! - Match a request path segment by segment
//! - Extract a typed integer from a numeric segment
//!
//! # Design Decisions
//! - Path matching is case-sensitive and exact (no prefix semantics)
//! - A numeric segment is ASCII digits only; no sign, no whitespace
//! - Values that overflow `u64` do not match
//! - No regex to guarantee O(n) matching

/// One segment of a path pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    /// Must equal the given text.
    Literal(&'static str),
    /// Must be a non-empty run of digits; its value is captured.
    Integer,
    /// Like `Integer` but may be missing. Only valid as the final segment.
    OptionalInteger,
}

/// A structured pattern over `/`-separated path segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    segments: Vec<Segment>,
}

impl PathPattern {
    /// Build a pattern. An `OptionalInteger` anywhere but last never matches.
    pub fn new(segments: Vec<Segment>) -> Self {
        Self { segments }
    }

    /// Pattern made only of literal segments.
    pub fn literal(parts: &[&'static str]) -> Self {
        Self::new(parts.iter().copied().map(Segment::Literal).collect())
    }

    /// Match `path` against this pattern.
    ///
    /// Returns `None` when the path does not match, otherwise `Some` holding
    /// the captured integer (if the pattern captured one).
    pub fn capture(&self, path: &str) -> Option<Option<u64>> {
        let rest = path.strip_prefix('/')?;
        let parts: Vec<&str> = rest.split('/').collect();

        let mut captured = None;
        let mut idx = 0;
        for (pos, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Literal(expected) => {
                    if parts.get(idx) != Some(expected) {
                        return None;
                    }
                    idx += 1;
                }
                Segment::Integer => {
                    captured = Some(parse_integer(parts.get(idx)?)?);
                    idx += 1;
                }
                Segment::OptionalInteger => {
                    if pos + 1 != self.segments.len() {
                        return None;
                    }
                    if let Some(part) = parts.get(idx) {
                        captured = Some(parse_integer(part)?);
                        idx += 1;
                    }
                }
            }
        }

        (idx == parts.len()).then_some(captured)
    }

    /// Returns true if `path` matches this pattern.
    pub fn matches(&self, path: &str) -> bool {
        self.capture(path).is_some()
    }
}

fn parse_integer(part: &str) -> Option<u64> {
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    part.parse().ok()
}
