//! Path pattern matching.
//!
//! # Responsibilities
//! - Parse express-style patterns (`/items/:id`)
//! - Match a request path exactly (routes) or by prefix (mounts)
//! - Capture named parameters
//!
//! # Design Decisions
//! - Matching is segment based: empty segments are ignored, so trailing
//!   slashes never change the outcome
//! - Literal segments are case-sensitive
//! - No regex, matching is O(segments)

/// A single pattern segment.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
}

/// Result of a successful match.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PathMatch {
    /// Captured parameters, in pattern order.
    pub params: Vec<(String, String)>,
    /// The matched portion of the path, normalized to start with `/`.
    pub matched: String,
    /// Unmatched tail of the path for prefix matches, always starting with `/`.
    pub remainder: String,
}

/// A compiled path pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    raw: String,
    segments: Vec<Segment>,
}

impl PathPattern {
    /// Parse a pattern. Segments starting with `:` capture a parameter.
    pub fn parse(pattern: impl Into<String>) -> Self {
        let raw = pattern.into();
        let segments = split(&raw)
            .map(|seg| match seg.strip_prefix(':') {
                Some(name) if !name.is_empty() => Segment::Param(name.to_string()),
                _ => Segment::Literal(seg.to_string()),
            })
            .collect();

        Self { raw, segments }
    }

    /// The pattern as written at registration.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Names of the parameters this pattern captures, in order.
    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|seg| match seg {
            Segment::Param(name) => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// Match the whole path.
    pub fn match_exact(&self, path: &str) -> Option<PathMatch> {
        let parts: Vec<&str> = split(path).collect();
        if parts.len() != self.segments.len() {
            return None;
        }

        let params = self.capture(&parts)?;
        Some(PathMatch {
            params,
            matched: format!("/{}", parts.join("/")),
            remainder: "/".to_string(),
        })
    }

    /// Match a leading portion of the path on segment boundaries.
    pub fn match_prefix(&self, path: &str) -> Option<PathMatch> {
        let parts: Vec<&str> = split(path).collect();
        if parts.len() < self.segments.len() {
            return None;
        }

        let (head, rest) = parts.split_at(self.segments.len());
        let params = self.capture(head)?;
        Some(PathMatch {
            params,
            matched: format!("/{}", head.join("/")),
            remainder: format!("/{}", rest.join("/")),
        })
    }

    fn capture(&self, parts: &[&str]) -> Option<Vec<(String, String)>> {
        let mut params = Vec::new();
        for (segment, part) in self.segments.iter().zip(parts) {
            match segment {
                Segment::Literal(lit) if lit == part => {}
                Segment::Literal(_) => return None,
                Segment::Param(name) => params.push((name.clone(), (*part).to_string())),
            }
        }
        Some(params)
    }
}

fn split(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|seg| !seg.is_empty())
}
