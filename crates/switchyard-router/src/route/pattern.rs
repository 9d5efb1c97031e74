//! Pattern compilation and matching for route segments
//!
//! A route pattern is split on `/` into typed segments once, at registration
//! time. Matching walks the compiled segments and the decoded request path
//! side by side; URL generation walks the same segments in reverse direction,
//! substituting parameter values.
//!
//! Pattern syntax:
//! - `albums`: literal segment, compared byte-for-byte
//! - `{name}`: capture, consumes exactly one non-empty path segment
//! - `...slug`: wildcard, consumes the rest of the raw path, separators
//!   included (final segment only)

use std::borrow::Cow;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use super::params::UrlParams;
use crate::error::{Error, Result};

/// Captured arguments of a successful match (name → decoded value)
pub type Params = HashMap<String, String>;

/// A compiled route pattern segment
///
/// # Examples
///
/// ```
/// use switchyard_router::route::pattern::{classify_segment, Segment};
///
/// assert!(matches!(classify_segment("albums"), Segment::Literal(_)));
/// assert!(matches!(classify_segment("{id}"), Segment::Capture(_)));
/// assert!(matches!(classify_segment("...slug"), Segment::Wildcard(_)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Static text segment
    Literal(String),
    /// Named single-segment capture: `{name}`
    Capture(String),
    /// Named capture of the remaining path: `...name`
    Wildcard(String),
}

/// Classifies one `/`-free piece of a pattern (pure function)
///
/// # Parsing Rules (evaluated in order)
///
/// 1. **Wildcard**: `...name`
/// 2. **Capture**: `{name}`
/// 3. **Literal**: any other text
pub fn classify_segment(segment: &str) -> Segment {
    if let Some(name) = segment.strip_prefix("...") {
        return Segment::Wildcard(name.to_string());
    }

    match segment.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
        Some(name) => Segment::Capture(name.to_string()),
        None => Segment::Literal(segment.to_string()),
    }
}

/// A compiled route pattern
///
/// # Examples
///
/// ```
/// use switchyard_router::RoutePattern;
///
/// let pattern = RoutePattern::parse("/albums/{year}/...slug").unwrap();
/// let params = pattern.matches("/albums/1991/human/live").unwrap();
///
/// assert_eq!(params["year"], "1991");
/// assert_eq!(params["slug"], "human/live");
/// assert!(pattern.matches("/albums/1991").is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePattern {
    raw: String,
    segments: Vec<Segment>,
}

impl RoutePattern {
    /// Compiles a pattern string
    ///
    /// Fails with [`Error::InvalidPattern`] when a wildcard is not the final
    /// segment, when more than one wildcard is present, or when a parameter
    /// name is empty or repeated.
    pub fn parse(raw: impl Into<String>) -> Result<Self> {
        let raw = raw.into();
        let segments: Vec<Segment> = raw
            .split('/')
            .filter(|s| !s.is_empty())
            .map(classify_segment)
            .collect();

        validate(&raw, &segments)?;

        Ok(Self { raw, segments })
    }

    /// The pattern string this was compiled from
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Parameter names in the order they appear in the pattern
    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Capture(name) | Segment::Wildcard(name) => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// Returns a new pattern with `prefix` prepended (no separator inserted)
    pub fn prefixed(&self, prefix: &str) -> Result<Self> {
        if prefix.is_empty() {
            return Ok(self.clone());
        }
        Self::parse(format!("{}{}", prefix, self.raw))
    }

    /// Matches a request path against this pattern
    ///
    /// The path is percent-decoded segment by segment before comparison.
    /// Returns `None` when the path does not match; a mismatch is an ordinary
    /// outcome, not an error.
    pub fn matches(&self, path: &str) -> Option<Params> {
        let mut pieces = Vec::new();
        let mut offset = 0;
        for raw in path.split('/') {
            if !raw.is_empty() {
                pieces.push(Piece {
                    offset,
                    decoded: urlencoding::decode(raw).ok()?,
                });
            }
            offset += raw.len() + 1;
        }

        match_segments(&self.segments, path, &pieces, Params::new())
    }

    /// Reconstructs a literal path, substituting parameter values
    ///
    /// Literal segments pass through unchanged; substituted values are
    /// percent-encoded so the generated URL matches this pattern again with
    /// the same captures.
    pub fn expand(&self, params: &UrlParams) -> Result<String> {
        let mut position = 0;
        let segments = self
            .segments
            .iter()
            .map(|segment| match segment {
                Segment::Literal(text) => Ok(text.clone()),
                Segment::Capture(name) | Segment::Wildcard(name) => {
                    let value = params.lookup(name, position).ok_or_else(|| {
                        Error::MissingParameter {
                            pattern: self.raw.clone(),
                            param: name.clone(),
                        }
                    })?;
                    position += 1;

                    Ok(match segment {
                        Segment::Wildcard(_) => value
                            .split('/')
                            .map(|piece| urlencoding::encode(piece))
                            .collect::<Vec<_>>()
                            .join("/"),
                        _ => urlencoding::encode(value).into_owned(),
                    })
                }
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(format!("/{}", segments.join("/")))
    }
}

impl FromStr for RoutePattern {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for RoutePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

fn invalid(raw: &str, reason: impl Into<String>) -> Error {
    Error::InvalidPattern {
        pattern: raw.to_string(),
        reason: reason.into(),
    }
}

fn validate(raw: &str, segments: &[Segment]) -> Result<()> {
    let wildcards = segments
        .iter()
        .filter(|segment| matches!(segment, Segment::Wildcard(_)))
        .count();
    if wildcards > 1 {
        return Err(invalid(raw, "only one wildcard segment is allowed"));
    }

    let mut seen = HashSet::new();
    for (idx, segment) in segments.iter().enumerate() {
        let name = match segment {
            Segment::Literal(_) => continue,
            Segment::Capture(name) | Segment::Wildcard(name) => name,
        };

        if name.is_empty() {
            return Err(invalid(raw, "parameter name must not be empty"));
        }
        if !seen.insert(name.as_str()) {
            return Err(invalid(raw, format!("duplicate parameter `{}`", name)));
        }
        if matches!(segment, Segment::Wildcard(_)) && idx + 1 != segments.len() {
            return Err(invalid(raw, "wildcard segment must be the last segment"));
        }
    }

    Ok(())
}

/// A non-empty path segment and where it starts in the raw path
struct Piece<'a> {
    offset: usize,
    decoded: Cow<'a, str>,
}

// Walks pattern and path segments simultaneously; a wildcard swallows the
// raw remainder, separators included, and requires at least one segment.
fn match_segments(
    pattern: &[Segment],
    path: &str,
    pieces: &[Piece<'_>],
    mut params: Params,
) -> Option<Params> {
    match (pattern.split_first(), pieces.split_first()) {
        (None, None) => Some(params),
        (None, Some(_)) | (Some(_), None) => None,
        (Some((Segment::Wildcard(name), _)), Some((piece, _))) => {
            let rest = urlencoding::decode(&path[piece.offset..]).ok()?;
            params.insert(name.clone(), rest.into_owned());
            Some(params)
        }
        (Some((Segment::Literal(text), rest)), Some((piece, remaining))) => {
            if text.as_str() != piece.decoded.as_ref() {
                return None;
            }
            match_segments(rest, path, remaining, params)
        }
        (Some((Segment::Capture(name), rest)), Some((piece, remaining))) => {
            params.insert(name.clone(), piece.decoded.to_string());
            match_segments(rest, path, remaining, params)
        }
    }
}
