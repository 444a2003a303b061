//! Attribute paths and their segments.
//!
//! An attribute path names a (possibly nested) field reachable from a
//! presenter: `title`, `author/name`, `comments/*`. Trailing segments past the
//! accessor name are call arguments (`notifications/unread`).
//!
//! Wildcards are only meaningful as the final segment. A path built from
//! untrusted input is *tainted*: every segment is a literal name (so a user
//! supplied `"*"` never acts as a wildcard) and permission checks only accept
//! exact grants for it.
//!
//! The textual form escapes `%`, `/` and `*` inside names as `%25`, `%2F` and
//! `%2A`, so a literal name never reads back as a separator or a wildcard.

use std::fmt::{self, Write as _};
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{PathError, PathResult};

/// Textual form of the single-level wildcard.
pub const WILDCARD: &str = "*";

/// Textual form of the deep wildcard.
pub const DEEP_WILDCARD: &str = "**";

/// Separator used by the textual form of a path.
pub const SEPARATOR: char = '/';

/// One element of an attribute path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Segment {
    /// A literal accessor name or call argument.
    Name(String),
    /// `*`: any single trailing segment.
    Wildcard,
    /// `**`: any number of trailing segments, associations included.
    DeepWildcard,
}

impl Segment {
    /// Create a literal name segment.
    #[must_use]
    pub fn name(name: impl Into<String>) -> Self {
        Self::Name(name.into())
    }

    /// Interpret a trusted token: `*` and `**` become wildcards, anything else
    /// a literal name.
    #[must_use]
    pub fn from_token(token: &str) -> Self {
        match token {
            WILDCARD => Self::Wildcard,
            DEEP_WILDCARD => Self::DeepWildcard,
            other => Self::Name(other.to_owned()),
        }
    }

    /// The literal name, if this is not a wildcard.
    #[must_use]
    pub fn as_name(&self) -> Option<&str> {
        match self {
            Self::Name(name) => Some(name),
            Self::Wildcard | Self::DeepWildcard => None,
        }
    }

    /// Whether this segment is `*` or `**`.
    #[must_use]
    pub fn is_wildcard(&self) -> bool {
        matches!(self, Self::Wildcard | Self::DeepWildcard)
    }
}

impl From<&str> for Segment {
    fn from(name: &str) -> Self {
        Self::Name(name.to_owned())
    }
}

impl From<String> for Segment {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(name) => {
                for ch in name.chars() {
                    match ch {
                        '%' => f.write_str("%25")?,
                        SEPARATOR => f.write_str("%2F")?,
                        '*' => f.write_str("%2A")?,
                        other => f.write_char(other)?,
                    }
                }
                Ok(())
            }
            Self::Wildcard => f.write_str(WILDCARD),
            Self::DeepWildcard => f.write_str(DEEP_WILDCARD),
        }
    }
}

/// Decode one token of the textual form.
fn parse_token(token: &str) -> Segment {
    if token == WILDCARD || token == DEEP_WILDCARD {
        return Segment::from_token(token);
    }
    let mut name = String::with_capacity(token.len());
    let mut rest = token;
    while let Some(at) = rest.find('%') {
        name.push_str(&rest[..at]);
        let tail = &rest[at..];
        let decoded = tail
            .get(1..3)
            .and_then(|code| match code.to_ascii_uppercase().as_str() {
                "25" => Some('%'),
                "2F" => Some(SEPARATOR),
                "2A" => Some('*'),
                _ => None,
            });
        if let Some(ch) = decoded {
            name.push(ch);
            rest = &tail[3..];
        } else {
            name.push('%');
            rest = &tail[1..];
        }
    }
    name.push_str(rest);
    Segment::Name(name)
}

/// Serialized form: a bare string for trusted paths, a marked object for
/// tainted ones.
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum PathRepr {
    Text(String),
    Marked {
        path: String,
        #[serde(default)]
        untrusted: bool,
    },
}

/// An ordered sequence of segments plus a taint flag.
///
/// Equality and hashing only look at the segments.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(try_from = "PathRepr", into = "PathRepr")]
pub struct AttributePath {
    segments: Vec<Segment>,
    tainted: bool,
}

impl AttributePath {
    /// Build a path from segments, rejecting wildcards that are not last.
    ///
    /// # Errors
    ///
    /// Returns [`PathError::MisplacedWildcard`] if a wildcard precedes another
    /// segment.
    pub fn new(segments: Vec<Segment>) -> PathResult<Self> {
        let last = segments.len().saturating_sub(1);
        if let Some((position, segment)) = segments
            .iter()
            .enumerate()
            .find(|(i, s)| s.is_wildcard() && *i != last)
        {
            return Err(PathError::MisplacedWildcard {
                wildcard: segment.to_string(),
                position,
            });
        }
        Ok(Self {
            segments,
            tainted: false,
        })
    }

    /// The empty path.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse the `/`-separated textual form (`comments/author/*`).
    ///
    /// The empty string parses to the empty path.
    ///
    /// # Errors
    ///
    /// Returns an error on empty segments or misplaced wildcards.
    pub fn parse(text: &str) -> PathResult<Self> {
        if text.is_empty() {
            return Ok(Self::empty());
        }
        let segments = text
            .split(SEPARATOR)
            .map(|token| {
                if token.is_empty() {
                    Err(PathError::EmptySegment {
                        path: text.to_owned(),
                    })
                } else {
                    Ok(parse_token(token))
                }
            })
            .collect::<PathResult<Vec<_>>>()?;
        Self::new(segments)
    }

    /// Parse several textual paths at once.
    ///
    /// # Errors
    ///
    /// Returns the first parse error encountered.
    pub fn parse_all<I, S>(texts: I) -> PathResult<Vec<Self>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        texts
            .into_iter()
            .map(|text| Self::parse(text.as_ref()))
            .collect()
    }

    /// Build a tainted path from untrusted names. Every element is a literal
    /// name, wildcards included.
    #[must_use]
    pub fn untrusted<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: names.into_iter().map(|n| Segment::Name(n.into())).collect(),
            tainted: true,
        }
    }

    /// Build an untainted path of literal names.
    #[must_use]
    pub fn names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: names.into_iter().map(|n| Segment::Name(n.into())).collect(),
            tainted: false,
        }
    }

    /// Mark this path as derived from untrusted input.
    #[must_use]
    pub fn taint(mut self) -> Self {
        self.tainted = true;
        self
    }

    /// Whether this path came from untrusted input.
    #[must_use]
    pub fn is_tainted(&self) -> bool {
        self.tainted
    }

    /// The segments of this path.
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Number of segments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Whether the path has no segments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// The first segment, if any.
    #[must_use]
    pub fn first(&self) -> Option<&Segment> {
        self.segments.first()
    }

    /// Whether the final segment is a wildcard.
    #[must_use]
    pub fn ends_with_wildcard(&self) -> bool {
        self.segments.last().is_some_and(Segment::is_wildcard)
    }

    /// Whether `prefix` is an initial subsequence of this path.
    #[must_use]
    pub fn starts_with(&self, prefix: &[Segment]) -> bool {
        self.segments.starts_with(prefix)
    }

    /// The path without its first segment, keeping taint.
    #[must_use]
    pub fn tail(&self) -> Self {
        Self {
            segments: self.segments.get(1..).unwrap_or_default().to_vec(),
            tainted: self.tainted,
        }
    }

    /// `prefix + self`, keeping this path's taint.
    #[must_use]
    pub fn prefixed(&self, prefix: &[Segment]) -> Self {
        let mut segments = Vec::with_capacity(prefix.len().saturating_add(self.len()));
        segments.extend_from_slice(prefix);
        segments.extend_from_slice(&self.segments);
        Self {
            segments,
            tainted: self.tainted,
        }
    }

    /// `self + other`; the result is tainted if either side is.
    #[must_use]
    pub fn join(&self, other: &Self) -> Self {
        let mut joined = other.prefixed(&self.segments);
        joined.tainted = self.tainted || other.tainted;
        joined
    }

    /// Consume the path, returning its segments.
    #[must_use]
    pub fn into_segments(self) -> Vec<Segment> {
        self.segments
    }
}

impl PartialEq for AttributePath {
    fn eq(&self, other: &Self) -> bool {
        self.segments == other.segments
    }
}

impl Eq for AttributePath {}

impl Hash for AttributePath {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.segments.hash(state);
    }
}

impl AsRef<AttributePath> for AttributePath {
    fn as_ref(&self) -> &AttributePath {
        self
    }
}

impl From<&str> for AttributePath {
    /// A single trusted segment; `*` and `**` become wildcards.
    fn from(token: &str) -> Self {
        Self {
            segments: vec![Segment::from_token(token)],
            tainted: false,
        }
    }
}

impl<const N: usize> From<[&str; N]> for AttributePath {
    /// Trusted segments; only the last one may turn into a wildcard.
    fn from(tokens: [&str; N]) -> Self {
        let last = N.saturating_sub(1);
        let segments = tokens
            .iter()
            .enumerate()
            .map(|(i, token)| {
                if i == last {
                    Segment::from_token(token)
                } else {
                    Segment::name(*token)
                }
            })
            .collect();
        Self {
            segments,
            tainted: false,
        }
    }
}

impl From<Vec<Segment>> for AttributePath {
    /// Wraps raw segments without validation. A wildcard that is not last is
    /// only ever matched literally.
    fn from(segments: Vec<Segment>) -> Self {
        Self {
            segments,
            tainted: false,
        }
    }
}

impl FromStr for AttributePath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for AttributePath {
    type Error = PathError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<AttributePath> for String {
    fn from(path: AttributePath) -> Self {
        path.to_string()
    }
}

impl TryFrom<PathRepr> for AttributePath {
    type Error = PathError;

    fn try_from(repr: PathRepr) -> Result<Self, Self::Error> {
        match repr {
            PathRepr::Text(text) => Self::parse(&text),
            PathRepr::Marked { path, untrusted } => {
                let parsed = Self::parse(&path)?;
                Ok(if untrusted { parsed.taint() } else { parsed })
            }
        }
    }
}

impl From<AttributePath> for PathRepr {
    fn from(path: AttributePath) -> Self {
        if path.tainted {
            Self::Marked {
                path: path.to_string(),
                untrusted: true,
            }
        } else {
            Self::Text(path.to_string())
        }
    }
}

impl fmt::Display for AttributePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                write!(f, "{SEPARATOR}")?;
            }
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}
