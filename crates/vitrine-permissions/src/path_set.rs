//! A set of permitted attribute paths with tail-wildcard matching.

use std::collections::HashSet;

use crate::path::{AttributePath, Segment};

/// Set of permitted attribute paths.
///
/// Membership is an exact match, or, for untainted queries, a stored path
/// ending in `*` (any one trailing segment) or `**` (any number of trailing
/// segments). The empty path is the "everything" sentinel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathSet {
    paths: HashSet<Vec<Segment>>,
}

impl PathSet {
    /// Create an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A set holding only the "everything" sentinel.
    #[must_use]
    pub fn everything() -> Self {
        let mut set = Self::new();
        set.paths.insert(Vec::new());
        set
    }

    /// Whether the "everything" sentinel is present.
    #[must_use]
    pub fn is_everything(&self) -> bool {
        let sentinel: &[Segment] = &[];
        self.paths.contains(sentinel)
    }

    /// Insert a path. Returns `true` if it was not already stored.
    pub fn insert(&mut self, segments: &[Segment]) -> bool {
        if self.paths.contains(segments) {
            return false;
        }
        self.paths.insert(segments.to_vec())
    }

    /// Whether `path` is permitted by this set.
    #[must_use]
    pub fn contains(&self, path: &AttributePath) -> bool {
        self.contains_segments(path.segments(), path.is_tainted())
    }

    /// Membership check over raw segments.
    ///
    /// Exact matches are tried first. Tainted queries stop there; untainted
    /// ones then try `[.., *]` at full length and `[.., **]` at every length
    /// from the longest down to a single segment.
    #[must_use]
    pub fn contains_segments(&self, segments: &[Segment], tainted: bool) -> bool {
        if self.paths.contains(segments) || self.is_everything() {
            return true;
        }
        if tainted || segments.is_empty() {
            return false;
        }

        let mut probe = segments.to_vec();
        if let Some(last) = probe.last_mut() {
            *last = Segment::Wildcard;
        }
        if self.paths.contains(&probe) {
            return true;
        }
        while let Some(last) = probe.last_mut() {
            *last = Segment::DeepWildcard;
            if self.paths.contains(&probe) {
                return true;
            }
            probe.pop();
        }
        false
    }

    /// The paths visible under `prefix`, with the prefix stripped.
    ///
    /// For every non-empty `path`, `self.contains(prefix + path)` equals
    /// `self.restrict(prefix).contains(path)`:
    /// - the sentinel is kept,
    /// - paths strictly longer than `prefix` that start with it keep their
    ///   remainder,
    /// - a `**` anchored above `prefix` becomes `[**]`.
    #[must_use]
    pub fn restrict(&self, prefix: &[Segment]) -> Self {
        if prefix.is_empty() {
            return self.clone();
        }
        let mut restricted = Self::new();
        for path in &self.paths {
            if path.is_empty() {
                restricted.paths.insert(Vec::new());
            } else if path.len() > prefix.len() && path.starts_with(prefix) {
                restricted.paths.insert(path[prefix.len()..].to_vec());
            } else if let Some((Segment::DeepWildcard, anchor)) = path.split_last() {
                if prefix.starts_with(anchor) {
                    restricted.paths.insert(vec![Segment::DeepWildcard]);
                }
            }
        }
        restricted
    }

    /// Add every path of `other`, each prepended with `prefix`.
    ///
    /// Under a non-empty prefix the sentinel of `other` becomes
    /// `prefix + [**]`, so it never widens past the prefix.
    pub fn merge_prefixed(&mut self, other: &Self, prefix: &[Segment]) {
        for path in &other.paths {
            let mut prefixed = Vec::with_capacity(prefix.len().saturating_add(path.len()));
            prefixed.extend_from_slice(prefix);
            prefixed.extend_from_slice(path);
            if path.is_empty() && !prefix.is_empty() {
                prefixed.push(Segment::DeepWildcard);
            }
            self.paths.insert(prefixed);
        }
    }

    /// Number of stored paths.
    #[must_use]
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Whether nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Stored paths in sorted order.
    #[must_use]
    pub fn to_sorted(&self) -> Vec<AttributePath> {
        let mut paths: Vec<_> = self.paths.iter().cloned().collect();
        paths.sort();
        paths.into_iter().map(AttributePath::from).collect()
    }
}

impl<'a> Extend<&'a AttributePath> for PathSet {
    fn extend<I: IntoIterator<Item = &'a AttributePath>>(&mut self, iter: I) {
        for path in iter {
            self.insert(path.segments());
        }
    }
}

impl FromIterator<AttributePath> for PathSet {
    fn from_iter<I: IntoIterator<Item = AttributePath>>(iter: I) -> Self {
        let mut set = Self::new();
        for path in iter {
            set.paths.insert(path.into_segments());
        }
        set
    }
}
