//! Permission state shared across a presenter tree.
//!
//! A [`Permissions`] handle is either *owned* (it stores its own
//! [`PathSet`]) or in *reference* mode: it reads through a parent at a fixed
//! relative prefix and has no storage of its own. The first mutation of a
//! reference-mode handle copies the parent's visible paths (prefix stripped)
//! into private storage and drops the link. Reads give the same answers
//! before and after that copy.
//!
//! Handles are cheap to clone; clones alias the same state. Everything here
//! is single-threaded (`Rc`/`RefCell`).

use std::cell::{RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

use tracing::{debug, trace};

use crate::path::{AttributePath, Segment};
use crate::path_set::PathSet;

#[derive(Debug, Default)]
struct State {
    /// Own storage. Always empty while `link` is set.
    own: PathSet,
    link: Option<Link>,
}

#[derive(Debug)]
struct Link {
    parent: Permissions,
    prefix: Vec<Segment>,
}

/// Permitted attribute paths for one presenter namespace.
#[derive(Clone, Default)]
pub struct Permissions {
    state: Rc<RefCell<State>>,
}

impl Permissions {
    /// Create an empty, owned permission set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a reference-mode view into `parent` at `prefix`.
    ///
    /// The effective prefix is `parent.effective_prefix() + prefix`.
    #[must_use]
    pub fn linked(parent: &Self, prefix: &[Segment]) -> Self {
        Self {
            state: Rc::new(RefCell::new(State {
                own: PathSet::new(),
                link: Some(Link {
                    parent: parent.clone(),
                    prefix: prefix.to_vec(),
                }),
            })),
        }
    }

    /// Whether this handle still reads through a parent.
    #[must_use]
    pub fn is_reference(&self) -> bool {
        self.state.borrow().link.is_some()
    }

    /// Whether both handles alias the same state.
    #[must_use]
    pub fn same_as(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.state, &other.state)
    }

    /// Prefix of this namespace relative to the nearest owned ancestor.
    #[must_use]
    pub fn effective_prefix(&self) -> Vec<Segment> {
        let state = self.state.borrow();
        match &state.link {
            Some(link) => {
                let mut prefix = link.parent.effective_prefix();
                prefix.extend_from_slice(&link.prefix);
                prefix
            },
            None => Vec::new(),
        }
    }

    /// Whether everything is permitted.
    ///
    /// When true on owned storage, the storage is compacted down to the
    /// sentinel.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        let (complete, compact) = {
            let state = self.state.borrow();
            match &state.link {
                Some(link) => (link.parent.is_complete(), false),
                None => (state.own.is_everything(), state.own.len() > 1),
            }
        };
        if complete && compact {
            self.state.borrow_mut().own = PathSet::everything();
        }
        complete
    }

    /// Permit every single-segment call (`[*]`), but no association
    /// drill-down.
    pub fn permit_all(&self) -> &Self {
        self.permit(&[], [AttributePath::from(crate::path::WILDCARD)])
    }

    /// Permit everything, discarding all other entries.
    pub fn permit_everything(&self) -> &Self {
        let mut state = self.state.borrow_mut();
        state.link = None;
        state.own = PathSet::everything();
        trace!("permitted everything");
        self
    }

    /// Whether `prefix + path` is permitted.
    ///
    /// Reads through reference links without mutating anything. The empty
    /// query is only permitted when the set is complete.
    #[must_use]
    pub fn permitted(&self, prefix: &[Segment], path: &AttributePath) -> bool {
        let full = path.prefixed(prefix);
        if full.is_empty() {
            return self.is_complete();
        }
        self.permitted_full(&full)
    }

    fn permitted_full(&self, full: &AttributePath) -> bool {
        let state = self.state.borrow();
        match &state.link {
            Some(link) => link.parent.permitted_full(&full.prefixed(&link.prefix)),
            None => state.own.contains(full),
        }
    }

    /// The candidates that are permitted under `prefix`, in input order.
    pub fn select_permitted<I, P>(&self, prefix: &[Segment], candidates: I) -> Vec<P>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<AttributePath>,
    {
        if self.is_complete() {
            return candidates.into_iter().collect();
        }
        candidates
            .into_iter()
            .filter(|candidate| self.permitted(prefix, candidate.as_ref()))
            .collect()
    }

    /// The candidates that are not permitted under `prefix`, in input order.
    pub fn reject_permitted<I, P>(&self, prefix: &[Segment], candidates: I) -> Vec<P>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<AttributePath>,
    {
        if self.is_complete() {
            return Vec::new();
        }
        candidates
            .into_iter()
            .filter(|candidate| !self.permitted(prefix, candidate.as_ref()))
            .collect()
    }

    /// Permit `prefix + path` for every path not already stored.
    ///
    /// A grant already covered by a wildcard is still stored: untrusted
    /// queries only match stored paths exactly.
    pub fn permit<I, P>(&self, prefix: &[Segment], paths: I) -> &Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<AttributePath>,
    {
        let fulls: Vec<AttributePath> = paths
            .into_iter()
            .map(|path| path.as_ref().prefixed(prefix))
            .collect();
        let mut own = self.own_mut();
        for full in fulls {
            if own.contains_segments(full.segments(), true) {
                continue;
            }
            own.insert(full.segments());
            trace!(path = %full, "permitted attribute path");
        }
        self
    }

    /// Union `other`'s visible paths, each prepended with `prefix`, into this
    /// set.
    pub fn merge(&self, other: &Self, prefix: &[Segment]) -> &Self {
        let incoming = other.paths();
        self.own_mut().merge_prefixed(&incoming, prefix);
        self
    }

    /// Snapshot of the paths visible in this namespace.
    #[must_use]
    pub fn paths(&self) -> PathSet {
        let state = self.state.borrow();
        match &state.link {
            Some(link) => link.parent.paths().restrict(&link.prefix),
            None => state.own.clone(),
        }
    }

    /// Whether nothing at all is permitted in this namespace.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths().is_empty()
    }

    /// Materialize private storage if still in reference mode.
    pub fn copy_on_write(&self) {
        let snapshot = {
            let state = self.state.borrow();
            state.link.as_ref().map(|link| {
                let restricted = link.parent.paths().restrict(&link.prefix);
                debug!(
                    prefix = %AttributePath::from(link.prefix.clone()),
                    paths = restricted.len(),
                    "materializing permissions"
                );
                restricted
            })
        };
        if let Some(own) = snapshot {
            let mut state = self.state.borrow_mut();
            state.own = own;
            state.link = None;
        }
    }

    fn own_mut(&self) -> RefMut<'_, PathSet> {
        self.copy_on_write();
        RefMut::map(self.state.borrow_mut(), |state| &mut state.own)
    }
}

impl fmt::Debug for Permissions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let paths: Vec<String> = self
            .paths()
            .to_sorted()
            .iter()
            .map(ToString::to_string)
            .collect();
        f.debug_struct("Permissions")
            .field("reference", &self.is_reference())
            .field(
                "effective_prefix",
                &AttributePath::from(self.effective_prefix()).to_string(),
            )
            .field("paths", &paths)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(text: &str) -> AttributePath {
        AttributePath::parse(text).unwrap()
    }

    fn paths(texts: &[&str]) -> Vec<AttributePath> {
        texts.iter().map(|t| p(t)).collect()
    }

    fn seg(text: &str) -> Vec<Segment> {
        p(text).into_segments()
    }

    fn granted() -> Permissions {
        let permissions = Permissions::new();
        permissions.permit(
            &[],
            paths(&[
                "another/array",
                "attr/array",
                "attr2",
                "attr3",
                "a/wildcard/*",
                "wild/**",
            ]),
        );
        permissions
    }

    #[test]
    fn test_initially_incomplete() {
        assert!(!Permissions::new().is_complete());
        assert!(Permissions::new().is_empty());
    }

    #[test]
    fn test_permit_everything_completes() {
        let permissions = granted();
        permissions.permit_everything();
        assert!(permissions.is_complete());
        assert_eq!(permissions.paths().len(), 1);
        assert!(permissions.permitted(&[], &p("any/deep/path")));
    }

    #[test]
    fn test_complete_compacts_storage() {
        let permissions = granted();
        permissions.permit(&[], [AttributePath::empty()]);
        assert!(permissions.paths().len() > 1);
        assert!(permissions.is_complete());
        assert_eq!(permissions.paths(), PathSet::everything());
    }

    #[test]
    fn test_permit_all_is_single_level() {
        let permissions = Permissions::new();
        permissions.permit_all();
        assert!(permissions.permitted(&[], &p("a")));
        assert!(permissions.permitted(&[], &p("b")));
        assert!(!permissions.permitted(&[], &p("a/a")));
        assert!(!permissions.is_complete());
    }

    #[test]
    fn test_permit_attribute() {
        let permissions = Permissions::new();
        permissions.permit(&[], [p("attr")]);
        assert!(permissions.permitted(&[], &p("attr")));

        permissions.permit(&[], paths(&["attr/array"]));
        assert!(permissions.permitted(&[], &p("attr/array")));
        assert!(!permissions.permitted(&[], &p("attr/array/extra")));
    }

    #[test]
    fn test_permitted_survives_unrelated_permits() {
        let permissions = Permissions::new();
        permissions.permit(&[], [p("title")]);
        permissions.permit(&[], paths(&["body", "author/name", "tags/*"]));
        assert!(permissions.permitted(&[], &p("title")));
    }

    #[test]
    fn test_permit_with_prefix() {
        let permissions = Permissions::new();
        permissions.permit(&seg("author"), paths(&["name", "email"]));
        assert!(permissions.permitted(&[], &p("author/name")));
        assert!(permissions.permitted(&seg("author"), &p("email")));
        assert!(!permissions.permitted(&[], &p("name")));
    }

    #[test]
    fn test_permit_skips_only_exact_duplicates() {
        let permissions = Permissions::new();
        permissions.permit(&[], paths(&["attr/*"]));
        permissions.permit(&[], paths(&["attr/name", "attr/*"]));
        assert_eq!(permissions.paths().len(), 2);

        // The exact grant is what an untrusted query can match.
        assert!(permissions.permitted(&[], &AttributePath::untrusted(["attr", "name"])));
        assert!(!permissions.permitted(&[], &AttributePath::untrusted(["attr", "other"])));
    }

    #[test]
    fn test_permit_after_everything_stores_nothing() {
        let permissions = Permissions::new();
        permissions.permit_everything();
        permissions.permit(&[], paths(&["attr/name"]));
        assert_eq!(permissions.paths().len(), 1);
    }

    #[test]
    fn test_wildcards() {
        let permissions = granted();
        assert!(permissions.permitted(&[], &p("a/wildcard/irrelevant")));
        assert!(!permissions.permitted(&[], &p("a/wildcard")));
        assert!(permissions.permitted(&[], &p("wild/wildcard/irrelevant")));
        assert!(permissions.permitted(&[], &p("wild/irrelevant")));
        assert!(!permissions.permitted(&[], &p("attr4/irrelevant")));
        assert!(!permissions.permitted(&[], &p("attr")));
    }

    #[test]
    fn test_taint_restricts_to_exact() {
        let permissions = granted();
        assert!(!permissions.permitted(
            &[],
            &AttributePath::untrusted(["a", "wildcard", "irrelevant"])
        ));
        assert!(!permissions.permitted(&[], &AttributePath::untrusted(["wild", "irrelevant"])));
        assert!(permissions.permitted(&[], &AttributePath::untrusted(["attr", "array"])));
        // Same path, untainted.
        assert!(permissions.permitted(&[], &AttributePath::names(["a", "wildcard", "irrelevant"])));
    }

    #[test]
    fn test_linked_prefix() {
        let parent = granted();
        let child = Permissions::linked(&parent, &seg("attr"));
        assert!(child.is_reference());
        assert!(child.permitted(&[], &p("array")));
        assert!(!child.permitted(&[], &p("attr2")));
        assert!(!child.permitted(&[], &p("wild/irrelevant")));
        assert_eq!(child.effective_prefix(), seg("attr"));

        let grandchild = Permissions::linked(&child, &seg("array"));
        assert_eq!(grandchild.effective_prefix(), seg("attr/array"));
    }

    #[test]
    fn test_reference_mode_sees_later_parent_grants() {
        let parent = Permissions::new();
        let child = Permissions::linked(&parent, &seg("author"));
        assert!(!child.permitted(&[], &p("name")));
        parent.permit(&[], paths(&["author/name"]));
        assert!(child.permitted(&[], &p("name")));
    }

    #[test]
    fn test_copy_on_write_isolates_child() {
        let parent = Permissions::new();
        parent.permit(&[], paths(&["author/name"]));
        let child = Permissions::linked(&parent, &seg("author"));

        child.permit(&[], [p("email")]);
        assert!(!child.is_reference());
        assert!(child.permitted(&[], &p("name")));
        assert!(child.permitted(&[], &p("email")));
        assert!(!parent.permitted(&[], &p("author/email")));
        assert!(parent.permitted(&[], &p("author/name")));
    }

    #[test]
    fn test_copy_on_write_is_idempotent_for_reads() {
        let parent = Permissions::new();
        parent.permit(
            &[],
            paths(&[
                "post/title",
                "post/comments/*",
                "post/author/**",
                "**",
                "post",
                "*",
            ]),
        );
        let grandparent_view = Permissions::linked(&parent, &seg("post"));
        let child = Permissions::linked(&grandparent_view, &seg("comments"));
        let queries = paths(&["body", "author", "author/name", "x/y/z", "title"]);
        let before: Vec<bool> = queries.iter().map(|q| child.permitted(&[], q)).collect();
        let tainted: Vec<bool> = queries
            .iter()
            .map(|q| child.permitted(&[], &q.clone().taint()))
            .collect();

        child.copy_on_write();
        assert!(!child.is_reference());

        let after: Vec<bool> = queries.iter().map(|q| child.permitted(&[], q)).collect();
        let tainted_after: Vec<bool> = queries
            .iter()
            .map(|q| child.permitted(&[], &q.clone().taint()))
            .collect();
        assert_eq!(before, after);
        assert_eq!(tainted, tainted_after);
    }

    #[test]
    fn test_empty_prefix_link_copies_on_write() {
        let collection = Permissions::new();
        let first = Permissions::linked(&collection, &[]);
        let second = Permissions::linked(&collection, &[]);

        first.permit(&[], [p("a")]);
        assert!(first.permitted(&[], &p("a")));
        assert!(!second.permitted(&[], &p("a")));
        assert!(!collection.permitted(&[], &p("a")));

        collection.permit(&[], [p("b")]);
        assert!(second.permitted(&[], &p("b")));
    }

    #[test]
    fn test_select_permitted_preserves_order() {
        let permissions = Permissions::new();
        permissions.permit(&[], paths(&["another/array", "attr/array/*", "attr2", "attr3"]));
        permissions.permit(&[], paths(&["attr/arrays", "attr2", "attr3"]));

        let candidates = paths(&[
            "attr4",
            "attr3",
            "attr/array/meth",
            "attrk/irrelevant",
            "attr2",
            "attr/ar",
            "attr/arrays",
            "attr5",
            "attr/arrays/more",
            "attr3",
        ]);
        let selected = permissions.select_permitted(&[], candidates.iter());
        let selected: Vec<String> = selected.iter().map(ToString::to_string).collect();
        assert_eq!(
            selected,
            vec!["attr3", "attr/array/meth", "attr2", "attr/arrays", "attr3"]
        );

        let rejected = permissions.reject_permitted(&[], candidates.iter());
        let rejected: Vec<String> = rejected.iter().map(ToString::to_string).collect();
        assert_eq!(
            rejected,
            vec!["attr4", "attrk/irrelevant", "attr/ar", "attr5", "attr/arrays/more"]
        );
    }

    #[test]
    fn test_select_and_reject_partition() {
        let permissions = granted();
        let candidates = paths(&["attr2", "nope", "wild/x", "a/wildcard", "attr/array"]);
        let mut union: Vec<AttributePath> = permissions.select_permitted(&[], candidates.clone());
        union.extend(permissions.reject_permitted(&[], candidates.clone()));
        assert_eq!(union.len(), candidates.len());
        for candidate in &candidates {
            assert!(union.contains(candidate));
        }
    }

    #[test]
    fn test_select_permitted_with_everything() {
        let permissions = Permissions::new();
        permissions.permit_everything();
        let candidates = paths(&["attr2", "attr3", "attr2", "attr", "array/deep"]);
        assert_eq!(
            permissions.select_permitted(&seg("prefix/array"), candidates.clone()),
            candidates
        );
        assert!(permissions.reject_permitted(&[], candidates).is_empty());
    }

    #[test]
    fn test_select_does_not_select_wildcard_parent() {
        let permissions = Permissions::new();
        permissions.permit(&[], paths(&["attr/array/*"]));
        assert!(permissions.select_permitted(&[], paths(&["attr/array"])).is_empty());
    }

    #[test]
    fn test_merge_with_prefix() {
        let parent = Permissions::new();
        parent.permit(&[], [p("title")]);
        let child = Permissions::new();
        child.permit(&[], paths(&["name", "email"]));

        parent.merge(&child, &seg("author"));
        assert!(parent.permitted(&[], &p("author/name")));
        assert!(parent.permitted(&[], &p("author/email")));
        assert!(parent.permitted(&[], &p("title")));
    }

    #[test]
    fn test_merge_into_reference_copies_first() {
        let root = Permissions::new();
        root.permit(&[], paths(&["post/title"]));
        let post = Permissions::linked(&root, &seg("post"));
        let extra = Permissions::new();
        extra.permit(&[], [p("body")]);

        post.merge(&extra, &[]);
        assert!(!post.is_reference());
        assert!(post.permitted(&[], &p("title")));
        assert!(post.permitted(&[], &p("body")));
        assert!(!root.permitted(&[], &p("post/body")));
    }

    #[test]
    fn test_clones_alias_state() {
        let permissions = Permissions::new();
        let alias = permissions.clone();
        alias.permit(&[], [p("x")]);
        assert!(permissions.permitted(&[], &p("x")));
        assert!(permissions.same_as(&alias));
        assert!(!permissions.same_as(&Permissions::new()));
    }

    #[test]
    fn test_debug_output() {
        let permissions = Permissions::new();
        permissions.permit(&[], paths(&["b", "a/*"]));
        let debug = format!("{permissions:?}");
        assert!(debug.contains("\"a/*\""));
        assert!(debug.contains("reference: false"));
    }
}
