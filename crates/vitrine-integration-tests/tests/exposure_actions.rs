//! Integration tests for action-scoped presenter exposures.

use std::rc::Rc;

use serde_json::json;
use vitrine_core::{
    ExposureOptions, Exposures, GENERIC_COLLECTION, Present, PresentError, Presented, Related,
};
use vitrine_test::{Post, blog_catalog, init_test_logging, paths};

fn blog_exposures() -> Exposures {
    init_test_logging();
    let catalog = blog_catalog();
    let mut exposures = Exposures::new(&catalog);
    exposures
        .presents(["post", "posts"], &ExposureOptions::new())
        .presents(
            ["posts"],
            &ExposureOptions::new().with("PostsPresenter").only(["index"]),
        )
        .presents_with(
            ["draft"],
            &ExposureOptions::new().except(["index"]),
            |presenter| presenter.permit(&paths(&["title"])),
        )
        .fallback("draft", || Ok(Presented::from(json!("no drafts here"))));
    exposures
}

fn presenter(presented: &Presented) -> &Rc<dyn Present> {
    presented.as_presenter().unwrap()
}

#[test]
fn test_latest_matching_declaration_wins() {
    let exposures = blog_exposures();
    let posts = Related::many(vec![Post::sample(), Post::titled("Second")]);

    let mut index = exposures.for_action("index");
    index.assign("posts", posts.clone());
    assert_eq!(presenter(&index.presenter("posts").unwrap()).type_name(), "PostsPresenter");

    let mut feed = exposures.for_action("feed");
    feed.assign("posts", posts);
    assert_eq!(presenter(&feed.presenter("posts").unwrap()).type_name(), GENERIC_COLLECTION);
}

#[test]
fn test_presenters_are_memoized_per_action() {
    let exposures = blog_exposures();
    let mut show = exposures.for_action("show");
    show.assign("post", Related::one(Post::sample()));

    let first = show.presenter("post").unwrap();
    presenter(&first).permit(&paths(&["title"]));
    let second = show.presenter("post").unwrap();
    assert!(Rc::ptr_eq(presenter(&first), presenter(&second)));
    assert_eq!(
        presenter(&second).to_json().unwrap(),
        json!({ "title": "Hello world" })
    );

    // Reassigning drops the memoized presenter and its grants.
    show.assign("post", Related::one(Post::titled("Replaced")));
    let third = show.presenter("post").unwrap();
    assert!(!Rc::ptr_eq(presenter(&first), presenter(&third)));
    assert_eq!(presenter(&third).to_json().unwrap(), json!({}));
}

#[test]
fn test_unassigned_variable_is_null() {
    let exposures = blog_exposures();
    let show = exposures.for_action("show");
    let presented = show.presenter("post").unwrap();
    assert_eq!(presented.as_value(), Some(&serde_json::Value::Null));
}

#[test]
fn test_callback_runs_on_build() {
    let exposures = blog_exposures();
    let mut edit = exposures.for_action("edit");
    edit.assign("draft", Related::one(Post::titled("Work in progress")));

    let draft = edit.presenter("draft").unwrap();
    assert_eq!(
        presenter(&draft).to_json().unwrap(),
        json!({ "title": "Work in progress" })
    );
}

#[test]
fn test_excluded_action_uses_fallback() {
    let exposures = blog_exposures();
    let mut index = exposures.for_action("index");
    index.assign("draft", Related::one(Post::sample()));

    let draft = index.presenter("draft").unwrap();
    assert_eq!(draft.as_value(), Some(&json!("no drafts here")));
}

#[test]
fn test_undeclared_variable_is_an_error() {
    let exposures = blog_exposures();
    let show = exposures.for_action("show");
    let err = show.presenter("comment").unwrap_err();
    assert!(matches!(err, PresentError::NoAccessor { ref name, .. } if name == "comment"));
    assert_eq!(err.to_string(), "undefined accessor `comment` for action `show`");
}

#[test]
fn test_options_from_loose_input() {
    let options = ExposureOptions::from_value(&json!({ "with": "PostsPresenter", "only": "index" }))
        .unwrap();
    assert!(options.applies_to("index"));
    assert!(!options.applies_to("show"));

    let err = ExposureOptions::from_value(&json!({ "scope": "recent" })).unwrap_err();
    assert!(matches!(err, PresentError::InvalidOptions { .. }));
}
