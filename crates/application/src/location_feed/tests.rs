use locus_core::AppError;
use locus_domain::{FeedKey, Location, LocationId, Page, PageRequest};

use super::{FeedState, LocationFeed, PageFetch};

fn key(search_text: &str) -> FeedKey {
    FeedKey::new(None, 2, search_text)
}

fn location(id: &str) -> Location {
    match LocationId::new(id) {
        Ok(location_id) => Location::new(location_id, id),
        Err(error) => panic!("invalid test location id '{id}': {error}"),
    }
}

fn page(ids: &[&str], next_link: Option<&str>) -> Page {
    Page {
        locations: ids.iter().map(|id| location(id)).collect(),
        next_link: next_link.map(str::to_owned),
        total: Some(5),
    }
}

fn issued(fetch: Option<PageFetch>) -> PageFetch {
    match fetch {
        Some(fetch) => fetch,
        None => panic!("expected a page fetch to be issued"),
    }
}

fn ids(feed: &LocationFeed) -> Vec<String> {
    feed.locations()
        .iter()
        .map(|location| location.id().as_str().to_owned())
        .collect()
}

#[test]
fn new_feed_is_loading_until_first_page_arrives() {
    let mut feed = LocationFeed::new(key(""));
    assert!(feed.is_loading());

    let first = issued(feed.start());
    assert_eq!(first.page_index(), 0);
    assert!(matches!(first.request(), PageRequest::Initial { offset: 0, .. }));
    assert!(feed.is_loading());
    assert!(!feed.loading_new_data());

    assert!(feed.complete(&first, Ok(page(&["a", "b"], Some("next-1")))));
    assert!(!feed.is_loading());
    assert_eq!(feed.total_results(), Some(5));
}

#[test]
fn has_more_follows_the_continuation_links() {
    let mut feed = LocationFeed::new(key(""));

    let first = issued(feed.start());
    assert!(feed.complete(&first, Ok(page(&["a", "b"], Some("next-1")))));
    assert!(feed.has_more());

    let second = issued(feed.load_more());
    assert_eq!(
        second.request(),
        &PageRequest::Continuation {
            link: "next-1".to_owned()
        }
    );
    assert!(feed.loading_new_data());
    assert!(feed.complete(&second, Ok(page(&["c", "d"], Some("next-2")))));
    assert!(feed.has_more());

    let third = issued(feed.load_more());
    assert!(feed.complete(&third, Ok(page(&["e"], None))));
    assert!(!feed.has_more());
    assert_eq!(feed.state(), FeedState::Exhausted);

    assert_eq!(feed.load_more(), None);
    assert_eq!(ids(&feed), vec!["a", "b", "c", "d", "e"]);
    assert_eq!(feed.page_count(), 3);
}

#[test]
fn load_more_is_rejected_while_a_fetch_is_in_flight() {
    let mut feed = LocationFeed::new(key(""));

    let first = issued(feed.start());
    assert_eq!(feed.load_more(), None);
    assert_eq!(feed.start(), None);

    assert!(feed.complete(&first, Ok(page(&["a"], Some("next-1")))));
    let second = issued(feed.load_more());
    assert_eq!(feed.load_more(), None);
    assert_eq!(feed.state(), FeedState::FetchingPage(1));
    assert_eq!(second.page_index(), 1);
}

#[test]
fn search_change_resets_pages_and_restarts_from_page_zero() {
    let mut feed = LocationFeed::new(key(""));
    let first = issued(feed.start());
    assert!(feed.complete(&first, Ok(page(&["a", "b"], Some("next-1")))));

    assert!(feed.reset(key("lab")));
    assert!(feed.locations().is_empty());
    assert!(feed.is_loading());

    let restarted = issued(feed.start());
    assert_eq!(restarted.page_index(), 0);
    assert_eq!(restarted.key().search_text, "lab");
}

#[test]
fn reset_with_unchanged_parameters_keeps_pages() {
    let mut feed = LocationFeed::new(key("lab"));
    let first = issued(feed.start());
    assert!(feed.complete(&first, Ok(page(&["a"], None))));

    assert!(!feed.reset(key(" lab ")));
    assert_eq!(ids(&feed), vec!["a"]);
}

#[test]
fn responses_for_a_superseded_search_are_dropped() {
    let mut feed = LocationFeed::new(key(""));
    let stale = issued(feed.start());

    assert!(feed.reset(key("lab")));
    let current = issued(feed.start());

    assert!(!feed.complete(&stale, Ok(page(&["stale"], Some("next-1")))));
    assert!(feed.locations().is_empty());

    assert!(feed.complete(&current, Ok(page(&["lab-1"], None))));
    assert_eq!(ids(&feed), vec!["lab-1"]);
}

#[test]
fn responses_for_an_earlier_identical_search_are_dropped() {
    let mut feed = LocationFeed::new(key("lab"));
    let stale = issued(feed.start());

    assert!(feed.reset(key("")));
    assert!(feed.reset(key("lab")));
    let current = issued(feed.start());

    assert!(!feed.complete(&stale, Ok(page(&["stale"], None))));
    assert!(feed.complete(&current, Ok(page(&["fresh"], None))));
    assert_eq!(ids(&feed), vec!["fresh"]);
}

#[test]
fn failed_fetch_is_terminal_until_reset() {
    let mut feed = LocationFeed::new(key(""));
    let first = issued(feed.start());
    assert!(feed.complete(&first, Ok(page(&["a"], Some("next-1")))));

    let second = issued(feed.load_more());
    assert!(feed.complete(
        &second,
        Err(AppError::Transport("connection reset".to_owned()))
    ));

    assert_eq!(feed.state(), FeedState::Failed);
    assert!(feed.error().is_some());
    assert_eq!(feed.load_more(), None);
    assert_eq!(ids(&feed), vec!["a"]);

    assert!(feed.reset(key("a")));
    assert!(feed.error().is_none());
    assert!(feed.start().is_some());
}

#[test]
fn failed_first_page_is_not_loading() {
    let mut feed = LocationFeed::new(key(""));
    let first = issued(feed.start());
    assert!(feed.complete(
        &first,
        Err(AppError::Upstream {
            status: 500,
            message: "boom".to_owned()
        })
    ));

    assert!(!feed.is_loading());
    assert!(feed.error().is_some());
}
