//! View model of the login location picker.

use std::time::Duration;

use locus_core::{AppError, AppResult, NonEmptyString};
use locus_domain::{
    AllowedLocations, DEFAULT_PAGE_SIZE, FeedKey, Location, LocationId, Page,
    infinite_scroll_trigger_index, reconcile,
};
use tokio::time::Instant;
use tracing::debug;

use crate::{DEFAULT_SEARCH_DEBOUNCE, Debouncer, LocationFeed, PageFetch};

/// Number of placeholder rows shown while the first page loads.
pub const LOADING_PLACEHOLDERS: usize = 5;

/// Notice shown when the location feed failed.
pub const LOAD_ERROR_MESSAGE: &str =
    "Unable to load login locations. Please try again or contact support if the problem persists.";

/// Caller-supplied picker settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickerOptions {
    /// Locations requested per page.
    pub page_size: u32,
    /// Optional location tag filter.
    pub location_tag: Option<NonEmptyString>,
    /// Location pinned to the top of the list.
    pub default_location_id: Option<LocationId>,
    /// Quiescence delay applied to search input.
    pub search_debounce: Duration,
}

impl Default for PickerOptions {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            location_tag: None,
            default_location_id: None,
            search_debounce: DEFAULT_SEARCH_DEBOUNCE,
        }
    }
}

/// Rendered list of selectable locations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationList {
    /// Reconciled locations in display order.
    pub items: Vec<Location>,
    /// Currently selected location.
    pub selected: Option<LocationId>,
    /// Entry whose visibility requests the next page.
    pub trigger_index: Option<usize>,
    /// Whether a further page is loading.
    pub loading_more: bool,
}

/// What the picker shows below the search input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickerView {
    /// First page still loading.
    Loading {
        /// Number of placeholder rows.
        placeholders: usize,
    },
    /// Location feed failed.
    Error {
        /// User-facing notice.
        message: String,
    },
    /// Nothing to select.
    Empty,
    /// Selectable locations.
    List(LocationList),
}

/// Stateful location picker.
///
/// Owns the search text, the feed of the debounced search, the allowlist and
/// the pinned default, and reconciles them into the displayed list.
#[derive(Debug, Clone)]
pub struct LocationPicker {
    options: PickerOptions,
    search_text: String,
    search: Debouncer<String>,
    feed: LocationFeed,
    allowed: AllowedLocations,
    pinned_default: Option<Location>,
    selected: Option<LocationId>,
}

impl LocationPicker {
    /// Creates a picker with an empty search and no restriction.
    #[must_use]
    pub fn new(options: PickerOptions) -> Self {
        let key = FeedKey::new(options.location_tag.clone(), options.page_size, "");
        let search = Debouncer::new(String::new(), options.search_debounce);

        Self {
            options,
            search_text: String::new(),
            search,
            feed: LocationFeed::new(key),
            allowed: AllowedLocations::unrestricted(),
            pinned_default: None,
            selected: None,
        }
    }

    /// Returns the picker settings.
    #[must_use]
    pub fn options(&self) -> &PickerOptions {
        &self.options
    }

    /// Issues the first page fetch.
    pub fn start(&mut self) -> Option<PageFetch> {
        self.feed.start()
    }

    /// Handles a change of the search input.
    ///
    /// Clears the selection; the feed follows once the input settles.
    pub fn on_search_input(&mut self, text: &str, now: Instant) {
        self.selected = None;
        self.search_text = text.trim().to_owned();
        self.search.push(self.search_text.clone(), now);
    }

    /// Returns the search text as typed, trimmed.
    #[must_use]
    pub fn search_text(&self) -> &str {
        self.search_text.as_str()
    }

    /// Returns when pending search input settles.
    #[must_use]
    pub fn search_deadline(&self) -> Option<Instant> {
        self.search.deadline()
    }

    /// Applies settled search input, restarting the feed when it changed.
    pub fn on_search_settled(&mut self, now: Instant) -> Option<PageFetch> {
        let settled = self.search.poll(now)?;
        if self.feed.reset(self.feed.key().with_search_text(settled)) {
            return self.feed.start();
        }

        None
    }

    /// Applies a page fetch outcome; stale outcomes are dropped.
    pub fn apply_page(&mut self, fetch: &PageFetch, outcome: AppResult<Page>) -> bool {
        self.feed.complete(fetch, outcome)
    }

    /// Replaces the role-derived allowlist.
    ///
    /// A selection that is no longer listed is cleared.
    pub fn set_allowed_locations(&mut self, allowed: AllowedLocations) {
        self.allowed = allowed;
        self.drop_unlisted_selection();
    }

    /// Sets the resolved pinned default.
    ///
    /// Locations other than the configured default are ignored. A selection
    /// that is no longer listed is cleared.
    pub fn set_pinned_default(&mut self, location: Option<Location>) {
        self.pinned_default = location.filter(|location| {
            self.options
                .default_location_id
                .as_ref()
                .is_some_and(|default_id| default_id == location.id())
        });
        self.drop_unlisted_selection();
    }

    /// Requests the next page; no-op while loading or when exhausted.
    pub fn load_more(&mut self) -> Option<PageFetch> {
        self.feed.load_more()
    }

    /// Handles a rendered entry becoming visible.
    pub fn on_item_visible(&mut self, index: usize) -> Option<PageFetch> {
        let trigger_index = infinite_scroll_trigger_index(
            self.locations().len(),
            self.options.page_size,
            self.feed.has_more(),
        );

        if trigger_index == Some(index) {
            return self.load_more();
        }

        None
    }

    /// Selects a location from the displayed list.
    pub fn select(&mut self, location_id: &LocationId) -> AppResult<()> {
        if !self
            .locations()
            .iter()
            .any(|location| location.id() == location_id)
        {
            return Err(AppError::NotFound(format!(
                "location '{location_id}' is not selectable"
            )));
        }

        self.selected = Some(location_id.clone());
        Ok(())
    }

    /// Returns the selected location id.
    #[must_use]
    pub fn selected(&self) -> Option<&LocationId> {
        self.selected.as_ref()
    }

    /// Returns the underlying feed.
    #[must_use]
    pub fn feed(&self) -> &LocationFeed {
        &self.feed
    }

    /// Returns the reconciled list of selectable locations.
    #[must_use]
    pub fn locations(&self) -> Vec<Location> {
        reconcile(
            &self.feed.locations(),
            &self.allowed,
            self.pinned_default.as_ref(),
            &self.search_text,
        )
    }

    /// Builds the current view.
    #[must_use]
    pub fn view(&self) -> PickerView {
        if self.feed.is_loading() {
            return PickerView::Loading {
                placeholders: LOADING_PLACEHOLDERS,
            };
        }

        if self.feed.error().is_some() {
            return PickerView::Error {
                message: LOAD_ERROR_MESSAGE.to_owned(),
            };
        }

        let items = self.locations();
        if items.is_empty() {
            return PickerView::Empty;
        }

        let trigger_index =
            infinite_scroll_trigger_index(items.len(), self.options.page_size, self.feed.has_more());

        PickerView::List(LocationList {
            items,
            selected: self.selected.clone(),
            trigger_index,
            loading_more: self.feed.loading_new_data(),
        })
    }

    fn drop_unlisted_selection(&mut self) {
        let Some(selected) = &self.selected else {
            return;
        };

        if !self
            .locations()
            .iter()
            .any(|location| location.id() == selected)
        {
            debug!(location_id = %selected, "selection no longer listed");
            self.selected = None;
        }
    }
}
