//! Incremental, search-keyed pagination over the location collection.

use locus_core::AppError;
use locus_domain::{FeedKey, Location, Page, PageRequest};
use tracing::debug;

/// Lifecycle of one pagination sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedState {
    /// No fetch in flight and further pages may follow.
    Idle,
    /// The page with this index is being fetched.
    FetchingPage(usize),
    /// The last fetched page had no continuation link.
    Exhausted,
    /// A page fetch failed; the sequence stops until the next reset.
    Failed,
}

/// Ticket for one page fetch issued by [`LocationFeed`].
///
/// Results are only applied while the ticket still belongs to the current
/// sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageFetch {
    generation: u64,
    key: FeedKey,
    page_index: usize,
    request: PageRequest,
}

impl PageFetch {
    /// Returns the sequence parameters the fetch was issued for.
    #[must_use]
    pub fn key(&self) -> &FeedKey {
        &self.key
    }

    /// Returns the zero-based page index.
    #[must_use]
    pub fn page_index(&self) -> usize {
        self.page_index
    }

    /// Returns the request to send to the location directory.
    #[must_use]
    pub fn request(&self) -> &PageRequest {
        &self.request
    }
}

/// Pages fetched so far for the current search parameters.
#[derive(Debug, Clone)]
pub struct LocationFeed {
    key: FeedKey,
    generation: u64,
    state: FeedState,
    pages: Vec<Page>,
    error: Option<AppError>,
}

impl LocationFeed {
    /// Creates an idle feed for the given parameters.
    #[must_use]
    pub fn new(key: FeedKey) -> Self {
        Self {
            key,
            generation: 0,
            state: FeedState::Idle,
            pages: Vec::new(),
            error: None,
        }
    }

    /// Returns the current sequence parameters.
    #[must_use]
    pub fn key(&self) -> &FeedKey {
        &self.key
    }

    /// Returns the current lifecycle state.
    #[must_use]
    pub fn state(&self) -> FeedState {
        self.state
    }

    /// Switches to new parameters, discarding every fetched page.
    ///
    /// Returns `false` and keeps the pages when the parameters did not change.
    pub fn reset(&mut self, key: FeedKey) -> bool {
        if key == self.key {
            return false;
        }

        debug!(
            search_text = %key.search_text,
            discarded_pages = self.pages.len(),
            "location feed reset"
        );

        self.key = key;
        self.generation = self.generation.wrapping_add(1);
        self.state = FeedState::Idle;
        self.pages.clear();
        self.error = None;
        true
    }

    /// Issues the first page fetch if nothing was fetched yet.
    pub fn start(&mut self) -> Option<PageFetch> {
        if !self.pages.is_empty() || self.state != FeedState::Idle {
            return None;
        }

        self.issue(0)
    }

    /// Issues the next page fetch.
    ///
    /// No-op while a fetch is in flight or when no further page exists.
    pub fn load_more(&mut self) -> Option<PageFetch> {
        if self.state != FeedState::Idle {
            return None;
        }

        if self.pages.is_empty() {
            return self.issue(0);
        }

        if !self.has_more() {
            self.state = FeedState::Exhausted;
            return None;
        }

        self.issue(self.pages.len())
    }

    /// Applies the outcome of a fetch.
    ///
    /// Returns `false` when the ticket is stale and the outcome was dropped.
    pub fn complete(&mut self, fetch: &PageFetch, outcome: Result<Page, AppError>) -> bool {
        if fetch.generation != self.generation
            || fetch.key != self.key
            || self.state != FeedState::FetchingPage(fetch.page_index)
        {
            debug!(
                page_index = fetch.page_index,
                search_text = %fetch.key.search_text,
                "dropping stale location page"
            );
            return false;
        }

        match outcome {
            Ok(page) => {
                self.state = if page.has_next() {
                    FeedState::Idle
                } else {
                    FeedState::Exhausted
                };
                debug!(
                    page_index = fetch.page_index,
                    entries = page.locations.len(),
                    has_more = page.has_next(),
                    "location page fetched"
                );
                self.pages.push(page);
            }
            Err(error) => {
                self.state = FeedState::Failed;
                self.error = Some(error);
            }
        }

        true
    }

    /// Returns every fetched location in fetch order.
    #[must_use]
    pub fn locations(&self) -> Vec<Location> {
        self.pages
            .iter()
            .flat_map(|page| page.locations.iter().cloned())
            .collect()
    }

    /// Returns the number of fetched pages.
    #[must_use]
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Returns whether the most recent page links to a further page.
    #[must_use]
    pub fn has_more(&self) -> bool {
        self.pages.last().is_some_and(Page::has_next)
    }

    /// Returns whether the first page is still outstanding.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.pages.is_empty() && matches!(self.state, FeedState::Idle | FeedState::FetchingPage(_))
    }

    /// Returns whether a page after the first is being fetched.
    #[must_use]
    pub fn loading_new_data(&self) -> bool {
        matches!(self.state, FeedState::FetchingPage(index) if index > 0)
    }

    /// Returns the terminal fetch error, if any.
    #[must_use]
    pub fn error(&self) -> Option<&AppError> {
        self.error.as_ref()
    }

    /// Returns the total match count reported with the first page.
    #[must_use]
    pub fn total_results(&self) -> Option<u64> {
        self.pages.first().and_then(|page| page.total)
    }

    fn issue(&mut self, page_index: usize) -> Option<PageFetch> {
        let request = PageRequest::for_index(&self.key, page_index, self.pages.last())?;
        self.state = FeedState::FetchingPage(page_index);

        Some(PageFetch {
            generation: self.generation,
            key: self.key.clone(),
            page_index,
            request,
        })
    }
}

#[cfg(test)]
mod tests;
