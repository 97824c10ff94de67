use locus_core::NonEmptyString;

use crate::Location;

/// Default number of locations requested per page.
pub const DEFAULT_PAGE_SIZE: u32 = 50;

/// One fetched batch of the location feed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Page {
    /// Locations in server order.
    pub locations: Vec<Location>,
    /// Link to the following page, absent on the last page.
    pub next_link: Option<String>,
    /// Total number of matches reported by the server.
    pub total: Option<u64>,
}

impl Page {
    /// Returns whether another page can be requested after this one.
    #[must_use]
    pub fn has_next(&self) -> bool {
        self.next_link.is_some()
    }
}

/// Parameters that identify one pagination sequence.
///
/// Pages fetched for different keys never mix.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FeedKey {
    /// Optional location tag filter.
    pub location_tag: Option<NonEmptyString>,
    /// Page size; zero lets the server choose.
    pub page_size: u32,
    /// Debounced, trimmed search text.
    pub search_text: String,
}

impl FeedKey {
    /// Creates a key for the given filter, page size and search text.
    #[must_use]
    pub fn new(
        location_tag: Option<NonEmptyString>,
        page_size: u32,
        search_text: impl Into<String>,
    ) -> Self {
        Self {
            location_tag,
            page_size,
            search_text: search_text.into().trim().to_owned(),
        }
    }

    /// Returns the same key with a different search text.
    #[must_use]
    pub fn with_search_text(&self, search_text: impl Into<String>) -> Self {
        Self::new(self.location_tag.clone(), self.page_size, search_text)
    }

    /// Returns whether a name filter applies.
    #[must_use]
    pub fn has_search(&self) -> bool {
        !self.search_text.is_empty()
    }
}

/// Request for one page of the feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageRequest {
    /// Query built from the feed parameters.
    Initial {
        /// Sequence parameters.
        key: FeedKey,
        /// Offset in entries; zero for the first page.
        offset: u64,
    },
    /// Server-provided continuation link.
    Continuation {
        /// Link taken from the previous page.
        link: String,
    },
}

impl PageRequest {
    /// Builds the request for `page_index`.
    ///
    /// With a previous page the request follows its continuation link, and
    /// `None` is returned when that page was the last one.
    #[must_use]
    pub fn for_index(key: &FeedKey, page_index: usize, previous: Option<&Page>) -> Option<Self> {
        if let Some(previous) = previous {
            return previous
                .next_link
                .clone()
                .map(|link| Self::Continuation { link });
        }

        let page_index = u64::try_from(page_index).unwrap_or(u64::MAX);
        Some(Self::Initial {
            key: key.clone(),
            offset: page_index.saturating_mul(u64::from(key.page_size)),
        })
    }
}

#[cfg(test)]
mod tests {
    use locus_core::NonEmptyString;

    use super::{FeedKey, Page, PageRequest};

    fn key() -> FeedKey {
        FeedKey::new(NonEmptyString::new("Login Location").ok(), 50, " lab ")
    }

    #[test]
    fn key_trims_search_text() {
        assert_eq!(key().search_text, "lab");
        assert!(!key().with_search_text("   ").has_search());
    }

    #[test]
    fn first_page_is_an_initial_query() {
        let request = PageRequest::for_index(&key(), 0, None);
        assert_eq!(
            request,
            Some(PageRequest::Initial {
                key: key(),
                offset: 0
            })
        );
    }

    #[test]
    fn page_without_previous_uses_offset() {
        let request = PageRequest::for_index(&key(), 3, None);
        assert_eq!(
            request,
            Some(PageRequest::Initial {
                key: key(),
                offset: 150
            })
        );
    }

    #[test]
    fn following_page_uses_continuation_link() {
        let previous = Page {
            next_link: Some("http://api.test/Location?page=2".to_owned()),
            ..Page::default()
        };

        let request = PageRequest::for_index(&key(), 1, Some(&previous));
        assert_eq!(
            request,
            Some(PageRequest::Continuation {
                link: "http://api.test/Location?page=2".to_owned()
            })
        );
    }

    #[test]
    fn last_page_ends_the_sequence() {
        let previous = Page::default();
        assert_eq!(PageRequest::for_index(&key(), 1, Some(&previous)), None);
    }
}
