use crate::domain::listing::{Listing, ListingId};
use crate::grid::fetcher::Page;
use std::collections::HashSet;
use tracing::debug;

/// Everything fetched so far for the current filter session.
#[derive(Debug, Clone, PartialEq)]
pub struct AccumulatedState {
    pub listings: Vec<Listing>,
    /// Index of the last page merged in.
    pub page_index: u32,
    pub pages_loaded: u32,
    pub has_more: bool,
    pub loading: bool,
}

impl AccumulatedState {
    fn empty() -> Self {
        Self {
            listings: Vec::new(),
            page_index: 0,
            pages_loaded: 0,
            has_more: true,
            loading: false,
        }
    }

    /// Page 0 until something has been merged, then the page after the last one.
    pub fn next_page_index(&self) -> u32 {
        if self.pages_loaded == 0 {
            0
        } else {
            self.page_index + 1
        }
    }
}

/// Ordered, id-deduplicated merge of listing pages.
pub struct Accumulator {
    state: AccumulatedState,
    seen: HashSet<ListingId>,
    page_size: usize,
}

impl Accumulator {
    pub fn new(page_size: usize) -> Self {
        Self {
            state: AccumulatedState::empty(),
            seen: HashSet::new(),
            page_size,
        }
    }

    pub fn state(&self) -> &AccumulatedState {
        &self.state
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn reset(&mut self) {
        self.state = AccumulatedState::empty();
        self.seen.clear();
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.state.loading = loading;
    }

    /// Appends the listings not seen before, in arrival order.
    ///
    /// `has_more` is computed from the raw page size as the API sent it:
    /// duplicates and dropped records never end the list early.
    pub fn append_page(&mut self, page: Page) -> &AccumulatedState {
        let received = page.received;
        let mut appended = 0usize;

        for listing in page.listings {
            if self.seen.insert(listing.id) {
                self.state.listings.push(listing);
                appended += 1;
            }
        }

        self.state.page_index = page.index;
        self.state.pages_loaded += 1;
        self.state.has_more = !page.is_final && received == self.page_size;

        debug!(
            page = page.index,
            received,
            appended,
            total = self.state.listings.len(),
            has_more = self.state.has_more,
            "page merged"
        );

        &self.state
    }
}
