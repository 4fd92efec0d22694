//! The infinite-scroll listing grid.
//!
//! One `ImoveisGrid` per browser session. It owns the accumulated listings,
//! the current filters and the scroll trigger, and recomputes the rendered
//! view on demand with [`crate::domain::filter::derive`].
//!
//! Fetches are serialized by the loading flag. Every fetch carries a
//! [`FetchTicket`] stamped with the session generation; a reset bumps the
//! generation so a late response from the previous session is dropped
//! instead of leaking into the new one.

pub mod accumulator;
pub mod fetcher;
pub mod trigger;

use crate::api::ApiError;
use crate::domain::filter::{derive, FilterState};
use crate::domain::listing::{Listing, ListingId};
use accumulator::{AccumulatedState, Accumulator};
use fetcher::{FetchMode, Page, PageFetcher};
use std::collections::HashSet;
use tracing::{debug, info, warn};
use trigger::{ScrollTrigger, TriggerState, VisibilityObserver};

pub const SENTINEL_ID: &str = "imoveis-sentinel";

/// Proof that a fetch was started for a given session generation and page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    generation: u64,
    page_index: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    Applied,
    Failed,
    /// The grid was reset while the fetch was in flight; the result was ignored.
    Stale,
}

pub struct ImoveisGrid<F, O> {
    fetcher: F,
    observer: O,
    accumulator: Accumulator,
    trigger: ScrollTrigger,
    mode: FetchMode,
    filter: FilterState,
    favorites: HashSet<ListingId>,
    generation: u64,
    error: Option<String>,
}

impl<F, O> ImoveisGrid<F, O>
where
    F: PageFetcher,
    O: VisibilityObserver,
{
    pub fn new(fetcher: F, observer: O, page_size: usize) -> Self {
        Self {
            fetcher,
            observer,
            accumulator: Accumulator::new(page_size),
            trigger: ScrollTrigger::new(SENTINEL_ID),
            mode: FetchMode::All,
            filter: FilterState::default(),
            favorites: HashSet::new(),
            generation: 0,
            error: None,
        }
    }

    /// First load: favorites, then page 0 of the current mode.
    pub fn mount(&mut self) -> FetchOutcome {
        self.refresh_favorites();
        self.restart()
    }

    /// Mounts with parameters already chosen, so the first fetch uses them.
    pub fn mount_with(&mut self, mode: FetchMode, filter: FilterState) -> FetchOutcome {
        self.mode = mode;
        self.filter = filter;
        self.mount()
    }

    pub fn state(&self) -> &AccumulatedState {
        self.accumulator.state()
    }

    pub fn mode(&self) -> FetchMode {
        self.mode
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn trigger_state(&self) -> TriggerState {
        self.trigger.state()
    }

    pub fn is_observing_sentinel(&self) -> bool {
        self.trigger.is_attached()
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    /// The rendered sequence for the current data, filters and favorites.
    pub fn view(&self) -> Vec<Listing> {
        derive(&self.state().listings, &self.filter, &self.favorites)
    }

    /// Applies new parameters. Mode, price ceiling and search term restart the
    /// session from page 0; type, sort and favorites-only only change the view.
    /// Returns the outcome of the restart fetch, if one happened.
    pub fn set_filters(&mut self, mode: FetchMode, filter: FilterState) -> Option<FetchOutcome> {
        let refetch =
            mode != self.mode || filter.effective_search() != self.filter.effective_search();

        self.mode = mode;
        self.filter = filter;

        if refetch {
            info!(mode = ?self.mode, "fetch parameters changed, restarting grid");
            Some(self.restart())
        } else {
            None
        }
    }

    /// Reloads the favorites set. A failure keeps the previous set; anonymous
    /// users routinely get a 401 here.
    pub fn refresh_favorites(&mut self) {
        match self.fetcher.favorite_ids() {
            Ok(ids) => self.favorites = ids,
            Err(e) => warn!(error = %e, "could not load favorites"),
        }
    }

    /// Drops the accumulated data and invalidates in-flight fetches.
    pub fn reset(&mut self) {
        self.generation += 1;
        self.accumulator.reset();
        self.trigger.resolve();
        self.error = None;
        self.trigger.sync(self.state().has_more, &self.observer);
        debug!(generation = self.generation, "grid reset");
    }

    fn restart(&mut self) -> FetchOutcome {
        self.reset();
        self.load_page(0).unwrap_or(FetchOutcome::Stale)
    }

    /// Marks the grid as loading and hands out a ticket for `page_index`.
    /// `None` while another fetch is outstanding.
    pub fn begin_fetch(&mut self, page_index: u32) -> Option<FetchTicket> {
        if self.state().loading {
            return None;
        }
        self.accumulator.set_loading(true);
        Some(FetchTicket {
            generation: self.generation,
            page_index,
        })
    }

    /// Applies a fetch result. Results for an older generation are discarded
    /// without touching any state.
    pub fn complete_fetch(
        &mut self,
        ticket: FetchTicket,
        result: Result<Page, ApiError>,
    ) -> FetchOutcome {
        if ticket.generation != self.generation {
            debug!(
                page = ticket.page_index,
                ticket_generation = ticket.generation,
                generation = self.generation,
                "dropping stale page"
            );
            return FetchOutcome::Stale;
        }

        self.accumulator.set_loading(false);
        self.trigger.resolve();

        let outcome = match result {
            Ok(mut page) => {
                page.index = ticket.page_index;
                self.accumulator.append_page(page);
                self.error = None;
                FetchOutcome::Applied
            }
            Err(e) => {
                // has_more is left as it was so the next reveal retries this page.
                warn!(page = ticket.page_index, error = %e, "listings page failed");
                self.error = Some(e.user_message());
                FetchOutcome::Failed
            }
        };

        self.trigger.sync(self.state().has_more, &self.observer);
        outcome
    }

    fn load_page(&mut self, page_index: u32) -> Option<FetchOutcome> {
        let ticket = self.begin_fetch(page_index)?;
        let result =
            self.fetcher
                .fetch_page(&self.mode, page_index, self.accumulator.page_size());
        Some(self.complete_fetch(ticket, result))
    }

    /// Acts on a pending sentinel visibility signal. Returns the outcome when a
    /// fetch was started.
    pub fn poll(&mut self) -> Option<FetchOutcome> {
        let (has_more, loading, next) = {
            let s = self.state();
            (s.has_more, s.loading, s.next_page_index())
        };

        if !self.trigger.try_fire(has_more, loading) {
            return None;
        }

        let outcome = self.load_page(next);
        if outcome.is_none() {
            self.trigger.resolve();
        }
        outcome
    }
}
