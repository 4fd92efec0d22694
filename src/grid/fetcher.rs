use crate::api::ApiError;
use crate::domain::listing::{Listing, ListingId};
use std::collections::HashSet;

/// Which remote list the grid is paging through.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum FetchMode {
    #[default]
    All,
    /// Only listings priced at or below the ceiling.
    PriceCeiling(f64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub index: u32,
    pub listings: Vec<Listing>,
    /// Entries the API sent, before unusable ones were dropped.
    pub received: usize,
    pub is_final: bool,
}

/// Source of listing pages. Implementations do the I/O and nothing else;
/// all state changes happen in the grid.
pub trait PageFetcher {
    fn fetch_page(
        &self,
        mode: &FetchMode,
        page_index: u32,
        page_size: usize,
    ) -> Result<Page, ApiError>;

    fn favorite_ids(&self) -> Result<HashSet<ListingId>, ApiError>;
}

impl<F: PageFetcher + ?Sized> PageFetcher for Box<F> {
    fn fetch_page(
        &self,
        mode: &FetchMode,
        page_index: u32,
        page_size: usize,
    ) -> Result<Page, ApiError> {
        (**self).fetch_page(mode, page_index, page_size)
    }

    fn favorite_ids(&self) -> Result<HashSet<ListingId>, ApiError> {
        (**self).favorite_ids()
    }
}
