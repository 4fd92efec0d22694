// src/domain/filter.rs

use crate::domain::listing::{Listing, ListingId};
use std::collections::HashSet;
use unicode_normalization::UnicodeNormalization;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PriceSort {
    #[default]
    None,
    Ascending,
    Descending,
}

impl PriceSort {
    /// Query-string form used by the filter form (`asc`, `desc`, anything else is none).
    pub fn from_param(raw: &str) -> Self {
        match raw.trim() {
            "asc" => PriceSort::Ascending,
            "desc" => PriceSort::Descending,
            _ => PriceSort::None,
        }
    }

    pub fn as_param(self) -> &'static str {
        match self {
            PriceSort::None => "",
            PriceSort::Ascending => "asc",
            PriceSort::Descending => "desc",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterState {
    pub kind: Option<String>,
    pub price_sort: PriceSort,
    pub search_term: Option<String>,
    pub favorites_only: bool,
}

impl FilterState {
    /// The search term with surrounding whitespace removed, `None` when blank.
    pub fn effective_search(&self) -> Option<&str> {
        self.search_term
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}

/// Canonical form for search: NFD, drop combining diacritics, lowercase.
/// "São Paulo" becomes "sao paulo".
pub fn normalize(text: &str) -> String {
    text.nfd()
        .filter(|c| !('\u{0300}'..='\u{036f}').contains(c))
        .collect::<String>()
        .to_lowercase()
}

fn matches_search(listing: &Listing, needle: &str) -> bool {
    [
        listing.kind.as_str(),
        listing.description.as_str(),
        listing.address.street.as_str(),
        listing.address.neighborhood.as_str(),
        listing.address.city.as_str(),
        listing.address.state.as_str(),
    ]
    .into_iter()
    .any(|field| normalize(field).contains(needle))
}

/// Computes the rendered sequence from the accumulated listings.
///
/// Stages run in a fixed order: favorite annotation, type filter, search,
/// price sort, favorites-only. Pure: the input slice is never reordered.
pub fn derive(
    accumulated: &[Listing],
    filter: &FilterState,
    favorites: &HashSet<ListingId>,
) -> Vec<Listing> {
    let mut view: Vec<Listing> = accumulated
        .iter()
        .cloned()
        .map(|mut listing| {
            listing.favorited = favorites.contains(&listing.id);
            listing
        })
        .collect();

    if let Some(kind) = filter.kind.as_deref().filter(|k| !k.is_empty()) {
        view.retain(|l| l.kind == kind);
    }

    if let Some(term) = filter.effective_search() {
        let needle = normalize(term);
        view.retain(|l| matches_search(l, &needle));
    }

    // `sort_by` is stable, so equal prices keep arrival order.
    match filter.price_sort {
        PriceSort::None => {}
        PriceSort::Ascending => view.sort_by(|a, b| a.price.total_cmp(&b.price)),
        PriceSort::Descending => view.sort_by(|a, b| b.price.total_cmp(&a.price)),
    }

    if filter.favorites_only {
        view.retain(|l| l.favorited);
    }

    view
}
