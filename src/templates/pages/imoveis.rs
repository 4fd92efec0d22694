use crate::domain::filter::FilterState;
use crate::domain::listing::Listing;
use crate::grid::fetcher::FetchMode;
use crate::grid::SENTINEL_ID;
use crate::templates::components::{error_banner, filter_form, listing_card};
use crate::templates::desktop_layout;
use maud::{html, Markup};

/// What the grid fragment needs, snapshotted from an `ImoveisGrid`.
pub struct GridVm<'a> {
    pub listings: &'a [Listing],
    pub loaded: usize,
    pub has_more: bool,
    pub error: Option<&'a str>,
    pub placeholder: &'a str,
}

pub fn imoveis_page(mode: FetchMode, filter: &FilterState, vm: &GridVm<'_>) -> Markup {
    desktop_layout(
        "Imóveis",
        html! {
            main class="container" {
                h1 { "Imóveis à venda" }
                (filter_form(mode, filter))
                (grid_fragment(vm))
            }
        },
    )
}

/// The swappable part of the page. htmx replaces `#imoveis-grid` wholesale,
/// both for filter changes and when the sentinel comes into view.
pub fn grid_fragment(vm: &GridVm<'_>) -> Markup {
    html! {
        section id="imoveis-grid" class="imoveis-grid" {
            @if let Some(message) = vm.error {
                (error_banner(message))
            }

            @if vm.listings.is_empty() {
                @if vm.error.is_none() && !vm.has_more {
                    p class="empty-state" { "Nenhum imóvel encontrado com esses filtros." }
                }
            } @else {
                p class="contagem" {
                    "Mostrando " strong { (vm.listings.len()) } " de " (vm.loaded) " imóveis carregados"
                }
                div class="grid" {
                    @for listing in vm.listings {
                        (listing_card(listing, vm.placeholder))
                    }
                }
            }

            @if vm.has_more {
                @if vm.error.is_some() {
                    // A failed page waits for the user instead of re-firing on swap.
                    div id=(SENTINEL_ID) class="sentinel sentinel-erro" {
                        button
                            type="button"
                            class="primary"
                            hx-get="/imoveis/mais"
                            hx-trigger="click"
                            hx-include=".filtros"
                            hx-target="#imoveis-grid"
                            hx-swap="outerHTML"
                        { "Tentar novamente" }
                    }
                } @else {
                    div
                        id=(SENTINEL_ID)
                        class="sentinel"
                        hx-get="/imoveis/mais"
                        hx-trigger="revealed"
                        hx-include=".filtros"
                        hx-target="#imoveis-grid"
                        hx-swap="outerHTML"
                    {
                        span class="spinner" aria-hidden="true" {}
                    }
                }
            }
        }
    }
}
