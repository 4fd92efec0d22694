use crate::domain::filter::{FilterState, PriceSort};
use crate::grid::fetcher::FetchMode;
use maud::{html, Markup};

pub const LISTING_KINDS: &[&str] = &[
    "Casa",
    "Apartamento",
    "Cobertura",
    "Kitnet",
    "Terreno",
    "Sala Comercial",
];

const SORT_OPTIONS: &[(PriceSort, &str)] = &[
    (PriceSort::None, "Mais recentes"),
    (PriceSort::Ascending, "Menor preço"),
    (PriceSort::Descending, "Maior preço"),
];

/// Filter bar. Any change re-requests the grid fragment; the search box
/// waits for typing to settle.
pub fn filter_form(mode: FetchMode, filter: &FilterState) -> Markup {
    let ceiling = match mode {
        FetchMode::PriceCeiling(c) => c.to_string(),
        FetchMode::All => String::new(),
    };
    let price_mode = matches!(mode, FetchMode::PriceCeiling(_));
    let kind = filter.kind.as_deref().unwrap_or("");

    html! {
        form
            class="filtros"
            method="get"
            action="/imoveis"
            hx-get="/imoveis/grade"
            hx-target="#imoveis-grid"
            hx-swap="outerHTML"
            hx-trigger="change, keyup changed delay:400ms from:input[name=busca]"
        {
            label class="sr-only" for="busca" { "Buscar" }
            input
                type="search"
                id="busca"
                name="busca"
                placeholder="Bairro, cidade, tipo..."
                value=(filter.search_term.as_deref().unwrap_or(""));

            select name="tipo" {
                option value="" selected[kind.is_empty()] { "Todos os tipos" }
                @for k in LISTING_KINDS {
                    option value=(k) selected[kind == *k] { (k) }
                }
            }

            select name="ordem" {
                @for (sort, label) in SORT_OPTIONS {
                    option value=(sort.as_param()) selected[filter.price_sort == *sort] { (label) }
                }
            }

            select name="modo" {
                option value="todos" selected[!price_mode] { "Qualquer preço" }
                option value="preco" selected[price_mode] { "Até um valor" }
            }
            input type="number" name="precoMax" min="0" step="1000" placeholder="Valor máximo" value=(ceiling);

            label class="toggle" {
                input type="checkbox" name="favoritos" value="1" checked[filter.favorites_only];
                " Só favoritos"
            }

            noscript { button type="submit" class="primary" { "Filtrar" } }
        }
    }
}
