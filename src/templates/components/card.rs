use crate::domain::listing::Listing;
use maud::{html, Markup};

/// "R$ 1.234.567,89"
pub fn format_brl(value: f64) -> String {
    let cents = (value.max(0.0) * 100.0).round() as u64;
    let reais = (cents / 100).to_string();
    let centavos = cents % 100;

    let mut grouped = String::with_capacity(reais.len() + reais.len() / 3);
    for (i, digit) in reais.chars().enumerate() {
        if i > 0 && (reais.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(digit);
    }

    format!("R$ {grouped},{centavos:02}")
}

pub fn listing_card(listing: &Listing, placeholder: &str) -> Markup {
    html! {
        article class="card imovel-card" data-id=(listing.id.0) {
            div class="imovel-thumb" {
                img src=(listing.thumbnail(placeholder)) alt=(listing.kind) loading="lazy";
                @if listing.favorited {
                    span class="favorito" title="Favorito" { "♥" }
                }
            }
            div class="card-body" {
                @if !listing.kind.is_empty() {
                    span class="badge" { (listing.kind) }
                }
                h2 class="preco" { (format_brl(listing.price)) }
                p class="endereco" { (listing.address.one_line()) }
                @if !listing.description.is_empty() {
                    p class="descricao" { (listing.description) }
                }
            }
        }
    }
}
