// src/domain/listing.rs

use crate::api::models::ListingDto;
use std::fmt;

/// Identifier assigned by the listings API. Stable across pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListingId(pub i64);

impl fmt::Display for ListingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Address {
    pub street: String,
    pub neighborhood: String,
    pub city: String,
    pub state: String,
}

impl Address {
    /// "Rua A, Centro - Recife/PE", skipping whatever is blank.
    pub fn one_line(&self) -> String {
        let head: Vec<&str> = [self.street.as_str(), self.neighborhood.as_str()]
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect();
        let tail: Vec<&str> = [self.city.as_str(), self.state.as_str()]
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect();

        match (head.is_empty(), tail.is_empty()) {
            (false, false) => format!("{} - {}", head.join(", "), tail.join("/")),
            (false, true) => head.join(", "),
            (true, false) => tail.join("/"),
            (true, true) => String::new(),
        }
    }
}

/// A property as the grid sees it: flattened out of the wire shape.
#[derive(Debug, Clone, PartialEq)]
pub struct Listing {
    pub id: ListingId,
    pub kind: String,
    pub description: String,
    pub price: f64,
    pub address: Address,
    pub photos: Vec<String>,
    /// Derived from the favorites set on every view recomputation, never sent by the API.
    pub favorited: bool,
}

impl Listing {
    /// Flattens the wire model. Only the id is mandatory; everything else
    /// degrades to empty so a sloppy record still renders.
    pub fn from_dto(dto: &ListingDto) -> Result<Self, String> {
        let id = dto.id.ok_or("Missing listing id")?;

        let address = dto
            .address
            .as_ref()
            .map(|a| Address {
                street: a.street.clone().unwrap_or_default(),
                neighborhood: a.neighborhood.clone().unwrap_or_default(),
                city: a.city.clone().unwrap_or_default(),
                state: a.state.clone().unwrap_or_default(),
            })
            .unwrap_or_default();

        let price = dto
            .price
            .filter(|p| p.is_finite() && *p >= 0.0)
            .unwrap_or(0.0);

        Ok(Listing {
            id: ListingId(id),
            kind: dto.kind.clone().unwrap_or_default(),
            description: dto.description.clone().unwrap_or_default(),
            price,
            address,
            photos: dto.photos.clone(),
            favorited: false,
        })
    }

    /// First photo, or the placeholder when there is none.
    pub fn thumbnail<'a>(&'a self, placeholder: &'a str) -> &'a str {
        self.photos
            .first()
            .map(String::as_str)
            .filter(|url| !url.trim().is_empty())
            .unwrap_or(placeholder)
    }
}
