// client.rs
use crate::api::models::{parse_favorite_ids, parse_page_envelope, PageEnvelope};
use crate::api::{ApiError, Session};
use crate::domain::listing::{Listing, ListingId};
use crate::grid::fetcher::{FetchMode, Page, PageFetcher};
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use url::Url;

const USER_AGENT: &str = concat!("imoveis-front/", env!("CARGO_PKG_VERSION"));

const LISTINGS_PATH: &str = "imoveis";
const PRICE_FILTER_PATH: &str = "imoveis/filtro/preco";
const FAVORITES_PATH: &str = "favoritos";

pub struct ImoveisClient {
    client: Client,
    base_url: Url,
    sort: String,
}

impl ImoveisClient {
    pub fn new(base_url: &str, timeout: Duration, sort: impl Into<String>) -> Result<Self, ApiError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        Ok(Self {
            client,
            base_url: normalize_base(base_url)?,
            sort: sort.into(),
        })
    }

    /// One page of listings. Never retries; the grid decides what to do on failure.
    pub fn fetch_page(
        &self,
        session: &Session,
        mode: &FetchMode,
        page_index: u32,
        page_size: usize,
    ) -> Result<Page, ApiError> {
        let url = self.page_url(mode, page_index, page_size)?;
        let start = Instant::now();

        debug!(%url, page = page_index, "fetching listings page");
        let body = self.get_text(session, url)?;
        let page = page_from_envelope(parse_page_envelope(&body)?, page_index, page_size);

        info!(
            page = page_index,
            received = page.received,
            kept = page.listings.len(),
            is_final = page.is_final,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "listings page fetched"
        );

        Ok(page)
    }

    pub fn favorite_ids(&self, session: &Session) -> Result<HashSet<ListingId>, ApiError> {
        let url = self
            .base_url
            .join(FAVORITES_PATH)
            .map_err(|e| ApiError::Endpoint(e.to_string()))?;

        let body = self.get_text(session, url)?;
        let ids = parse_favorite_ids(&body)?;
        debug!(count = ids.len(), "favorites loaded");
        Ok(ids)
    }

    pub(crate) fn page_url(
        &self,
        mode: &FetchMode,
        page_index: u32,
        page_size: usize,
    ) -> Result<Url, ApiError> {
        let path = match mode {
            FetchMode::All => LISTINGS_PATH,
            FetchMode::PriceCeiling(_) => PRICE_FILTER_PATH,
        };

        let mut url = self
            .base_url
            .join(path)
            .map_err(|e| ApiError::Endpoint(e.to_string()))?;

        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("page", &page_index.to_string())
                .append_pair("size", &page_size.to_string())
                .append_pair("sort", &self.sort);
            if let FetchMode::PriceCeiling(ceiling) = mode {
                query.append_pair("precoMax", &ceiling.to_string());
            }
        }

        Ok(url)
    }

    fn get_text(&self, session: &Session, url: Url) -> Result<String, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(token) = session.bearer() {
            let value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|e| ApiError::Endpoint(format!("invalid bearer token: {e}")))?;
            headers.insert(AUTHORIZATION, value);
        }

        let resp = self
            .client
            .get(url)
            .headers(headers)
            .send()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let status = resp.status();
        let text = resp
            .text()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        if !status.is_success() {
            return Err(ApiError::Server {
                status: status.as_u16(),
                body: text,
            });
        }

        Ok(text)
    }
}

/// Converts the raw envelope, dropping listings that cannot be shown.
/// A missing `last` flag is inferred from the raw entry count.
fn page_from_envelope(envelope: PageEnvelope, page_index: u32, page_size: usize) -> Page {
    let received = envelope.received;
    let is_final = envelope.last.unwrap_or(received < page_size);

    let listings: Vec<Listing> = envelope
        .content
        .iter()
        .filter_map(|dto| match Listing::from_dto(dto) {
            Ok(listing) => Some(listing),
            Err(reason) => {
                warn!(%reason, "skipping listing");
                None
            }
        })
        .collect();

    Page {
        index: page_index,
        listings,
        received,
        is_final,
    }
}

/// `Url::join` replaces the last path segment unless the base ends in `/`.
fn normalize_base(base_url: &str) -> Result<Url, ApiError> {
    let mut url = Url::parse(base_url).map_err(|e| ApiError::Endpoint(e.to_string()))?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// The production `PageFetcher`: the shared client plus the caller's session.
pub struct ApiFetcher {
    client: Arc<ImoveisClient>,
    session: Session,
}

impl ApiFetcher {
    pub fn new(client: Arc<ImoveisClient>, session: Session) -> Self {
        Self { client, session }
    }
}

impl PageFetcher for ApiFetcher {
    fn fetch_page(
        &self,
        mode: &FetchMode,
        page_index: u32,
        page_size: usize,
    ) -> Result<Page, ApiError> {
        self.client
            .fetch_page(&self.session, mode, page_index, page_size)
    }

    fn favorite_ids(&self) -> Result<HashSet<ListingId>, ApiError> {
        self.client.favorite_ids(&self.session)
    }
}
