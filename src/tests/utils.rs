use crate::api::{ApiError, Session};
use crate::config::AppConfig;
use crate::domain::listing::{Address, Listing, ListingId};
use crate::grid::fetcher::{FetchMode, Page, PageFetcher};
use crate::state::{AppState, FetcherFactory};
use astra::{Body, Request, Response};
use http::Method;
use std::collections::HashSet;
use std::io::Read;
use std::sync::{Arc, Mutex};

pub const TOTAL_LISTINGS: i64 = 13;

/// In-memory stand-in for the listings API: 13 listings, odd ids are houses,
/// even ids apartments, listing 3 is in São Paulo. Favorites start as {2, 5}.
pub struct StubApi {
    pub calls: Mutex<Vec<(FetchMode, u32)>>,
    pub failing_pages: Mutex<HashSet<u32>>,
    pub sessions: Mutex<Vec<Session>>,
    pub favorites: Mutex<HashSet<ListingId>>,
}

impl Default for StubApi {
    fn default() -> Self {
        Self {
            calls: Mutex::default(),
            failing_pages: Mutex::default(),
            sessions: Mutex::default(),
            favorites: Mutex::new([ListingId(2), ListingId(5)].into_iter().collect()),
        }
    }
}

impl StubApi {
    pub fn set_favorites(&self, ids: &[i64]) {
        *self.favorites.lock().unwrap() = ids.iter().copied().map(ListingId).collect();
    }

    pub fn calls(&self) -> Vec<(FetchMode, u32)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn fail_page(&self, page: u32) {
        self.failing_pages.lock().unwrap().insert(page);
    }

    pub fn heal(&self) {
        self.failing_pages.lock().unwrap().clear();
    }
}

struct StubFetcher(Arc<StubApi>);

fn stub_listing(id: i64) -> Listing {
    Listing {
        id: ListingId(id),
        kind: if id % 2 == 1 { "Casa" } else { "Apartamento" }.to_string(),
        description: format!("Imóvel número {id}"),
        price: (id * 10_000) as f64,
        address: Address {
            street: format!("Rua {id}"),
            neighborhood: "Centro".into(),
            city: if id == 3 { "São Paulo" } else { "Campinas" }.into(),
            state: "SP".into(),
        },
        photos: vec![format!("/fotos/{id}.jpg")],
        favorited: false,
    }
}

impl PageFetcher for StubFetcher {
    fn fetch_page(
        &self,
        mode: &FetchMode,
        page_index: u32,
        page_size: usize,
    ) -> Result<Page, ApiError> {
        self.0.calls.lock().unwrap().push((*mode, page_index));

        if self.0.failing_pages.lock().unwrap().contains(&page_index) {
            return Err(ApiError::Server {
                status: 503,
                body: "indisponível".into(),
            });
        }

        let total = match mode {
            FetchMode::All => TOTAL_LISTINGS,
            FetchMode::PriceCeiling(ceiling) => TOTAL_LISTINGS.min((*ceiling / 10_000.0) as i64),
        };
        let start = page_index as i64 * page_size as i64 + 1;
        let end = (start + page_size as i64 - 1).min(total);

        let listings: Vec<Listing> = (start..=end).map(stub_listing).collect();
        Ok(Page {
            index: page_index,
            received: listings.len(),
            listings,
            is_final: end >= total,
        })
    }

    fn favorite_ids(&self) -> Result<HashSet<ListingId>, ApiError> {
        Ok(self.0.favorites.lock().unwrap().clone())
    }
}

pub fn test_state() -> (AppState, Arc<StubApi>) {
    let api = Arc::new(StubApi::default());
    let shared = Arc::clone(&api);

    let fetchers: FetcherFactory = Arc::new(move |session: Session| {
        shared.sessions.lock().unwrap().push(session);
        let fetcher: Box<dyn PageFetcher + Send> = Box::new(StubFetcher(Arc::clone(&shared)));
        fetcher
    });

    let config = AppConfig {
        placeholder_image: "/ph.png".into(),
        ..AppConfig::default()
    };

    (AppState::new(config, fetchers), api)
}

pub fn get(uri: &str, cookie: Option<&str>) -> Request {
    let mut req = Request::new(Body::empty());
    *req.method_mut() = Method::GET;
    *req.uri_mut() = uri.parse().unwrap();
    if let Some(cookie) = cookie {
        req.headers_mut()
            .insert("Cookie", cookie.parse().unwrap());
    }
    req
}

pub fn body_string(mut resp: Response) -> String {
    let mut bytes = Vec::new();
    resp.body_mut().reader().read_to_end(&mut bytes).unwrap();
    String::from_utf8(bytes).unwrap()
}

/// `grid=<id>` taken from the response's Set-Cookie, ready to send back.
pub fn grid_cookie_of(resp: &Response) -> Option<String> {
    resp.headers()
        .get("Set-Cookie")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(str::to_string)
}

pub fn card_count(html: &str) -> usize {
    html.matches(r#"class="card imovel-card""#).count()
}
