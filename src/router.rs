use crate::auth::cookies::{grid_cookie, parse_cookies, session_from_cookies, GRID_COOKIE};
use crate::domain::filter::{FilterState, PriceSort};
use crate::errors::ServerError;
use crate::grid::fetcher::FetchMode;
use crate::grid::SENTINEL_ID;
use crate::responses::{html_response_with_cookie, text_response, ResultResp};
use crate::sessions::{Checkout, ServerGrid};
use crate::state::AppState;
use crate::templates::pages::{grid_fragment, imoveis_page, GridVm};
use astra::Request;
use std::collections::HashMap;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Render {
    FullPage,
    Fragment,
}

pub fn handle(req: Request, state: &AppState) -> ResultResp {
    let method = req.method().as_str();
    let path = req.uri().path();

    match (method, path) {
        ("GET", "/health") => text_response(200, "ok"),
        ("GET", "/") | ("GET", "/imoveis") => show_grid(&req, state, Render::FullPage),
        ("GET", "/imoveis/grade") => show_grid(&req, state, Render::Fragment),
        ("GET", "/imoveis/mais") => load_more(&req, state),
        _ => Err(ServerError::NotFound),
    }
}

/// Page load or filter change.
fn show_grid(req: &Request, state: &AppState, render: Render) -> ResultResp {
    let (mode, filter) = parse_grid_params(&parse_query(req))?;
    let checkout = checkout_grid(req, state)?;

    let mut grid = checkout
        .grid
        .lock()
        .map_err(|_| ServerError::InternalError)?;

    if checkout.created {
        grid.mount_with(mode, filter);
    } else {
        if render == Render::FullPage {
            grid.refresh_favorites();
        }
        grid.set_filters(mode, filter);
    }

    respond(&grid, state, render, &checkout)
}

/// The sentinel scrolled into view, or the retry button was clicked.
/// Carries the filter form's fields so the grid matches what the user sees.
fn load_more(req: &Request, state: &AppState) -> ResultResp {
    let params = parse_query(req);
    let requested = if params.is_empty() {
        None
    } else {
        Some(parse_grid_params(&params)?)
    };
    let checkout = checkout_grid(req, state)?;

    let mut grid = checkout
        .grid
        .lock()
        .map_err(|_| ServerError::InternalError)?;

    match (checkout.created, requested) {
        // Session expired between page load and scroll; start over.
        (true, Some((mode, filter))) => {
            grid.mount_with(mode, filter);
        }
        (true, None) => {
            grid.mount();
        }
        (false, requested) => {
            let restarted = requested.and_then(|(mode, filter)| grid.set_filters(mode, filter));
            if let Some(outcome) = restarted {
                debug!(?outcome, "filters differed from the grid, restarted");
            } else {
                let observed = grid.observer().reveal(SENTINEL_ID);
                let outcome = grid.poll();
                debug!(observed, ?outcome, "sentinel revealed");
            }
        }
    }

    respond(&grid, state, Render::Fragment, &checkout)
}

fn checkout_grid(req: &Request, state: &AppState) -> Result<Checkout, ServerError> {
    let cookies = parse_cookies(req);
    let session = session_from_cookies(&cookies);

    state.sessions.checkout(
        cookies.get(GRID_COOKIE).map(String::as_str),
        &session,
        |session| state.new_grid(session),
    )
}

fn respond(grid: &ServerGrid, state: &AppState, render: Render, checkout: &Checkout) -> ResultResp {
    let view = grid.view();
    let vm = GridVm {
        listings: &view,
        loaded: grid.state().listings.len(),
        has_more: grid.state().has_more,
        error: grid.error(),
        placeholder: &state.config.placeholder_image,
    };

    let markup = match render {
        Render::FullPage => imoveis_page(grid.mode(), grid.filter(), &vm),
        Render::Fragment => grid_fragment(&vm),
    };

    let cookie = checkout.created.then(|| grid_cookie(&checkout.id));
    html_response_with_cookie(markup, cookie)
}

fn parse_query(req: &Request) -> HashMap<String, String> {
    req.uri()
        .query()
        .map(|q| url::form_urlencoded::parse(q.as_bytes()).into_owned().collect())
        .unwrap_or_default()
}

/// `modo`, `precoMax`, `busca`, `tipo`, `ordem`, `favoritos`.
fn parse_grid_params(params: &HashMap<String, String>) -> Result<(FetchMode, FilterState), ServerError> {
    let non_empty = |key: &str| {
        params
            .get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    };

    let price_mode = params.get("modo").map(|m| m.trim()) != Some("todos");
    let mode = match non_empty("precoMax") {
        Some(raw) if price_mode => {
            let ceiling: f64 = raw
                .parse()
                .map_err(|_| ServerError::BadRequest(format!("precoMax inválido: {raw}")))?;
            if !ceiling.is_finite() || ceiling < 0.0 {
                return Err(ServerError::BadRequest(format!("precoMax inválido: {raw}")));
            }
            FetchMode::PriceCeiling(ceiling)
        }
        _ => FetchMode::All,
    };

    let filter = FilterState {
        kind: non_empty("tipo"),
        price_sort: params
            .get("ordem")
            .map(|o| PriceSort::from_param(o))
            .unwrap_or_default(),
        search_term: non_empty("busca"),
        favorites_only: matches!(
            params.get("favoritos").map(|f| f.trim()),
            Some("1") | Some("true") | Some("on")
        ),
    };

    Ok((mode, filter))
}
