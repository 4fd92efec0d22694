// src/tests/router_tests/imoveis_tests.rs

use crate::api::Session;
use crate::errors::ServerError;
use crate::grid::fetcher::FetchMode;
use crate::grid::SENTINEL_ID;
use crate::router::handle;
use crate::tests::utils::{body_string, card_count, get, grid_cookie_of, test_state};

#[test]
fn first_visit_renders_first_page_and_sets_cookie() {
    let (state, api) = test_state();

    let resp = handle(get("/imoveis", None), &state).unwrap();
    assert_eq!(resp.status(), 200);

    let cookie = grid_cookie_of(&resp).expect("new session must set the grid cookie");
    assert!(cookie.starts_with("grid="));

    let body = body_string(resp);
    assert_eq!(card_count(&body), 8);
    assert!(body.contains(SENTINEL_ID));
    assert!(body.contains(r#"<form class="filtros""#));
    assert_eq!(api.calls(), vec![(FetchMode::All, 0)]);
}

#[test]
fn revealing_the_sentinel_loads_the_rest() {
    let (state, api) = test_state();

    let first = handle(get("/imoveis", None), &state).unwrap();
    let cookie = grid_cookie_of(&first).unwrap();

    let more = handle(get("/imoveis/mais", Some(&cookie)), &state).unwrap();
    assert!(grid_cookie_of(&more).is_none());

    let body = body_string(more);
    assert_eq!(card_count(&body), 13);
    assert!(!body.contains(SENTINEL_ID));
    assert!(!body.contains("<html"));

    // Nothing left: another reveal must not hit the API.
    let again = handle(get("/imoveis/mais", Some(&cookie)), &state).unwrap();
    assert_eq!(card_count(&body_string(again)), 13);
    assert_eq!(api.calls(), vec![(FetchMode::All, 0), (FetchMode::All, 1)]);
}

#[test]
fn local_filters_reuse_loaded_pages() {
    let (state, api) = test_state();
    let cookie = grid_cookie_of(&handle(get("/imoveis", None), &state).unwrap()).unwrap();

    let resp = handle(
        get("/imoveis/grade?tipo=Apartamento&ordem=desc", Some(&cookie)),
        &state,
    )
    .unwrap();
    let body = body_string(resp);

    // Ids 2, 4, 6, 8 from page 0, most expensive first.
    assert_eq!(card_count(&body), 4);
    let pos = |id: &str| body.find(&format!(r#"data-id="{id}""#)).unwrap();
    assert!(pos("8") < pos("6") && pos("6") < pos("4") && pos("4") < pos("2"));

    let resp = handle(get("/imoveis/grade?favoritos=1", Some(&cookie)), &state).unwrap();
    assert_eq!(card_count(&body_string(resp)), 2);

    assert_eq!(api.calls().len(), 1);
}

#[test]
fn search_restarts_the_session() {
    let (state, api) = test_state();
    let cookie = grid_cookie_of(&handle(get("/imoveis", None), &state).unwrap()).unwrap();
    handle(get("/imoveis/mais", Some(&cookie)), &state).unwrap();

    let resp = handle(get("/imoveis/grade?busca=sao%20paulo", Some(&cookie)), &state).unwrap();
    let body = body_string(resp);

    assert_eq!(card_count(&body), 1);
    assert!(body.contains(r#"data-id="3""#));
    assert_eq!(api.calls().last(), Some(&(FetchMode::All, 0)));
    assert_eq!(api.calls().len(), 3);
}

#[test]
fn price_ceiling_uses_price_mode() {
    let (state, api) = test_state();

    let resp = handle(get("/imoveis?modo=preco&precoMax=50000", None), &state).unwrap();
    let body = body_string(resp);

    assert_eq!(card_count(&body), 5);
    assert!(!body.contains(SENTINEL_ID));
    assert_eq!(api.calls(), vec![(FetchMode::PriceCeiling(50000.0), 0)]);
}

#[test]
fn failed_page_shows_banner_and_keeps_cards() {
    let (state, api) = test_state();
    let cookie = grid_cookie_of(&handle(get("/imoveis", None), &state).unwrap()).unwrap();

    api.fail_page(1);
    let body = body_string(handle(get("/imoveis/mais", Some(&cookie)), &state).unwrap());
    assert!(body.contains(r#"role="alert""#));
    assert!(body.contains("503"));
    assert_eq!(card_count(&body), 8);
    assert!(body.contains(SENTINEL_ID));
    assert!(body.contains("Tentar novamente"));
    assert!(!body.contains("revealed"));

    api.heal();
    let body = body_string(handle(get("/imoveis/mais", Some(&cookie)), &state).unwrap());
    assert!(!body.contains(r#"role="alert""#));
    assert_eq!(card_count(&body), 13);
}

#[test]
fn photos_render_and_token_reaches_fetcher() {
    let (state, api) = test_state();

    let body = body_string(handle(get("/imoveis", Some("token=abc123")), &state).unwrap());
    assert!(body.contains(r#"src="/fotos/1.jpg""#));
    assert_eq!(
        api.sessions.lock().unwrap().as_slice(),
        &[Session::with_token("abc123")]
    );
}

#[test]
fn unknown_routes_and_bad_params() {
    let (state, _api) = test_state();

    assert!(matches!(
        handle(get("/nope", None), &state),
        Err(ServerError::NotFound)
    ));
    assert!(matches!(
        handle(get("/imoveis?precoMax=caro", None), &state),
        Err(ServerError::BadRequest(_))
    ));
}

#[test]
fn health_is_plain_ok() {
    let (state, _api) = test_state();
    let resp = handle(get("/health", None), &state).unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(body_string(resp), "ok");
}

#[test]
fn load_more_on_expired_session_keeps_form_filters() {
    let (state, api) = test_state();

    let resp = handle(
        get("/imoveis/mais?modo=todos&precoMax=&busca=sao%20paulo&tipo=&ordem=", Some("grid=gone")),
        &state,
    )
    .unwrap();
    assert!(grid_cookie_of(&resp).is_some());

    let body = body_string(resp);
    assert_eq!(card_count(&body), 1);
    assert!(body.contains(r#"data-id="3""#));
    assert_eq!(api.calls(), vec![(FetchMode::All, 0)]);
}

#[test]
fn load_more_with_other_search_restarts_instead_of_paging() {
    let (state, api) = test_state();
    let cookie = grid_cookie_of(&handle(get("/imoveis", None), &state).unwrap()).unwrap();

    let resp = handle(get("/imoveis/mais?busca=sao%20paulo", Some(&cookie)), &state).unwrap();
    assert_eq!(card_count(&body_string(resp)), 1);
    assert_eq!(api.calls(), vec![(FetchMode::All, 0), (FetchMode::All, 0)]);

    let resp = handle(get("/imoveis/mais?busca=sao%20paulo", Some(&cookie)), &state).unwrap();
    assert_eq!(card_count(&body_string(resp)), 1);
    assert_eq!(api.calls().last(), Some(&(FetchMode::All, 1)));
}

#[test]
fn full_page_load_refreshes_favorites() {
    let (state, api) = test_state();

    let first = handle(get("/imoveis?favoritos=1", None), &state).unwrap();
    let cookie = grid_cookie_of(&first).unwrap();
    assert_eq!(card_count(&body_string(first)), 2);

    api.set_favorites(&[1, 3, 4]);
    let body = body_string(handle(get("/imoveis?favoritos=1", Some(&cookie)), &state).unwrap());
    assert_eq!(card_count(&body), 3);
    assert!(body.contains(r#"data-id="4""#));
    assert!(!body.contains(r#"data-id="2""#));

    assert_eq!(api.calls().len(), 1);
}

#[test]
fn new_token_rebuilds_the_grid() {
    let (state, api) = test_state();

    let first = handle(get("/imoveis", Some("token=antigo")), &state).unwrap();
    let cookie = grid_cookie_of(&first).unwrap();

    let again = handle(
        get("/imoveis", Some(&format!("{cookie}; token=novo"))),
        &state,
    )
    .unwrap();
    let new_cookie = grid_cookie_of(&again).expect("replaced grid must set a new cookie");
    assert_ne!(new_cookie, cookie);

    assert_eq!(
        api.sessions.lock().unwrap().as_slice(),
        &[Session::with_token("antigo"), Session::with_token("novo")]
    );
}
