// src/auth/cookies.rs
use crate::api::Session;
use astra::Request;
use std::collections::HashMap;

pub const GRID_COOKIE: &str = "grid";
pub const TOKEN_COOKIE: &str = "token";

/// All cookies on the request, later headers winning on duplicates.
pub fn parse_cookies(req: &Request) -> HashMap<String, String> {
    let mut map = HashMap::new();

    for header in req.headers().get_all("Cookie") {
        let Ok(raw) = header.to_str() else {
            continue;
        };
        for pair in raw.split(';') {
            let mut parts = pair.trim().splitn(2, '=');
            if let (Some(k), Some(v)) = (parts.next(), parts.next()) {
                if !k.is_empty() {
                    map.insert(k.to_string(), v.to_string());
                }
            }
        }
    }

    map
}

/// The caller's API session, taken from the `token` cookie.
pub fn session_from_cookies(cookies: &HashMap<String, String>) -> Session {
    cookies
        .get(TOKEN_COOKIE)
        .map(|t| Session::with_token(t.as_str()))
        .unwrap_or_default()
}

pub fn grid_cookie(grid_id: &str) -> String {
    format!("{GRID_COOKIE}={grid_id}; Path=/; HttpOnly; SameSite=Lax")
}
