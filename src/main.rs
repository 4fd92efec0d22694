use crate::api::ImoveisClient;
use crate::config::AppConfig;
use crate::router::handle;
use crate::state::AppState;
use astra::{Request, Server};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

mod api;
mod auth;
mod config;
mod domain;
mod errors;
mod grid;
mod responses;
mod router;
mod sessions;
mod state;
mod templates;

#[cfg(test)]
mod tests;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 1️⃣ Configuration
    let config = match AppConfig::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!(error = %e, "configuration failed");
            std::process::exit(1);
        }
    };

    // 2️⃣ Listings API client, shared by every grid
    let client = match ImoveisClient::new(&config.api_url, config.request_timeout, config.sort.clone()) {
        Ok(c) => Arc::new(c),
        Err(e) => {
            error!(error = %e, api_url = %config.api_url, "could not build API client");
            std::process::exit(1);
        }
    };

    // 3️⃣ Start the server
    let addr = config.bind_addr;
    let server = Server::bind(&addr).max_workers(config.max_workers);
    let state = Arc::new(AppState::with_api(config, client));

    info!(%addr, "starting server");

    let result = server.serve(move |req: Request, _info| {
        let method = req.method().clone();
        let path = req.uri().path().to_string();

        match handle(req, &state) {
            Ok(resp) => resp,
            Err(err) => {
                warn!(%method, %path, error = %err, "request failed");
                templates::html_error_response(err)
            }
        }
    });

    if let Err(e) = result {
        error!(error = %e, "server ended with error");
        std::process::exit(1);
    }

    info!("server shut down cleanly");
}
