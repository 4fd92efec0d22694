// state.rs
use crate::api::{ApiFetcher, ImoveisClient, Session};
use crate::config::AppConfig;
use crate::grid::fetcher::PageFetcher;
use crate::grid::trigger::RevealRegistry;
use crate::grid::ImoveisGrid;
use crate::sessions::{GridSessions, ServerGrid};
use std::sync::Arc;

/// Builds the fetcher a new grid talks through, for a given caller.
pub type FetcherFactory = Arc<dyn Fn(Session) -> Box<dyn PageFetcher + Send> + Send + Sync>;

/// Shared by every worker thread.
pub struct AppState {
    pub config: AppConfig,
    pub sessions: GridSessions,
    fetchers: FetcherFactory,
}

impl AppState {
    pub fn new(config: AppConfig, fetchers: FetcherFactory) -> Self {
        let sessions = GridSessions::new(config.session_ttl);
        Self {
            config,
            sessions,
            fetchers,
        }
    }

    /// Production wiring: every grid talks to the listings API.
    pub fn with_api(config: AppConfig, client: Arc<ImoveisClient>) -> Self {
        let fetchers: FetcherFactory = Arc::new(move |session: Session| {
            let fetcher: Box<dyn PageFetcher + Send> =
                Box::new(ApiFetcher::new(Arc::clone(&client), session));
            fetcher
        });
        Self::new(config, fetchers)
    }

    pub fn new_grid(&self, session: Session) -> ServerGrid {
        ImoveisGrid::new(
            (self.fetchers)(session),
            RevealRegistry::new(),
            self.config.page_size,
        )
    }
}
