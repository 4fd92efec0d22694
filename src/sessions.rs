// sessions.rs
use crate::api::Session;
use crate::auth::token::{generate_grid_id, looks_like_grid_id};
use crate::errors::ServerError;
use crate::grid::fetcher::PageFetcher;
use crate::grid::trigger::RevealRegistry;
use crate::grid::ImoveisGrid;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::{debug, info};

pub type ServerGrid = ImoveisGrid<Box<dyn PageFetcher + Send>, RevealRegistry>;
pub type SharedGrid = Arc<Mutex<ServerGrid>>;

struct Slot {
    grid: SharedGrid,
    /// Caller the grid's fetcher was built for.
    session: Session,
    last_seen: Instant,
}

pub struct Checkout {
    pub id: String,
    pub grid: SharedGrid,
    /// True when the grid was just built and still needs mounting.
    pub created: bool,
}

/// Live grids keyed by the `grid` cookie.
///
/// The map lock is only held for lookup and insert; each grid has its own
/// lock, held for the whole request so one browser's requests run in order.
pub struct GridSessions {
    slots: Mutex<HashMap<String, Slot>>,
    ttl: Duration,
}

impl GridSessions {
    pub fn new(ttl: Duration) -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    /// Returns the grid for `requested`, or a new one. A grid built for a
    /// different `session` (login, logout, new token) is replaced.
    pub fn checkout<C>(
        &self,
        requested: Option<&str>,
        session: &Session,
        create: C,
    ) -> Result<Checkout, ServerError>
    where
        C: FnOnce(Session) -> ServerGrid,
    {
        let now = Instant::now();
        let mut slots = self.slots.lock().map_err(|_| ServerError::InternalError)?;

        let ttl = self.ttl;
        let before = slots.len();
        slots.retain(|_, slot| now.duration_since(slot.last_seen) < ttl);
        if slots.len() < before {
            info!(evicted = before - slots.len(), "idle grid sessions evicted");
        }

        if let Some(id) = requested.filter(|id| looks_like_grid_id(id)) {
            if slots.get(id).is_some_and(|slot| slot.session != *session) {
                info!("caller session changed, replacing grid");
                slots.remove(id);
            }

            if let Some(slot) = slots.get_mut(id) {
                slot.last_seen = now;
                return Ok(Checkout {
                    id: id.to_string(),
                    grid: Arc::clone(&slot.grid),
                    created: false,
                });
            }
        }

        let id = generate_grid_id();
        let grid = Arc::new(Mutex::new(create(session.clone())));
        slots.insert(
            id.clone(),
            Slot {
                grid: Arc::clone(&grid),
                session: session.clone(),
                last_seen: now,
            },
        );
        debug!(active = slots.len(), "grid session created");

        Ok(Checkout {
            id,
            grid,
            created: true,
        })
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.slots.lock().map(|s| s.len()).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiError;
    use crate::domain::listing::ListingId;
    use crate::grid::fetcher::{FetchMode, Page};
    use std::collections::HashSet;

    struct Empty;

    impl PageFetcher for Empty {
        fn fetch_page(&self, _: &FetchMode, index: u32, _: usize) -> Result<Page, ApiError> {
            Ok(Page {
                index,
                listings: vec![],
                received: 0,
                is_final: true,
            })
        }

        fn favorite_ids(&self) -> Result<HashSet<ListingId>, ApiError> {
            Ok(HashSet::new())
        }
    }

    fn new_grid(_: Session) -> ServerGrid {
        let fetcher: Box<dyn PageFetcher + Send> = Box::new(Empty);
        ImoveisGrid::new(fetcher, RevealRegistry::new(), 8)
    }

    #[test]
    fn known_id_returns_same_grid() {
        let sessions = GridSessions::new(Duration::from_secs(60));
        let first = sessions.checkout(None, &Session::anonymous(), new_grid).unwrap();
        assert!(first.created);

        let again = sessions.checkout(Some(&first.id), &Session::anonymous(), new_grid).unwrap();
        assert!(!again.created);
        assert!(Arc::ptr_eq(&first.grid, &again.grid));
        assert_eq!(sessions.len(), 1);
    }

    #[test]
    fn unknown_id_gets_a_fresh_session() {
        let sessions = GridSessions::new(Duration::from_secs(60));
        let out = sessions.checkout(Some("forged"), &Session::anonymous(), new_grid).unwrap();
        assert!(out.created);
        assert_ne!(out.id, "forged");
    }

    #[test]
    fn idle_sessions_are_evicted() {
        let sessions = GridSessions::new(Duration::ZERO);
        let first = sessions.checkout(None, &Session::anonymous(), new_grid).unwrap();

        let again = sessions.checkout(Some(&first.id), &Session::anonymous(), new_grid).unwrap();
        assert!(again.created);
        assert_eq!(sessions.len(), 1);
    }

    #[test]
    fn new_token_replaces_the_grid() {
        let sessions = GridSessions::new(Duration::from_secs(60));
        let first = sessions
            .checkout(None, &Session::anonymous(), new_grid)
            .unwrap();

        let logged_in = Session::with_token("abc");
        let again = sessions
            .checkout(Some(&first.id), &logged_in, new_grid)
            .unwrap();
        assert!(again.created);
        assert_ne!(again.id, first.id);
        assert_eq!(sessions.len(), 1);

        let same = sessions.checkout(Some(&again.id), &logged_in, new_grid).unwrap();
        assert!(!same.created);
    }
}
