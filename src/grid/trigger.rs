use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

pub type OnVisible = Arc<dyn Fn() + Send + Sync>;

/// Something that can tell us when an element scrolls into view.
pub trait VisibilityObserver {
    fn observe(&self, target: &str, on_visible: OnVisible) -> Subscription;
}

/// Handle for an active observation. Dropping it stops the observation.
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    pub fn unsubscribe(mut self) {
        self.cancel_now();
    }

    fn cancel_now(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel_now();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerState {
    Idle,
    FetchPending,
}

/// Turns sentinel visibility into "load the next page" decisions.
///
/// The observer callback only raises a flag; the grid polls it with
/// [`ScrollTrigger::try_fire`] so all state changes stay on the grid's owner.
pub struct ScrollTrigger {
    target: String,
    state: TriggerState,
    visible: Arc<AtomicBool>,
    subscription: Option<Subscription>,
}

impl ScrollTrigger {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            state: TriggerState::Idle,
            visible: Arc::new(AtomicBool::new(false)),
            subscription: None,
        }
    }

    pub fn state(&self) -> TriggerState {
        self.state
    }

    pub fn is_attached(&self) -> bool {
        self.subscription.is_some()
    }

    /// Observe while there is more to load; stop observing once there isn't.
    pub fn sync<O: VisibilityObserver + ?Sized>(&mut self, has_more: bool, observer: &O) {
        match (has_more, self.subscription.is_some()) {
            (true, false) => {
                let flag = Arc::clone(&self.visible);
                let on_visible: OnVisible = Arc::new(move || flag.store(true, Ordering::SeqCst));
                self.subscription = Some(observer.observe(&self.target, on_visible));
                debug!(sentinel = %self.target, "sentinel observed");
            }
            (false, true) => {
                if let Some(sub) = self.subscription.take() {
                    sub.unsubscribe();
                }
                self.visible.store(false, Ordering::SeqCst);
                debug!(sentinel = %self.target, "sentinel detached");
            }
            _ => {}
        }
    }

    /// Consumes a pending visibility signal and moves Idle -> FetchPending
    /// when a fetch is allowed. Returns whether the caller should fetch.
    pub fn try_fire(&mut self, has_more: bool, loading: bool) -> bool {
        let visible = self.visible.swap(false, Ordering::SeqCst);
        if !visible || self.subscription.is_none() {
            return false;
        }
        if self.state == TriggerState::FetchPending || !has_more || loading {
            return false;
        }
        self.state = TriggerState::FetchPending;
        true
    }

    /// FetchPending -> Idle, whatever the fetch outcome.
    pub fn resolve(&mut self) {
        self.state = TriggerState::Idle;
    }
}

/// Observer driven by explicit reveal notifications.
///
/// The browser runs the real intersection observer (htmx `revealed`); its
/// request ends up in [`RevealRegistry::reveal`].
#[derive(Clone, Default)]
pub struct RevealRegistry {
    inner: Arc<Mutex<HashMap<String, (u64, OnVisible)>>>,
    next_id: Arc<AtomicU64>,
}

impl RevealRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fires the callback registered for `target`. Returns false when nothing observes it.
    pub fn reveal(&self, target: &str) -> bool {
        let callback = match self.inner.lock() {
            Ok(map) => map.get(target).map(|(_, cb)| Arc::clone(cb)),
            Err(_) => {
                warn!(sentinel = target, "reveal registry lock poisoned");
                None
            }
        };

        match callback {
            Some(cb) => {
                cb();
                true
            }
            None => false,
        }
    }

    pub fn is_observing(&self, target: &str) -> bool {
        self.inner
            .lock()
            .map(|map| map.contains_key(target))
            .unwrap_or(false)
    }
}

impl VisibilityObserver for RevealRegistry {
    fn observe(&self, target: &str, on_visible: OnVisible) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut map) = self.inner.lock() {
            map.insert(target.to_string(), (id, on_visible));
        }

        let inner = Arc::clone(&self.inner);
        let target = target.to_string();
        Subscription::new(move || {
            if let Ok(mut map) = inner.lock() {
                // A newer observation of the same target must survive.
                if map.get(&target).is_some_and(|(current, _)| *current == id) {
                    map.remove(&target);
                }
            }
        })
    }
}
