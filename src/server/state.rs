use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use kinship_friend_requests::FriendRequests;
use kinship_graph_store::GraphWriter;
use kinship_recommender::Recommender;
use parking_lot::Mutex;

use crate::app_settings::{Config, SearchConfig};

pub type SharedStore = Arc<dyn GraphWriter>;

#[derive(Clone)]
pub struct ServeState {
    pub(crate) store: SharedStore,
    pub(crate) friend_requests: Arc<FriendRequests<dyn GraphWriter>>,
    pub(crate) recommender: Arc<Recommender<dyn GraphWriter>>,
    pub(crate) request_timeout: Duration,
    pub(crate) search: SearchConfig,
    pub(crate) health: Arc<ServeHealth>,
}

impl ServeState {
    pub fn new(store: SharedStore, config: &Config) -> Self {
        Self::with_health(store, config, Arc::new(ServeHealth::new()))
    }

    pub fn with_health(store: SharedStore, config: &Config, health: Arc<ServeHealth>) -> Self {
        let friend_requests = Arc::new(FriendRequests::new(Arc::clone(&store)));
        let recommender = Arc::new(
            Recommender::new(Arc::clone(&store))
                .with_weights(config.recommendation.weights())
                .with_max_results(config.recommendation.max_results),
        );
        Self {
            store,
            friend_requests,
            recommender,
            request_timeout: Duration::from_millis(config.server.request_timeout_ms),
            search: config.search.clone(),
            health,
        }
    }

    pub fn health(&self) -> &ServeHealth {
        &self.health
    }
}

#[derive(Default)]
pub struct ServeHealth {
    live: AtomicBool,
    ready: AtomicBool,
    last_ready_check: AtomicU64,
    last_error: Mutex<Option<String>>,
}

pub(crate) struct ServeHealthSnapshot {
    pub(crate) ready: bool,
    pub(crate) live: bool,
    pub(crate) last_ready_check: Option<u64>,
    pub(crate) last_error: Option<String>,
}

impl ServeHealth {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_live(&self) {
        self.live.store(true, Ordering::SeqCst);
    }

    pub fn mark_ready(&self) {
        self.ready.store(true, Ordering::SeqCst);
        self.update_last_check();
        *self.last_error.lock() = None;
    }

    pub fn mark_unready(&self, error: impl Into<String>) {
        self.ready.store(false, Ordering::SeqCst);
        self.update_last_check();
        *self.last_error.lock() = Some(error.into());
    }

    pub(crate) fn snapshot(&self) -> ServeHealthSnapshot {
        ServeHealthSnapshot {
            ready: self.ready.load(Ordering::SeqCst),
            live: self.live.load(Ordering::SeqCst),
            last_ready_check: match self.last_ready_check.load(Ordering::SeqCst) {
                0 => None,
                value => Some(value),
            },
            last_error: self.last_error.lock().clone(),
        }
    }

    fn update_last_check(&self) {
        if let Ok(duration) = SystemTime::now().duration_since(UNIX_EPOCH) {
            self.last_ready_check
                .store(duration.as_secs(), Ordering::SeqCst);
        }
    }
}
