/// Announcement vocabulary.
pub mod announcement;
/// Revealed winners ledger.
pub mod ledger;
/// Ranking data model.
pub mod ranking;
mod sse;
/// Showcase state machine.
pub mod state_machine;
/// Place themes.
pub mod theme;
/// Guarded announcement dispatch.
pub mod transitions;

use std::sync::Arc;

use axum::extract::ws::Message;
use dashmap::DashMap;
use tokio::sync::{Mutex, RwLock, RwLockReadGuard, mpsc, watch};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    config::AppConfig,
    services::{ranking_source::RankingClient, showcase_runtime::ShowcaseHandle},
    state::{
        announcement::{Announcement, Place},
        ranking::{RankingItem, RankingSnapshot},
    },
};

pub use self::sse::SseHub;
use self::sse::SseState;

/// Application state shared across handlers and tasks.
pub type SharedState = Arc<AppState>;

#[derive(Clone)]
/// Handle used to push messages to a connected viewer.
pub struct ViewerConnection {
    /// Socket identifier.
    pub id: Uuid,
    /// Writer queue of the socket.
    pub tx: mpsc::UnboundedSender<Message>,
}

/// Central application state: ranking snapshot, viewer sockets and the controller view.
pub struct AppState {
    config: Arc<AppConfig>,
    ranking: RwLock<RankingSnapshot>,
    ranking_client: Option<RankingClient>,
    sse: SseState,
    viewers: DashMap<Uuid, ViewerConnection>,
    revealed: RwLock<Vec<Place>>,
    controller: ShowcaseHandle,
    degraded: watch::Sender<bool>,
    announce_gate: Mutex<()>,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// Spawns the controller view, so this must run inside a tokio runtime.
    pub fn new(config: AppConfig) -> SharedState {
        let ranking_client = config
            .upstream()
            .and_then(|upstream| match RankingClient::new(&upstream.base_url) {
                Ok(client) => Some(client),
                Err(err) => {
                    warn!(error = %err, "failed to build upstream ranking client");
                    None
                }
            });
        let (controller, _task) = ShowcaseHandle::spawn(config.showcase().clone());
        let (degraded_tx, _rx) = watch::channel(false);

        Arc::new(Self {
            config: Arc::new(config),
            ranking: RwLock::new(RankingSnapshot::default()),
            ranking_client,
            sse: SseState::new(16, 16),
            viewers: DashMap::new(),
            revealed: RwLock::new(Vec::new()),
            controller,
            degraded: degraded_tx,
            announce_gate: Mutex::new(()),
        })
    }

    /// Immutable configuration loaded at startup.
    pub fn config(&self) -> Arc<AppConfig> {
        self.config.clone()
    }

    /// Client for the upstream judging backend, when configured.
    pub fn ranking_client(&self) -> Option<&RankingClient> {
        self.ranking_client.as_ref()
    }

    /// Clone of the current ranking snapshot.
    pub async fn ranking_snapshot(&self) -> RankingSnapshot {
        self.ranking.read().await.clone()
    }

    /// Hold the ranking snapshot steady while a viewer registers.
    pub async fn read_ranking(&self) -> RwLockReadGuard<'_, RankingSnapshot> {
        self.ranking.read().await
    }

    /// Replace the ranking wholesale and hand it to the controller view.
    ///
    /// `fan_out` runs while the write lock is held so viewers registering
    /// concurrently never miss the new snapshot.
    pub async fn replace_ranking<F>(&self, items: Vec<RankingItem>, fan_out: F) -> (u64, usize)
    where
        F: FnOnce(&[RankingItem]) -> usize,
    {
        let mut guard = self.ranking.write().await;
        guard.replace(items);
        if self.controller.replace_ranking(guard.items().to_vec()).is_err() {
            warn!("controller view stopped; ranking not forwarded");
        }
        let delivered = fan_out(guard.items());
        (guard.version(), delivered)
    }

    /// Serializes announcement processing and viewer registration.
    pub fn announce_gate(&self) -> &Mutex<()> {
        &self.announce_gate
    }

    /// Places announced since the last reset, in announcement order.
    pub async fn revealed_places(&self) -> Vec<Place> {
        self.revealed.read().await.clone()
    }

    /// Track which places late joiners must be told about.
    pub async fn record_announcement(&self, announcement: Announcement) {
        let mut revealed = self.revealed.write().await;
        match announcement {
            Announcement::Reset => revealed.clear(),
            Announcement::StartAnimation(place) | Announcement::Reveal(place) => {
                if !revealed.contains(&place) {
                    revealed.push(place);
                }
            }
        }
    }

    /// The admin's own view, running the same machine as every viewer.
    pub fn controller(&self) -> &ShowcaseHandle {
        &self.controller
    }

    /// Registry of active viewer sockets keyed by their identifier.
    pub fn viewers(&self) -> &DashMap<Uuid, ViewerConnection> {
        &self.viewers
    }

    /// Current degraded flag (upstream ranking source failing).
    pub fn is_degraded(&self) -> bool {
        *self.degraded.borrow()
    }

    /// Subscribe to degraded mode updates.
    pub fn degraded_watcher(&self) -> watch::Receiver<bool> {
        self.degraded.subscribe()
    }

    /// Update and broadcast the degraded flag when the value changes.
    pub fn update_degraded(&self, value: bool) {
        if self.is_degraded() == value {
            return;
        }
        info!(degraded = value, "degraded mode changed");
        self.degraded.send_replace(value);
    }

    /// Broadcast hub used for the public SSE stream.
    pub fn public_sse(&self) -> &SseHub {
        self.sse.public()
    }

    /// Broadcast hub used for the admin SSE stream.
    pub fn admin_sse(&self) -> &SseHub {
        self.sse.admin().hub()
    }

    /// Token guard that ensures a single admin SSE subscriber at a time.
    pub fn admin_token(&self) -> &Mutex<Option<String>> {
        self.sse.admin().token()
    }
}
