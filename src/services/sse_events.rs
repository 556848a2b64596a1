use serde::Serialize;
use tokio::{sync::broadcast::error::RecvError, task::JoinHandle};
use tracing::{debug, info};

use crate::{
    dto::{
        phase::ShowcaseStatus,
        sse::{AnnouncementEvent, RankingUpdatedEvent, ShowcaseChangedEvent, SystemStatus},
    },
    state::{SharedState, announcement::Announcement, ranking::RankingItem},
};

const EVENT_ANNOUNCEMENT: &str = "winner.announcement";
const EVENT_RANKING_UPDATED: &str = "ranking.updated";
const EVENT_SHOWCASE_CHANGED: &str = "showcase.changed";
const EVENT_SYSTEM_STATUS: &str = "system.status";

/// Mirror a winner announcement on both SSE streams.
pub fn broadcast_announcement(
    state: &SharedState,
    announcement: Announcement,
    issued_at: &str,
    delivered: usize,
) {
    let payload = AnnouncementEvent {
        place: announcement.place_number(),
        action: announcement.action(),
        issued_at: issued_at.to_string(),
        delivered,
    };
    send_public_event(state, EVENT_ANNOUNCEMENT, &payload);
    send_admin_event(state, EVENT_ANNOUNCEMENT, &payload);
}

/// Broadcast the full ranking after a replacement.
pub fn broadcast_ranking_updated(state: &SharedState, version: u64, ranking: &[RankingItem]) {
    let payload = RankingUpdatedEvent {
        version,
        ranking: ranking.to_vec(),
    };
    send_public_event(state, EVENT_RANKING_UPDATED, &payload);
}

/// Broadcast the controller view state.
pub fn broadcast_showcase_changed(state: &SharedState) {
    let snapshot = state.controller().snapshot();
    let payload = ShowcaseChangedEvent(ShowcaseStatus::from(&snapshot.showcase));
    send_public_event(state, EVENT_SHOWCASE_CHANGED, &payload);
    send_admin_event(state, EVENT_SHOWCASE_CHANGED, &payload);
}

/// Broadcast whether the ranking source is currently failing.
pub fn broadcast_system_status(state: &SharedState, degraded: bool) {
    let payload = SystemStatus { degraded };
    send_public_event(state, EVENT_SYSTEM_STATUS, &payload);
    send_admin_event(state, EVENT_SYSTEM_STATUS, &payload);
}

/// Forward controller view events and degraded flips to the SSE streams
/// until the controller view stops.
pub fn spawn_forwarders(state: SharedState) -> JoinHandle<()> {
    let mut events = state.controller().subscribe_events();
    let mut degraded = state.degraded_watcher();
    tokio::spawn(async move {
        loop {
            tokio::select! {
                received = events.recv() => match received {
                    Ok(event) => {
                        debug!(?event, "controller view event");
                        broadcast_showcase_changed(&state);
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        debug!(skipped, "controller view events lagged");
                        broadcast_showcase_changed(&state);
                    }
                    Err(RecvError::Closed) => break,
                },
                changed = degraded.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let value = *degraded.borrow_and_update();
                    broadcast_system_status(&state, value);
                }
            }
        }
        info!("SSE forwarders stopped");
    })
}

fn send_public_event(state: &SharedState, event: &str, payload: &impl Serialize) {
    state.public_sse().broadcast_json(event, payload);
}

fn send_admin_event(state: &SharedState, event: &str, payload: &impl Serialize) {
    state.admin_sse().broadcast_json(event, payload);
}
