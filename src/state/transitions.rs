use crate::{
    dto::{now_rfc3339, ws::ViewerOutboundMessage},
    error::ServiceError,
    services::{showcase_runtime::ViewerSnapshot, sse_events, websocket_service},
    state::{
        SharedState,
        announcement::{Announcement, Place},
        ranking::RankingSnapshot,
        state_machine::ShowcaseEvent,
    },
};

/// What an announcement guard gets to look at.
pub struct GuardContext<'a> {
    /// Announcement being dispatched.
    pub announcement: Announcement,
    /// Controller view before the announcement.
    pub controller: &'a ViewerSnapshot,
    /// Places revealed since the last reset.
    pub revealed: &'a [Place],
    /// Current ranking snapshot.
    pub ranking: &'a RankingSnapshot,
}

/// Result of one dispatched announcement.
#[derive(Debug)]
pub struct Dispatched {
    /// Dispatched announcement.
    pub announcement: Announcement,
    /// Viewer sockets the announcement was queued on.
    pub delivered: usize,
    /// RFC 3339 timestamp of the dispatch.
    pub issued_at: String,
    /// Controller view events produced by the announcement.
    pub events: Vec<ShowcaseEvent>,
}

/// Check, record, fan out and apply one announcement as a single step.
///
/// Viewers receive the announcement before the controller view applies it.
/// A fan-out reaching nobody is not an error: the controller view still
/// applies the announcement and the caller decides how to report it.
pub async fn run_announcement_with_broadcast<G>(
    state: &SharedState,
    announcement: Announcement,
    guard: G,
) -> Result<Dispatched, ServiceError>
where
    G: FnOnce(&GuardContext<'_>) -> Result<(), ServiceError>,
{
    let _gate = state.announce_gate().lock().await;

    {
        let controller = state.controller().snapshot();
        let revealed = state.revealed_places().await;
        let ranking = state.ranking_snapshot().await;
        guard(&GuardContext {
            announcement,
            controller: &controller,
            revealed: &revealed,
            ranking: &ranking,
        })?;
    }

    state.record_announcement(announcement).await;
    let delivered =
        websocket_service::fan_out(state, &ViewerOutboundMessage::announcement(announcement));
    let events = state.controller().announce(announcement).await?;
    let issued_at = now_rfc3339();
    sse_events::broadcast_announcement(state, announcement, &issued_at, delivered);

    Ok(Dispatched {
        announcement,
        delivered,
        issued_at,
        events,
    })
}
