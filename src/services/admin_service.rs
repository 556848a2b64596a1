//! Business logic powering the admin REST routes: winner announcements and
//! ranking replacement. Announcements go through the dispatch gate so the
//! guard, the viewer fan-out and the controller view stay in lockstep.

use tracing::{info, warn};

use crate::{
    dto::{
        admin::{AnnounceResponse, RankingUpdateResponse},
        ws::ViewerOutboundMessage,
    },
    error::ServiceError,
    services::{sse_events, top_three::compute_top_three, websocket_service},
    state::{
        SharedState,
        announcement::Announcement,
        ranking::RankingItem,
        transitions::{Dispatched, GuardContext, run_announcement_with_broadcast},
    },
};

const NO_VIEWER_WARNING: &str = "no viewer connected; only the controller view applied it";

/// Broadcast a validated announcement to every viewer and the controller view.
pub async fn announce(
    state: &SharedState,
    announcement: Announcement,
) -> Result<AnnounceResponse, ServiceError> {
    let dispatched =
        run_announcement_with_broadcast(state, announcement, ensure_announcement_allowed).await?;
    Ok(to_response(dispatched))
}

/// Broadcast a full reset. Never rejected: even with nobody listening the
/// controller view resets and the revealed history is cleared.
pub async fn reset(state: &SharedState) -> Result<AnnounceResponse, ServiceError> {
    let dispatched = run_announcement_with_broadcast(state, Announcement::Reset, |_| Ok(())).await?;
    Ok(to_response(dispatched))
}

/// Replace the ranking snapshot and push it to every connected viewer.
pub async fn replace_ranking(
    state: &SharedState,
    ranking: Vec<RankingItem>,
) -> Result<RankingUpdateResponse, ServiceError> {
    Ok(apply_ranking(state, ranking).await)
}

/// Pull the ranking from the upstream source right now.
pub async fn refresh_ranking(state: &SharedState) -> Result<RankingUpdateResponse, ServiceError> {
    let client = state.ranking_client().ok_or(ServiceError::NotConfigured)?;
    match client.fetch().await {
        Ok(ranking) => {
            state.update_degraded(false);
            Ok(apply_ranking(state, ranking).await)
        }
        Err(err) => {
            warn!(error = %err, url = client.url(), "manual ranking refresh failed");
            state.update_degraded(true);
            Err(err.into())
        }
    }
}

/// Store `ranking` as the new snapshot, then notify viewers and SSE clients.
pub async fn apply_ranking(state: &SharedState, ranking: Vec<RankingItem>) -> RankingUpdateResponse {
    let teams = ranking.len();
    let (version, delivered) = state
        .replace_ranking(ranking, |items| {
            websocket_service::fan_out(
                state,
                &ViewerOutboundMessage::RankingUpdate {
                    ranking: items.to_vec(),
                },
            )
        })
        .await;

    let snapshot = state.ranking_snapshot().await;
    sse_events::broadcast_ranking_updated(state, snapshot.version(), snapshot.items());
    info!(teams, version, delivered, "ranking replaced");

    RankingUpdateResponse {
        teams,
        version,
        delivered,
    }
}

/// Admin-side ordering rules for `start_animation`; other actions pass.
///
/// Places are revealed from third to first. A place can start only while the
/// controller view is idle, when someone holds it, and while every place
/// revealed so far ranks below it.
fn ensure_announcement_allowed(ctx: &GuardContext<'_>) -> Result<(), ServiceError> {
    let Announcement::StartAnimation(place) = ctx.announcement else {
        return Ok(());
    };

    if ctx.controller.showcase.session.is_some() {
        return Err(ServiceError::InvalidState(
            "a showcase is already running".into(),
        ));
    }

    let podium = compute_top_three(ctx.ranking.items());
    if !podium.has(place) {
        return Err(ServiceError::InvalidState(format!(
            "no team holds place {place} yet"
        )));
    }

    if let Some(blocking) = ctx
        .revealed
        .iter()
        .find(|revealed| revealed.number() <= place.number())
    {
        return Err(ServiceError::InvalidState(format!(
            "place {place} cannot start after place {blocking} was revealed"
        )));
    }

    Ok(())
}

fn to_response(dispatched: Dispatched) -> AnnounceResponse {
    let Dispatched {
        announcement,
        delivered,
        issued_at,
        ..
    } = dispatched;

    let warning = (delivered == 0).then(|| {
        warn!(?announcement, "announcement reached no viewer");
        NO_VIEWER_WARNING.to_string()
    });

    AnnounceResponse {
        place: announcement.place_number(),
        action: announcement.action(),
        delivered,
        issued_at,
        warning,
    }
}

#[cfg(test)]
mod tests {
    use tokio::sync::mpsc;
    use uuid::Uuid;

    use super::*;
    use crate::{
        config::AppConfig,
        state::{AppState, ViewerConnection, announcement::Place},
    };

    async fn seeded() -> SharedState {
        let state = AppState::new(AppConfig::default());
        apply_ranking(
            &state,
            vec![
                RankingItem::new(1, "Alpha", 9.0),
                RankingItem::new(2, "Beta", 8.0),
                RankingItem::new(3, "Gamma", 7.0),
                RankingItem::new(4, "Delta", 6.0),
            ],
        )
        .await;
        state
    }

    fn connect_viewer(state: &SharedState) -> mpsc::UnboundedReceiver<axum::extract::ws::Message> {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = Uuid::new_v4();
        state.viewers().insert(id, ViewerConnection { id, tx });
        rx
    }

    #[tokio::test]
    async fn announcement_without_viewers_warns_but_applies() {
        let state = seeded().await;
        let response = announce(&state, Announcement::Reveal(Place::Third))
            .await
            .unwrap();
        assert_eq!(response.delivered, 0);
        assert!(response.warning.is_some());

        let snapshot = state.controller().snapshot();
        assert_eq!(snapshot.showcase.revealed_place, Some(Place::Third));
    }

    #[tokio::test]
    async fn announcement_reaches_connected_viewers() {
        let state = seeded().await;
        let mut rx = connect_viewer(&state);
        let response = announce(&state, Announcement::Reveal(Place::Third))
            .await
            .unwrap();
        assert_eq!(response.delivered, 1);
        assert!(response.warning.is_none());
        assert!(rx.recv().await.is_some());
    }

    #[tokio::test]
    async fn start_requires_a_winner() {
        let state = AppState::new(AppConfig::default());
        let err = announce(&state, Announcement::StartAnimation(Place::First))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidState(_)));
    }

    #[tokio::test]
    async fn places_are_revealed_from_third_to_first() {
        let state = seeded().await;
        announce(&state, Announcement::Reveal(Place::Second))
            .await
            .unwrap();

        let err = announce(&state, Announcement::StartAnimation(Place::Third))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidState(_)));
        let err = announce(&state, Announcement::StartAnimation(Place::Second))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidState(_)));

        assert!(
            announce(&state, Announcement::StartAnimation(Place::First))
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn start_is_rejected_while_a_showcase_runs() {
        let state = seeded().await;
        announce(&state, Announcement::StartAnimation(Place::Third))
            .await
            .unwrap();
        let err = announce(&state, Announcement::StartAnimation(Place::Second))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidState(_)));
    }

    #[tokio::test]
    async fn reset_clears_history_and_allows_restart() {
        let state = seeded().await;
        announce(&state, Announcement::Reveal(Place::First))
            .await
            .unwrap();
        let response = reset(&state).await.unwrap();
        assert_eq!(response.place, 0);
        assert!(state.revealed_places().await.is_empty());
        assert!(
            announce(&state, Announcement::StartAnimation(Place::Third))
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn ranking_replacement_is_pushed_to_viewers() {
        let state = AppState::new(AppConfig::default());
        let mut rx = connect_viewer(&state);
        let response =
            replace_ranking(&state, vec![RankingItem::new(7, "Solo", 5.0)]).await.unwrap();
        assert_eq!(response.teams, 1);
        assert_eq!(response.version, 1);
        assert_eq!(response.delivered, 1);

        let axum::extract::ws::Message::Text(text) = rx.recv().await.unwrap() else {
            panic!("expected text frame");
        };
        assert!(text.contains(r#""type":"ranking_update""#));
    }

    #[tokio::test]
    async fn refresh_without_upstream_is_not_configured() {
        let state = AppState::new(AppConfig::default());
        assert!(matches!(
            refresh_ranking(&state).await,
            Err(ServiceError::NotConfigured)
        ));
    }
}
