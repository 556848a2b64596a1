//! Passive viewer: follows the winners socket of a server and drives its own
//! showcase from the announcements it receives.

use std::time::Duration;

use futures::{SinkExt, StreamExt};
use thiserror::Error;
use tokio::time::sleep;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, info, warn};

use crate::{
    dto::ws::{ViewerInboundMessage, ViewerOutboundMessage},
    services::showcase_runtime::{RuntimeClosed, ShowcaseHandle},
};

const RECONNECT_DELAY: Duration = Duration::from_secs(2);

/// Why a viewer session ended.
#[derive(Debug, Error)]
pub enum ViewerError {
    /// The local showcase stopped, so there is nothing left to drive.
    #[error(transparent)]
    Runtime(#[from] RuntimeClosed),
    /// The socket failed.
    #[error("websocket error")]
    Socket(#[from] tokio_tungstenite::tungstenite::Error),
}

/// Connect to `url` and feed `handle` until the local showcase stops,
/// reconnecting whenever the server goes away.
pub async fn run(url: String, handle: ShowcaseHandle) {
    loop {
        match session(&url, &handle).await {
            Ok(()) => info!(%url, "winners socket closed by server"),
            Err(ViewerError::Runtime(_)) => {
                info!("showcase stopped; viewer exiting");
                return;
            }
            Err(err) => warn!(%url, error = %err, "winners socket failed"),
        }
        sleep(RECONNECT_DELAY).await;
    }
}

async fn session(url: &str, handle: &ShowcaseHandle) -> Result<(), ViewerError> {
    let (stream, _) = connect_async(url).await?;
    info!(%url, "connected to winners socket");
    let (mut write, mut read) = stream.split();

    if handle.snapshot().ranking_version == 0 {
        let request = serde_json::to_string(&ViewerInboundMessage::GetRanking)
            .map_err(|err| warn!(error = %err, "failed to serialize get_ranking"))
            .ok();
        if let Some(request) = request {
            write.send(Message::Text(request.into())).await?;
        }
    }

    while let Some(message) = read.next().await {
        match message? {
            Message::Text(text) => handle_text(handle, &text).await?,
            Message::Ping(payload) => write.send(Message::Pong(payload)).await?,
            Message::Close(_) => break,
            _ => {}
        }
    }
    Ok(())
}

/// Apply one server message to the local showcase.
///
/// Malformed or invalid messages are logged and dropped.
pub async fn handle_text(handle: &ShowcaseHandle, text: &str) -> Result<(), RuntimeClosed> {
    let message = match serde_json::from_str::<ViewerOutboundMessage>(text) {
        Ok(message) => message,
        Err(err) => {
            warn!(error = %err, payload = %text, "ignoring malformed server message");
            return Ok(());
        }
    };

    match message {
        ViewerOutboundMessage::InitialRanking { ranking }
        | ViewerOutboundMessage::RankingUpdate { ranking } => {
            debug!(teams = ranking.len(), "ranking received");
            handle.replace_ranking(ranking)
        }
        announcement @ ViewerOutboundMessage::WinnerAnnouncement { .. } => {
            match announcement.as_announcement() {
                Some(Ok(announcement)) => {
                    debug!(?announcement, "announcement received");
                    handle.announce(announcement).await.map(|_| ())
                }
                Some(Err(err)) => {
                    warn!(error = %err, "ignoring invalid announcement");
                    Ok(())
                }
                None => Ok(()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{
        announcement::Place,
        state_machine::{ShowcasePhase, ShowcaseSettings},
    };

    #[tokio::test(start_paused = true)]
    async fn ranking_then_start_runs_a_showcase() {
        let (handle, _task) = ShowcaseHandle::spawn(ShowcaseSettings::default());
        handle_text(
            &handle,
            r#"{"type":"initial_ranking","ranking":[{"team_id":1,"display_name":"Alpha","average_score":9.0},{"team_id":2,"display_name":"Beta","average_score":8.0}]}"#,
        )
        .await
        .unwrap();
        handle_text(
            &handle,
            r#"{"type":"winner_announcement","place":1,"action":"start_animation"}"#,
        )
        .await
        .unwrap();

        let snapshot = handle.snapshot();
        assert_eq!(snapshot.ranking_len, 2);
        assert_eq!(snapshot.showcase.phase, ShowcasePhase::Carousel);
        assert!(snapshot.overlay.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn bad_messages_are_ignored() {
        let (handle, _task) = ShowcaseHandle::spawn(ShowcaseSettings::default());
        handle_text(&handle, "not json").await.unwrap();
        handle_text(
            &handle,
            r#"{"type":"winner_announcement","place":0,"action":"reveal"}"#,
        )
        .await
        .unwrap();
        handle_text(
            &handle,
            r#"{"type":"winner_announcement","place":7,"action":"start_animation"}"#,
        )
        .await
        .unwrap();
        assert_eq!(handle.snapshot().showcase.phase, ShowcasePhase::Idle);
        assert_eq!(handle.snapshot().showcase.revealed_place, None);
    }

    #[tokio::test(start_paused = true)]
    async fn reveal_without_ranking_marks_the_place_only() {
        let (handle, _task) = ShowcaseHandle::spawn(ShowcaseSettings::default());
        handle_text(
            &handle,
            r#"{"type":"winner_announcement","place":2,"action":"reveal"}"#,
        )
        .await
        .unwrap();
        let snapshot = handle.snapshot();
        assert_eq!(snapshot.showcase.revealed_place, Some(Place::Second));
        assert!(snapshot.showcase.revealed_teams.is_empty());
    }

    #[tokio::test]
    async fn stopped_runtime_is_reported() {
        let (handle, task) = ShowcaseHandle::spawn(ShowcaseSettings::default());
        handle.shutdown();
        task.await.unwrap();
        let result = handle_text(
            &handle,
            r#"{"type":"ranking_update","ranking":[]}"#,
        )
        .await;
        assert!(result.is_err());
    }
}
