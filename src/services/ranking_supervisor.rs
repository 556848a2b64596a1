use std::{future::Future, time::Duration};

use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::{
    services::{admin_service, ranking_source::RankingSourceError},
    state::{SharedState, ranking::RankingItem},
};

const INITIAL_DELAY: Duration = Duration::from_millis(1_000);
const MAX_DELAY: Duration = Duration::from_secs(10);

/// Poll the upstream ranking and keep the shared state in degraded mode while it fails.
///
/// The previous snapshot is kept on failure. A fetched ranking identical to
/// the current one is not re-broadcast.
pub async fn run<F, Fut>(state: SharedState, poll_interval: Duration, mut fetch: F)
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = Result<Vec<RankingItem>, RankingSourceError>> + Send,
{
    let mut delay = INITIAL_DELAY;

    loop {
        match fetch().await {
            Ok(ranking) => {
                if state.is_degraded() {
                    info!("ranking source healthy again; leaving degraded mode");
                }
                state.update_degraded(false);
                delay = INITIAL_DELAY;

                let unchanged = state.read_ranking().await.items() == ranking.as_slice();
                if unchanged {
                    debug!(teams = ranking.len(), "ranking unchanged");
                } else {
                    admin_service::apply_ranking(&state, ranking).await;
                }
                sleep(poll_interval).await;
            }
            Err(err) => {
                if !state.is_degraded() {
                    warn!(error = %err, "ranking fetch failed; entering degraded mode");
                } else {
                    warn!(error = %err, retry_in = ?delay, "ranking fetch failed");
                }
                state.update_degraded(true);
                sleep(delay).await;
                delay = (delay * 2).min(MAX_DELAY);
            }
        }
    }
}
