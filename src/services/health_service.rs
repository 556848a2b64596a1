use tracing::warn;

use crate::{dto::health::HealthResponse, state::SharedState};

/// Report `degraded` while the upstream ranking source is failing.
pub fn health_status(state: &SharedState) -> HealthResponse {
    if state.is_degraded() {
        if let Some(client) = state.ranking_client() {
            warn!(url = client.url(), "ranking source unavailable (degraded mode)");
        }
        HealthResponse::degraded()
    } else {
        HealthResponse::ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::AppConfig, state::AppState};

    #[tokio::test]
    async fn reflects_degraded_flag() {
        let state = AppState::new(AppConfig::default());
        assert_eq!(health_status(&state).status, "ok");
        state.update_degraded(true);
        assert_eq!(health_status(&state).status, "degraded");
    }
}
