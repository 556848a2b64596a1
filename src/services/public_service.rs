//! Service helpers that expose read-only public projections of the podium.

use crate::{
    dto::{
        phase::ShowcaseStatus,
        public::{PodiumResponse, RankingResponse, ShowcaseResponse},
    },
    services::top_three::compute_top_three,
    state::{SharedState, theme::PlaceTheme},
};

/// Return the current ranking snapshot.
pub async fn get_ranking(state: &SharedState) -> RankingResponse {
    let snapshot = state.ranking_snapshot().await;
    RankingResponse {
        version: snapshot.version(),
        ranking: snapshot.items().to_vec(),
    }
}

/// Return the podium buckets and the places announced since the last reset.
pub async fn get_podium(state: &SharedState) -> PodiumResponse {
    let podium = {
        let ranking = state.read_ranking().await;
        compute_top_three(ranking.items())
    };
    let revealed_places = state
        .revealed_places()
        .await
        .into_iter()
        .map(|place| place.number())
        .collect();

    PodiumResponse {
        podium,
        revealed_places,
    }
}

/// Theme configured for `place`; unknown places get the finalist theme.
pub fn get_theme(state: &SharedState, place: u8) -> PlaceTheme {
    state.config().showcase().themes.get(place).clone()
}

/// Controller view state together with the frame it would draw right now.
pub fn get_showcase(state: &SharedState) -> ShowcaseResponse {
    let snapshot = state.controller().snapshot();
    ShowcaseResponse {
        status: ShowcaseStatus::from(&snapshot.showcase),
        overlay: snapshot.overlay,
    }
}
