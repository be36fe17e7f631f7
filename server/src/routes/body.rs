use serde::Deserialize;

use crate::place::Score;

/// Names the place to toggle in a favourites or check-ins list.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceReference {
    pub place_id: Option<String>,
}

#[derive(Clone, Copy, Debug, Deserialize)]
pub struct ScoreSubmission {
    pub score: Option<Score>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct TipSubmission {
    pub text: Option<String>,
}
