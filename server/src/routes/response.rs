use serde::Serialize;
use uuid::Uuid;

use crate::detail::{PlaceDetail, ScoringUpdate};
use crate::summary::{PlaceSummary, RelatedPlace};
use crate::tip::{PlaceTip, UserTip};
use crate::user::{Session, UserProfile};

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum SuccessResponse<'a> {
    Created {
        message: &'a str,
        #[serde(skip_serializing_if = "Option::is_none")]
        id: Option<Uuid>,
    },
    Data {
        data: Payload,
    },
    Healthz {
        revision: Option<&'a str>,
        timestamp: Option<&'a str>,
        version: &'a str,
    },
}

impl<'a> SuccessResponse<'a> {
    pub fn data(payload: Payload) -> Self {
        SuccessResponse::Data { data: payload }
    }
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum Payload {
    Detail(PlaceDetail),
    PlaceTip(PlaceTip),
    PlaceTips(Vec<PlaceTip>),
    Places(Vec<PlaceSummary>),
    Related(Vec<RelatedPlace>),
    Scoring(ScoringUpdate),
    Session(Session),
    #[serde(rename_all = "camelCase")]
    Toggled {
        place_id: Uuid,
        present: bool,
    },
    Url(String),
    Urls(Vec<String>),
    User(UserProfile),
    UserTips(Vec<UserTip>),
}
