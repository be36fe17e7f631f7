use std::time::{Duration, Instant};

use log::debug;
use warp::{
    filters::multipart::FormData,
    http::StatusCode,
    reject,
    reply::{json, with_header, with_status, Reply},
};

use crate::environment::Environment;
use crate::errors::BackendError;
use crate::io::parse_picture;
use crate::logic::places::PlaceSubmission;
use crate::logic::users::{Credentials, Registration};
use crate::logic::{pictures, places, relations, tips, users};
use crate::routes::{
    auth::{authorize, parse_id},
    body::{PlaceReference, ScoreSubmission, TipSubmission},
    query::SearchQuery,
    rejection::{Context, Rejection},
    response::{Payload, SuccessResponse},
};
use crate::user::Relation;

const SERVER_TIMING_HEADER: &str = "server-timing";
type RouteResult = Result<Box<dyn Reply>, reject::Rejection>;

macro_rules! timed {
    ($($expression:stmt);+) => {
        let start = Instant::now();

        // TODO when `try` blocks are stabilized, we can wrap the body
        // and return the headers even on errors
        let result = { $($expression)+ };

        Ok(Box::new(with_header(
            result,
            SERVER_TIMING_HEADER,
            format_server_timing(start.elapsed()),
        )) as Box<dyn Reply>)
    };
}

pub async fn register(environment: Environment, registration: Registration) -> RouteResult {
    timed! {
        let id = users::register_user(&environment, registration)
            .await
            .map_err(|e| Rejection::new(Context::register(), e))?;

        debug!(environment.logger, "Registered user"; "user_id" => %id);
        with_status(
            json(&SuccessResponse::Created { message: "User created", id: None }),
            StatusCode::CREATED,
        )
    }
}

pub async fn authenticate(environment: Environment, credentials: Credentials) -> RouteResult {
    timed! {
        let session = users::authenticate_user(&environment, credentials)
            .await
            .map_err(|e| Rejection::new(Context::authenticate(), e))?;

        json(&SuccessResponse::data(Payload::Session(session)))
    }
}

pub async fn retrieve_user(
    environment: Environment,
    id: String,
    authorization: Option<String>,
) -> RouteResult {
    timed! {
        let error_handler = |e: BackendError| Rejection::new(Context::retrieve_user(id.clone()), e);

        let user_id = authorize(&environment, &id, authorization.as_deref())
            .await
            .map_err(error_handler)?;

        let user = users::retrieve_user(&environment, &user_id)
            .await
            .map_err(error_handler)?;

        json(&SuccessResponse::data(Payload::User(user)))
    }
}

pub async fn add_profile_picture(
    environment: Environment,
    id: String,
    authorization: Option<String>,
    content: FormData,
) -> RouteResult {
    timed! {
        let error_handler = |e: BackendError| Rejection::new(Context::profile_picture(id.clone()), e);

        let user_id = authorize(&environment, &id, authorization.as_deref())
            .await
            .map_err(error_handler)?;

        debug!(environment.logger, "Parsing submission..."; "user_id" => %user_id);
        let image = parse_picture(content).await.map_err(error_handler)?;

        let url = users::add_profile_picture(&environment, &user_id, image)
            .await
            .map_err(error_handler)?;

        with_status(
            json(&SuccessResponse::data(Payload::Url(url.into()))),
            StatusCode::CREATED,
        )
    }
}

async fn toggle(
    environment: Environment,
    relation: Relation,
    id: String,
    authorization: Option<String>,
    reference: PlaceReference,
) -> RouteResult {
    timed! {
        let error_handler = |e: BackendError| Rejection::new(Context::toggle(id.clone(), relation), e);

        let user_id = authorize(&environment, &id, authorization.as_deref())
            .await
            .map_err(error_handler)?;

        let place_id = reference
            .place_id
            .as_deref()
            .ok_or_else(|| BackendError::missing("placeId"))
            .and_then(parse_id)
            .map_err(error_handler)?;

        let present = relations::toggle(&environment, relation, &user_id, &place_id)
            .await
            .map_err(error_handler)?;

        json(&SuccessResponse::data(Payload::Toggled { place_id, present }))
    }
}

pub async fn toggle_favourite(
    environment: Environment,
    id: String,
    authorization: Option<String>,
    reference: PlaceReference,
) -> RouteResult {
    toggle(environment, Relation::Favourite, id, authorization, reference).await
}

pub async fn toggle_check_in(
    environment: Environment,
    id: String,
    authorization: Option<String>,
    reference: PlaceReference,
) -> RouteResult {
    toggle(environment, Relation::CheckIn, id, authorization, reference).await
}

async fn list_related(
    environment: Environment,
    relation: Relation,
    id: String,
    authorization: Option<String>,
) -> RouteResult {
    timed! {
        let error_handler = |e: BackendError| Rejection::new(Context::list_related(id.clone(), relation), e);

        let user_id = authorize(&environment, &id, authorization.as_deref())
            .await
            .map_err(error_handler)?;

        let related = relations::list(&environment, relation, &user_id)
            .await
            .map_err(error_handler)?;

        json(&SuccessResponse::data(Payload::Related(related)))
    }
}

pub async fn list_favourites(
    environment: Environment,
    id: String,
    authorization: Option<String>,
) -> RouteResult {
    list_related(environment, Relation::Favourite, id, authorization).await
}

pub async fn list_check_ins(
    environment: Environment,
    id: String,
    authorization: Option<String>,
) -> RouteResult {
    list_related(environment, Relation::CheckIn, id, authorization).await
}

pub async fn add_place(
    environment: Environment,
    id: String,
    authorization: Option<String>,
    submission: PlaceSubmission,
) -> RouteResult {
    timed! {
        let error_handler = |e: BackendError| Rejection::new(Context::add_place(id.clone()), e);

        let user_id = authorize(&environment, &id, authorization.as_deref())
            .await
            .map_err(error_handler)?;

        let place_id = places::add_place(&environment, &user_id, submission)
            .await
            .map_err(error_handler)?;

        let location = environment
            .urls
            .place(&user_id, &place_id)
            .map_err(|source| BackendError::FailedToGenerateUrl { source })
            .map_err(error_handler)?;

        with_header(
            with_status(
                json(&SuccessResponse::Created { message: "Place created", id: Some(place_id) }),
                StatusCode::CREATED,
            ),
            "location",
            location.as_str(),
        )
    }
}

pub async fn search_places(
    environment: Environment,
    id: String,
    authorization: Option<String>,
    query: SearchQuery,
) -> RouteResult {
    timed! {
        let error_handler = |e: BackendError| Rejection::new(Context::search_places(id.clone()), e);

        let _caller = authorize(&environment, &id, authorization.as_deref())
            .await
            .map_err(error_handler)?;

        let SearchQuery { name, filter, longitude, latitude } = query;

        let found = match (name.as_deref(), filter.as_deref()) {
            (None, Some(filter)) => {
                places::search_by_category(&environment, Some(filter), longitude, latitude).await
            }
            (name, _) => places::search_by_name(&environment, name, longitude, latitude).await,
        }
        .map_err(error_handler)?;

        json(&SuccessResponse::data(Payload::Places(found)))
    }
}

pub async fn retrieve_place(
    environment: Environment,
    id: String,
    place_id: String,
    authorization: Option<String>,
) -> RouteResult {
    timed! {
        let error_handler =
            |e: BackendError| Rejection::new(Context::retrieve_place(id.clone(), place_id.clone()), e);

        let user_id = authorize(&environment, &id, authorization.as_deref())
            .await
            .map_err(error_handler)?;
        let place = parse_id(&place_id).map_err(error_handler)?;

        let detail = places::retrieve_place(&environment, &user_id, &place)
            .await
            .map_err(error_handler)?;

        json(&SuccessResponse::data(Payload::Detail(detail)))
    }
}

pub async fn update_scoring(
    environment: Environment,
    id: String,
    place_id: String,
    authorization: Option<String>,
    submission: ScoreSubmission,
) -> RouteResult {
    timed! {
        let error_handler =
            |e: BackendError| Rejection::new(Context::update_scoring(id.clone(), place_id.clone()), e);

        let user_id = authorize(&environment, &id, authorization.as_deref())
            .await
            .map_err(error_handler)?;
        let place = parse_id(&place_id).map_err(error_handler)?;

        let update = places::update_scoring(&environment, &user_id, &place, submission.score)
            .await
            .map_err(error_handler)?;

        json(&SuccessResponse::data(Payload::Scoring(update)))
    }
}

pub async fn add_place_picture(
    environment: Environment,
    id: String,
    place_id: String,
    authorization: Option<String>,
    content: FormData,
) -> RouteResult {
    timed! {
        let error_handler =
            |e: BackendError| Rejection::new(Context::add_picture(id.clone(), place_id.clone()), e);

        let user_id = authorize(&environment, &id, authorization.as_deref())
            .await
            .map_err(error_handler)?;
        let place = parse_id(&place_id).map_err(error_handler)?;

        debug!(environment.logger, "Parsing submission..."; "user_id" => %user_id, "place_id" => %place);
        let image = parse_picture(content).await.map_err(error_handler)?;

        let url = pictures::add_place_picture(&environment, &user_id, &place, image)
            .await
            .map_err(error_handler)?;

        with_status(
            json(&SuccessResponse::data(Payload::Url(url))),
            StatusCode::CREATED,
        )
    }
}

pub async fn list_place_pictures(
    environment: Environment,
    id: String,
    place_id: String,
    authorization: Option<String>,
) -> RouteResult {
    timed! {
        let error_handler =
            |e: BackendError| Rejection::new(Context::list_place_pictures(id.clone(), place_id.clone()), e);

        let _caller = authorize(&environment, &id, authorization.as_deref())
            .await
            .map_err(error_handler)?;
        let place = parse_id(&place_id).map_err(error_handler)?;

        let urls = pictures::list_place_pictures(&environment, &place)
            .await
            .map_err(error_handler)?;

        json(&SuccessResponse::data(Payload::Urls(urls)))
    }
}

pub async fn list_user_pictures(
    environment: Environment,
    id: String,
    authorization: Option<String>,
) -> RouteResult {
    timed! {
        let error_handler = |e: BackendError| Rejection::new(Context::list_user_pictures(id.clone()), e);

        let user_id = authorize(&environment, &id, authorization.as_deref())
            .await
            .map_err(error_handler)?;

        let urls = pictures::list_user_pictures(&environment, &user_id)
            .await
            .map_err(error_handler)?;

        json(&SuccessResponse::data(Payload::Urls(urls)))
    }
}

pub async fn add_tip(
    environment: Environment,
    id: String,
    place_id: String,
    authorization: Option<String>,
    submission: TipSubmission,
) -> RouteResult {
    timed! {
        let error_handler =
            |e: BackendError| Rejection::new(Context::add_tip(id.clone(), place_id.clone()), e);

        let user_id = authorize(&environment, &id, authorization.as_deref())
            .await
            .map_err(error_handler)?;
        let place = parse_id(&place_id).map_err(error_handler)?;

        let tip = tips::add_tip(&environment, &user_id, &place, submission.text.as_deref())
            .await
            .map_err(error_handler)?;

        with_status(
            json(&SuccessResponse::data(Payload::PlaceTip(tip))),
            StatusCode::CREATED,
        )
    }
}

pub async fn list_place_tips(
    environment: Environment,
    id: String,
    place_id: String,
    authorization: Option<String>,
) -> RouteResult {
    timed! {
        let error_handler =
            |e: BackendError| Rejection::new(Context::list_place_tips(id.clone(), place_id.clone()), e);

        let _caller = authorize(&environment, &id, authorization.as_deref())
            .await
            .map_err(error_handler)?;
        let place = parse_id(&place_id).map_err(error_handler)?;

        let tips = tips::list_place_tips(&environment, &place)
            .await
            .map_err(error_handler)?;

        json(&SuccessResponse::data(Payload::PlaceTips(tips)))
    }
}

pub async fn list_user_tips(
    environment: Environment,
    id: String,
    authorization: Option<String>,
) -> RouteResult {
    timed! {
        let error_handler = |e: BackendError| Rejection::new(Context::list_user_tips(id.clone()), e);

        let user_id = authorize(&environment, &id, authorization.as_deref())
            .await
            .map_err(error_handler)?;

        let tips = tips::list_user_tips(&environment, &user_id)
            .await
            .map_err(error_handler)?;

        json(&SuccessResponse::data(Payload::UserTips(tips)))
    }
}

fn format_server_timing(seconds: Duration) -> String {
    format!("handler;dur={}", seconds.as_secs_f64() * 1000.0)
}
