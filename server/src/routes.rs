use std::sync::Arc;

use log::{debug, error, Logger};
use warp::http::StatusCode;
use warp::reject;
use warp::reply::{json, with_status, Json, WithStatus};

use crate::errors::BackendError;

pub mod admin;
mod auth;
mod body;
mod handlers;
mod query;
mod rejection;
mod response;

pub use internal::*;

/// The maximum form data size to accept. This should be enforced by
/// the HTTP gateway, so on the Rust side it’s set to a generous
/// number.
const MAX_CONTENT_LENGTH: u64 = 32 * 1024 * 1024;

/// The maximum JSON body size to accept.
const MAX_JSON_LENGTH: u64 = 64 * 1024;

pub async fn format_rejection(
    logger: Arc<Logger>,
    rej: reject::Rejection,
) -> Result<WithStatus<Json>, reject::Rejection> {
    if let Some(r) = rej.find::<rejection::Rejection>() {
        let e = &r.error;
        let status = status_code_for(e);

        if status.is_server_error() {
            error!(logger, "Backend error"; "context" => ?r.context, "error" => ?r.error, "status" => %status, "message" => %r.error);
        } else {
            debug!(logger, "Request rejected"; "context" => ?r.context, "status" => %status, "message" => %r.error);
        }

        return Ok(with_status(json(&r.flatten()), status));
    }

    Err(rej)
}

fn status_code_for(e: &BackendError) -> StatusCode {
    use BackendError::*;

    match e {
        Validation { .. }
        | UnknownCategory(..)
        | InvalidId(..)
        | PartsMissing
        | MalformedFormSubmission => StatusCode::BAD_REQUEST,
        UnsupportedMediaType { .. } => StatusCode::UNSUPPORTED_MEDIA_TYPE,
        NotFound(..) => StatusCode::NOT_FOUND,
        AlreadyExists { .. } => StatusCode::CONFLICT,
        IncorrectCredentials | MissingCredentials | InvalidSession => StatusCode::UNAUTHORIZED,
        Forbidden { .. } => StatusCode::FORBIDDEN,
        PasswordHashing(..) | FailedToGenerateUrl { .. } | UploadFailed { .. } | Sqlx { .. } => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

mod internal {
    use std::sync::Arc;

    use serde::de::DeserializeOwned;
    use warp::filters::multipart::form;
    use warp::filters::BoxedFilter;
    use warp::path::end;
    use warp::reject;
    use warp::Filter;
    use warp::Reply;
    use warp::{get as g, header, path as p, post, query};

    use super::body::{PlaceReference, ScoreSubmission, TipSubmission};
    use super::{handlers, query as q, MAX_CONTENT_LENGTH, MAX_JSON_LENGTH};
    use crate::environment::Environment;
    use crate::logic::places::PlaceSubmission;
    use crate::logic::users::{Credentials, Registration};

    type Route = BoxedFilter<(Box<dyn Reply>,)>;

    fn json_body<T: DeserializeOwned + Send>(
    ) -> impl Filter<Extract = (T,), Error = reject::Rejection> + Clone {
        warp::body::content_length_limit(MAX_JSON_LENGTH).and(warp::body::json())
    }

    fn bearer() -> impl Filter<Extract = (Option<String>,), Error = reject::Rejection> + Clone {
        header::optional::<String>("authorization")
    }

    macro_rules! route_filter {
        ($route_variable:ident; $first:expr) => (let $route_variable = $route_variable.and($first););
        ($route_variable:ident; $first:expr, $($rest:expr),+) => (
            let $route_variable = $route_variable.and($first);
            route_filter!($route_variable; $($rest),+);
        )
    }

    macro_rules! route {
        ($name:ident => $handler:ident, $route_variable:ident; $($filters:expr),+) => (
            pub fn $name(environment: Environment) -> Route {
                let a = environment.urls.api_path.clone();

                let $route_variable = warp::any()
                    .map(move || environment.clone())
                    .and(p(a));

                route_filter!($route_variable; $($filters),+);

                $route_variable.and_then(handlers::$handler)
                    .boxed()
            }
        );
    }

    route!(make_register_route => register, rt; p("users"), end(), post(), json_body::<Registration>());
    route!(make_authenticate_route => authenticate, rt; p("auth"), end(), post(), json_body::<Credentials>());
    route!(make_user_route => retrieve_user, rt; p!("users" / String), g(), bearer());
    route!(make_profile_picture_route => add_profile_picture, rt; p!("users" / String / "profile-picture"), post(), bearer(), form().max_length(MAX_CONTENT_LENGTH));
    route!(make_toggle_favourite_route => toggle_favourite, rt; p!("users" / String / "favourites"), post(), bearer(), json_body::<PlaceReference>());
    route!(make_favourites_route => list_favourites, rt; p!("users" / String / "favourites"), g(), bearer());
    route!(make_toggle_check_in_route => toggle_check_in, rt; p!("users" / String / "check-ins"), post(), bearer(), json_body::<PlaceReference>());
    route!(make_check_ins_route => list_check_ins, rt; p!("users" / String / "check-ins"), g(), bearer());
    route!(make_add_place_route => add_place, rt; p!("users" / String / "places"), post(), bearer(), json_body::<PlaceSubmission>());
    route!(make_search_route => search_places, rt; p!("users" / String / "places"), g(), bearer(), query::<q::SearchQuery>());
    route!(make_place_route => retrieve_place, rt; p!("users" / String / "places" / String), g(), bearer());
    route!(make_scoring_route => update_scoring, rt; p!("users" / String / "places" / String / "scoring"), post(), bearer(), json_body::<ScoreSubmission>());
    route!(make_add_place_picture_route => add_place_picture, rt; p!("users" / String / "places" / String / "pictures"), post(), bearer(), form().max_length(MAX_CONTENT_LENGTH));
    route!(make_place_pictures_route => list_place_pictures, rt; p!("users" / String / "places" / String / "pictures"), g(), bearer());
    route!(make_user_pictures_route => list_user_pictures, rt; p!("users" / String / "pictures"), g(), bearer());
    route!(make_add_tip_route => add_tip, rt; p!("users" / String / "places" / String / "tips"), post(), bearer(), json_body::<TipSubmission>());
    route!(make_place_tips_route => list_place_tips, rt; p!("users" / String / "places" / String / "tips"), g(), bearer());
    route!(make_user_tips_route => list_user_tips, rt; p!("users" / String / "tips"), g(), bearer());

    /// Every API route, with errors rendered by `format_rejection`.
    pub fn make_api(
        environment: Environment,
    ) -> impl Filter<Extract = (impl Reply,), Error = reject::Rejection> + Clone {
        let logger = environment.logger.clone();

        make_register_route(environment.clone())
            .or(make_authenticate_route(environment.clone()))
            .unify()
            .or(make_user_route(environment.clone()))
            .unify()
            .or(make_profile_picture_route(environment.clone()))
            .unify()
            .or(make_toggle_favourite_route(environment.clone()))
            .unify()
            .or(make_favourites_route(environment.clone()))
            .unify()
            .or(make_toggle_check_in_route(environment.clone()))
            .unify()
            .or(make_check_ins_route(environment.clone()))
            .unify()
            .or(make_add_place_route(environment.clone()))
            .unify()
            .or(make_search_route(environment.clone()))
            .unify()
            .or(make_place_route(environment.clone()))
            .unify()
            .or(make_scoring_route(environment.clone()))
            .unify()
            .or(make_add_place_picture_route(environment.clone()))
            .unify()
            .or(make_place_pictures_route(environment.clone()))
            .unify()
            .or(make_user_pictures_route(environment.clone()))
            .unify()
            .or(make_add_tip_route(environment.clone()))
            .unify()
            .or(make_place_tips_route(environment.clone()))
            .unify()
            .or(make_user_tips_route(environment))
            .unify()
            .recover(move |r| super::format_rejection(Arc::clone(&logger), r))
    }
}
