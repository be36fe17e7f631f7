use log::{debug, o};
use serde::Deserialize;
use uuid::Uuid;

use super::{require_place, require_user};
use crate::detail::{detail, PlaceDetail, ScoringUpdate};
use crate::environment::Environment;
use crate::errors::BackendError;
use crate::place::{Categories, Category, Coordinates, NewPlace, Score, Vote};
use crate::search::{search_nearby, NearbyFilter};
use crate::summary::PlaceSummary;
use crate::validation::{coordinate, required};

/// A new place as submitted. Category flags that are left out are
/// false.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct PlaceSubmission {
    pub name: Option<String>,
    pub address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    #[serde(flatten)]
    pub categories: Categories,
}

fn origin(longitude: Option<f64>, latitude: Option<f64>) -> Result<Coordinates, BackendError> {
    Ok(Coordinates::new(
        coordinate("longitude", longitude)?,
        coordinate("latitude", latitude)?,
    ))
}

/// Creates a place owned by `user_id` and returns its ID.
pub async fn add_place(
    environment: &Environment,
    user_id: &Uuid,
    submission: PlaceSubmission,
) -> Result<Uuid, BackendError> {
    let name = required("name", submission.name.as_deref())?;
    let address = required("address", submission.address.as_deref())?;
    let location = origin(submission.longitude, submission.latitude)?;

    require_user(environment, user_id).await?;

    let id = environment
        .db
        .insert_place(
            user_id,
            NewPlace {
                name,
                address,
                location,
                categories: submission.categories,
            },
        )
        .await?;

    debug!(environment.logger, "Created place"; "user_id" => %user_id, "place_id" => %id);

    Ok(id)
}

/// Places near the point whose name contains `name`, ignoring case.
pub async fn search_by_name(
    environment: &Environment,
    name: Option<&str>,
    longitude: Option<f64>,
    latitude: Option<f64>,
) -> Result<Vec<PlaceSummary>, BackendError> {
    let name = required("name", name)?;
    let origin = origin(longitude, latitude)?;

    search_nearby(environment, NearbyFilter::Name(name), origin).await
}

/// Places near the point tagged with the category named by `filter`.
pub async fn search_by_category(
    environment: &Environment,
    filter: Option<&str>,
    longitude: Option<f64>,
    latitude: Option<f64>,
) -> Result<Vec<PlaceSummary>, BackendError> {
    let category: Category = required("filter", filter)?.parse()?;
    let origin = origin(longitude, latitude)?;

    search_nearby(environment, NearbyFilter::Category(category), origin).await
}

/// A place as seen by `user_id`. The place is looked up first, so a
/// missing place is reported before anything else is read.
pub async fn retrieve_place(
    environment: &Environment,
    user_id: &Uuid,
    place_id: &Uuid,
) -> Result<PlaceDetail, BackendError> {
    let place = require_place(environment, place_id).await?;
    let viewer = require_user(environment, user_id).await?;

    let pictures = environment.db.pictures_of_place(place_id).await?;

    Ok(detail(
        &mut environment.rng(),
        &place,
        &pictures,
        &viewer,
        &environment.config.default_picture_url,
    ))
}

/// Records `user_id`'s score for a place, replacing any earlier one.
pub async fn update_scoring(
    environment: &Environment,
    user_id: &Uuid,
    place_id: &Uuid,
    score: Option<Score>,
) -> Result<ScoringUpdate, BackendError> {
    let score = score.ok_or_else(|| BackendError::missing("score"))?;

    require_user(environment, user_id).await?;
    let mut place = require_place(environment, place_id).await?;

    let logger = environment.logger.new(o!(
        "user_id" => user_id.to_string(),
        "place_id" => place_id.to_string()
    ));
    debug!(logger, "Updating scoring..."; "score" => score);

    place.voters = environment
        .db
        .upsert_vote(place_id, Vote::new(*user_id, score))
        .await?;

    Ok(ScoringUpdate::new(&place, score))
}
