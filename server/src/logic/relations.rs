use log::debug;
use uuid::Uuid;

use super::{require_place, require_user};
use crate::environment::Environment;
use crate::errors::BackendError;
use crate::summary::{relate, RelatedPlace};
use crate::user::Relation;

/// Adds the place to the user's favourites or check-ins if it is not
/// there, removes it otherwise. Returns whether it is there now.
pub async fn toggle(
    environment: &Environment,
    relation: Relation,
    user_id: &Uuid,
    place_id: &Uuid,
) -> Result<bool, BackendError> {
    require_user(environment, user_id).await?;
    require_place(environment, place_id).await?;

    let present = environment
        .db
        .toggle_relation(relation, user_id, place_id)
        .await?;

    debug!(environment.logger, "Toggled {}", relation; "user_id" => %user_id, "place_id" => %place_id, "present" => present);

    Ok(present)
}

pub async fn toggle_favourite(
    environment: &Environment,
    user_id: &Uuid,
    place_id: &Uuid,
) -> Result<bool, BackendError> {
    toggle(environment, Relation::Favourite, user_id, place_id).await
}

pub async fn toggle_check_in(
    environment: &Environment,
    user_id: &Uuid,
    place_id: &Uuid,
) -> Result<bool, BackendError> {
    toggle(environment, Relation::CheckIn, user_id, place_id).await
}

/// The places in one of the user's lists, in the order they were
/// added.
pub async fn list(
    environment: &Environment,
    relation: Relation,
    user_id: &Uuid,
) -> Result<Vec<RelatedPlace>, BackendError> {
    require_user(environment, user_id).await?;

    let places = environment.db.related_places(relation, user_id).await?;
    let mut rng = environment.rng();
    let mut related = Vec::with_capacity(places.len());

    for place in &places {
        let pictures = environment.db.pictures_of_place(&place.id).await?;

        related.push(relate(
            &mut rng,
            place,
            &pictures,
            &environment.config.default_picture_url,
        ));
    }

    Ok(related)
}

pub async fn list_favourites(
    environment: &Environment,
    user_id: &Uuid,
) -> Result<Vec<RelatedPlace>, BackendError> {
    list(environment, Relation::Favourite, user_id).await
}

pub async fn list_check_ins(
    environment: &Environment,
    user_id: &Uuid,
) -> Result<Vec<RelatedPlace>, BackendError> {
    list(environment, Relation::CheckIn, user_id).await
}
