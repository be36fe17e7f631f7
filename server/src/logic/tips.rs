use std::collections::HashMap;

use log::{debug, warn};
use time::OffsetDateTime;
use uuid::Uuid;

use super::{require_place, require_user};
use crate::environment::Environment;
use crate::errors::BackendError;
use crate::media::pick_picture;
use crate::scoring::score_of;
use crate::tip::{display_time, NewTip, PlaceTip, Tip, UserTip};
use crate::user::User;
use crate::validation::required;

fn place_tip(tip: Tip, author: &User, default_picture: &str) -> PlaceTip {
    PlaceTip {
        id: tip.id,
        text: tip.text,
        user_picture: author
            .profile_picture
            .clone()
            .unwrap_or_else(|| default_picture.to_owned()),
        user_name: author.name.clone(),
        user_surname: author.surname.clone(),
        time: tip.time,
    }
}

/// Leaves a tip on a place, dated today.
pub async fn add_tip(
    environment: &Environment,
    user_id: &Uuid,
    place_id: &Uuid,
    text: Option<&str>,
) -> Result<PlaceTip, BackendError> {
    let text = required("text", text)?;

    let author = require_user(environment, user_id).await?;
    require_place(environment, place_id).await?;

    debug!(environment.logger, "Adding tip..."; "user_id" => %user_id, "place_id" => %place_id);
    let tip = environment
        .db
        .insert_tip(NewTip {
            text,
            author_id: *user_id,
            place_id: *place_id,
            time: display_time(OffsetDateTime::now_utc()),
        })
        .await?;

    Ok(place_tip(
        tip,
        &author,
        &environment.config.default_profile_picture_url,
    ))
}

/// A place's tips with their authors, oldest first.
pub async fn list_place_tips(
    environment: &Environment,
    place_id: &Uuid,
) -> Result<Vec<PlaceTip>, BackendError> {
    require_place(environment, place_id).await?;

    let tips = environment.db.tips_of_place(place_id).await?;
    let mut authors: HashMap<Uuid, Option<User>> = HashMap::new();
    let mut listed = Vec::with_capacity(tips.len());

    for tip in tips {
        if !authors.contains_key(&tip.author_id) {
            let author = environment.db.retrieve_user(&tip.author_id).await?;
            authors.insert(tip.author_id, author);
        }

        match &authors[&tip.author_id] {
            Some(author) => listed.push(place_tip(
                tip,
                author,
                &environment.config.default_profile_picture_url,
            )),
            None => {
                warn!(environment.logger, "Skipping tip without author"; "tip_id" => %tip.id)
            }
        }
    }

    Ok(listed)
}

/// A user's tips with the places they are about, oldest first.
pub async fn list_user_tips(
    environment: &Environment,
    user_id: &Uuid,
) -> Result<Vec<UserTip>, BackendError> {
    require_user(environment, user_id).await?;

    let tips = environment.db.tips_of_user(user_id).await?;
    let mut rng = environment.rng();
    let mut listed = Vec::with_capacity(tips.len());

    for tip in tips {
        let place = match environment.db.retrieve_place(&tip.place_id).await? {
            Some(place) => place,
            None => {
                warn!(environment.logger, "Skipping tip without place"; "tip_id" => %tip.id);
                continue;
            }
        };

        let pictures = environment.db.pictures_of_place(&place.id).await?;

        listed.push(UserTip {
            id: tip.id,
            text: tip.text,
            place_id: place.id,
            place_name: place.name,
            picture: pick_picture(
                &mut rng,
                &pictures,
                &environment.config.default_picture_url,
            ),
            scoring: score_of(&place.voters),
            time: tip.time,
        });
    }

    Ok(listed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::Entity;
    use crate::logic::pictures::add_place_picture;
    use crate::logic::places::update_scoring;
    use crate::logic::testing::{environment, place, png, user};
    use crate::scoring::Scoring;

    #[tokio::test]
    async fn tips_carry_author_and_date() {
        let (environment, _) = environment();
        let ana = user(&environment, "ana@example.com").await;
        let bar = place(&environment, &ana, "Bar").await;

        let tip = add_tip(&environment, &ana, &bar, Some("  order the cava  "))
            .await
            .unwrap();

        assert_eq!(tip.text, "order the cava");
        assert_eq!(tip.user_name, "Ana");
        assert_eq!(tip.user_surname, "Puig");
        assert_eq!(tip.user_picture, environment.config.default_profile_picture_url);
        assert_eq!(tip.time, display_time(OffsetDateTime::now_utc()));

        assert_eq!(list_place_tips(&environment, &bar).await.unwrap(), vec![tip]);
    }

    #[tokio::test]
    async fn blank_tips_are_rejected_before_lookups() {
        let (environment, _) = environment();

        let result = add_tip(&environment, &Uuid::new_v4(), &Uuid::new_v4(), Some(" ")).await;
        assert!(matches!(result, Err(BackendError::Validation { field: "text", .. })));

        let result = add_tip(&environment, &Uuid::new_v4(), &Uuid::new_v4(), Some("ok")).await;
        assert!(matches!(result, Err(BackendError::NotFound(Entity::User))));
    }

    #[tokio::test]
    async fn user_tips_describe_their_places() {
        let (environment, _) = environment();
        let ana = user(&environment, "ana@example.com").await;
        let bar = place(&environment, &ana, "Bar").await;
        let cafe = place(&environment, &ana, "Cafe").await;

        let picture = add_place_picture(&environment, &ana, &bar, png()).await.unwrap();
        update_scoring(&environment, &ana, &bar, Some(10)).await.unwrap();
        add_tip(&environment, &ana, &bar, Some("first")).await.unwrap();
        add_tip(&environment, &ana, &cafe, Some("second")).await.unwrap();

        let tips = list_user_tips(&environment, &ana).await.unwrap();

        assert_eq!(tips.len(), 2);
        assert_eq!(tips[0].text, "first");
        assert_eq!(tips[0].place_id, bar);
        assert_eq!(tips[0].place_name, "Bar");
        assert_eq!(tips[0].picture, picture);
        assert_eq!(tips[0].scoring, Scoring::Single(10));
        assert_eq!(tips[1].place_name, "Cafe");
        assert_eq!(tips[1].scoring, Scoring::Unscored);
        assert_eq!(tips[1].picture, environment.config.default_picture_url);
    }
}
