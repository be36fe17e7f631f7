use rand::Rng;
use serde::Serialize;
use uuid::Uuid;

use crate::media::pick_picture;
use crate::picture::Picture;
use crate::place::{Categories, Place, Score};
use crate::scoring::{score_of, scores_of, Scoring};
use crate::user::{Relation, User};

/// A single place as seen by one viewer.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceDetail {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub user_id: Uuid,
    #[serde(flatten)]
    pub categories: Categories,
    pub scoring: Scoring,
    pub picture: String,
    pub favourite: bool,
    pub check_in: bool,
    pub user_score: Option<Score>,
    pub visitors: usize,
    pub scores: Vec<Score>,
}

/// The state of a place's rating after a vote.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoringUpdate {
    pub scoring: Scoring,
    pub visitors: usize,
    pub scores: Vec<Score>,
    pub user_score: Score,
}

impl ScoringUpdate {
    pub fn new(place: &Place, user_score: Score) -> Self {
        ScoringUpdate {
            scoring: score_of(&place.voters),
            visitors: place.voters.len(),
            scores: scores_of(&place.voters),
            user_score,
        }
    }
}

/// Builds the detail view of `place` for `viewer`.
pub fn detail<R: Rng + ?Sized>(
    rng: &mut R,
    place: &Place,
    pictures: &[Picture],
    viewer: &User,
    default_picture: &str,
) -> PlaceDetail {
    PlaceDetail {
        id: place.id,
        name: place.name.clone(),
        address: place.address.clone(),
        latitude: place.location.latitude,
        longitude: place.location.longitude,
        user_id: place.owner_id,
        categories: place.categories,
        scoring: score_of(&place.voters),
        picture: pick_picture(rng, pictures, default_picture),
        favourite: viewer.has(Relation::Favourite, &place.id),
        check_in: viewer.has(Relation::CheckIn, &place.id),
        user_score: place.vote_of(&viewer.id).map(|v| v.score),
        visitors: place.voters.len(),
        scores: scores_of(&place.voters),
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::media::DEFAULT_PICTURE_URL;
    use crate::place::{Coordinates, Vote};

    fn viewer() -> User {
        User {
            id: Uuid::new_v4(),
            name: "Ana".to_owned(),
            surname: "Puig".to_owned(),
            email: "ana@example.com".to_owned(),
            birthday: "1990-01-01".to_owned(),
            gender: None,
            phone: None,
            profile_picture: None,
            favourites: vec![],
            check_ins: vec![],
        }
    }

    fn place(voters: Vec<Vote>) -> Place {
        Place {
            id: Uuid::new_v4(),
            name: "Bar Pinotxo".to_owned(),
            address: "La Boqueria".to_owned(),
            location: Coordinates::new(2.1719, 41.3818),
            owner_id: Uuid::new_v4(),
            categories: Categories {
                breakfast: true,
                ..Categories::default()
            },
            voters,
        }
    }

    #[test]
    fn detail_reports_viewer_relations() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut viewer = viewer();
        let place = place(vec![Vote::new(Uuid::new_v4(), 0), Vote::new(viewer.id, 10)]);
        viewer.favourites.push(place.id);

        let detail = detail(&mut rng, &place, &[], &viewer, DEFAULT_PICTURE_URL);

        assert!(detail.favourite);
        assert!(!detail.check_in);
        assert_eq!(detail.user_score, Some(10));
        assert_eq!(detail.visitors, 2);
        assert_eq!(detail.scores, vec![0, 10]);
        assert_eq!(detail.scoring, Scoring::Average(5.0));
    }

    #[test]
    fn detail_without_votes() {
        let mut rng = StdRng::seed_from_u64(11);
        let viewer = viewer();
        let place = place(vec![]);

        let detail = detail(&mut rng, &place, &[], &viewer, DEFAULT_PICTURE_URL);

        assert_eq!(detail.user_score, None);
        assert_eq!(detail.visitors, 0);
        assert!(detail.scores.is_empty());
        assert_eq!(detail.scoring, Scoring::Unscored);

        let value = serde_json::to_value(&detail).unwrap();
        assert_eq!(value["userScore"], serde_json::Value::Null);
        assert_eq!(value["breakfast"], serde_json::json!(true));
        assert_eq!(value["checkIn"], serde_json::json!(false));
    }

    #[test]
    fn single_vote_scores_wrap_the_scoring() {
        let mut rng = StdRng::seed_from_u64(11);
        let viewer = viewer();
        let place = place(vec![Vote::new(Uuid::new_v4(), 5)]);

        let detail = detail(&mut rng, &place, &[], &viewer, DEFAULT_PICTURE_URL);

        assert_eq!(detail.scoring, Scoring::Single(5));
        assert_eq!(detail.scores, vec![5]);
    }
}
