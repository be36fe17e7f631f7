use rand::Rng;
use serde::Serialize;
use uuid::Uuid;

use crate::media::{pick_picture, pick_tip};
use crate::picture::Picture;
use crate::place::Place;
use crate::scoring::{score_of, Scoring};
use crate::tip::Tip;

/// A place as shown in search results.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceSummary {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub scoring: Scoring,
    pub picture: String,
    pub tip: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// A place as listed among a user's favourites or check-ins.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RelatedPlace {
    pub place_id: Uuid,
    pub name: String,
    pub scoring: Scoring,
    pub address: String,
    pub picture: String,
}

/// Builds the list-view representation of a place from its own
/// pictures and tips.
pub fn summarize<R: Rng + ?Sized>(
    rng: &mut R,
    place: &Place,
    pictures: &[Picture],
    tips: &[Tip],
    default_picture: &str,
) -> PlaceSummary {
    PlaceSummary {
        id: place.id,
        name: place.name.clone(),
        address: place.address.clone(),
        scoring: score_of(&place.voters),
        picture: pick_picture(rng, pictures, default_picture),
        tip: pick_tip(rng, tips),
        latitude: place.location.latitude,
        longitude: place.location.longitude,
    }
}

pub fn relate<R: Rng + ?Sized>(
    rng: &mut R,
    place: &Place,
    pictures: &[Picture],
    default_picture: &str,
) -> RelatedPlace {
    RelatedPlace {
        place_id: place.id,
        name: place.name.clone(),
        scoring: score_of(&place.voters),
        address: place.address.clone(),
        picture: pick_picture(rng, pictures, default_picture),
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::media::DEFAULT_PICTURE_URL;
    use crate::place::{Categories, Coordinates, Vote};

    fn place(voters: Vec<Vote>) -> Place {
        Place {
            id: Uuid::new_v4(),
            name: "El Xampanyet".to_owned(),
            address: "Carrer de Montcada, 22".to_owned(),
            location: Coordinates::new(2.1812, 41.3845),
            owner_id: Uuid::new_v4(),
            categories: Categories::default(),
            voters,
        }
    }

    #[test]
    fn summary_without_media_uses_defaults() {
        let mut rng = StdRng::seed_from_u64(3);
        let place = place(vec![]);

        let summary = summarize(&mut rng, &place, &[], &[], DEFAULT_PICTURE_URL);

        assert_eq!(summary.id, place.id);
        assert_eq!(summary.scoring, Scoring::Unscored);
        assert_eq!(summary.picture, DEFAULT_PICTURE_URL);
        assert_eq!(summary.tip, "");
    }

    // Regression guard: the summary must not swap the two axes.
    #[test]
    fn summary_keeps_latitude_and_longitude_apart() {
        let mut rng = StdRng::seed_from_u64(3);
        let place = place(vec![]);

        let summary = summarize(&mut rng, &place, &[], &[], DEFAULT_PICTURE_URL);

        assert_eq!(summary.latitude, 41.3845);
        assert_eq!(summary.longitude, 2.1812);
    }

    #[test]
    fn summary_serializes_only_list_fields() {
        let mut rng = StdRng::seed_from_u64(3);
        let place = place(vec![Vote::new(Uuid::new_v4(), 10), Vote::new(Uuid::new_v4(), 5)]);

        let summary = summarize(&mut rng, &place, &[], &[], DEFAULT_PICTURE_URL);
        let value = serde_json::to_value(&summary).unwrap();
        let object = value.as_object().unwrap();

        let mut keys: Vec<_> = object.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(
            keys,
            vec!["address", "id", "latitude", "longitude", "name", "picture", "scoring", "tip"]
        );
        assert_eq!(object["scoring"], serde_json::json!(7.5));
    }

    #[test]
    fn related_place_reports_place_id() {
        let mut rng = StdRng::seed_from_u64(3);
        let place = place(vec![Vote::new(Uuid::new_v4(), 5)]);

        let related = relate(&mut rng, &place, &[], DEFAULT_PICTURE_URL);

        assert_eq!(related.place_id, place.id);
        assert_eq!(related.scoring, Scoring::Single(5));
    }
}
