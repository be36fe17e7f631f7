use std::collections::HashMap;
use std::fmt;

use log::debug;
use uuid::Uuid;

use crate::environment::Environment;
use crate::errors::BackendError;
use crate::picture::Picture;
use crate::place::{Category, Coordinates, Place};
use crate::summary::{summarize, PlaceSummary};
use crate::tip::Tip;

/// Which places a nearby search considers, before distance.
#[derive(Clone, Debug, PartialEq)]
pub enum NearbyFilter {
    /// Case-insensitive substring of the place name. Already
    /// normalized.
    Name(String),
    /// Places tagged with the category.
    Category(Category),
}

impl NearbyFilter {
    pub fn matches(&self, place: &Place) -> bool {
        match self {
            NearbyFilter::Name(term) => place.name.to_lowercase().contains(&term.to_lowercase()),
            NearbyFilter::Category(category) => place.categories.has(*category),
        }
    }
}

impl fmt::Display for NearbyFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NearbyFilter::Name(term) => write!(f, "name ~ {:?}", term),
            NearbyFilter::Category(category) => write!(f, "category = {}", category),
        }
    }
}

/// A storage-level nearby query. Results come back nearest first.
#[derive(Clone, Debug, PartialEq)]
pub struct NearbyQuery {
    pub filter: NearbyFilter,
    pub origin: Coordinates,
    pub radius_meters: f64,
}

/// Escapes `%`, `_` and `\` so a search term matches literally inside
/// an `ILIKE … ESCAPE '\'` pattern.
pub fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());

    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }

    escaped
}

/// Runs a nearby query and summarizes each hit with its own pictures
/// and tips, keeping the storage order.
pub async fn search_nearby(
    environment: &Environment,
    filter: NearbyFilter,
    origin: Coordinates,
) -> Result<Vec<PlaceSummary>, BackendError> {
    let query = NearbyQuery {
        filter,
        origin,
        radius_meters: environment.config.search_radius_meters,
    };

    debug!(environment.logger, "Searching nearby places..."; "filter" => %query.filter, "longitude" => origin.longitude, "latitude" => origin.latitude);
    let places = environment.db.find_nearby(query).await?;

    let mut media: HashMap<Uuid, (Vec<Picture>, Vec<Tip>)> = HashMap::with_capacity(places.len());

    for place in &places {
        let pictures = environment.db.pictures_of_place(&place.id).await?;
        let tips = environment.db.tips_of_place(&place.id).await?;

        media.insert(place.id, (pictures, tips));
    }

    let mut rng = environment.rng();
    let default_picture = &environment.config.default_picture_url;

    let summaries = places
        .iter()
        .map(|place| {
            let (pictures, tips) = &media[&place.id];
            summarize(&mut rng, place, pictures, tips, default_picture)
        })
        .collect();

    Ok(summaries)
}
