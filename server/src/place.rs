use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::BackendError;

/// Mean earth radius in meters, as used by the nearby queries.
pub const EARTH_RADIUS_METERS: f64 = 6_371_008.8;

/// The score a user gives a place. The UI offers 0, 5 and 10 but any
/// integer is accepted.
pub type Score = i32;

/// A geographic point. Stored and reported as-is; ranges are not
/// validated.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
pub struct Coordinates {
    pub longitude: f64,
    pub latitude: f64,
}

impl Coordinates {
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Coordinates {
            longitude,
            latitude,
        }
    }

    /// Great-circle distance in meters (haversine formula).
    pub fn distance_to(&self, other: &Coordinates) -> f64 {
        let (lat1, lat2) = (self.latitude.to_radians(), other.latitude.to_radians());
        let d_lat = (other.latitude - self.latitude).to_radians();
        let d_lon = (other.longitude - self.longitude).to_radians();

        let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);

        2.0 * EARTH_RADIUS_METERS * a.sqrt().asin()
    }
}

/// One user's vote for one place.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Vote {
    pub voter_id: Uuid,
    pub score: Score,
}

impl Vote {
    pub fn new(voter_id: Uuid, score: Score) -> Self {
        Vote { voter_id, score }
    }
}

/// The boolean tags a place can carry. Search by category goes
/// through this enum; the key a client sends is never used to index
/// into a record directly.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Category {
    Breakfast,
    Lunch,
    Dinner,
    Coffee,
    NightLife,
    ThingsToDo,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Breakfast,
        Category::Lunch,
        Category::Dinner,
        Category::Coffee,
        Category::NightLife,
        Category::ThingsToDo,
    ];

    /// The `places` column holding this tag.
    pub fn column(self) -> &'static str {
        match self {
            Category::Breakfast => "breakfast",
            Category::Lunch => "lunch",
            Category::Dinner => "dinner",
            Category::Coffee => "coffee",
            Category::NightLife => "night_life",
            Category::ThingsToDo => "things_to_do",
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            Category::Breakfast => "breakfast",
            Category::Lunch => "lunch",
            Category::Dinner => "dinner",
            Category::Coffee => "coffee",
            Category::NightLife => "nightLife",
            Category::ThingsToDo => "thingsToDo",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Category {
    type Err = BackendError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "breakfast" => Ok(Category::Breakfast),
            "lunch" => Ok(Category::Lunch),
            "dinner" => Ok(Category::Dinner),
            "coffee" => Ok(Category::Coffee),
            // older clients send the misspelt key
            "nightLife" | "nigthLife" => Ok(Category::NightLife),
            "thingsToDo" => Ok(Category::ThingsToDo),
            _ => Err(BackendError::UnknownCategory(s.to_owned())),
        }
    }
}

/// The category tags of a place.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Categories {
    #[serde(default)]
    pub breakfast: bool,
    #[serde(default)]
    pub lunch: bool,
    #[serde(default)]
    pub dinner: bool,
    #[serde(default)]
    pub coffee: bool,
    #[serde(default, alias = "nigthLife")]
    pub night_life: bool,
    #[serde(default)]
    pub things_to_do: bool,
}

impl Categories {
    pub fn has(&self, category: Category) -> bool {
        match category {
            Category::Breakfast => self.breakfast,
            Category::Lunch => self.lunch,
            Category::Dinner => self.dinner,
            Category::Coffee => self.coffee,
            Category::NightLife => self.night_life,
            Category::ThingsToDo => self.things_to_do,
        }
    }
}

/// A place as stored, with its embedded voter list in vote order.
#[derive(Clone, Debug, PartialEq)]
pub struct Place {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub location: Coordinates,
    pub owner_id: Uuid,
    pub categories: Categories,
    pub voters: Vec<Vote>,
}

impl Place {
    /// The vote the given user cast, if any.
    pub fn vote_of(&self, user_id: &Uuid) -> Option<&Vote> {
        self.voters.iter().find(|v| &v.voter_id == user_id)
    }
}

/// A validated place about to be inserted.
#[derive(Clone, Debug, PartialEq)]
pub struct NewPlace {
    pub name: String,
    pub address: String,
    pub location: Coordinates,
    pub categories: Categories,
}
