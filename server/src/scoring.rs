use serde::{Serialize, Serializer};

use crate::place::{Score, Vote};

/// What a place's rating looks like to clients.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Scoring {
    /// Nobody has voted yet. Serialized as `"?"`.
    Unscored,
    /// Exactly one vote, reported unchanged.
    Single(Score),
    /// The mean of two or more votes, rounded to one decimal.
    Average(f64),
}

pub const UNSCORED_MARKER: &str = "?";

impl Serialize for Scoring {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Scoring::Unscored => serializer.serialize_str(UNSCORED_MARKER),
            Scoring::Single(score) => serializer.serialize_i32(*score),
            Scoring::Average(average) => serializer.serialize_f64(*average),
        }
    }
}

/// Reduces a voter list to its display scoring.
pub fn score_of(voters: &[Vote]) -> Scoring {
    match voters {
        [] => Scoring::Unscored,
        [only] => Scoring::Single(only.score),
        _ => {
            let sum: f64 = voters.iter().map(|v| f64::from(v.score)).sum();
            let mean = sum / voters.len() as f64;

            Scoring::Average(round_to_tenth(mean))
        }
    }
}

/// The raw scores in voter order. A single vote yields a one-element
/// list holding that vote, no votes an empty list.
pub fn scores_of(voters: &[Vote]) -> Vec<Score> {
    voters.iter().map(|v| v.score).collect()
}

/// Rounds half up on the first decimal digit.
fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0 + 0.5).floor() / 10.0
}
