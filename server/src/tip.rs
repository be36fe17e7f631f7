use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::scoring::Scoring;

/// A free-text note a user left on a place.
#[derive(Clone, Debug, PartialEq)]
pub struct Tip {
    pub id: Uuid,
    pub text: String,
    pub author_id: Uuid,
    pub place_id: Uuid,

    /// The creation date as shown to users, e.g. `18 October 2026`.
    pub time: String,
}

/// A tip about to be inserted.
#[derive(Clone, Debug, PartialEq)]
pub struct NewTip {
    pub text: String,
    pub author_id: Uuid,
    pub place_id: Uuid,
    pub time: String,
}

/// A tip as listed on its place, with its author's details.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceTip {
    pub id: Uuid,
    pub text: String,
    pub user_picture: String,
    pub user_name: String,
    pub user_surname: String,
    pub time: String,
}

/// A tip as listed on its author's profile, with its place's details.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserTip {
    pub id: Uuid,
    pub text: String,
    pub place_id: Uuid,
    pub place_name: String,
    pub picture: String,
    pub scoring: Scoring,
    pub time: String,
}

/// Renders a date the way tips display it: day without padding, full
/// month name, four-digit year.
pub fn display_time(when: OffsetDateTime) -> String {
    when.format("%-d %B %Y")
}

#[cfg(test)]
mod tests {
    use time::Date;

    use super::display_time;

    fn at(year: i32, month: u8, day: u8) -> time::OffsetDateTime {
        Date::try_from_ymd(year, month, day)
            .and_then(|d| d.try_with_hms(23, 10, 0))
            .expect("valid date")
            .assume_utc()
    }

    #[test]
    fn display_time_has_no_padding() {
        assert_eq!(display_time(at(2026, 10, 8)), "8 October 2026");
        assert_eq!(display_time(at(2018, 11, 21)), "21 November 2018");
    }
}
