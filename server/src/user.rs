use std::fmt;

use serde::Serialize;
use uuid::Uuid;

/// A registered user as stored, minus any password material.
#[derive(Clone, Debug, PartialEq)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub surname: String,
    pub email: String,
    pub birthday: String,
    pub gender: Option<String>,
    pub phone: Option<String>,
    pub profile_picture: Option<String>,
    pub favourites: Vec<Uuid>,
    pub check_ins: Vec<Uuid>,
}

impl User {
    pub fn has(&self, relation: Relation, place_id: &Uuid) -> bool {
        self.related(relation).contains(place_id)
    }

    pub fn related(&self, relation: Relation) -> &[Uuid] {
        match relation {
            Relation::Favourite => &self.favourites,
            Relation::CheckIn => &self.check_ins,
        }
    }
}

/// A validated registration about to be inserted.
#[derive(Clone, Debug, PartialEq)]
pub struct NewUser {
    pub name: String,
    pub surname: String,
    pub email: String,
    pub password_hash: String,
    pub birthday: String,
    pub gender: Option<String>,
    pub phone: Option<String>,
}

/// What is needed to check a login attempt.
#[derive(Clone, Debug, PartialEq)]
pub struct StoredCredentials {
    pub id: Uuid,
    pub password_hash: String,
}

/// The sets of places a user can toggle membership in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Relation {
    Favourite,
    CheckIn,
}

impl Relation {
    pub const ALL: [Relation; 2] = [Relation::Favourite, Relation::CheckIn];

    /// The table recording this relation.
    pub fn table(self) -> &'static str {
        match self {
            Relation::Favourite => "favourites",
            Relation::CheckIn => "check_ins",
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Relation::Favourite => write!(f, "favourite"),
            Relation::CheckIn => write!(f, "check-in"),
        }
    }
}

/// A user as returned to themselves.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: Uuid,
    pub name: String,
    pub surname: String,
    pub email: String,
    pub birthday: String,
    pub gender: Option<String>,
    pub phone: Option<String>,
    pub profile_picture: String,
    pub favourites: Vec<Uuid>,
    pub check_ins: Vec<Uuid>,
}

impl UserProfile {
    pub fn new(user: User, default_picture: &str) -> Self {
        UserProfile {
            id: user.id,
            name: user.name,
            surname: user.surname,
            email: user.email,
            birthday: user.birthday,
            gender: user.gender,
            phone: user.phone,
            profile_picture: user
                .profile_picture
                .unwrap_or_else(|| default_picture.to_owned()),
            favourites: user.favourites,
            check_ins: user.check_ins,
        }
    }
}

/// The result of a successful login.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Session {
    pub id: Uuid,
    pub token: Uuid,
}
