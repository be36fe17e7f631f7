use futures::future::BoxFuture;
use uuid::Uuid;

use crate::errors::BackendError;
use crate::picture::{NewPicture, Picture};
use crate::place::{NewPlace, Place, Vote};
use crate::search::NearbyQuery;
use crate::tip::{NewTip, Tip};
use crate::user::{NewUser, Relation, StoredCredentials, User};

pub mod memory;

/// The storage operations the use cases rely on.
pub trait Db {
    fn create_session(&self, user_id: &Uuid) -> BoxFuture<Result<Uuid, BackendError>>;

    fn find_nearby(&self, query: NearbyQuery) -> BoxFuture<Result<Vec<Place>, BackendError>>;

    fn insert_picture(&self, picture: NewPicture) -> BoxFuture<Result<Picture, BackendError>>;

    fn insert_place(
        &self,
        owner_id: &Uuid,
        place: NewPlace,
    ) -> BoxFuture<Result<Uuid, BackendError>>;

    fn insert_tip(&self, tip: NewTip) -> BoxFuture<Result<Tip, BackendError>>;

    /// Fails with `AlreadyExists` if the email is taken.
    fn insert_user(&self, user: NewUser) -> BoxFuture<Result<Uuid, BackendError>>;

    fn pictures_of_place(&self, place_id: &Uuid)
        -> BoxFuture<Result<Vec<Picture>, BackendError>>;

    fn pictures_of_user(&self, user_id: &Uuid) -> BoxFuture<Result<Vec<Picture>, BackendError>>;

    /// The places in the relation, in the order they were added.
    fn related_places(
        &self,
        relation: Relation,
        user_id: &Uuid,
    ) -> BoxFuture<Result<Vec<Place>, BackendError>>;

    fn retrieve_credentials(
        &self,
        email: &str,
    ) -> BoxFuture<Result<Option<StoredCredentials>, BackendError>>;

    fn retrieve_place(&self, id: &Uuid) -> BoxFuture<Result<Option<Place>, BackendError>>;

    fn retrieve_user(&self, id: &Uuid) -> BoxFuture<Result<Option<User>, BackendError>>;

    fn session_user(&self, token: &Uuid) -> BoxFuture<Result<Option<Uuid>, BackendError>>;

    fn tips_of_place(&self, place_id: &Uuid) -> BoxFuture<Result<Vec<Tip>, BackendError>>;

    fn tips_of_user(&self, user_id: &Uuid) -> BoxFuture<Result<Vec<Tip>, BackendError>>;

    /// Adds the place to the relation if absent, removes it otherwise.
    /// Returns whether the place is in the relation afterwards.
    fn toggle_relation(
        &self,
        relation: Relation,
        user_id: &Uuid,
        place_id: &Uuid,
    ) -> BoxFuture<Result<bool, BackendError>>;

    fn update_profile_picture(
        &self,
        id: &Uuid,
        url: &str,
        public_id: &str,
    ) -> BoxFuture<Result<(), BackendError>>;

    /// Records the vote, replacing any earlier vote by the same voter
    /// and moving it to the end of the voter list, as one atomic
    /// write. Returns the voter list afterwards.
    fn upsert_vote(&self, place_id: &Uuid, vote: Vote)
        -> BoxFuture<Result<Vec<Vote>, BackendError>>;
}

pub use self::postgres::*;

mod postgres {
    use std::collections::HashMap;

    use futures::future::BoxFuture;
    use futures::FutureExt;
    use lazy_static::lazy_static;
    use sqlx::{
        self,
        postgres::{PgPool, PgRow},
    };
    use uuid::Uuid;

    use crate::errors::BackendError;
    use crate::picture::{NewPicture, Picture};
    use crate::place::{Categories, Category, Coordinates, NewPlace, Place, Score, Vote};
    use crate::search::{escape_like, NearbyFilter, NearbyQuery};
    use crate::tip::{NewTip, Tip};
    use crate::user::{NewUser, Relation, StoredCredentials, User};

    const USERS_EMAIL_CONSTRAINT: &str = "users_email";

    const PLACE_COLUMNS: &str = include_str!("queries/place_columns.sql");
    const NAME_FILTER: &str = r"p.name ILIKE '%' || $4 || '%' ESCAPE '\'";

    lazy_static! {
        static ref RETRIEVE_PLACE: String =
            include_str!("queries/retrieve_place.sql").replace("{columns}", PLACE_COLUMNS);
        static ref FIND_NEARBY_BY_NAME: String = nearby_query(NAME_FILTER);
        static ref FIND_NEARBY_BY_CATEGORY: HashMap<Category, String> = Category::ALL
            .iter()
            .map(|c| (*c, nearby_query(&format!("p.{}", c.column()))))
            .collect();
        static ref RELATED_PLACES: HashMap<Relation, String> = Relation::ALL
            .iter()
            .map(|r| {
                let query = include_str!("queries/related_places.sql")
                    .replace("{columns}", PLACE_COLUMNS)
                    .replace("{relation}", r.table());
                (*r, query)
            })
            .collect();
        static ref TOGGLE_RELATION: HashMap<Relation, String> = Relation::ALL
            .iter()
            .map(|r| {
                let query = include_str!("queries/toggle_relation.sql").replace("{relation}", r.table());
                (*r, query)
            })
            .collect();
        static ref PICTURES_OF_PLACE: String =
            include_str!("queries/retrieve_pictures.sql").replace("{owner}", "place_id");
        static ref PICTURES_OF_USER: String =
            include_str!("queries/retrieve_pictures.sql").replace("{owner}", "user_id");
        static ref TIPS_OF_PLACE: String =
            include_str!("queries/retrieve_tips.sql").replace("{owner}", "place_id");
        static ref TIPS_OF_USER: String =
            include_str!("queries/retrieve_tips.sql").replace("{owner}", "user_id");
    }

    fn nearby_query(filter: &str) -> String {
        include_str!("queries/find_nearby.sql")
            .replace("{columns}", PLACE_COLUMNS)
            .replace("{filter}", filter)
    }

    pub struct PgDb {
        pool: PgPool,
    }

    impl PgDb {
        pub fn new(pool: PgPool) -> Self {
            PgDb { pool }
        }
    }

    // these can be simplified once async functions in traits are stabilized
    impl super::Db for PgDb {
        fn create_session(&self, user_id: &Uuid) -> BoxFuture<Result<Uuid, BackendError>> {
            let user_id = *user_id;

            async move {
                let query = sqlx::query_as(include_str!("queries/create_session.sql"));

                let (token,): (Uuid,) = query
                    .bind(user_id)
                    .fetch_one(&self.pool)
                    .await
                    .map_err(map_sqlx_error)?;

                Ok(token)
            }
            .boxed()
        }

        fn find_nearby(&self, query: NearbyQuery) -> BoxFuture<Result<Vec<Place>, BackendError>> {
            async move {
                let NearbyQuery {
                    filter,
                    origin,
                    radius_meters,
                } = query;

                let sql: &str = match &filter {
                    NearbyFilter::Name(_) => FIND_NEARBY_BY_NAME.as_str(),
                    NearbyFilter::Category(category) => FIND_NEARBY_BY_CATEGORY[category].as_str(),
                };

                let mut query = sqlx::query(sql)
                    .bind(origin.longitude)
                    .bind(origin.latitude)
                    .bind(radius_meters);

                if let NearbyFilter::Name(term) = &filter {
                    query = query.bind(escape_like(term));
                }

                let places = query
                    .try_map(|row: PgRow| place_from_row(&row))
                    .fetch_all(&self.pool)
                    .await
                    .map_err(map_sqlx_error)?;

                Ok(places)
            }
            .boxed()
        }

        fn insert_picture(&self, picture: NewPicture) -> BoxFuture<Result<Picture, BackendError>> {
            async move {
                let query = sqlx::query_as(include_str!("queries/create_picture.sql"));

                let (id,): (Uuid,) = query
                    .bind(&picture.url)
                    .bind(&picture.public_id)
                    .bind(picture.owner_id)
                    .bind(picture.place_id)
                    .fetch_one(&self.pool)
                    .await
                    .map_err(map_sqlx_error)?;

                Ok(Picture {
                    id,
                    url: picture.url,
                    public_id: picture.public_id,
                    owner_id: picture.owner_id,
                    place_id: picture.place_id,
                })
            }
            .boxed()
        }

        fn insert_place(
            &self,
            owner_id: &Uuid,
            place: NewPlace,
        ) -> BoxFuture<Result<Uuid, BackendError>> {
            let owner_id = *owner_id;

            async move {
                let query = sqlx::query_as(include_str!("queries/create_place.sql"));
                let categories = place.categories;

                let (id,): (Uuid,) = query
                    .bind(&place.name)
                    .bind(&place.address)
                    .bind(place.location.latitude)
                    .bind(place.location.longitude)
                    .bind(owner_id)
                    .bind(categories.breakfast)
                    .bind(categories.lunch)
                    .bind(categories.dinner)
                    .bind(categories.coffee)
                    .bind(categories.night_life)
                    .bind(categories.things_to_do)
                    .fetch_one(&self.pool)
                    .await
                    .map_err(map_sqlx_error)?;

                Ok(id)
            }
            .boxed()
        }

        fn insert_tip(&self, tip: NewTip) -> BoxFuture<Result<Tip, BackendError>> {
            async move {
                let query = sqlx::query_as(include_str!("queries/create_tip.sql"));

                let (id,): (Uuid,) = query
                    .bind(&tip.text)
                    .bind(tip.author_id)
                    .bind(tip.place_id)
                    .bind(&tip.time)
                    .fetch_one(&self.pool)
                    .await
                    .map_err(map_sqlx_error)?;

                Ok(Tip {
                    id,
                    text: tip.text,
                    author_id: tip.author_id,
                    place_id: tip.place_id,
                    time: tip.time,
                })
            }
            .boxed()
        }

        fn insert_user(&self, user: NewUser) -> BoxFuture<Result<Uuid, BackendError>> {
            async move {
                let query = sqlx::query_as(include_str!("queries/create_user.sql"));

                let (id,): (Uuid,) = query
                    .bind(&user.name)
                    .bind(&user.surname)
                    .bind(&user.email)
                    .bind(&user.password_hash)
                    .bind(&user.birthday)
                    .bind(&user.gender)
                    .bind(&user.phone)
                    .fetch_one(&self.pool)
                    .await
                    .map_err(|e| match map_sqlx_error(e) {
                        BackendError::AlreadyExists { .. } => BackendError::AlreadyExists {
                            email: user.email.clone(),
                        },
                        e => e,
                    })?;

                Ok(id)
            }
            .boxed()
        }

        fn pictures_of_place(
            &self,
            place_id: &Uuid,
        ) -> BoxFuture<Result<Vec<Picture>, BackendError>> {
            retrieve_pictures(&self.pool, PICTURES_OF_PLACE.as_str(), *place_id).boxed()
        }

        fn pictures_of_user(&self, user_id: &Uuid) -> BoxFuture<Result<Vec<Picture>, BackendError>> {
            retrieve_pictures(&self.pool, PICTURES_OF_USER.as_str(), *user_id).boxed()
        }

        fn related_places(
            &self,
            relation: Relation,
            user_id: &Uuid,
        ) -> BoxFuture<Result<Vec<Place>, BackendError>> {
            let user_id = *user_id;

            async move {
                let places = sqlx::query(RELATED_PLACES[&relation].as_str())
                    .bind(user_id)
                    .try_map(|row: PgRow| place_from_row(&row))
                    .fetch_all(&self.pool)
                    .await
                    .map_err(map_sqlx_error)?;

                Ok(places)
            }
            .boxed()
        }

        fn retrieve_credentials(
            &self,
            email: &str,
        ) -> BoxFuture<Result<Option<StoredCredentials>, BackendError>> {
            let email = email.to_owned();

            async move {
                let credentials = sqlx::query(include_str!("queries/retrieve_credentials.sql"))
                    .bind(email)
                    .try_map(|row: PgRow| {
                        Ok(StoredCredentials {
                            id: try_get(&row, "id")?,
                            password_hash: try_get(&row, "password_hash")?,
                        })
                    })
                    .fetch_optional(&self.pool)
                    .await
                    .map_err(map_sqlx_error)?;

                Ok(credentials)
            }
            .boxed()
        }

        fn retrieve_place(&self, id: &Uuid) -> BoxFuture<Result<Option<Place>, BackendError>> {
            let id = *id;

            async move {
                let place = sqlx::query(RETRIEVE_PLACE.as_str())
                    .bind(id)
                    .try_map(|row: PgRow| place_from_row(&row))
                    .fetch_optional(&self.pool)
                    .await
                    .map_err(map_sqlx_error)?;

                Ok(place)
            }
            .boxed()
        }

        fn retrieve_user(&self, id: &Uuid) -> BoxFuture<Result<Option<User>, BackendError>> {
            let id = *id;

            async move {
                let user = sqlx::query(include_str!("queries/retrieve_user.sql"))
                    .bind(id)
                    .try_map(|row: PgRow| {
                        Ok(User {
                            id: try_get(&row, "id")?,
                            name: try_get(&row, "name")?,
                            surname: try_get(&row, "surname")?,
                            email: try_get(&row, "email")?,
                            birthday: try_get(&row, "birthday")?,
                            gender: try_get(&row, "gender")?,
                            phone: try_get(&row, "phone")?,
                            profile_picture: try_get(&row, "profile_picture")?,
                            favourites: try_get(&row, "favourites")?,
                            check_ins: try_get(&row, "check_ins")?,
                        })
                    })
                    .fetch_optional(&self.pool)
                    .await
                    .map_err(map_sqlx_error)?;

                Ok(user)
            }
            .boxed()
        }

        fn session_user(&self, token: &Uuid) -> BoxFuture<Result<Option<Uuid>, BackendError>> {
            let token = *token;

            async move {
                let query = sqlx::query_as(include_str!("queries/retrieve_session.sql"));

                let user_id: Option<Uuid> = query
                    .bind(token)
                    .fetch_optional(&self.pool)
                    .await
                    .map_err(map_sqlx_error)?
                    .map(|(user_id,)| user_id);

                Ok(user_id)
            }
            .boxed()
        }

        fn tips_of_place(&self, place_id: &Uuid) -> BoxFuture<Result<Vec<Tip>, BackendError>> {
            retrieve_tips(&self.pool, TIPS_OF_PLACE.as_str(), *place_id).boxed()
        }

        fn tips_of_user(&self, user_id: &Uuid) -> BoxFuture<Result<Vec<Tip>, BackendError>> {
            retrieve_tips(&self.pool, TIPS_OF_USER.as_str(), *user_id).boxed()
        }

        fn toggle_relation(
            &self,
            relation: Relation,
            user_id: &Uuid,
            place_id: &Uuid,
        ) -> BoxFuture<Result<bool, BackendError>> {
            let user_id = *user_id;
            let place_id = *place_id;

            async move {
                let (present,): (bool,) = sqlx::query_as(TOGGLE_RELATION[&relation].as_str())
                    .bind(user_id)
                    .bind(place_id)
                    .fetch_one(&self.pool)
                    .await
                    .map_err(map_sqlx_error)?;

                Ok(present)
            }
            .boxed()
        }

        fn update_profile_picture(
            &self,
            id: &Uuid,
            url: &str,
            public_id: &str,
        ) -> BoxFuture<Result<(), BackendError>> {
            let id = *id;
            let url = url.to_owned();
            let public_id = public_id.to_owned();

            async move {
                let count = sqlx::query(include_str!("queries/update_profile_picture.sql"))
                    .bind(id)
                    .bind(url)
                    .bind(public_id)
                    .execute(&self.pool)
                    .await
                    .map_err(map_sqlx_error)?
                    .rows_affected();

                if count == 0 {
                    Err(BackendError::NotFound(crate::errors::Entity::User))
                } else {
                    Ok(())
                }
            }
            .boxed()
        }

        fn upsert_vote(
            &self,
            place_id: &Uuid,
            vote: Vote,
        ) -> BoxFuture<Result<Vec<Vote>, BackendError>> {
            let place_id = *place_id;

            async move {
                sqlx::query(include_str!("queries/upsert_vote.sql"))
                    .bind(place_id)
                    .bind(vote.voter_id)
                    .bind(vote.score)
                    .execute(&self.pool)
                    .await
                    .map_err(map_sqlx_error)?;

                let voters = sqlx::query(include_str!("queries/retrieve_votes.sql"))
                    .bind(place_id)
                    .try_map(|row: PgRow| {
                        Ok(Vote::new(try_get(&row, "user_id")?, try_get(&row, "score")?))
                    })
                    .fetch_all(&self.pool)
                    .await
                    .map_err(map_sqlx_error)?;

                Ok(voters)
            }
            .boxed()
        }
    }

    async fn retrieve_pictures(
        pool: &PgPool,
        sql: &str,
        owner: Uuid,
    ) -> Result<Vec<Picture>, BackendError> {
        sqlx::query(sql)
            .bind(owner)
            .try_map(|row: PgRow| {
                Ok(Picture {
                    id: try_get(&row, "id")?,
                    url: try_get(&row, "url")?,
                    public_id: try_get(&row, "public_id")?,
                    owner_id: try_get(&row, "user_id")?,
                    place_id: try_get(&row, "place_id")?,
                })
            })
            .fetch_all(pool)
            .await
            .map_err(map_sqlx_error)
    }

    async fn retrieve_tips(pool: &PgPool, sql: &str, owner: Uuid) -> Result<Vec<Tip>, BackendError> {
        sqlx::query(sql)
            .bind(owner)
            .try_map(|row: PgRow| {
                Ok(Tip {
                    id: try_get(&row, "id")?,
                    text: try_get(&row, "text")?,
                    author_id: try_get(&row, "user_id")?,
                    place_id: try_get(&row, "place_id")?,
                    time: try_get(&row, "time")?,
                })
            })
            .fetch_all(pool)
            .await
            .map_err(map_sqlx_error)
    }

    fn place_from_row(row: &PgRow) -> Result<Place, sqlx::Error> {
        let voter_ids: Vec<Uuid> = try_get(row, "voter_ids")?;
        let voter_scores: Vec<Score> = try_get(row, "voter_scores")?;

        let voters = voter_ids
            .into_iter()
            .zip(voter_scores)
            .map(|(id, score)| Vote::new(id, score))
            .collect();

        Ok(Place {
            id: try_get(row, "id")?,
            name: try_get(row, "name")?,
            address: try_get(row, "address")?,
            location: Coordinates::new(try_get(row, "longitude")?, try_get(row, "latitude")?),
            owner_id: try_get(row, "user_id")?,
            categories: Categories {
                breakfast: try_get(row, "breakfast")?,
                lunch: try_get(row, "lunch")?,
                dinner: try_get(row, "dinner")?,
                coffee: try_get(row, "coffee")?,
                night_life: try_get(row, "night_life")?,
                things_to_do: try_get(row, "things_to_do")?,
            },
            voters,
        })
    }

    fn try_get<'a, T: sqlx::Type<sqlx::Postgres> + sqlx::decode::Decode<'a, sqlx::Postgres>>(
        row: &'a PgRow,
        column: &str,
    ) -> Result<T, sqlx::Error> {
        use sqlx::prelude::*;

        row.try_get(column)
    }

    fn map_sqlx_error(error: sqlx::Error) -> BackendError {
        use sqlx::Error;

        match error {
            Error::Database(ref e) if e.constraint() == Some(USERS_EMAIL_CONSTRAINT) => {
                BackendError::AlreadyExists {
                    email: String::new(),
                }
            }
            _ => BackendError::Sqlx { source: error },
        }
    }
}
