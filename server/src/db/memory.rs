use std::cmp::Ordering;
use std::collections::HashMap;

use futures::future::BoxFuture;
use futures::FutureExt;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::Db;
use crate::errors::{BackendError, Entity};
use crate::picture::{NewPicture, Picture};
use crate::place::{NewPlace, Place, Vote};
use crate::search::NearbyQuery;
use crate::tip::{NewTip, Tip};
use crate::user::{NewUser, Relation, StoredCredentials, User};

#[derive(Debug)]
struct StoredUser {
    user: NewUser,
    id: Uuid,
    profile_picture: Option<(String, String)>,
}

#[derive(Debug, Default)]
struct State {
    users: Vec<StoredUser>,
    sessions: HashMap<Uuid, Uuid>,
    places: Vec<Place>,
    pictures: Vec<Picture>,
    tips: Vec<Tip>,
    relations: HashMap<(Relation, Uuid), Vec<Uuid>>,
}

impl State {
    fn user(&self, id: &Uuid) -> Option<User> {
        let stored = self.users.iter().find(|u| &u.id == id)?;
        let related = |relation| {
            self.relations
                .get(&(relation, *id))
                .cloned()
                .unwrap_or_default()
        };

        Some(User {
            id: stored.id,
            name: stored.user.name.clone(),
            surname: stored.user.surname.clone(),
            email: stored.user.email.clone(),
            birthday: stored.user.birthday.clone(),
            gender: stored.user.gender.clone(),
            phone: stored.user.phone.clone(),
            profile_picture: stored.profile_picture.as_ref().map(|(url, _)| url.clone()),
            favourites: related(Relation::Favourite),
            check_ins: related(Relation::CheckIn),
        })
    }

    fn place_mut(&mut self, id: &Uuid) -> Option<&mut Place> {
        self.places.iter_mut().find(|p| &p.id == id)
    }
}

/// Keeps everything in process memory. Behaves like `PgDb` as far as
/// ordering and error reporting go.
#[derive(Debug, Default)]
pub struct MemoryDb {
    state: RwLock<State>,
}

impl MemoryDb {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Db for MemoryDb {
    fn create_session(&self, user_id: &Uuid) -> BoxFuture<Result<Uuid, BackendError>> {
        let user_id = *user_id;

        async move {
            let token = Uuid::new_v4();
            self.state.write().await.sessions.insert(token, user_id);
            Ok(token)
        }
        .boxed()
    }

    fn find_nearby(&self, query: NearbyQuery) -> BoxFuture<Result<Vec<Place>, BackendError>> {
        async move {
            let state = self.state.read().await;

            let mut hits: Vec<(f64, &Place)> = state
                .places
                .iter()
                .filter(|p| query.filter.matches(p))
                .map(|p| (query.origin.distance_to(&p.location), p))
                .filter(|(distance, _)| *distance <= query.radius_meters)
                .collect();

            hits.sort_by(|(a, _), (b, _)| a.partial_cmp(b).unwrap_or(Ordering::Equal));

            Ok(hits.into_iter().map(|(_, p)| p.clone()).collect())
        }
        .boxed()
    }

    fn insert_picture(&self, picture: NewPicture) -> BoxFuture<Result<Picture, BackendError>> {
        async move {
            let picture = Picture {
                id: Uuid::new_v4(),
                url: picture.url,
                public_id: picture.public_id,
                owner_id: picture.owner_id,
                place_id: picture.place_id,
            };

            self.state.write().await.pictures.push(picture.clone());
            Ok(picture)
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
            let mut state = self.state.write().await;

            if !state.users.iter().any(|u| u.id == owner_id) {
                return Err(BackendError::NotFound(Entity::User));
            }

            let id = Uuid::new_v4();
            state.places.push(Place {
                id,
                name: place.name,
                address: place.address,
                location: place.location,
                owner_id,
                categories: place.categories,
                voters: vec![],
            });

            Ok(id)
        }
        .boxed()
    }

    fn insert_tip(&self, tip: NewTip) -> BoxFuture<Result<Tip, BackendError>> {
        async move {
            let tip = Tip {
                id: Uuid::new_v4(),
                text: tip.text,
                author_id: tip.author_id,
                place_id: tip.place_id,
                time: tip.time,
            };

            self.state.write().await.tips.push(tip.clone());
            Ok(tip)
        }
        .boxed()
    }

    fn insert_user(&self, user: NewUser) -> BoxFuture<Result<Uuid, BackendError>> {
        async move {
            let mut state = self.state.write().await;

            if state.users.iter().any(|u| u.user.email == user.email) {
                return Err(BackendError::AlreadyExists { email: user.email });
            }

            let id = Uuid::new_v4();
            state.users.push(StoredUser {
                user,
                id,
                profile_picture: None,
            });

            Ok(id)
        }
        .boxed()
    }

    fn pictures_of_place(
        &self,
        place_id: &Uuid,
    ) -> BoxFuture<Result<Vec<Picture>, BackendError>> {
        let place_id = *place_id;

        async move {
            let state = self.state.read().await;
            Ok(state
                .pictures
                .iter()
                .filter(|p| p.place_id == place_id)
                .cloned()
                .collect())
        }
        .boxed()
    }

    fn pictures_of_user(&self, user_id: &Uuid) -> BoxFuture<Result<Vec<Picture>, BackendError>> {
        let user_id = *user_id;

        async move {
            let state = self.state.read().await;
            Ok(state
                .pictures
                .iter()
                .filter(|p| p.owner_id == user_id)
                .cloned()
                .collect())
        }
        .boxed()
    }

    fn related_places(
        &self,
        relation: Relation,
        user_id: &Uuid,
    ) -> BoxFuture<Result<Vec<Place>, BackendError>> {
        let user_id = *user_id;

        async move {
            let state = self.state.read().await;
            let ids = match state.relations.get(&(relation, user_id)) {
                Some(ids) => ids,
                None => return Ok(vec![]),
            };

            Ok(ids
                .iter()
                .filter_map(|id| state.places.iter().find(|p| &p.id == id))
                .cloned()
                .collect())
        }
        .boxed()
    }

    fn retrieve_credentials(
        &self,
        email: &str,
    ) -> BoxFuture<Result<Option<StoredCredentials>, BackendError>> {
        let email = email.to_owned();

        async move {
            let state = self.state.read().await;
            Ok(state
                .users
                .iter()
                .find(|u| u.user.email == email)
                .map(|u| StoredCredentials {
                    id: u.id,
                    password_hash: u.user.password_hash.clone(),
                }))
        }
        .boxed()
    }

    fn retrieve_place(&self, id: &Uuid) -> BoxFuture<Result<Option<Place>, BackendError>> {
        let id = *id;

        async move {
            let state = self.state.read().await;
            Ok(state.places.iter().find(|p| p.id == id).cloned())
        }
        .boxed()
    }

    fn retrieve_user(&self, id: &Uuid) -> BoxFuture<Result<Option<User>, BackendError>> {
        let id = *id;

        async move { Ok(self.state.read().await.user(&id)) }.boxed()
    }

    fn session_user(&self, token: &Uuid) -> BoxFuture<Result<Option<Uuid>, BackendError>> {
        let token = *token;

        async move { Ok(self.state.read().await.sessions.get(&token).copied()) }.boxed()
    }

    fn tips_of_place(&self, place_id: &Uuid) -> BoxFuture<Result<Vec<Tip>, BackendError>> {
        let place_id = *place_id;

        async move {
            let state = self.state.read().await;
            Ok(state
                .tips
                .iter()
                .filter(|t| t.place_id == place_id)
                .cloned()
                .collect())
        }
        .boxed()
    }

    fn tips_of_user(&self, user_id: &Uuid) -> BoxFuture<Result<Vec<Tip>, BackendError>> {
        let user_id = *user_id;

        async move {
            let state = self.state.read().await;
            Ok(state
                .tips
                .iter()
                .filter(|t| t.author_id == user_id)
                .cloned()
                .collect())
        }
        .boxed()
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
            let mut state = self.state.write().await;
            let related = state.relations.entry((relation, user_id)).or_default();

            match related.iter().position(|id| *id == place_id) {
                Some(index) => {
                    related.remove(index);
                    Ok(false)
                }
                None => {
                    related.push(place_id);
                    Ok(true)
                }
            }
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
        let picture = (url.to_owned(), public_id.to_owned());

        async move {
            let mut state = self.state.write().await;

            match state.users.iter_mut().find(|u| u.id == id) {
                Some(user) => {
                    user.profile_picture = Some(picture);
                    Ok(())
                }
                None => Err(BackendError::NotFound(Entity::User)),
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
            let mut state = self.state.write().await;
            let place = state
                .place_mut(&place_id)
                .ok_or(BackendError::NotFound(Entity::Place))?;

            place.voters.retain(|v| v.voter_id != vote.voter_id);
            place.voters.push(vote);

            Ok(place.voters.clone())
        }
        .boxed()
    }
}
