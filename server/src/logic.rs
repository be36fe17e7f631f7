//! The use cases, one function each. Arguments are validated before
//! any storage access; lookups of referenced records come next, in the
//! order each function documents.

use uuid::Uuid;

use crate::environment::Environment;
use crate::errors::{BackendError, Entity};
use crate::place::Place;
use crate::user::User;

pub mod pictures;
pub mod places;
pub mod relations;
pub mod tips;
pub mod users;

/// Looks up a user or fails with `NotFound(User)`.
pub(crate) async fn require_user(environment: &Environment, id: &Uuid) -> Result<User, BackendError> {
    environment
        .db
        .retrieve_user(id)
        .await?
        .ok_or(BackendError::NotFound(Entity::User))
}

/// Looks up a place or fails with `NotFound(Place)`.
pub(crate) async fn require_place(
    environment: &Environment,
    id: &Uuid,
) -> Result<Place, BackendError> {
    environment
        .db
        .retrieve_place(id)
        .await?
        .ok_or(BackendError::NotFound(Entity::Place))
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Arc;

    use url::Url;
    use uuid::Uuid;

    use crate::db::memory::MemoryDb;
    use crate::environment::{Config, Environment};
    use crate::io::ImageUpload;
    use crate::place::{Categories, Coordinates, NewPlace};
    use crate::store::mock::MockStore;
    use crate::urls::Urls;
    use crate::user::NewUser;

    pub(crate) fn environment() -> (Environment, Arc<MockStore>) {
        let base = Url::parse("https://media.example.com/pictures/").unwrap();
        let store = Arc::new(MockStore::new(base));

        let environment = Environment::new(
            Arc::new(log::discard_logger()),
            Arc::new(MemoryDb::new()),
            Arc::new(Urls::new("https://example.com/", "api")),
            store.clone(),
            Config::new(15_000.0, None, Some(5)),
        );

        (environment, store)
    }

    pub(crate) async fn user(environment: &Environment, email: &str) -> Uuid {
        environment
            .db
            .insert_user(NewUser {
                name: "Ana".to_owned(),
                surname: "Puig".to_owned(),
                email: email.to_owned(),
                password_hash: "unused".to_owned(),
                birthday: "1990-01-01".to_owned(),
                gender: None,
                phone: None,
            })
            .await
            .unwrap()
    }

    pub(crate) async fn place(environment: &Environment, owner: &Uuid, name: &str) -> Uuid {
        environment
            .db
            .insert_place(
                owner,
                NewPlace {
                    name: name.to_owned(),
                    address: "Carrer de Montcada, 22".to_owned(),
                    location: Coordinates::new(2.1812, 41.3845),
                    categories: Categories::default(),
                },
            )
            .await
            .unwrap()
    }

    pub(crate) fn png() -> ImageUpload {
        ImageUpload {
            content_type: "image/png".to_owned(),
            raw: vec![0x89, b'P', b'N', b'G'],
        }
    }
}
