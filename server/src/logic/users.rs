use log::{debug, o};
use serde::Deserialize;
use url::Url;
use uuid::Uuid;

use super::pictures::upload_image;
use super::require_user;
use crate::environment::Environment;
use crate::errors::{BackendError, Entity};
use crate::io::ImageUpload;
use crate::normalization::normalize_email;
use crate::password::{hash_password, verify_password};
use crate::user::{NewUser, Session, UserProfile};
use crate::validation::{optional, required, required_raw};

/// A registration form as submitted.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Registration {
    pub name: Option<String>,
    pub surname: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub birthday: Option<String>,
    pub gender: Option<String>,
    pub phone: Option<String>,
}

/// Login credentials as submitted.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Credentials {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Creates a user. The email is stored trimmed and lower-cased; the
/// password only as an Argon2id hash.
pub async fn register_user(
    environment: &Environment,
    registration: Registration,
) -> Result<Uuid, BackendError> {
    let name = required("name", registration.name.as_deref())?;
    let surname = required("surname", registration.surname.as_deref())?;
    let email = normalize_email(required("email", registration.email.as_deref())?);
    let password = required_raw("password", registration.password.as_deref())?;
    let birthday = required("birthday", registration.birthday.as_deref())?;

    let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| BackendError::PasswordHashing(e.to_string()))??;

    debug!(environment.logger, "Registering user..."; "email" => &email);
    environment
        .db
        .insert_user(NewUser {
            name,
            surname,
            email,
            password_hash,
            birthday,
            gender: optional(registration.gender.as_deref()),
            phone: optional(registration.phone.as_deref()),
        })
        .await
}

/// Checks the credentials and opens a new session.
pub async fn authenticate_user(
    environment: &Environment,
    credentials: Credentials,
) -> Result<Session, BackendError> {
    let email = normalize_email(required("email", credentials.email.as_deref())?);
    let password = required_raw("password", credentials.password.as_deref())?;

    let stored = environment
        .db
        .retrieve_credentials(&email)
        .await?
        .ok_or(BackendError::NotFound(Entity::User))?;

    let hash = stored.password_hash;
    let matches = tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| BackendError::PasswordHashing(e.to_string()))??;

    if !matches {
        return Err(BackendError::IncorrectCredentials);
    }

    let token = environment.db.create_session(&stored.id).await?;
    debug!(environment.logger, "Opened session"; "user_id" => %stored.id);

    Ok(Session {
        id: stored.id,
        token,
    })
}

/// The user as shown to themselves.
pub async fn retrieve_user(environment: &Environment, id: &Uuid) -> Result<UserProfile, BackendError> {
    let user = require_user(environment, id).await?;

    Ok(UserProfile::new(
        user,
        &environment.config.default_profile_picture_url,
    ))
}

/// Uploads a new profile picture and returns its public URL.
pub async fn add_profile_picture(
    environment: &Environment,
    id: &Uuid,
    image: ImageUpload,
) -> Result<Url, BackendError> {
    require_user(environment, id).await?;

    let logger = environment.logger.new(o!("user_id" => id.to_string()));
    debug!(logger, "Uploading profile picture...");
    let (url, key) = upload_image(environment, image).await?;

    environment
        .db
        .update_profile_picture(id, url.as_str(), &key.to_string())
        .await?;

    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::testing::{environment, png};

    fn registration(email: &str) -> Registration {
        Registration {
            name: Some("Ana".to_owned()),
            surname: Some("Puig".to_owned()),
            email: Some(email.to_owned()),
            password: Some("s3cret".to_owned()),
            birthday: Some("1990-01-01".to_owned()),
            gender: Some("  ".to_owned()),
            phone: None,
        }
    }

    fn credentials(email: &str, password: &str) -> Credentials {
        Credentials {
            email: Some(email.to_owned()),
            password: Some(password.to_owned()),
        }
    }

    #[tokio::test]
    async fn registering_twice_fails_and_keeps_the_first_user() {
        let (environment, _) = environment();

        let id = register_user(&environment, registration("ana@example.com"))
            .await
            .unwrap();

        let mut second = registration(" ANA@example.com ");
        second.name = Some("Impostor".to_owned());
        let result = register_user(&environment, second).await;
        assert!(matches!(result, Err(BackendError::AlreadyExists { .. })));

        let user = retrieve_user(&environment, &id).await.unwrap();
        assert_eq!(user.name, "Ana");
        assert_eq!(user.email, "ana@example.com");
        assert_eq!(user.gender, None);
    }

    #[tokio::test]
    async fn blank_fields_fail_before_storage() {
        let (environment, _) = environment();

        let mut blank = registration("ana@example.com");
        blank.surname = Some(" ".to_owned());

        assert!(matches!(
            register_user(&environment, blank).await,
            Err(BackendError::Validation { field: "surname", .. })
        ));
        assert!(matches!(
            authenticate_user(&environment, credentials("ana@example.com", "s3cret")).await,
            Err(BackendError::NotFound(Entity::User))
        ));
    }

    #[tokio::test]
    async fn authentication_checks_the_password() {
        let (environment, _) = environment();
        let id = register_user(&environment, registration("ana@example.com"))
            .await
            .unwrap();

        assert!(matches!(
            authenticate_user(&environment, credentials("ana@example.com", "wrong")).await,
            Err(BackendError::IncorrectCredentials)
        ));

        let session = authenticate_user(&environment, credentials("Ana@Example.com", "s3cret"))
            .await
            .unwrap();
        assert_eq!(session.id, id);
        assert_eq!(
            environment.db.session_user(&session.token).await.unwrap(),
            Some(id)
        );
    }

    #[tokio::test]
    async fn profile_picture_defaults_until_uploaded() {
        let (environment, store) = environment();
        let id = register_user(&environment, registration("ana@example.com"))
            .await
            .unwrap();

        let user = retrieve_user(&environment, &id).await.unwrap();
        assert_eq!(
            user.profile_picture,
            environment.config.default_profile_picture_url
        );

        let url = add_profile_picture(&environment, &id, png()).await.unwrap();
        assert_eq!(store.count().await, 1);

        let user = retrieve_user(&environment, &id).await.unwrap();
        assert_eq!(user.profile_picture, url.as_str());
    }

    #[tokio::test]
    async fn unknown_users_are_not_found() {
        let (environment, store) = environment();
        let id = Uuid::new_v4();

        assert!(matches!(
            retrieve_user(&environment, &id).await,
            Err(BackendError::NotFound(Entity::User))
        ));
        assert!(matches!(
            add_profile_picture(&environment, &id, png()).await,
            Err(BackendError::NotFound(Entity::User))
        ));
        assert_eq!(store.count().await, 0);
    }
}
