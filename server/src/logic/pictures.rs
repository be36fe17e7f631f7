use log::{debug, o};
use url::Url;
use uuid::Uuid;

use super::{require_place, require_user};
use crate::environment::Environment;
use crate::errors::BackendError;
use crate::io::ImageUpload;
use crate::picture::NewPicture;

/// Saves an image under a fresh key. Returns its public URL and the
/// key, which doubles as the picture's public id.
pub(crate) async fn upload_image(
    environment: &Environment,
    image: ImageUpload,
) -> Result<(Url, Uuid), BackendError> {
    let key = Uuid::new_v4();

    environment
        .store
        .save(&key, image.content_type, image.raw)
        .await?;

    let url = environment
        .store
        .get_url(&key)
        .map_err(|source| BackendError::FailedToGenerateUrl { source })?;

    Ok((url, key))
}

/// Adds a picture to a place. Checks the user, then the place, before
/// uploading anything.
pub async fn add_place_picture(
    environment: &Environment,
    user_id: &Uuid,
    place_id: &Uuid,
    image: ImageUpload,
) -> Result<String, BackendError> {
    require_user(environment, user_id).await?;
    require_place(environment, place_id).await?;

    let logger = environment.logger.new(o!(
        "user_id" => user_id.to_string(),
        "place_id" => place_id.to_string()
    ));

    debug!(logger, "Uploading picture..."; "content_type" => &image.content_type);
    let (url, key) = upload_image(environment, image).await?;

    debug!(logger, "Recording picture..."; "key" => %key);
    let picture = environment
        .db
        .insert_picture(NewPicture {
            url: url.into(),
            public_id: key.to_string(),
            owner_id: *user_id,
            place_id: *place_id,
        })
        .await?;

    Ok(picture.url)
}

/// The URLs of a place's pictures, oldest first.
pub async fn list_place_pictures(
    environment: &Environment,
    place_id: &Uuid,
) -> Result<Vec<String>, BackendError> {
    require_place(environment, place_id).await?;

    let pictures = environment.db.pictures_of_place(place_id).await?;

    Ok(pictures.into_iter().map(|p| p.url).collect())
}

/// The URLs of the pictures a user uploaded, oldest first.
pub async fn list_user_pictures(
    environment: &Environment,
    user_id: &Uuid,
) -> Result<Vec<String>, BackendError> {
    require_user(environment, user_id).await?;

    let pictures = environment.db.pictures_of_user(user_id).await?;

    Ok(pictures.into_iter().map(|p| p.url).collect())
}
