use std::io;

use bytes::{Buf, Bytes};
use futures::stream::StreamExt;
use mime::Mime;
use warp::multipart::{FormData, Part};

use crate::errors::BackendError;

/// The form field carrying an uploaded picture.
pub const PICTURE_FIELD: &str = "picture";

/// An image read from a form submission.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageUpload {
    pub content_type: String,
    pub raw: Vec<u8>,
}

/// Collects chunks of [`Part`].
pub async fn part_as_vec(raw: Part) -> Result<Vec<u8>, ()> {
    let vec_of_results = part_as_stream(raw).collect::<Vec<_>>().await;

    let vec_of_vecs = vec_of_results
        .into_iter()
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| ())?;

    Ok(vec_of_vecs.concat())
}

/// Collects raw data from [`Part`].
pub fn part_as_stream(raw: Part) -> impl futures::Stream<Item = Result<Bytes, io::Error>> {
    raw.stream().map(|r| {
        r.map(|mut x| x.copy_to_bytes(x.remaining()))
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "could not retrieve chunk"))
    })
}

/// Checks that a declared content type names an image.
pub fn image_content_type(content_type: Option<&str>) -> Result<Mime, BackendError> {
    let unsupported = || BackendError::UnsupportedMediaType {
        content_type: content_type.map(str::to_owned),
    };

    let mime: Mime = content_type.ok_or_else(unsupported)?.parse().map_err(|_| unsupported())?;

    if mime.type_() == mime::IMAGE {
        Ok(mime)
    } else {
        Err(unsupported())
    }
}

/// Reads the `picture` part of a submission. Parts before it are
/// skipped unread; parts after it are never polled.
pub async fn parse_picture(mut form: FormData) -> Result<ImageUpload, BackendError> {
    while let Some(part) = form.next().await {
        let part = part.map_err(|_| BackendError::MalformedFormSubmission)?;

        if part.name() != PICTURE_FIELD {
            continue;
        }

        let mime = image_content_type(part.content_type())?;

        let raw = part_as_vec(part)
            .await
            .map_err(|_| BackendError::MalformedFormSubmission)?;

        if raw.is_empty() {
            return Err(BackendError::PartsMissing);
        }

        return Ok(ImageUpload {
            content_type: mime.essence_str().to_owned(),
            raw,
        });
    }

    Err(BackendError::PartsMissing)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn images_are_accepted() {
        let mime = image_content_type(Some("image/png")).unwrap();
        assert_eq!(mime.essence_str(), "image/png");

        let mime = image_content_type(Some("image/jpeg; charset=binary")).unwrap();
        assert_eq!(mime.essence_str(), "image/jpeg");
    }

    #[test]
    fn other_types_are_rejected() {
        for content_type in &[Some("text/plain"), Some("application/pdf"), Some("garbage"), None] {
            assert!(matches!(
                image_content_type(*content_type),
                Err(BackendError::UnsupportedMediaType { .. })
            ));
        }
    }
}
