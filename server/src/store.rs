use std::convert::TryFrom;
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};
use rusoto_s3::{PutObjectRequest, S3Client, StreamingBody, S3};
use url::{ParseError, Url};
use uuid::Uuid;

use crate::errors::BackendError;

pub mod mock;

pub trait Store: Send + Sync {
    /// The type of successful result.
    type Output;

    /// The type of raw data.
    type Raw;

    /// Gets the public URL for the given object.
    fn get_url(&self, key: &Uuid) -> Result<Url, ParseError>;

    /// Saves the given data under the given key.
    fn save(
        &self,
        key: &Uuid,
        content_type: String,
        raw: Self::Raw,
    ) -> BoxFuture<Result<Self::Output, BackendError>>;
}

/// A store that saves pictures to an S3-compatible bucket.
pub struct S3Store {
    client: Arc<S3Client>,
    acl: String,
    bucket: String,
    cache_control: String,
    base_url: Url,
}

impl S3Store {
    pub fn new(
        client: Arc<S3Client>,
        acl: String,
        bucket: String,
        cache_control: String,
        base_url: Url,
    ) -> Self {
        Self {
            client,
            acl,
            bucket,
            cache_control,
            base_url,
        }
    }

    /// Builds a store from the `S3_*` and `BACKEND_S3_*` variables.
    /// Panics if any of them is missing or malformed.
    pub fn from_env() -> Result<Self, rusoto_core::request::TlsError> {
        use rusoto_core::request::HttpClient;
        use rusoto_core::Region;
        use rusoto_credential::StaticProvider;

        use crate::config::get_variable;

        let region = Region::Custom {
            name: get_variable("S3_REGION_NAME"),
            endpoint: get_variable("S3_ENDPOINT"),
        };

        let client = Arc::new(S3Client::new_with(
            HttpClient::new()?,
            StaticProvider::new_minimal(
                get_variable("S3_ACCESS_KEY"),
                get_variable("S3_SECRET_ACCESS_KEY"),
            ),
            region,
        ));

        let base_url = get_variable("S3_BASE_URL");
        let base_url =
            Url::parse(&base_url).unwrap_or_else(|e| panic!("parse S3_BASE_URL {:?}: {}", base_url, e));

        Ok(S3Store::new(
            client,
            get_variable("BACKEND_S3_ACL"),
            get_variable("S3_BUCKET_NAME"),
            get_variable("BACKEND_S3_CACHE_CONTROL"),
            base_url,
        ))
    }
}

impl Store for S3Store {
    type Output = ();
    type Raw = Vec<u8>;

    fn get_url(&self, key: &Uuid) -> Result<Url, ParseError> {
        self.base_url.join(&key.to_string())
    }

    fn save(
        &self,
        key: &Uuid,
        content_type: String,
        raw: Vec<u8>,
    ) -> BoxFuture<Result<(), BackendError>> {
        upload(self, *key, content_type, raw).boxed()
    }
}

async fn upload(
    store: &S3Store,
    key: Uuid,
    content_type: String,
    raw: Vec<u8>,
) -> Result<(), BackendError> {
    // a Vec never holds more than isize::MAX bytes
    let len = i64::try_from(raw.len()).ok();

    let request = PutObjectRequest {
        acl: Some(store.acl.clone()),
        body: Some(StreamingBody::from(raw)),
        bucket: store.bucket.clone(),
        cache_control: Some(store.cache_control.clone()),
        content_length: len,
        content_type: Some(content_type),
        key: key.to_string(),
        ..Default::default()
    };

    store
        .client
        .put_object(request)
        .await
        .map(|_| ())
        .map_err(|source| BackendError::UploadFailed { source })
}
