use std::collections::HashMap;

use futures::future::{BoxFuture, FutureExt};
use tokio::sync::RwLock;
use url::{ParseError, Url};
use uuid::Uuid;

use crate::errors::BackendError;
use crate::store::Store;

/// An uploaded object held by [`MockStore`].
#[derive(Clone, Debug, PartialEq)]
pub struct StoredObject {
    pub content_type: String,
    pub raw: Vec<u8>,
}

/// Keeps uploads in memory and serves them from a fake base URL.
pub struct MockStore {
    base_url: Url,
    objects: RwLock<HashMap<Uuid, StoredObject>>,
}

impl MockStore {
    pub fn new(base_url: Url) -> Self {
        MockStore {
            base_url,
            objects: RwLock::default(),
        }
    }

    pub async fn get(&self, key: &Uuid) -> Option<StoredObject> {
        self.objects.read().await.get(key).cloned()
    }

    pub async fn count(&self) -> usize {
        self.objects.read().await.len()
    }
}

impl Store for MockStore {
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
        let key = *key;

        async move {
            let object = StoredObject { content_type, raw };
            self.objects.write().await.insert(key, object);
            Ok(())
        }
        .boxed()
    }
}
