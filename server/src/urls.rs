use url::{ParseError, Url};
use uuid::Uuid;

/// Convenience wrapper for URL generation functions.
#[derive(Clone, Debug)]
pub struct Urls {
    /// Top-level URL, including trailing slash.
    base: Url,

    /// Path segment every API route lives under.
    pub(crate) api_path: String,

    /// `api_path` with a trailing slash.
    api_prefix: String,
}

impl Urls {
    /// Create a new instance. `api_path` should *not* include a
    /// trailing slash. Panics if `base` is not a URL.
    pub fn new(base: impl AsRef<str>, api_path: impl Into<String>) -> Self {
        let base =
            Url::parse(base.as_ref()).unwrap_or_else(|_| panic!("parse {} as URL", base.as_ref()));
        let api_path = api_path.into();
        let api_prefix = format!("{}/", api_path);

        Urls {
            base,
            api_path,
            api_prefix,
        }
    }

    pub fn api(&self) -> Result<Url, ParseError> {
        self.base.join(&self.api_prefix)
    }

    /// Where a newly created place can be retrieved by its owner.
    pub fn place(&self, user_id: &Uuid, place_id: &Uuid) -> Result<Url, ParseError> {
        self.api()?
            .join(&format!("users/{}/places/{}", user_id, place_id))
    }
}
