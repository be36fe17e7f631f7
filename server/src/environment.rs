use std::sync::Arc;

use log::Logger;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::db::Db;
use crate::media::{DEFAULT_PICTURE_URL, DEFAULT_PROFILE_PICTURE_URL};
use crate::store::Store;
use crate::urls::Urls;

/// Places further than this from the query point are left out of
/// nearby searches.
pub const DEFAULT_SEARCH_RADIUS_METERS: f64 = 15_000.0;

pub type SafeStore = dyn Store<Output = (), Raw = Vec<u8>> + Send + Sync;

/// Everything a request handler needs. Cheap to clone; nothing in it
/// is mutated by requests.
#[derive(Clone)]
pub struct Environment {
    pub logger: Arc<Logger>,
    pub db: Arc<dyn Db + Send + Sync>,
    pub urls: Arc<Urls>,
    pub store: Arc<SafeStore>,
    pub config: Arc<Config>,
}

impl Environment {
    pub fn new(
        logger: Arc<Logger>,
        db: Arc<dyn Db + Send + Sync>,
        urls: Arc<Urls>,
        store: Arc<SafeStore>,
        config: Config,
    ) -> Self {
        Self {
            logger,
            db,
            urls,
            store,
            config: Arc::new(config),
        }
    }

    /// A fresh random source for picking pictures and tips. Seeded
    /// from configuration when a seed is set, from the OS otherwise.
    pub fn rng(&self) -> StdRng {
        match self.config.picker_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub(crate) search_radius_meters: f64,
    pub(crate) default_picture_url: String,
    pub(crate) default_profile_picture_url: String,
    pub(crate) picker_seed: Option<u64>,
}

impl Config {
    pub fn new(
        search_radius_meters: f64,
        default_picture_url: Option<String>,
        picker_seed: Option<u64>,
    ) -> Self {
        Self {
            search_radius_meters,
            default_picture_url: default_picture_url
                .unwrap_or_else(|| DEFAULT_PICTURE_URL.to_owned()),
            default_profile_picture_url: DEFAULT_PROFILE_PICTURE_URL.to_owned(),
            picker_seed,
        }
    }
}
