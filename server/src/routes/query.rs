use serde::Deserialize;

/// Parameters of a nearby search. `name` takes precedence over
/// `filter` when both are given.
#[derive(Clone, Debug, Deserialize)]
pub struct SearchQuery {
    pub name: Option<String>,
    pub filter: Option<String>,
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
}
