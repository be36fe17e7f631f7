use serde::Serialize;
use warp::reject;

use crate::errors::BackendError;
use crate::user::Relation;

#[derive(Debug)]
pub struct Rejection {
    pub(crate) context: Context,
    pub(crate) error: BackendError,
}

impl Rejection {
    pub fn new(context: Context, error: BackendError) -> Self {
        Rejection { context, error }
    }

    pub fn flatten(&self) -> FlattenedRejection {
        FlattenedRejection {
            context: self.context.clone(),
            message: format!("{}", self.error),
        }
    }
}

impl reject::Reject for Rejection {}

#[derive(Debug, Serialize)]
pub struct FlattenedRejection {
    #[serde(flatten)]
    pub(crate) context: Context,
    pub(crate) message: String,
}

/// The operation a request was attempting, with the path arguments it
/// was given.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "context", rename_all = "snake_case")]
pub enum Context {
    AddPicture { id: String, place_id: String },
    AddPlace { id: String },
    AddTip { id: String, place_id: String },
    Authenticate,
    ListPlacePictures { id: String, place_id: String },
    ListPlaceTips { id: String, place_id: String },
    ListRelated { id: String, relation: String },
    ListUserPictures { id: String },
    ListUserTips { id: String },
    ProfilePicture { id: String },
    Register,
    RetrievePlace { id: String, place_id: String },
    RetrieveUser { id: String },
    SearchPlaces { id: String },
    Toggle { id: String, relation: String },
    UpdateScoring { id: String, place_id: String },
}

impl Context {
    pub fn add_picture(id: String, place_id: String) -> Context {
        Context::AddPicture { id, place_id }
    }

    pub fn add_place(id: String) -> Context {
        Context::AddPlace { id }
    }

    pub fn add_tip(id: String, place_id: String) -> Context {
        Context::AddTip { id, place_id }
    }

    pub fn authenticate() -> Context {
        Context::Authenticate
    }

    pub fn list_place_pictures(id: String, place_id: String) -> Context {
        Context::ListPlacePictures { id, place_id }
    }

    pub fn list_place_tips(id: String, place_id: String) -> Context {
        Context::ListPlaceTips { id, place_id }
    }

    pub fn list_related(id: String, relation: Relation) -> Context {
        Context::ListRelated {
            id,
            relation: relation.to_string(),
        }
    }

    pub fn list_user_pictures(id: String) -> Context {
        Context::ListUserPictures { id }
    }

    pub fn list_user_tips(id: String) -> Context {
        Context::ListUserTips { id }
    }

    pub fn profile_picture(id: String) -> Context {
        Context::ProfilePicture { id }
    }

    pub fn register() -> Context {
        Context::Register
    }

    pub fn retrieve_place(id: String, place_id: String) -> Context {
        Context::RetrievePlace { id, place_id }
    }

    pub fn retrieve_user(id: String) -> Context {
        Context::RetrieveUser { id }
    }

    pub fn search_places(id: String) -> Context {
        Context::SearchPlaces { id }
    }

    pub fn toggle(id: String, relation: Relation) -> Context {
        Context::Toggle {
            id,
            relation: relation.to_string(),
        }
    }

    pub fn update_scoring(id: String, place_id: String) -> Context {
        Context::UpdateScoring { id, place_id }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::errors::Entity;

    #[test]
    fn flattened_rejections_name_their_context() {
        let rejection = Rejection::new(
            Context::retrieve_place("u".to_owned(), "p".to_owned()),
            BackendError::NotFound(Entity::Place),
        );

        assert_eq!(
            serde_json::to_value(rejection.flatten()).unwrap(),
            json!({
                "context": "retrieve_place",
                "id": "u",
                "place_id": "p",
                "message": "place does not exist",
            })
        );
    }

    #[test]
    fn unit_contexts_serialize_as_tags() {
        let rejection = Rejection::new(Context::register(), BackendError::blank("name"));

        assert_eq!(
            serde_json::to_value(rejection.flatten()).unwrap(),
            json!({ "context": "register", "message": "name is empty or blank" })
        );
    }
}
