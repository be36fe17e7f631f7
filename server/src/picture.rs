use uuid::Uuid;

/// An uploaded picture of a place. Pictures reference their place and
/// owner by ID only.
#[derive(Clone, Debug, PartialEq)]
pub struct Picture {
    pub id: Uuid,

    /// The public URL of the image.
    pub url: String,

    /// The key under which the media store keeps the image.
    pub public_id: String,

    pub owner_id: Uuid,
    pub place_id: Uuid,
}

/// A picture about to be recorded, after the upload succeeded.
#[derive(Clone, Debug, PartialEq)]
pub struct NewPicture {
    pub url: String,
    pub public_id: String,
    pub owner_id: Uuid,
    pub place_id: Uuid,
}
