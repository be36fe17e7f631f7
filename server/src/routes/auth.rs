use uuid::Uuid;

use crate::environment::Environment;
use crate::errors::BackendError;

const BEARER_PREFIX: &str = "Bearer ";

/// Parses an ID taken from the request path.
pub(crate) fn parse_id(raw: &str) -> Result<Uuid, BackendError> {
    Uuid::parse_str(raw).map_err(|_| BackendError::InvalidId(raw.to_owned()))
}

/// Extracts the session token from an `Authorization` header.
pub(crate) fn bearer_token(header: Option<&str>) -> Result<Uuid, BackendError> {
    let header = header.ok_or(BackendError::MissingCredentials)?;

    let token = header
        .strip_prefix(BEARER_PREFIX)
        .ok_or(BackendError::InvalidSession)?;

    Uuid::parse_str(token.trim()).map_err(|_| BackendError::InvalidSession)
}

/// Parses the path user ID and checks that the caller holds a session
/// for that same user.
pub(crate) async fn authorize(
    environment: &Environment,
    raw_id: &str,
    authorization: Option<&str>,
) -> Result<Uuid, BackendError> {
    let id = parse_id(raw_id)?;
    let token = bearer_token(authorization)?;

    let session = environment
        .db
        .session_user(&token)
        .await?
        .ok_or(BackendError::InvalidSession)?;

    if session != id {
        return Err(BackendError::Forbidden { session, user: id });
    }

    Ok(id)
}
