//! Eager argument checks. Every use case runs these before touching
//! storage.

use crate::errors::BackendError;
use crate::normalization::normalize_text;

/// Returns the normalized value, or a validation error if it is
/// missing or blank.
pub fn required(field: &'static str, value: Option<&str>) -> Result<String, BackendError> {
    let value = value.ok_or_else(|| BackendError::missing(field))?;
    let normalized = normalize_text(value);

    if normalized.is_empty() {
        return Err(BackendError::blank(field));
    }

    Ok(normalized)
}

/// Like `required`, but leaves the text untouched apart from the
/// blank check. Used for secrets.
pub fn required_raw(field: &'static str, value: Option<&str>) -> Result<String, BackendError> {
    let value = value.ok_or_else(|| BackendError::missing(field))?;

    if value.trim().is_empty() {
        return Err(BackendError::blank(field));
    }

    Ok(value.to_owned())
}

/// Normalizes an optional value; blank strings count as absent.
pub fn optional(value: Option<&str>) -> Option<String> {
    value.map(normalize_text).filter(|s| !s.is_empty())
}

/// Rejects `NaN` and infinities.
pub fn coordinate(field: &'static str, value: Option<f64>) -> Result<f64, BackendError> {
    let value = value.ok_or_else(|| BackendError::missing(field))?;

    if value.is_finite() {
        Ok(value)
    } else {
        Err(BackendError::not_a_number(field))
    }
}
