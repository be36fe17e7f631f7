use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::errors::BackendError;

/// Hashes a password with Argon2id and a fresh salt. Returns the PHC
/// string to store.
pub fn hash_password(password: &str) -> Result<String, BackendError> {
    let salt = SaltString::generate(&mut OsRng);

    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| BackendError::PasswordHashing(e.to_string()))?;

    Ok(hash.to_string())
}

/// Checks a password against a stored PHC string. Fails only if the
/// stored hash cannot be parsed.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, BackendError> {
    let parsed = PasswordHash::new(hash).map_err(|e| BackendError::PasswordHashing(e.to_string()))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashes_verify_only_their_password() {
        let hash = hash_password("hunter2").unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(!hash.contains("hunter2"));
        assert!(verify_password("hunter2", &hash).unwrap());
        assert!(!verify_password("hunter3", &hash).unwrap());
    }

    #[test]
    fn salts_differ() {
        assert_ne!(hash_password("same").unwrap(), hash_password("same").unwrap());
    }

    #[test]
    fn malformed_hashes_are_errors() {
        assert!(matches!(
            verify_password("x", "not a hash"),
            Err(BackendError::PasswordHashing(_))
        ));
    }
}
