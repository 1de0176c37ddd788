use argon2::password_hash::SaltString;
use argon2::password_hash::rand_core::OsRng;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use chirp_core::{ChirpError, ChirpResult};

/// Hash a password with Argon2id and a fresh salt, returning the PHC string.
pub fn hash_password(password: &str) -> ChirpResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ChirpError::Crypto(format!("password hashing failed: {e}")))
}

/// Check `password` against a stored PHC string.
///
/// A mismatch is `Ok(false)`; only a malformed hash is an error.
pub fn verify_password(password: &str, hash: &str) -> ChirpResult<bool> {
    let parsed = PasswordHash::new(hash)
        .map_err(|e| ChirpError::Crypto(format!("invalid password hash: {e}")))?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(ChirpError::Crypto(format!(
            "password verification failed: {e}"
        ))),
    }
}
