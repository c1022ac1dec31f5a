//! Argon2id implementation of [`CredentialHasher`].

use argon2::{
    Argon2, PasswordHash, PasswordVerifier,
    password_hash::{self, PasswordHasher, SaltString, rand_core::OsRng},
};

use crate::application::credentials::{CredentialError, CredentialHasher};

/// Hashes with Argon2id default parameters and a fresh random salt; output is
/// the PHC string stored alongside the account.
#[derive(Debug, Clone, Copy, Default)]
pub struct Argon2Hasher;

impl CredentialHasher for Argon2Hasher {
    fn hash(&self, plaintext: &str) -> Result<String, CredentialError> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(plaintext.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|err| CredentialError::Hash(err.to_string()))
    }

    fn verify(&self, plaintext: &str, hash: &str) -> Result<bool, CredentialError> {
        let parsed =
            PasswordHash::new(hash).map_err(|err| CredentialError::MalformedHash(err.to_string()))?;

        match Argon2::default().verify_password(plaintext.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(err) => Err(CredentialError::MalformedHash(err.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_verifies_only_the_original_password() {
        let hasher = Argon2Hasher;
        let hash = hasher.hash("correct horse").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(hasher.verify("correct horse", &hash).unwrap());
        assert!(!hasher.verify("battery staple", &hash).unwrap());
    }

    #[test]
    fn salts_differ_between_hashes() {
        let hasher = Argon2Hasher;
        assert_ne!(hasher.hash("same").unwrap(), hasher.hash("same").unwrap());
    }

    #[test]
    fn malformed_hash_is_an_error() {
        assert!(matches!(
            Argon2Hasher.verify("pw", "plaintext-in-db"),
            Err(CredentialError::MalformedHash(_))
        ));
    }
}
