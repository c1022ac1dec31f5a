//! Credential hashing seam.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("failed to hash credential: {0}")]
    Hash(String),
    #[error("stored credential hash is malformed: {0}")]
    MalformedHash(String),
}

/// One-way password hashing. `verify` answers whether `plaintext` matches a
/// hash previously produced by `hash`.
pub trait CredentialHasher: Send + Sync {
    fn hash(&self, plaintext: &str) -> Result<String, CredentialError>;

    fn verify(&self, plaintext: &str, hash: &str) -> Result<bool, CredentialError>;
}
