/// Cryptographic operation errors.
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    #[error("invalid digest length: expected {expected} hex characters, got {actual}")]
    InvalidDigestLength { expected: usize, actual: usize },

    #[error("digest is not lowercase hex: {0}")]
    InvalidDigestEncoding(String),
}
