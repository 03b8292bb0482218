//! Credentia Crypto: SHA-256 commitments over canonical credential encodings.

pub mod error;
pub mod hashing;

pub use error::CryptoError;
pub use hashing::{commit, decode_digest, digest_fields, is_digest_hex, sha256, Hash, DIGEST_HEX_LEN};
