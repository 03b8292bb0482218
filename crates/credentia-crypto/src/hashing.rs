use credentia_core::{canonicalize, CanonicalString, CredentialFields};
use sha2::{Digest, Sha256};

use crate::error::CryptoError;

/// SHA-256 hash (32 bytes).
pub type Hash = [u8; 32];

/// Length of a rendered digest.
pub const DIGEST_HEX_LEN: usize = 64;

/// Hash arbitrary data using SHA-256.
pub fn sha256(data: &[u8]) -> Hash {
    Sha256::digest(data).into()
}

/// Commit to a canonical credential encoding: SHA-256 over its raw bytes,
/// rendered as lowercase hex.
pub fn commit(canonical: &CanonicalString) -> String {
    hex::encode(sha256(canonical.as_bytes()))
}

/// `commit(canonicalize(fields))`, the digest stored at issuance and
/// recomputed at verification.
pub fn digest_fields(fields: &CredentialFields) -> String {
    commit(&canonicalize(fields))
}

/// Parse a rendered digest back into bytes.
pub fn decode_digest(digest: &str) -> Result<Hash, CryptoError> {
    if digest.len() != DIGEST_HEX_LEN {
        return Err(CryptoError::InvalidDigestLength {
            expected: DIGEST_HEX_LEN,
            actual: digest.len(),
        });
    }
    if digest.bytes().any(|b| b.is_ascii_uppercase()) {
        return Err(CryptoError::InvalidDigestEncoding(digest.to_string()));
    }
    let mut out = [0u8; 32];
    hex::decode_to_slice(digest, &mut out)
        .map_err(|_| CryptoError::InvalidDigestEncoding(digest.to_string()))?;
    Ok(out)
}

/// Whether `digest` is 64 lowercase hex characters.
pub fn is_digest_hex(digest: &str) -> bool {
    decode_digest(digest).is_ok()
}
