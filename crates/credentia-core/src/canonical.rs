//! Canonical text encoding of a credential, the only input to hashing.
//!
//! The encoding is the seven field values in commitment order joined by
//! a literal `|`, taken byte-for-byte as stored. Nothing is trimmed,
//! re-ordered, case-folded or escaped, so any edit to any field changes
//! the canonical string.

use std::fmt;

use crate::error::CoreError;
use crate::types::{CredentialFields, RawCredentialFields};

/// Separator placed between field values.
pub const FIELD_SEPARATOR: &str = "|";

/// Output of [`canonicalize`]. Only this type can be committed, which keeps
/// every digest path going through the same encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalString(String);

impl CanonicalString {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Display for CanonicalString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Encode a complete field set. Pure and infallible: presence was already
/// enforced when the typed fields were built.
pub fn canonicalize(fields: &CredentialFields) -> CanonicalString {
    CanonicalString(fields.values().join(FIELD_SEPARATOR))
}

/// Encode wire-level fields, failing with a missing-field error when any of
/// the seven values is absent.
pub fn canonicalize_raw(raw: &RawCredentialFields) -> Result<CanonicalString, CoreError> {
    let fields = raw.clone().validate()?;
    Ok(canonicalize(&fields))
}
