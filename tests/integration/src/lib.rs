//! Shared fixtures for the cross-crate tests.

use chrono::{DateTime, Duration, TimeZone, Utc};
use std::sync::Mutex;

use credentia_core::{CredentialFields, MspId};
use credentia_registry::Clock;

/// Commitment of [`scenario_fields`].
pub const SCENARIO_DIGEST: &str =
    "8baf6861f699291d286a3beed68803319b746f4260fe20d06c17c7a8355d8d1a";

pub fn msp(id: &str) -> MspId {
    MspId::new(id).expect("valid msp id")
}

/// `CRED3001`: Asha Patel, B.Tech from UniA.
pub fn scenario_fields() -> CredentialFields {
    CredentialFields::new(
        "CRED3001",
        "S-301",
        "Asha Patel",
        "UniA",
        "B.Tech",
        "8.8",
        "2025-10-01",
    )
    .expect("valid fields")
}

pub fn fields_with_id(cred_id: &str) -> CredentialFields {
    let mut fields = scenario_fields();
    fields.cred_id = cred_id.to_string();
    fields
}

/// Clock the test moves by hand.
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn starting_at(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn at(&self, now: DateTime<Utc>) {
        *self.now.lock().expect("clock lock") = now;
    }

    pub fn advance(&self, by: Duration) {
        *self.now.lock().expect("clock lock") += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::starting_at(Utc.with_ymd_and_hms(2025, 10, 1, 9, 0, 0).unwrap())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().expect("clock lock")
    }
}
