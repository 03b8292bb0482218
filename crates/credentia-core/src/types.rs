use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::CoreError;

/// Membership-service identifier of an organization, e.g. `Org1MSP`.
/// Each organization owns exactly one private partition.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MspId(String);

impl MspId {
    /// Create an organization id. Must be non-empty and free of NUL bytes,
    /// which are reserved as a storage key separator.
    pub fn new(id: impl Into<String>) -> Result<Self, CoreError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(CoreError::InvalidField {
                field: "mspID",
                reason: "organization id must not be empty".into(),
            });
        }
        if id.contains('\0') {
            return Err(CoreError::InvalidField {
                field: "mspID",
                reason: "organization id must not contain NUL".into(),
            });
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for MspId {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<MspId> for String {
    fn from(id: MspId) -> Self {
        id.0
    }
}

impl fmt::Display for MspId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The seven committed fields of an academic credential.
///
/// Values are preserved exactly as given: no trimming, no numeric
/// parsing of `gpa`, no date parsing of `issue_date`. Only `cred_id`
/// is required to be non-empty; the other fields may be empty strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawCredentialFields")]
pub struct CredentialFields {
    #[serde(rename = "credID")]
    pub cred_id: String,
    #[serde(rename = "studentID")]
    pub student_id: String,
    #[serde(rename = "studentName")]
    pub student_name: String,
    pub university: String,
    pub degree: String,
    pub gpa: String,
    #[serde(rename = "issueDate")]
    pub issue_date: String,
}

impl CredentialFields {
    /// Wire names in commitment order.
    pub const FIELD_NAMES: [&'static str; 7] = [
        "credID",
        "studentID",
        "studentName",
        "university",
        "degree",
        "gpa",
        "issueDate",
    ];

    /// Build a field set, rejecting an empty credential id.
    pub fn new(
        cred_id: impl Into<String>,
        student_id: impl Into<String>,
        student_name: impl Into<String>,
        university: impl Into<String>,
        degree: impl Into<String>,
        gpa: impl Into<String>,
        issue_date: impl Into<String>,
    ) -> Result<Self, CoreError> {
        let fields = Self {
            cred_id: cred_id.into(),
            student_id: student_id.into(),
            student_name: student_name.into(),
            university: university.into(),
            degree: degree.into(),
            gpa: gpa.into(),
            issue_date: issue_date.into(),
        };
        validate_cred_id(&fields.cred_id)?;
        Ok(fields)
    }

    /// Field values in commitment order.
    pub fn values(&self) -> [&str; 7] {
        [
            self.cred_id.as_str(),
            self.student_id.as_str(),
            self.student_name.as_str(),
            self.university.as_str(),
            self.degree.as_str(),
            self.gpa.as_str(),
            self.issue_date.as_str(),
        ]
    }
}

/// Credential fields as they arrive on the wire, before presence checks.
/// `null` and absent are both `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawCredentialFields {
    #[serde(rename = "credID", default)]
    pub cred_id: Option<String>,
    #[serde(rename = "studentID", default)]
    pub student_id: Option<String>,
    #[serde(rename = "studentName", default)]
    pub student_name: Option<String>,
    #[serde(default)]
    pub university: Option<String>,
    #[serde(default)]
    pub degree: Option<String>,
    #[serde(default)]
    pub gpa: Option<String>,
    #[serde(rename = "issueDate", default)]
    pub issue_date: Option<String>,
}

impl RawCredentialFields {
    /// Check that every field is present and convert to the typed form.
    pub fn validate(self) -> Result<CredentialFields, CoreError> {
        fn require(value: Option<String>, name: &'static str) -> Result<String, CoreError> {
            value.ok_or(CoreError::MissingField(name))
        }

        let fields = CredentialFields {
            cred_id: require(self.cred_id, "credID")?,
            student_id: require(self.student_id, "studentID")?,
            student_name: require(self.student_name, "studentName")?,
            university: require(self.university, "university")?,
            degree: require(self.degree, "degree")?,
            gpa: require(self.gpa, "gpa")?,
            issue_date: require(self.issue_date, "issueDate")?,
        };
        validate_cred_id(&fields.cred_id)?;
        Ok(fields)
    }
}

impl TryFrom<RawCredentialFields> for CredentialFields {
    type Error = CoreError;

    fn try_from(raw: RawCredentialFields) -> Result<Self, Self::Error> {
        raw.validate()
    }
}

impl From<CredentialFields> for RawCredentialFields {
    fn from(fields: CredentialFields) -> Self {
        Self {
            cred_id: Some(fields.cred_id),
            student_id: Some(fields.student_id),
            student_name: Some(fields.student_name),
            university: Some(fields.university),
            degree: Some(fields.degree),
            gpa: Some(fields.gpa),
            issue_date: Some(fields.issue_date),
        }
    }
}

/// Reject credential ids that cannot be stored or looked up.
pub fn validate_cred_id(cred_id: &str) -> Result<(), CoreError> {
    if cred_id.is_empty() {
        return Err(CoreError::InvalidField {
            field: "credID",
            reason: "credential id must not be empty".into(),
        });
    }
    if cred_id.contains('\0') {
        return Err(CoreError::InvalidField {
            field: "credID",
            reason: "credential id must not contain NUL".into(),
        });
    }
    Ok(())
}
