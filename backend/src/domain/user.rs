//! User identity, roles, and credential material.

use std::fmt;

use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use utoipa::ToSchema;
use uuid::Uuid;
use zeroize::Zeroize;

/// Validation errors raised by the user constructors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserValidationError {
    /// The identifier was not a valid UUID.
    #[error("user id must be a valid UUID")]
    InvalidId,
    /// The email failed shape validation.
    #[error("email must contain '@' and be at most 255 characters")]
    InvalidEmail,
    /// The full name was empty or too long.
    #[error("full name must be between 2 and 100 characters")]
    InvalidFullName,
    /// The role string did not name a known role.
    #[error("unknown role: {0}")]
    UnknownRole(String),
}

/// Stable user identifier stored as a UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    /// Parse an identifier from its canonical string form.
    pub fn parse(raw: &str) -> Result<Self, UserValidationError> {
        Uuid::parse_str(raw)
            .map(Self)
            .map_err(|_| UserValidationError::InvalidId)
    }

    /// Generate a fresh random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Closed set of roles a user can hold.
///
/// Consumed via exhaustive matching; there is deliberately no catch-all
/// string form inside the domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Operational administrator.
    Admin,
    /// Bookable resource: owns a calendar of slots.
    Doctor,
    /// Requester: books slots on doctors' calendars.
    Patient,
}

impl Role {
    /// Stable storage representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Doctor => "doctor",
            Self::Patient => "patient",
        }
    }

    /// Parse the storage representation back into a role.
    pub fn parse(raw: &str) -> Result<Self, UserValidationError> {
        match raw {
            "admin" => Ok(Self::Admin),
            "doctor" => Ok(Self::Doctor),
            "patient" => Ok(Self::Patient),
            other => Err(UserValidationError::UnknownRole(other.to_owned())),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lower-cased, shape-validated email address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// Validate and normalise an email address.
    pub fn new(raw: impl Into<String>) -> Result<Self, UserValidationError> {
        let trimmed = raw.into().trim().to_lowercase();
        let local_ok = trimmed
            .split_once('@')
            .is_some_and(|(local, host)| !local.is_empty() && !host.is_empty());
        if trimmed.is_empty() || trimmed.len() > 255 || !local_ok {
            return Err(UserValidationError::InvalidEmail);
        }
        Ok(Self(trimmed))
    }

    /// The normalised address.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<Email> for String {
    fn from(value: Email) -> Self {
        value.0
    }
}

impl TryFrom<String> for Email {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Optional profile fields carried alongside the identity core.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Contact phone number.
    pub phone: Option<String>,
    /// Age in years.
    pub age: Option<i32>,
    /// Free-form gender description.
    pub gender: Option<String>,
    /// Department, for doctors.
    pub department: Option<String>,
    /// Medical history notes, for patients.
    pub medical_history: Option<String>,
    /// Known allergies, for patients.
    pub allergies: Option<String>,
}

/// Summary of how complete a user's profile is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileCompletion {
    /// True once every required field is filled in.
    pub is_complete: bool,
    /// Filled-in share of required fields, 0..=100.
    pub completion_percentage: u32,
    /// Names of the required fields that are still empty.
    pub missing_fields: Vec<String>,
    /// Number of required fields for this role.
    pub total_fields: u32,
    /// Number of required fields already filled in.
    pub completed_fields: u32,
}

/// A registered user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id: UserId,
    email: Email,
    role: Role,
    full_name: String,
    profile: Profile,
}

impl User {
    /// Construct a user, validating the full name.
    pub fn new(
        id: UserId,
        email: Email,
        role: Role,
        full_name: impl Into<String>,
        profile: Profile,
    ) -> Result<Self, UserValidationError> {
        let full_name = full_name.into();
        let length = full_name.trim().chars().count();
        if !(2..=100).contains(&length) {
            return Err(UserValidationError::InvalidFullName);
        }
        Ok(Self {
            id,
            email,
            role,
            full_name,
            profile,
        })
    }

    /// Stable identifier.
    pub fn id(&self) -> UserId {
        self.id
    }

    /// Normalised email address.
    pub fn email(&self) -> &Email {
        &self.email
    }

    /// Assigned role.
    pub fn role(&self) -> Role {
        self.role
    }

    /// Display name.
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    /// Optional profile fields.
    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    /// Compute how complete this user's profile is.
    ///
    /// Patients are additionally expected to provide medical history and
    /// allergies; other roles only the contact fields.
    pub fn profile_completion(&self) -> ProfileCompletion {
        let mut required: Vec<(&str, bool)> = vec![
            ("full_name", !self.full_name.trim().is_empty()),
            ("phone", self.profile.phone.is_some()),
            ("age", self.profile.age.is_some()),
            ("gender", self.profile.gender.is_some()),
        ];
        if self.role == Role::Patient {
            required.push(("medical_history", self.profile.medical_history.is_some()));
            required.push(("allergies", self.profile.allergies.is_some()));
        }

        let total = required.len() as u32;
        let missing: Vec<String> = required
            .iter()
            .filter(|(_, filled)| !filled)
            .map(|(name, _)| (*name).to_owned())
            .collect();
        let completed = total - missing.len() as u32;

        ProfileCompletion {
            is_complete: missing.is_empty(),
            completion_percentage: completed * 100 / total,
            missing_fields: missing,
            total_fields: total,
            completed_fields: completed,
        }
    }
}

/// Salted SHA-256 credential digest.
///
/// The salt and digest are stored hex-encoded; intermediate digest material
/// is wiped once comparison has happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordDigest {
    salt_hex: String,
    digest_hex: String,
}

impl PasswordDigest {
    /// Derive a digest for a new password with a fresh random salt.
    pub fn create(password: &str) -> Self {
        let mut salt = [0_u8; 16];
        rand::thread_rng().fill_bytes(&mut salt);
        let salt_hex = hex::encode(salt);
        let digest_hex = Self::digest(&salt_hex, password);
        Self {
            salt_hex,
            digest_hex,
        }
    }

    /// Rehydrate a digest from its stored parts.
    pub fn from_parts(salt_hex: impl Into<String>, digest_hex: impl Into<String>) -> Self {
        Self {
            salt_hex: salt_hex.into(),
            digest_hex: digest_hex.into(),
        }
    }

    /// Check a candidate password against the stored digest.
    pub fn verify(&self, password: &str) -> bool {
        let mut candidate = Self::digest(&self.salt_hex, password);
        let matches = candidate == self.digest_hex;
        candidate.zeroize();
        matches
    }

    /// Stored hex salt.
    pub fn salt_hex(&self) -> &str {
        &self.salt_hex
    }

    /// Stored hex digest.
    pub fn digest_hex(&self) -> &str {
        &self.digest_hex
    }

    fn digest(salt_hex: &str, password: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(salt_hex.as_bytes());
        hasher.update(password.as_bytes());
        hex::encode(hasher.finalize())
    }
}
