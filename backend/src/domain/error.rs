//! Domain-level error type.
//!
//! Transport agnostic: inbound adapters map these onto HTTP status codes and
//! JSON envelopes. The reservation coordinator is the single place that maps
//! port failures into this taxonomy.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

/// Response header carrying the request correlation identifier.
pub const TRACE_ID_HEADER: &str = "Trace-Id";

/// Stable machine-readable error code describing the failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[non_exhaustive]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// The request is malformed or fails validation.
    InvalidRequest,
    /// Authentication failed or is missing.
    Unauthorized,
    /// Authenticated but not permitted to perform this action.
    Forbidden,
    /// The requested resource does not exist.
    NotFound,
    /// The requested slot start lies in the past.
    PastTime,
    /// Another request is processing the identical slot right now; the
    /// caller should back off briefly and retry.
    SlotContended,
    /// The slot overlaps a committed active booking; retrying will not
    /// help.
    SlotConflict,
    /// A uniqueness constraint was violated (e.g. duplicate email).
    Conflict,
    /// A backing store is unreachable or timing out.
    ServiceUnavailable,
    /// An unexpected error occurred inside the domain.
    InternalError,
}

/// Domain error payload carried to adapters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Error {
    #[schema(example = "slot_contended")]
    code: ErrorCode,
    #[schema(example = "this slot is being processed by another request")]
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    trace_id: Option<String>,
}

impl Error {
    /// Create a new error with the given code and message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
            trace_id: None,
        }
    }

    /// Stable machine-readable error code.
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Human-readable message returned to adapters.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Supplementary structured details for adapters.
    pub fn details(&self) -> Option<&Value> {
        self.details.as_ref()
    }

    /// Correlation identifier attached by the middleware, if any.
    pub fn trace_id(&self) -> Option<&str> {
        self.trace_id.as_deref()
    }

    /// Attach structured details to the error.
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Attach a correlation identifier to the error.
    pub fn with_trace_id(mut self, trace_id: impl Into<String>) -> Self {
        self.trace_id = Some(trace_id.into());
        self
    }

    /// Convenience constructor for [`ErrorCode::InvalidRequest`].
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidRequest, message)
    }

    /// Convenience constructor for [`ErrorCode::Unauthorized`].
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, message)
    }

    /// Convenience constructor for [`ErrorCode::Forbidden`].
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Forbidden, message)
    }

    /// Convenience constructor for [`ErrorCode::NotFound`].
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    /// Convenience constructor for [`ErrorCode::PastTime`].
    pub fn past_time(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::PastTime, message)
    }

    /// Convenience constructor for [`ErrorCode::SlotContended`].
    pub fn slot_contended(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::SlotContended, message)
    }

    /// Convenience constructor for [`ErrorCode::SlotConflict`].
    pub fn slot_conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::SlotConflict, message)
    }

    /// Convenience constructor for [`ErrorCode::Conflict`].
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Conflict, message)
    }

    /// Convenience constructor for [`ErrorCode::ServiceUnavailable`].
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ServiceUnavailable, message)
    }

    /// Convenience constructor for [`ErrorCode::InternalError`].
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.

    use rstest::rstest;
    use serde_json::json;

    use super::*;

    #[rstest]
    #[case(Error::slot_contended("busy"), ErrorCode::SlotContended)]
    #[case(Error::slot_conflict("taken"), ErrorCode::SlotConflict)]
    #[case(Error::past_time("too late"), ErrorCode::PastTime)]
    #[case(Error::service_unavailable("down"), ErrorCode::ServiceUnavailable)]
    fn constructors_set_the_expected_code(#[case] error: Error, #[case] code: ErrorCode) {
        assert_eq!(error.code(), code);
    }

    #[rstest]
    fn codes_serialise_as_snake_case() {
        let serialised =
            serde_json::to_value(Error::slot_contended("busy")).expect("serialisable error");
        assert_eq!(serialised["code"], json!("slot_contended"));
        assert!(serialised.get("details").is_none());
        assert!(serialised.get("traceId").is_none());
    }

    #[rstest]
    fn details_and_trace_id_survive_serialisation() {
        let error = Error::invalid_request("bad field")
            .with_details(json!({ "field": "slotStart" }))
            .with_trace_id("00000000-0000-0000-0000-000000000000");

        let serialised = serde_json::to_value(&error).expect("serialisable error");
        assert_eq!(serialised["details"]["field"], json!("slotStart"));
        assert_eq!(
            serialised["traceId"],
            json!("00000000-0000-0000-0000-000000000000")
        );
    }

    #[rstest]
    fn display_shows_the_message() {
        assert_eq!(Error::not_found("doctor not found").to_string(), "doctor not found");
    }
}
