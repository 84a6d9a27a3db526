//! Access to the attendance backend.
//!
//! Controllers talk to the backend through [`AttendanceApi`]; [`ApiClient`]
//! is the HTTP implementation.

pub mod client;
pub mod multipart;
#[cfg(test)]
pub(crate) mod testing;

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::models::{AttendanceSession, MarkAttendanceResponse, NewStudent, Student};

pub use client::ApiClient;

pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Failure of a single backend request.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Non-2xx response, with the backend's `detail` when it sent one
    #[error("{}", .detail.as_deref().unwrap_or("request rejected"))]
    Rejected { status: u16, detail: Option<String> },

    /// The backend could not be reached
    #[error("Server connection failed: {0}")]
    Transport(String),

    /// The response body did not match the expected shape
    #[error("Invalid response: {0}")]
    Decode(String),

    /// The request ended without producing a result
    #[error("{0}")]
    Unexpected(String),

    /// A file to upload could not be read
    #[error("Cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ApiError {
    pub fn rejected(status: u16, detail: impl Into<String>) -> Self {
        ApiError::Rejected {
            status,
            detail: Some(detail.into()),
        }
    }

    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        ApiError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    detail: Option<serde_json::Value>,
}

impl From<ureq::Error> for ApiError {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::Status(status, response) => ApiError::Rejected {
                status,
                detail: read_detail(response),
            },
            ureq::Error::Transport(transport) => ApiError::Transport(transport.to_string()),
        }
    }
}

/// Extract `detail` from an error body. Validation errors carry a list, which
/// is passed on as its JSON text.
fn read_detail(response: ureq::Response) -> Option<String> {
    let body: ErrorBody = response.into_json().ok()?;
    match body.detail? {
        serde_json::Value::String(s) => Some(s),
        serde_json::Value::Null => None,
        other => Some(other.to_string()),
    }
}

/// Operations the backend exposes.
pub trait AttendanceApi: Send + Sync {
    /// `GET /`, returning the service banner
    fn health(&self) -> ApiResult<String>;

    /// `POST /attendance/mark` with a classroom image
    fn mark_attendance(&self, image: &Path) -> ApiResult<MarkAttendanceResponse>;

    /// `GET /students/`
    fn list_students(&self) -> ApiResult<Vec<Student>>;

    /// `POST /students/` with a reference photo
    fn create_student(&self, student: &NewStudent) -> ApiResult<()>;

    /// `DELETE /students/{id}`
    fn delete_student(&self, id: i64) -> ApiResult<()>;

    /// `GET /sessions/`
    fn list_sessions(&self) -> ApiResult<Vec<AttendanceSession>>;

    /// `GET /sessions/{id}`
    fn get_session(&self, id: i64) -> ApiResult<AttendanceSession>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detail_of(err: &ApiError) -> Option<&str> {
        match err {
            ApiError::Rejected { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }

    fn status_error(status: u16, body: &str) -> ureq::Error {
        let response = ureq::Response::new(status, "Error", body).unwrap();
        ureq::Error::Status(status, response)
    }

    #[test]
    fn test_detail_is_extracted() {
        let err = ApiError::from(status_error(400, r#"{"detail":"Duplicate student_id"}"#));
        assert_eq!(detail_of(&err), Some("Duplicate student_id"));
        assert_eq!(err.to_string(), "Duplicate student_id");
        assert!(matches!(err, ApiError::Rejected { status: 400, .. }));
    }

    #[test]
    fn test_missing_or_unparsable_detail() {
        let err = ApiError::from(status_error(500, "Internal Server Error"));
        assert_eq!(detail_of(&err), None);
        assert_eq!(err.to_string(), "request rejected");

        let err = ApiError::from(status_error(404, r#"{"message":"nope"}"#));
        assert_eq!(detail_of(&err), None);
    }

    #[test]
    fn test_structured_detail_is_stringified() {
        let err = ApiError::from(status_error(422, r#"{"detail":[{"loc":["body","file"]}]}"#));
        assert_eq!(detail_of(&err), Some(r#"[{"loc":["body","file"]}]"#));
    }

    #[test]
    fn test_transport_message() {
        let err = ApiError::Transport("connection refused".to_string());
        assert!(matches!(err, ApiError::Transport(_)));
        assert_eq!(err.to_string(), "Server connection failed: connection refused");
    }
}
