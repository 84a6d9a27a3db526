use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, warn};

use super::multipart::MultipartForm;
use super::{ApiError, ApiResult, AttendanceApi};
use crate::config::ApiConfig;
use crate::models::{AttendanceSession, MarkAttendanceResponse, NewStudent, Student};

/// HTTP client for the attendance backend.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Clone)]
pub struct ApiClient {
    agent: ureq::Agent,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct Banner {
    #[serde(default)]
    message: String,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Self {
            agent,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &ApiConfig) -> Self {
        Self::new(&config.base_url, Duration::from_secs(config.timeout_secs))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn send_form(&self, path: &str, form: MultipartForm) -> ApiResult<ureq::Response> {
        let url = self.url(path);
        let (content_type, body) = form.finish();
        debug!(%url, bytes = body.len(), "POST multipart");
        self.agent
            .post(&url)
            .set("Content-Type", &content_type)
            .send_bytes(&body)
            .map_err(|e| log_failure(&url, e.into()))
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        let url = self.url(path);
        debug!(%url, "GET");
        let response = self
            .agent
            .get(&url)
            .call()
            .map_err(|e| log_failure(&url, e.into()))?;
        decode(response)
    }
}

fn decode<T: DeserializeOwned>(response: ureq::Response) -> ApiResult<T> {
    response
        .into_json()
        .map_err(|e| ApiError::Decode(e.to_string()))
}

fn log_failure(url: &str, err: ApiError) -> ApiError {
    warn!(%url, error = %err, "request failed");
    err
}

impl AttendanceApi for ApiClient {
    fn health(&self) -> ApiResult<String> {
        let banner: Banner = self.get_json("/")?;
        Ok(banner.message)
    }

    fn mark_attendance(&self, image: &Path) -> ApiResult<MarkAttendanceResponse> {
        let form = MultipartForm::new().file("file", image)?;
        let response = self.send_form("/attendance/mark", form)?;
        decode(response)
    }

    fn list_students(&self) -> ApiResult<Vec<Student>> {
        self.get_json("/students/")
    }

    fn create_student(&self, student: &NewStudent) -> ApiResult<()> {
        let form = MultipartForm::new()
            .text("name", &student.name)
            .text("student_id", &student.student_id)
            .file("file", &student.photo)?;
        // Any 2xx body is accepted.
        self.send_form("/students/", form)?;
        Ok(())
    }

    fn delete_student(&self, id: i64) -> ApiResult<()> {
        let url = self.url(&format!("/students/{}", id));
        debug!(%url, "DELETE");
        self.agent
            .delete(&url)
            .call()
            .map_err(|e| log_failure(&url, e.into()))?;
        Ok(())
    }

    fn list_sessions(&self) -> ApiResult<Vec<AttendanceSession>> {
        self.get_json("/sessions/")
    }

    fn get_session(&self, id: i64) -> ApiResult<AttendanceSession> {
        self.get_json(&format!("/sessions/{}", id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let client = ApiClient::new("http://localhost:8000/", Duration::from_secs(5));
        assert_eq!(client.base_url(), "http://localhost:8000");
        assert_eq!(client.url("/students/"), "http://localhost:8000/students/");
    }

    #[test]
    fn test_from_config() {
        let config = ApiConfig {
            base_url: "http://attendance.school.test:9000".to_string(),
            timeout_secs: 10,
        };
        let client = ApiClient::from_config(&config);
        assert_eq!(client.url("/attendance/mark"), "http://attendance.school.test:9000/attendance/mark");
    }

    #[test]
    fn test_unreachable_backend_is_transport_error() {
        // Port 9 (discard) on localhost is reliably closed in test environments.
        let client = ApiClient::new("http://127.0.0.1:9", Duration::from_secs(2));
        let err = client.list_students().unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)), "unexpected error: {err:?}");
    }

    #[test]
    fn test_unreadable_upload_fails_before_sending() {
        let client = ApiClient::new("http://127.0.0.1:9", Duration::from_secs(2));
        let err = client
            .mark_attendance(Path::new("/nonexistent/classroom.jpg"))
            .unwrap_err();
        assert!(matches!(err, ApiError::Io { .. }));
    }
}
