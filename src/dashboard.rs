//! Upload controller for the dashboard page.
//!
//! Owns the selected classroom photo, the busy flag and the most recent
//! session. A request is split into `begin_submit` / `finish_submit` so the
//! TUI can run it on a worker; `submit` runs both inline.

use chrono::Local;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::api::{ApiError, ApiResult, AttendanceApi};
use crate::models::{AttendanceSession, MarkAttendanceResponse};

#[derive(Debug, Default)]
pub struct UploadController {
    selected_file: Option<PathBuf>,
    /// Path of the upload in flight, used to stamp the session
    pending: Option<PathBuf>,
    session: Option<AttendanceSession>,
    analysis: String,
    busy: bool,
    error: Option<String>,
}

impl UploadController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select_file(&mut self, path: impl Into<PathBuf>) {
        self.selected_file = Some(path.into());
    }

    pub fn selected_file(&self) -> Option<&Path> {
        self.selected_file.as_deref()
    }

    pub fn session(&self) -> Option<&AttendanceSession> {
        self.session.as_ref()
    }

    /// AI narrative for the latest upload; empty while a request is running.
    pub fn analysis(&self) -> &str {
        &self.analysis
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    pub fn can_submit(&self) -> bool {
        self.selected_file.is_some() && !self.busy
    }

    /// Start an upload. Returns the file to send, or `None` when nothing is
    /// selected or a request is already running.
    pub fn begin_submit(&mut self) -> Option<PathBuf> {
        if !self.can_submit() {
            return None;
        }
        let path = self.selected_file.clone()?;
        self.busy = true;
        self.analysis.clear();
        self.error = None;
        self.pending = Some(path.clone());
        Some(path)
    }

    /// Apply the outcome of an upload. Clears the busy flag on every path.
    pub fn finish_submit(&mut self, result: ApiResult<MarkAttendanceResponse>) {
        self.busy = false;
        let image = self.pending.take().unwrap_or_default();

        match result {
            Ok(response) => {
                let analysis = response.analysis.clone();
                let session = AttendanceSession::from_mark(response, &image, Local::now().naive_local());
                info!(
                    session = session.id,
                    present = session.present_count(),
                    total = session.total_count(),
                    "attendance marked"
                );
                self.session = Some(session);
                self.analysis = analysis;
            }
            Err(err) => {
                warn!(error = %err, "attendance upload failed");
                self.error = Some(upload_error_message(&err));
            }
        }
    }

    /// Upload the selected file and wait for the result.
    pub fn submit(&mut self, api: &dyn AttendanceApi) -> bool {
        let Some(path) = self.begin_submit() else {
            return false;
        };
        let result = api.mark_attendance(&path);
        let ok = result.is_ok();
        self.finish_submit(result);
        ok
    }

    /// `"<present> / <total> Present"` for the current session.
    pub fn ratio_label(&self) -> Option<String> {
        self.session.as_ref().map(|s| s.attendance_ratio())
    }

    pub fn unknown_badge(&self) -> Option<String> {
        self.session.as_ref().and_then(|s| s.unknown_faces_badge())
    }
}

fn upload_error_message(err: &ApiError) -> String {
    match err {
        ApiError::Rejected { detail: None, .. } => "Error: Upload failed".to_string(),
        other => format!("Error: {}", other),
    }
}
