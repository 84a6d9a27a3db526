//! Past attendance sessions, as listed by the backend.

use tracing::warn;

use crate::api::{ApiResult, AttendanceApi};
use crate::models::AttendanceSession;

#[derive(Debug, Default)]
pub struct HistoryController {
    sessions: Vec<AttendanceSession>,
    open: Option<AttendanceSession>,
    busy: bool,
    error: Option<String>,
    pub selected_index: usize,
}

impl HistoryController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sessions(&self) -> &[AttendanceSession] {
        &self.sessions
    }

    /// Session whose details were last fetched.
    pub fn open_session_details(&self) -> Option<&AttendanceSession> {
        self.open.as_ref()
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn selected_session_id(&self) -> Option<i64> {
        self.sessions.get(self.selected_index).map(|s| s.id)
    }

    pub fn move_up(&mut self) {
        if self.selected_index > 0 {
            self.selected_index -= 1;
        }
    }

    pub fn move_down(&mut self) {
        if self.selected_index + 1 < self.sessions.len() {
            self.selected_index += 1;
        }
    }

    /// Mark a request as started. Returns false if one is already running.
    pub fn begin(&mut self) -> bool {
        if self.busy {
            return false;
        }
        self.busy = true;
        self.error = None;
        true
    }

    pub fn finish_sessions(&mut self, result: ApiResult<Vec<AttendanceSession>>) {
        self.busy = false;
        match result {
            Ok(mut sessions) => {
                // Newest first
                sessions.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
                self.sessions = sessions;
                self.selected_index = self.selected_index.min(self.sessions.len().saturating_sub(1));
            }
            Err(err) => {
                warn!(error = %err, "Failed to fetch sessions");
                self.error = Some(err.to_string());
            }
        }
    }

    pub fn finish_open(&mut self, result: ApiResult<AttendanceSession>) {
        self.busy = false;
        match result {
            Ok(session) => self.open = Some(session),
            Err(err) => {
                warn!(error = %err, "Failed to fetch session");
                self.error = Some(err.to_string());
            }
        }
    }

    pub fn load_sessions(&mut self, api: &dyn AttendanceApi) {
        if self.begin() {
            let result = api.list_sessions();
            self.finish_sessions(result);
        }
    }

    pub fn open_session(&mut self, api: &dyn AttendanceApi, id: i64) {
        if self.begin() {
            let result = api.get_session(id);
            self.finish_open(result);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::FakeBackend;
    use crate::models::fixtures::timestamp;

    fn sessions() -> Vec<AttendanceSession> {
        vec![
            AttendanceSession::new(1, timestamp(), "static/uploads/mon.jpg", Vec::new()).with_report("Sleepy"),
            AttendanceSession::new(2, timestamp() + chrono::Duration::days(1), "static/uploads/tue.jpg", Vec::new())
                .with_report("Focused"),
        ]
    }

    #[test]
    fn test_sessions_newest_first() {
        let backend = FakeBackend::new();
        backend.set_sessions(sessions());
        let mut history = HistoryController::new();
        history.load_sessions(&backend);

        let ids: Vec<i64> = history.sessions().iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![2, 1]);
        assert_eq!(history.selected_session_id(), Some(2));
        assert!(!history.is_busy());
    }

    #[test]
    fn test_open_session() {
        let backend = FakeBackend::new();
        backend.set_sessions(sessions());
        let mut history = HistoryController::new();
        history.open_session(&backend, 1);
        assert_eq!(
            history.open_session_details().and_then(|s| s.ai_analysis_report.as_deref()),
            Some("Sleepy")
        );
    }

    #[test]
    fn test_missing_session_surfaces_detail() {
        let backend = FakeBackend::new();
        let mut history = HistoryController::new();
        history.open_session(&backend, 99);
        assert_eq!(history.error(), Some("Session not found"));
        assert!(history.open_session_details().is_none());
    }

    #[test]
    fn test_single_request_at_a_time() {
        let mut history = HistoryController::new();
        assert!(history.begin());
        assert!(!history.begin());
        history.finish_sessions(Ok(Vec::new()));
        assert!(history.begin());
    }
}
