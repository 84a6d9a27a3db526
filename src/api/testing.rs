//! In-memory backend used by controller tests.

use std::path::Path;
use std::sync::Mutex;

use super::{ApiError, ApiResult, AttendanceApi};
use crate::models::{AttendanceSession, MarkAttendanceResponse, NewStudent, Student};

#[derive(Default)]
struct State {
    students: Vec<Student>,
    sessions: Vec<AttendanceSession>,
    next_id: i64,
    mark_response: Option<MarkAttendanceResponse>,
    offline: bool,
    calls: Vec<String>,
}

/// Behaves like the real service for the roster endpoints and replays a
/// canned response for uploads.
#[derive(Default)]
pub struct FakeBackend {
    state: Mutex<State>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_students(students: Vec<Student>) -> Self {
        let next_id = students.iter().map(|s| s.id).max().unwrap_or(0);
        let backend = Self::new();
        {
            let mut state = backend.state.lock().unwrap();
            state.students = students;
            state.next_id = next_id;
        }
        backend
    }

    pub fn set_mark_response(&self, response: MarkAttendanceResponse) {
        self.state.lock().unwrap().mark_response = Some(response);
    }

    pub fn set_sessions(&self, sessions: Vec<AttendanceSession>) {
        self.state.lock().unwrap().sessions = sessions;
    }

    /// Make every subsequent call fail as if the server were down.
    pub fn set_offline(&self, offline: bool) {
        self.state.lock().unwrap().offline = offline;
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    fn enter(&self, call: &str) -> ApiResult<std::sync::MutexGuard<'_, State>> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call.to_string());
        if state.offline {
            return Err(ApiError::Transport("connection refused".to_string()));
        }
        Ok(state)
    }
}

impl AttendanceApi for FakeBackend {
    fn health(&self) -> ApiResult<String> {
        drop(self.enter("health")?);
        Ok("Gen-AI Classroom Attendance System API".to_string())
    }

    fn mark_attendance(&self, image: &Path) -> ApiResult<MarkAttendanceResponse> {
        let state = self.enter("mark_attendance")?;
        if !image.exists() {
            return Err(ApiError::io(
                image,
                std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
            ));
        }
        state
            .mark_response
            .clone()
            .ok_or_else(|| ApiError::rejected(500, "No classroom model loaded"))
    }

    fn list_students(&self) -> ApiResult<Vec<Student>> {
        let state = self.enter("list_students")?;
        Ok(state.students.clone())
    }

    fn create_student(&self, student: &NewStudent) -> ApiResult<()> {
        let mut state = self.enter("create_student")?;
        if state.students.iter().any(|s| s.student_id == student.student_id) {
            return Err(ApiError::rejected(400, "Duplicate student_id"));
        }
        state.next_id += 1;
        let id = state.next_id;
        state.students.push(Student {
            id,
            name: student.name.clone(),
            student_id: student.student_id.clone(),
            face_encoding_path: Some(format!("static/encodings/{}.npy", student.student_id)),
        });
        Ok(())
    }

    fn delete_student(&self, id: i64) -> ApiResult<()> {
        let mut state = self.enter("delete_student")?;
        let before = state.students.len();
        state.students.retain(|s| s.id != id);
        if state.students.len() == before {
            return Err(ApiError::rejected(404, "Student not found"));
        }
        Ok(())
    }

    fn list_sessions(&self) -> ApiResult<Vec<AttendanceSession>> {
        let state = self.enter("list_sessions")?;
        Ok(state.sessions.clone())
    }

    fn get_session(&self, id: i64) -> ApiResult<AttendanceSession> {
        let state = self.enter("get_session")?;
        state
            .sessions
            .iter()
            .find(|s| s.id == id)
            .cloned()
            .ok_or_else(|| ApiError::rejected(404, "Session not found"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_releases_state_between_calls() {
        let backend = FakeBackend::new();
        assert!(backend.health().is_ok());

        backend.set_offline(true);
        assert!(matches!(backend.health(), Err(ApiError::Transport(_))));
        assert_eq!(backend.calls(), vec!["health", "health"]);
    }
}
