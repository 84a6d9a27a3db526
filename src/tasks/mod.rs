//! Background requests for the interactive client.
//!
//! Each backend call runs on its own worker thread and reports back over a
//! channel, so the event loop keeps drawing while a request is in flight.
//! Requests cannot be cancelled once started.

pub mod manager;

use std::sync::mpsc;
use std::time::Instant;

use crate::api::{ApiError, ApiResult};
use crate::models::{AttendanceSession, MarkAttendanceResponse, Student};

pub use manager::BackgroundTaskManager;

/// Unique identifier for a background task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(pub u64);

impl TaskId {
    pub fn new() -> Self {
        use std::sync::atomic::{AtomicU64, Ordering};
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        TaskId(COUNTER.fetch_add(1, Ordering::SeqCst))
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

/// Kind of backend request. At most one of each kind runs at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskType {
    MarkAttendance,
    LoadRoster,
    AddStudent,
    DeleteStudent,
    LoadSessions,
    OpenSession,
}

impl TaskType {
    /// Short display name for status bar.
    pub fn short_name(&self) -> &'static str {
        match self {
            TaskType::MarkAttendance => "M",
            TaskType::LoadRoster => "R",
            TaskType::AddStudent => "A",
            TaskType::DeleteStudent => "D",
            TaskType::LoadSessions => "H",
            TaskType::OpenSession => "S",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            TaskType::MarkAttendance => "Mark Attendance",
            TaskType::LoadRoster => "Load Roster",
            TaskType::AddStudent => "Add Student",
            TaskType::DeleteStudent => "Delete Student",
            TaskType::LoadSessions => "Load Sessions",
            TaskType::OpenSession => "Open Session",
        }
    }
}

/// Typed result of a finished request.
#[derive(Debug)]
pub enum TaskOutcome {
    Marked(ApiResult<MarkAttendanceResponse>),
    Roster(ApiResult<Vec<Student>>),
    StudentAdded(ApiResult<()>),
    StudentDeleted(ApiResult<()>),
    Sessions(ApiResult<Vec<AttendanceSession>>),
    Session(ApiResult<AttendanceSession>),
}

impl TaskOutcome {
    /// Outcome for a worker that stopped without reporting.
    pub fn lost(task_type: TaskType) -> Self {
        let err = || {
            ApiError::Unexpected(format!(
                "{} ended without a response",
                task_type.display_name()
            ))
        };
        match task_type {
            TaskType::MarkAttendance => TaskOutcome::Marked(Err(err())),
            TaskType::LoadRoster => TaskOutcome::Roster(Err(err())),
            TaskType::AddStudent => TaskOutcome::StudentAdded(Err(err())),
            TaskType::DeleteStudent => TaskOutcome::StudentDeleted(Err(err())),
            TaskType::LoadSessions => TaskOutcome::Sessions(Err(err())),
            TaskType::OpenSession => TaskOutcome::Session(Err(err())),
        }
    }

    pub fn is_success(&self) -> bool {
        match self {
            TaskOutcome::Marked(r) => r.is_ok(),
            TaskOutcome::Roster(r) => r.is_ok(),
            TaskOutcome::StudentAdded(r) | TaskOutcome::StudentDeleted(r) => r.is_ok(),
            TaskOutcome::Sessions(r) => r.is_ok(),
            TaskOutcome::Session(r) => r.is_ok(),
        }
    }
}

/// Update messages sent from workers via channels.
#[derive(Debug)]
pub enum TaskUpdate {
    /// The request has been sent.
    Started,
    /// The request finished, successfully or not.
    Finished(TaskOutcome),
}

/// A running request and the channel it reports on.
pub struct BackgroundTask {
    pub id: TaskId,
    pub task_type: TaskType,
    pub sent: bool,
    pub receiver: mpsc::Receiver<TaskUpdate>,
    pub started_at: Instant,
}

impl BackgroundTask {
    pub fn new(task_type: TaskType, receiver: mpsc::Receiver<TaskUpdate>) -> Self {
        Self {
            id: TaskId::new(),
            task_type,
            sent: false,
            receiver,
            started_at: Instant::now(),
        }
    }

    /// Get elapsed time since task started.
    pub fn elapsed(&self) -> std::time::Duration {
        self.started_at.elapsed()
    }
}

/// A request that has finished and been removed from tracking.
#[derive(Debug)]
pub struct TaskCompletion {
    pub id: TaskId,
    pub task_type: TaskType,
    pub outcome: TaskOutcome,
}
