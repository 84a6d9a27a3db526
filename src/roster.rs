//! Roster controller: the student list plus the add-student form.

use std::path::PathBuf;
use tracing::{info, warn};

use crate::api::{ApiError, ApiResult, AttendanceApi};
use crate::models::{NewStudent, Student};

pub const ADD_SUCCESS_MESSAGE: &str = "Student added successfully to the secure roster.";
pub const ADD_FALLBACK_MESSAGE: &str = "Failed to add student. Please try again.";
pub const CONNECTION_MESSAGE: &str = "Server connection failed. Please check if Backend is running.";
pub const DELETE_FAILED_MESSAGE: &str = "Failed to delete";
pub const DELETE_ERROR_MESSAGE: &str = "Error deleting student";

/// Result of the last add-student submission. Stays until the next one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Feedback {
    #[default]
    Idle,
    Success(String),
    Error(String),
}

impl Feedback {
    pub fn message(&self) -> Option<&str> {
        match self {
            Feedback::Idle => None,
            Feedback::Success(msg) | Feedback::Error(msg) => Some(msg.as_str()),
        }
    }
}

/// Which form field has keyboard focus.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FormField {
    #[default]
    Name,
    StudentId,
    Photo,
}

impl FormField {
    pub fn next(self) -> Self {
        match self {
            FormField::Name => FormField::StudentId,
            FormField::StudentId => FormField::Photo,
            FormField::Photo => FormField::Name,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            FormField::Name => FormField::Photo,
            FormField::StudentId => FormField::Name,
            FormField::Photo => FormField::StudentId,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudentForm {
    pub name: String,
    pub student_id: String,
    pub photo: Option<PathBuf>,
    pub focus: FormField,
}

impl StudentForm {
    /// All three fields are required; blank text counts as missing.
    pub fn is_complete(&self) -> bool {
        !self.name.trim().is_empty() && !self.student_id.trim().is_empty() && self.photo.is_some()
    }

    pub fn to_new_student(&self) -> Option<NewStudent> {
        if !self.is_complete() {
            return None;
        }
        Some(NewStudent {
            name: self.name.clone(),
            student_id: self.student_id.clone(),
            photo: self.photo.clone()?,
        })
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Text buffer of the focused field, if it is a text field.
    pub fn focused_text_mut(&mut self) -> Option<&mut String> {
        match self.focus {
            FormField::Name => Some(&mut self.name),
            FormField::StudentId => Some(&mut self.student_id),
            FormField::Photo => None,
        }
    }
}

#[derive(Debug, Default)]
pub struct RosterController {
    students: Vec<Student>,
    pub form: StudentForm,
    feedback: Feedback,
    alert: Option<String>,
    pub selected_index: usize,
}

impl RosterController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn students(&self) -> &[Student] {
        &self.students
    }

    pub fn feedback(&self) -> &Feedback {
        &self.feedback
    }

    /// Message from a failed delete, shown until dismissed.
    pub fn alert(&self) -> Option<&str> {
        self.alert.as_deref()
    }

    pub fn dismiss_alert(&mut self) {
        self.alert = None;
    }

    pub fn selected_student(&self) -> Option<&Student> {
        self.students.get(self.selected_index)
    }

    pub fn move_up(&mut self) {
        if self.selected_index > 0 {
            self.selected_index -= 1;
        }
    }

    pub fn move_down(&mut self) {
        if self.selected_index + 1 < self.students.len() {
            self.selected_index += 1;
        }
    }

    /// Apply a roster fetch. Failures are logged and leave the list as it was.
    pub fn finish_load(&mut self, result: ApiResult<Vec<Student>>) {
        match result {
            Ok(students) => {
                self.students = students;
                let max_index = self.students.len().saturating_sub(1);
                if self.selected_index > max_index {
                    self.selected_index = max_index;
                }
            }
            Err(err) => {
                warn!(error = %err, "Failed to fetch students");
            }
        }
    }

    pub fn load_roster(&mut self, api: &dyn AttendanceApi) {
        let result = api.list_students();
        self.finish_load(result);
    }

    /// Start an add-student submission. Returns `None` (and sends nothing)
    /// while any required field is missing.
    pub fn begin_add(&mut self) -> Option<NewStudent> {
        let student = self.form.to_new_student()?;
        self.feedback = Feedback::Idle;
        Some(student)
    }

    /// Apply the outcome of an add. Returns true when the roster should be
    /// refreshed.
    pub fn finish_add(&mut self, result: ApiResult<()>) -> bool {
        match result {
            Ok(()) => {
                info!(student_id = %self.form.student_id, "student added");
                self.feedback = Feedback::Success(ADD_SUCCESS_MESSAGE.to_string());
                self.form.clear();
                true
            }
            Err(err) => {
                warn!(error = %err, "add student failed");
                self.feedback = Feedback::Error(add_error_message(&err));
                false
            }
        }
    }

    pub fn add_student(&mut self, api: &dyn AttendanceApi) -> bool {
        let Some(student) = self.begin_add() else {
            return false;
        };
        let result = api.create_student(&student);
        let refresh = self.finish_add(result);
        if refresh {
            self.load_roster(api);
        }
        refresh
    }

    /// Apply the outcome of a delete. Returns true when the roster should be
    /// refreshed; on failure the list is left alone and an alert is raised.
    pub fn finish_delete(&mut self, result: ApiResult<()>) -> bool {
        match result {
            Ok(()) => true,
            Err(err) => {
                warn!(error = %err, "delete student failed");
                self.alert = Some(
                    if matches!(err, ApiError::Rejected { .. }) {
                        DELETE_FAILED_MESSAGE
                    } else {
                        DELETE_ERROR_MESSAGE
                    }
                    .to_string(),
                );
                false
            }
        }
    }

    /// Delete immediately; there is no confirmation step.
    pub fn delete_student(&mut self, api: &dyn AttendanceApi, id: i64) -> bool {
        info!(id, "deleting student");
        let result = api.delete_student(id);
        let refresh = self.finish_delete(result);
        if refresh {
            self.load_roster(api);
        }
        refresh
    }
}

fn add_error_message(err: &ApiError) -> String {
    match err {
        ApiError::Rejected { detail: Some(detail), .. } => detail.clone(),
        ApiError::Rejected { detail: None, .. } => ADD_FALLBACK_MESSAGE.to_string(),
        ApiError::Transport(_) | ApiError::Decode(_) => CONNECTION_MESSAGE.to_string(),
        ApiError::Io { .. } | ApiError::Unexpected(_) => err.to_string(),
    }
}
