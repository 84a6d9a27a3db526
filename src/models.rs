//! Typed view-models for the attendance API.
//!
//! These mirror the JSON the backend returns. Sessions built from an upload
//! response are held in memory only.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// A registered student on the roster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    /// Server-assigned primary key
    pub id: i64,
    pub name: String,
    /// External-facing identifier (school ID), distinct from `id`
    pub student_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub face_encoding_path: Option<String>,
}

/// Presence determination for one student.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AttendanceStatus {
    Present,
    Absent,
}

impl AttendanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttendanceStatus::Present => "PRESENT",
            AttendanceStatus::Absent => "ABSENT",
        }
    }
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One student's row within a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub id: i64,
    /// Foreign key to `Student::id`
    pub student_id: i64,
    pub status: AttendanceStatus,
    /// Recognition score from the backend, not interpreted here
    #[serde(default)]
    pub confidence: f64,
    /// Snapshot of the student at analysis time
    #[serde(default)]
    pub student: Option<Student>,
}

impl AttendanceRecord {
    pub fn is_present(&self) -> bool {
        self.status == AttendanceStatus::Present
    }

    /// Name to show for this record, falling back to the numeric key.
    pub fn display_name(&self) -> String {
        match self.student.as_ref().map(|s| s.name.as_str()) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => format!("Student #{}", self.student_id),
        }
    }

    /// External student ID from the snapshot, if any.
    pub fn external_id(&self) -> &str {
        self.student
            .as_ref()
            .map(|s| s.student_id.as_str())
            .unwrap_or("")
    }
}

/// Body returned by `POST /attendance/mark`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkAttendanceResponse {
    pub session_id: i64,
    #[serde(default)]
    pub analysis: String,
    #[serde(default)]
    pub records: Vec<AttendanceRecord>,
    #[serde(default)]
    pub unknown_faces_count: Option<u32>,
    #[serde(default)]
    pub present_count: Option<u32>,
    #[serde(default)]
    pub total_students: Option<u32>,
}

/// The result of one attendance-marking run over a classroom image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceSession {
    pub id: i64,
    pub created_at: NaiveDateTime,
    #[serde(default)]
    pub classroom_image_path: String,
    #[serde(default)]
    pub ai_analysis_report: Option<String>,
    #[serde(default)]
    pub unknown_faces_count: Option<u32>,
    #[serde(default)]
    records: Vec<AttendanceRecord>,
}

impl AttendanceSession {
    pub fn new(
        id: i64,
        created_at: NaiveDateTime,
        classroom_image_path: impl Into<String>,
        records: Vec<AttendanceRecord>,
    ) -> Self {
        Self {
            id,
            created_at,
            classroom_image_path: classroom_image_path.into(),
            ai_analysis_report: None,
            unknown_faces_count: None,
            records,
        }
    }

    /// Build the client-side session for a successful upload.
    pub fn from_mark(response: MarkAttendanceResponse, image: &Path, created_at: NaiveDateTime) -> Self {
        Self {
            id: response.session_id,
            created_at,
            classroom_image_path: image.to_string_lossy().to_string(),
            ai_analysis_report: Some(response.analysis),
            unknown_faces_count: response.unknown_faces_count,
            records: response.records,
        }
    }

    pub fn with_report(mut self, report: impl Into<String>) -> Self {
        self.ai_analysis_report = Some(report.into());
        self
    }

    pub fn with_unknown_faces(mut self, count: u32) -> Self {
        self.unknown_faces_count = Some(count);
        self
    }

    pub fn records(&self) -> &[AttendanceRecord] {
        &self.records
    }

    pub fn present_count(&self) -> usize {
        self.records.iter().filter(|r| r.is_present()).count()
    }

    pub fn total_count(&self) -> usize {
        self.records.len()
    }

    /// e.g. `"1 / 2 Present"`
    pub fn attendance_ratio(&self) -> String {
        format!("{} / {} Present", self.present_count(), self.total_count())
    }

    /// Badge text, shown only when at least one face went unmatched.
    pub fn unknown_faces_badge(&self) -> Option<String> {
        match self.unknown_faces_count {
            Some(count) if count > 0 => Some(format!("{} Unknown Detected", count)),
            _ => None,
        }
    }
}

/// Fields submitted to `POST /students/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStudent {
    pub name: String,
    pub student_id: String,
    pub photo: std::path::PathBuf,
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn student(id: i64, name: &str, external: &str) -> Student {
        Student {
            id,
            name: name.to_string(),
            student_id: external.to_string(),
            face_encoding_path: None,
        }
    }

    pub fn record(id: i64, student_id: i64, status: AttendanceStatus) -> AttendanceRecord {
        AttendanceRecord {
            id,
            student_id,
            status,
            confidence: 1.0,
            student: Some(student(student_id, &format!("Student {}", student_id), &format!("S{:03}", student_id))),
        }
    }

    pub fn timestamp() -> NaiveDateTime {
        chrono::NaiveDate::from_ymd_opt(2024, 9, 2)
            .and_then(|d| d.and_hms_opt(9, 15, 0))
            .unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn test_status_wire_format() {
        let status: AttendanceStatus = serde_json::from_str("\"PRESENT\"").unwrap();
        assert_eq!(status, AttendanceStatus::Present);
        assert_eq!(serde_json::to_string(&AttendanceStatus::Absent).unwrap(), "\"ABSENT\"");
        assert!(serde_json::from_str::<AttendanceStatus>("\"LATE\"").is_err());
    }

    #[test]
    fn test_mark_response_maps_to_session() {
        let body = r#"{
            "session_id": 7,
            "present_count": 1,
            "total_students": 2,
            "unknown_faces_count": 3,
            "analysis": "Energetic",
            "records": [
                {"id": 1, "student_id": 1, "status": "PRESENT", "confidence": 1.0,
                 "student": {"id": 1, "name": "Ada", "student_id": "S001"}},
                {"id": 2, "student_id": 2, "status": "ABSENT", "confidence": 1.0,
                 "student": {"id": 2, "name": "Grace", "student_id": "S002"}}
            ]
        }"#;
        let response: MarkAttendanceResponse = serde_json::from_str(body).unwrap();
        let session = AttendanceSession::from_mark(response, Path::new("/tmp/class.jpg"), timestamp());

        assert_eq!(session.id, 7);
        assert_eq!(session.ai_analysis_report.as_deref(), Some("Energetic"));
        assert_eq!(session.classroom_image_path, "/tmp/class.jpg");
        assert_eq!(session.records()[0].display_name(), "Ada");
        assert_eq!(session.records()[1].id, 2);
        assert_eq!(session.attendance_ratio(), "1 / 2 Present");
        assert_eq!(session.unknown_faces_badge().as_deref(), Some("3 Unknown Detected"));
    }

    #[test]
    fn test_negative_unknown_faces_rejected() {
        let body = r#"{"session_id": 1, "analysis": "", "records": [], "unknown_faces_count": -1}"#;
        assert!(serde_json::from_str::<MarkAttendanceResponse>(body).is_err());
    }

    #[test]
    fn test_present_count_for_any_record_set() {
        for total in 0..8i64 {
            for present in 0..=total {
                let records = (0..total)
                    .map(|i| {
                        let status = if i < present {
                            AttendanceStatus::Present
                        } else {
                            AttendanceStatus::Absent
                        };
                        record(i, i, status)
                    })
                    .collect();
                let session = AttendanceSession::new(1, timestamp(), "", records);
                assert_eq!(session.present_count(), present as usize);
                assert_eq!(session.total_count(), total as usize);
                assert_eq!(session.attendance_ratio(), format!("{} / {} Present", present, total));
            }
        }
    }

    #[test]
    fn test_unknown_badge_hidden_when_zero_or_absent() {
        let session = AttendanceSession::new(1, timestamp(), "", Vec::new());
        assert_eq!(session.unknown_faces_badge(), None);
        assert_eq!(session.clone().with_unknown_faces(0).unknown_faces_badge(), None);
        assert!(session.with_unknown_faces(2).unknown_faces_badge().is_some());
    }

    #[test]
    fn test_record_without_snapshot_falls_back() {
        let body = r#"{"id": 1, "student_id": 42, "status": "ABSENT", "student": null}"#;
        let record: AttendanceRecord = serde_json::from_str(body).unwrap();
        assert_eq!(record.display_name(), "Student #42");
        assert_eq!(record.external_id(), "");
        assert_eq!(record.confidence, 0.0);
    }

    #[test]
    fn test_session_listing_without_records() {
        let body = r#"{"id": 3, "created_at": "2024-09-02T09:15:00.123456",
                       "classroom_image_path": "static/uploads/a.jpg",
                       "ai_analysis_report": "Quiet"}"#;
        let session: AttendanceSession = serde_json::from_str(body).unwrap();
        assert_eq!(session.id, 3);
        assert_eq!(session.total_count(), 0);
        assert_eq!(session.ai_analysis_report.as_deref(), Some("Quiet"));
    }
}
