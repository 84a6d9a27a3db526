use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::models::AttendanceSession;

/// Export format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Csv,
    Json,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "CSV",
            ExportFormat::Json => "JSON",
        }
    }

    /// Pick a format from a file extension, if it names one.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_string_lossy().to_lowercase().as_str() {
            "csv" => Some(ExportFormat::Csv),
            "json" => Some(ExportFormat::Json),
            _ => None,
        }
    }
}

/// Default file name for a session export, e.g. `attendance-session-7.csv`.
pub fn default_file_name(session: &AttendanceSession, format: ExportFormat) -> PathBuf {
    PathBuf::from(format!("attendance-session-{}.{}", session.id, format.extension()))
}

/// Write a session's records to a file. Returns the number of records written.
pub fn export_session(session: &AttendanceSession, output_path: &Path, format: ExportFormat) -> Result<usize> {
    match format {
        ExportFormat::Csv => export_csv(session, output_path)?,
        ExportFormat::Json => export_json(session, output_path)?,
    }

    tracing::info!(
        session = session.id,
        path = %output_path.display(),
        format = format.name(),
        "exported session"
    );
    Ok(session.total_count())
}

fn export_json(session: &AttendanceSession, output_path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(session)?;
    let mut file = File::create(output_path)?;
    file.write_all(json.as_bytes())?;
    Ok(())
}

fn export_csv(session: &AttendanceSession, output_path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(output_path)?;

    wtr.write_record([
        "record_id",
        "student_id",
        "student_name",
        "external_id",
        "status",
        "confidence",
    ])?;

    for record in session.records() {
        let id = record.id.to_string();
        let student_id = record.student_id.to_string();
        let name = record.display_name();
        let confidence = record.confidence.to_string();
        wtr.write_record([
            id.as_str(),
            student_id.as_str(),
            name.as_str(),
            record.external_id(),
            record.status.as_str(),
            confidence.as_str(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
