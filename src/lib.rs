//! Terminal client for an AI-assisted classroom attendance service.
//!
//! The backend does the face recognition; this crate uploads photos,
//! manages the student roster, and presents the results.

pub mod api;
pub mod app;
pub mod config;
pub mod dashboard;
pub mod export;
pub mod history;
pub mod logging;
pub mod models;
pub mod roster;
pub mod tasks;
pub mod ui;
