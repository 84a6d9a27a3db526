use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::prelude::*;
use std::path::PathBuf;
use std::time::Duration;

use crate::api::{ApiClient, AttendanceApi};
use crate::config::Config;
use crate::dashboard::UploadController;
use crate::export;
use crate::history::HistoryController;
use crate::roster::RosterController;
use crate::tasks::{BackgroundTaskManager, TaskOutcome, TaskType};
use crate::ui;
use crate::ui::file_picker::{FilePicker, PickerTarget};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Dashboard,
    Roster,
    History,
}

impl Page {
    pub const ALL: [Page; 3] = [Page::Dashboard, Page::Roster, Page::History];

    pub fn title(&self) -> &'static str {
        match self {
            Page::Dashboard => "Dashboard",
            Page::Roster => "Roster",
            Page::History => "History",
        }
    }

    pub fn index(&self) -> usize {
        match self {
            Page::Dashboard => 0,
            Page::Roster => 1,
            Page::History => 2,
        }
    }

    pub fn next(&self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(&self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    Normal,
    Help,
    /// Typing into the add-student form
    EditingForm,
    PickingFile,
}

pub struct App {
    pub config: Config,
    pub api: ApiClient,
    pub page: Page,
    pub mode: AppMode,
    pub should_quit: bool,
    pub status_message: Option<String>,
    pub upload: UploadController,
    pub roster: RosterController,
    pub history: HistoryController,
    pub file_picker: Option<FilePicker>,
    pub task_manager: BackgroundTaskManager,
    /// A roster refresh was requested while another was in flight
    roster_reload_pending: bool,
}

impl App {
    pub fn new(config: Config) -> Self {
        let api = ApiClient::from_config(&config.api);
        Self {
            config,
            api,
            page: Page::Dashboard,
            mode: AppMode::Normal,
            should_quit: false,
            status_message: None,
            upload: UploadController::new(),
            roster: RosterController::new(),
            history: HistoryController::new(),
            file_picker: None,
            task_manager: BackgroundTaskManager::new(),
            roster_reload_pending: false,
        }
    }

    pub async fn run(&mut self, terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>) -> Result<()> {
        while !self.should_quit {
            self.apply_completions();

            terminal.draw(|frame| ui::render(frame, self))?;

            if event::poll(Duration::from_millis(100))? {
                match event::read()? {
                    Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key(key)?,
                    Event::Resize(_, _) => {}
                    _ => {}
                }
            }
        }

        Ok(())
    }

    /// Message that blocks input until dismissed.
    pub fn alert(&self) -> Option<&str> {
        self.upload.error().or_else(|| self.roster.alert())
    }

    fn apply_completions(&mut self) {
        for completion in self.task_manager.poll_updates() {
            let success = completion.outcome.is_success();
            tracing::debug!(task = completion.task_type.display_name(), success, "request finished");

            match completion.outcome {
                TaskOutcome::Marked(result) => {
                    self.upload.finish_submit(result);
                    if let Some(ratio) = self.upload.ratio_label().filter(|_| success) {
                        self.status_message = Some(format!("Attendance marked: {}", ratio));
                    } else {
                        self.status_message = None;
                    }
                }
                TaskOutcome::Roster(result) => {
                    self.roster.finish_load(result);
                    if std::mem::take(&mut self.roster_reload_pending) {
                        self.load_roster();
                    }
                }
                TaskOutcome::StudentAdded(result) => {
                    if self.roster.finish_add(result) {
                        self.load_roster();
                    }
                }
                TaskOutcome::StudentDeleted(result) => {
                    if self.roster.finish_delete(result) {
                        self.status_message = Some("Student deleted".to_string());
                        self.load_roster();
                    }
                }
                TaskOutcome::Sessions(result) => self.history.finish_sessions(result),
                TaskOutcome::Session(result) => self.history.finish_open(result),
            }
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        if self.alert().is_some() {
            self.upload.dismiss_error();
            self.roster.dismiss_alert();
            return Ok(());
        }

        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return Ok(());
        }

        match self.mode {
            AppMode::Help => {
                // Any key closes help
                self.mode = AppMode::Normal;
                return Ok(());
            }
            AppMode::PickingFile => return self.handle_picker_key(key),
            AppMode::EditingForm => return self.handle_form_key(key),
            AppMode::Normal => {}
        }

        self.status_message = None;

        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('?') => self.mode = AppMode::Help,
            KeyCode::Char('1') => self.switch_page(Page::Dashboard),
            KeyCode::Char('2') => self.switch_page(Page::Roster),
            KeyCode::Char('3') => self.switch_page(Page::History),
            KeyCode::Tab => self.switch_page(self.page.next()),
            KeyCode::BackTab => self.switch_page(self.page.prev()),
            _ => match self.page {
                Page::Dashboard => self.handle_dashboard_key(key),
                Page::Roster => self.handle_roster_key(key),
                Page::History => self.handle_history_key(key),
            },
        }

        Ok(())
    }

    fn switch_page(&mut self, page: Page) {
        if self.page == page {
            return;
        }
        self.page = page;
        // Each page fetches fresh data when it is shown.
        match page {
            Page::Dashboard => {}
            Page::Roster => self.load_roster(),
            Page::History => self.load_sessions(),
        }
    }

    fn handle_dashboard_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('o') => self.open_picker(PickerTarget::ClassroomPhoto),
            KeyCode::Char('m') | KeyCode::Enter => self.submit_upload(),
            KeyCode::Char('e') => self.export_session(),
            _ => {}
        }
    }

    fn handle_roster_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('a') | KeyCode::Char('i') => self.mode = AppMode::EditingForm,
            KeyCode::Char('j') | KeyCode::Down => self.roster.move_down(),
            KeyCode::Char('k') | KeyCode::Up => self.roster.move_up(),
            KeyCode::Char('d') | KeyCode::Delete => self.delete_selected_student(),
            KeyCode::Char('r') => self.load_roster(),
            KeyCode::Char('s') => self.submit_student(),
            _ => {}
        }
    }

    fn handle_history_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => self.history.move_down(),
            KeyCode::Char('k') | KeyCode::Up => self.history.move_up(),
            KeyCode::Char('r') => self.load_sessions(),
            KeyCode::Enter => self.open_selected_session(),
            _ => {}
        }
    }

    fn handle_form_key(&mut self, key: KeyEvent) -> Result<()> {
        use crate::roster::FormField;

        if key.modifiers.contains(KeyModifiers::CONTROL) {
            if key.code == KeyCode::Char('s') {
                self.submit_student();
            }
            return Ok(());
        }

        let form = &mut self.roster.form;
        match key.code {
            KeyCode::Esc => self.mode = AppMode::Normal,
            KeyCode::Tab | KeyCode::Down => form.focus = form.focus.next(),
            KeyCode::BackTab | KeyCode::Up => form.focus = form.focus.prev(),
            KeyCode::Enter => {
                if form.focus == FormField::Photo {
                    self.open_picker(PickerTarget::ReferencePhoto);
                } else {
                    form.focus = form.focus.next();
                }
            }
            KeyCode::Backspace => {
                if let Some(text) = form.focused_text_mut() {
                    text.pop();
                } else {
                    form.photo = None;
                }
            }
            KeyCode::Char(c) => {
                if let Some(text) = form.focused_text_mut() {
                    text.push(c);
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn handle_picker_key(&mut self, key: KeyEvent) -> Result<()> {
        let Some(picker) = self.file_picker.as_mut() else {
            self.mode = AppMode::Normal;
            return Ok(());
        };

        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => self.close_picker(None),
            KeyCode::Char('j') | KeyCode::Down => picker.move_down(),
            KeyCode::Char('k') | KeyCode::Up => picker.move_up(),
            KeyCode::Char('h') | KeyCode::Left | KeyCode::Backspace => picker.go_parent(),
            KeyCode::Char('l') | KeyCode::Right | KeyCode::Enter => {
                if let Some(path) = picker.activate() {
                    self.close_picker(Some(path));
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn open_picker(&mut self, target: PickerTarget) {
        let current = match target {
            PickerTarget::ClassroomPhoto => self.upload.selected_file().map(|p| p.to_path_buf()),
            PickerTarget::ReferencePhoto => self.roster.form.photo.clone(),
        };
        let start_dir = current
            .as_ref()
            .and_then(|p| p.parent())
            .map(|p| p.to_path_buf())
            .filter(|p| p.is_dir())
            .or_else(|| self.config.upload.start_dir.clone())
            .or_else(|| std::env::current_dir().ok())
            .unwrap_or_else(|| PathBuf::from("."));

        self.file_picker = Some(FilePicker::new(target, start_dir, &self.config.upload.image_extensions));
        self.mode = AppMode::PickingFile;
    }

    fn close_picker(&mut self, chosen: Option<PathBuf>) {
        let Some(picker) = self.file_picker.take() else {
            self.mode = AppMode::Normal;
            return;
        };

        match picker.target {
            PickerTarget::ClassroomPhoto => {
                if let Some(path) = chosen {
                    self.upload.select_file(path);
                }
                self.mode = AppMode::Normal;
            }
            PickerTarget::ReferencePhoto => {
                if chosen.is_some() {
                    self.roster.form.photo = chosen;
                }
                self.mode = AppMode::EditingForm;
            }
        }
    }

    fn submit_upload(&mut self) {
        if self.task_manager.is_running(TaskType::MarkAttendance) {
            return;
        }
        let Some(path) = self.upload.begin_submit() else {
            if self.upload.selected_file().is_none() {
                self.status_message = Some("Choose a classroom photo first (o)".to_string());
            }
            return;
        };

        self.status_message = Some(format!(
            "Uploading {}...",
            path.file_name().unwrap_or_default().to_string_lossy()
        ));
        let api = self.api.clone();
        self.task_manager.spawn(TaskType::MarkAttendance, move || {
            TaskOutcome::Marked(api.mark_attendance(&path))
        });
    }

    fn export_session(&mut self) {
        let Some(session) = self.upload.session() else {
            self.status_message = Some("No session to export".to_string());
            return;
        };

        let format = self.config.export.default_format;
        let path = export::default_file_name(session, format);
        self.status_message = Some(match export::export_session(session, &path, format) {
            Ok(count) => format!("Exported {} records to {}", count, path.display()),
            Err(e) => format!("Export failed: {}", e),
        });
    }

    fn load_roster(&mut self) {
        let api = self.api.clone();
        let spawned = self.task_manager.spawn(TaskType::LoadRoster, move || {
            TaskOutcome::Roster(api.list_students())
        });
        if spawned.is_none() {
            self.roster_reload_pending = true;
        }
    }

    fn submit_student(&mut self) {
        if self.task_manager.is_running(TaskType::AddStudent) {
            return;
        }
        // Incomplete forms are ignored; the submit control shows as disabled.
        let Some(student) = self.roster.begin_add() else {
            return;
        };

        let api = self.api.clone();
        self.task_manager.spawn(TaskType::AddStudent, move || {
            TaskOutcome::StudentAdded(api.create_student(&student))
        });
    }

    fn delete_selected_student(&mut self) {
        if self.task_manager.is_running(TaskType::DeleteStudent) {
            return;
        }
        let Some(id) = self.roster.selected_student().map(|s| s.id) else {
            return;
        };

        tracing::info!(id, "deleting student");
        let api = self.api.clone();
        self.task_manager.spawn(TaskType::DeleteStudent, move || {
            TaskOutcome::StudentDeleted(api.delete_student(id))
        });
    }

    fn load_sessions(&mut self) {
        if !self.history.begin() {
            return;
        }
        let api = self.api.clone();
        self.task_manager.spawn(TaskType::LoadSessions, move || {
            TaskOutcome::Sessions(api.list_sessions())
        });
    }

    fn open_selected_session(&mut self) {
        let Some(id) = self.history.selected_session_id() else {
            return;
        };
        if !self.history.begin() {
            return;
        }
        let api = self.api.clone();
        self.task_manager.spawn(TaskType::OpenSession, move || {
            TaskOutcome::Session(api.get_session(id))
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_cycle() {
        assert_eq!(Page::Dashboard.next(), Page::Roster);
        assert_eq!(Page::History.next(), Page::Dashboard);
        assert_eq!(Page::Dashboard.prev(), Page::History);
        assert_eq!(Page::ALL[Page::History.index()], Page::History);
    }

    #[test]
    fn test_form_typing_and_escape() {
        let mut app = App::new(Config::default());
        app.page = Page::Roster;
        app.mode = AppMode::EditingForm;

        for c in "Ada".chars() {
            app.handle_key(KeyEvent::from(KeyCode::Char(c))).unwrap();
        }
        app.handle_key(KeyEvent::from(KeyCode::Tab)).unwrap();
        for c in "S12".chars() {
            app.handle_key(KeyEvent::from(KeyCode::Char(c))).unwrap();
        }
        assert_eq!(app.roster.form.name, "Ada");
        assert_eq!(app.roster.form.student_id, "S12");
        assert_eq!(app.page, Page::Roster, "digits typed into the form must not switch pages");

        // Incomplete form: Ctrl+s sends nothing
        app.handle_key(KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL)).unwrap();
        assert!(!app.task_manager.has_running_tasks());

        app.handle_key(KeyEvent::from(KeyCode::Esc)).unwrap();
        assert_eq!(app.mode, AppMode::Normal);
    }

    #[test]
    fn test_alert_swallows_next_key() {
        let mut app = App::new(Config::default());
        app.roster.finish_delete(Err(crate::api::ApiError::rejected(404, "Student not found")));
        assert_eq!(app.alert(), Some(crate::roster::DELETE_FAILED_MESSAGE));

        app.handle_key(KeyEvent::from(KeyCode::Char('q'))).unwrap();
        assert!(!app.should_quit);
        assert_eq!(app.alert(), None);
    }

    #[test]
    fn test_upload_without_file_sets_hint() {
        let mut app = App::new(Config::default());
        app.handle_key(KeyEvent::from(KeyCode::Char('m'))).unwrap();
        assert!(!app.upload.is_busy());
        assert!(!app.task_manager.has_running_tasks());
        assert!(app.status_message.is_some());
    }
}
