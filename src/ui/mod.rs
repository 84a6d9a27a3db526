pub mod attendance_table;
mod dashboard;
mod dialogs;
pub mod file_picker;
mod history;
mod roster;
mod status_bar;

use ratatui::{prelude::*, widgets::Tabs};

use crate::app::{App, AppMode, Page};

pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    // Main layout: tab bar + page + status bar
    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

    render_tabs(frame, app, main_chunks[0]);

    match app.page {
        Page::Dashboard => dashboard::render(frame, &app.upload, main_chunks[1]),
        Page::Roster => roster::render(frame, &app.roster, app.mode == AppMode::EditingForm, main_chunks[1]),
        Page::History => history::render(frame, &app.history, main_chunks[1]),
    }

    status_bar::render(frame, app, main_chunks[2]);

    if let Some(ref picker) = app.file_picker {
        file_picker::render(frame, picker, area);
    }

    if app.mode == AppMode::Help {
        dialogs::render_help(frame, area);
    }

    if let Some(message) = app.alert() {
        dialogs::render_alert(frame, message, area);
    }
}

fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(16), Constraint::Min(0)])
        .split(area);

    let brand = Span::styled(
        " CLASSROOM AI ",
        Style::default()
            .fg(Color::White)
            .bg(Color::Blue)
            .add_modifier(Modifier::BOLD),
    );
    frame.render_widget(Line::from(brand), chunks[0]);

    let titles: Vec<Line> = Page::ALL
        .iter()
        .enumerate()
        .map(|(i, page)| Line::from(format!("{} {}", i + 1, page.title())))
        .collect();
    let tabs = Tabs::new(titles)
        .select(app.page.index())
        .style(Style::default().fg(Color::Gray))
        .highlight_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .divider("|");
    frame.render_widget(tabs, chunks[1]);
}
