use ratatui::{
    prelude::*,
    widgets::Paragraph,
};

use crate::app::{App, AppMode, Page};

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let mut spans = Vec::new();

    // Left: backend address
    spans.push(Span::styled(
        format!(" {} ", app.api.base_url()),
        Style::default().fg(Color::White).bg(Color::DarkGray),
    ));

    let indicators = task_indicators(app);
    if !indicators.is_empty() {
        spans.push(Span::styled(
            format!(" {} ", indicators),
            Style::default().fg(Color::Cyan),
        ));
    }

    if let Some(ref message) = app.status_message {
        spans.push(Span::styled(
            format!(" {} ", message),
            Style::default().fg(Color::Yellow),
        ));
    }

    let help_text = format!(" {} ", hints(app));
    let content_len: usize = spans.iter().map(|s| s.content.chars().count()).sum();
    let help_len = help_text.chars().count();

    let available = area.width as usize;
    if available > content_len + help_len {
        spans.push(Span::raw(" ".repeat(available - content_len - help_len)));
    }

    // Right: key hints
    spans.push(Span::styled(
        help_text,
        Style::default().fg(Color::White).bg(Color::DarkGray),
    ));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// `[M:...]` until the worker has sent its request, then `[M:3s]`.
fn task_indicators(app: &App) -> String {
    app.task_manager
        .running_tasks()
        .iter()
        .map(|task| {
            if task.sent {
                format!("[{}:{}s]", task.task_type.short_name(), task.elapsed().as_secs())
            } else {
                format!("[{}:...]", task.task_type.short_name())
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn hints(app: &App) -> &'static str {
    match app.mode {
        AppMode::Help => "any key:close",
        AppMode::PickingFile => "↵:choose h:parent Esc:cancel",
        AppMode::EditingForm => "Tab:next field Ctrl+s:add Esc:done",
        AppMode::Normal => match app.page {
            Page::Dashboard => "o:photo m:mark e:export ?:help q:quit",
            Page::Roster => "a:add d:delete r:reload ?:help q:quit",
            Page::History => "↵:open r:reload ?:help q:quit",
        },
    }
}
