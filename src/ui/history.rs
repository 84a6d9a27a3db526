use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
};

use crate::history::HistoryController;

pub fn render(frame: &mut Frame, history: &HistoryController, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(area);

    let title = if history.is_busy() {
        " Past Sessions (loading...) ".to_string()
    } else {
        format!(" Past Sessions ({}) ", history.sessions().len())
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Blue))
        .title(title)
        .title_style(Style::default().add_modifier(Modifier::BOLD));

    if history.sessions().is_empty() {
        let text = history
            .error()
            .map(|e| Line::from(Span::styled(e.to_string(), Style::default().fg(Color::Red))))
            .unwrap_or_else(|| Line::from("No sessions yet. Press r to refresh."));
        frame.render_widget(
            Paragraph::new(text)
                .style(Style::default().fg(Color::DarkGray))
                .wrap(Wrap { trim: true })
                .block(block),
            columns[0],
        );
    } else {
        let items: Vec<ListItem> = history
            .sessions()
            .iter()
            .map(|session| {
                ListItem::new(Line::from(vec![
                    Span::styled(format!("#{:<5}", session.id), Style::default().fg(Color::Cyan)),
                    Span::raw(session.created_at.format("%Y-%m-%d %H:%M").to_string()),
                ]))
            })
            .collect();
        let list = List::new(items)
            .block(block)
            .highlight_style(Style::default().bg(Color::Blue).fg(Color::White));
        let mut state = ListState::default();
        state.select(Some(history.selected_index));
        frame.render_stateful_widget(list, columns[0], &mut state);
    }

    render_details(frame, history, columns[1]);
}

fn render_details(frame: &mut Frame, history: &HistoryController, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Session Report ");

    // Errors from a refresh or an open show here, even with sessions listed.
    let mut lines: Vec<Line> = Vec::new();
    if let Some(err) = history.error() {
        lines.push(Line::from(Span::styled(
            format!("Error: {}", err),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(""));
    }

    let Some(session) = history.open_session_details() else {
        lines.push(Line::from(Span::styled(
            "Select a session and press ↵ to view its report.",
            Style::default().fg(Color::DarkGray),
        )));
        frame.render_widget(
            Paragraph::new(lines).wrap(Wrap { trim: true }).block(block),
            area,
        );
        return;
    };

    let label = Style::default().fg(Color::DarkGray);
    lines.extend([
        Line::from(vec![
            Span::styled("Session: ", label),
            Span::raw(format!("#{}", session.id)),
        ]),
        Line::from(vec![
            Span::styled("Taken: ", label),
            Span::raw(session.created_at.format("%Y-%m-%d %H:%M:%S").to_string()),
        ]),
        Line::from(vec![
            Span::styled("Image: ", label),
            Span::raw(session.classroom_image_path.clone()),
        ]),
        Line::from(""),
    ]);

    match session.ai_analysis_report.as_deref() {
        Some(report) if !report.is_empty() => {
            lines.push(Line::from(Span::styled(
                "Classroom Vibe Analysis",
                Style::default().add_modifier(Modifier::BOLD).fg(Color::Magenta),
            )));
            lines.push(Line::from(Span::styled(
                format!("\"{}\"", report),
                Style::default().add_modifier(Modifier::ITALIC),
            )));
        }
        _ => lines.push(Line::from(Span::styled("No analysis recorded.", label))),
    }

    frame.render_widget(
        Paragraph::new(lines).wrap(Wrap { trim: true }).block(block),
        area,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiError;
    use crate::models::fixtures::timestamp;
    use crate::models::AttendanceSession;
    use ratatui::backend::TestBackend;

    fn screen_text(history: &HistoryController) -> String {
        let mut terminal = Terminal::new(TestBackend::new(120, 20)).unwrap();
        terminal
            .draw(|frame| render(frame, history, frame.area()))
            .unwrap();
        let buf = terminal.backend().buffer();
        buf.content
            .chunks(buf.area.width as usize)
            .map(|line| line.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_open_error_shown_next_to_listed_sessions() {
        let mut history = HistoryController::new();
        history.finish_sessions(Ok(vec![AttendanceSession::new(1, timestamp(), "class.jpg", Vec::new())]));
        assert!(history.begin());
        history.finish_open(Err(ApiError::rejected(404, "Session not found")));

        let text = screen_text(&history);
        assert!(text.contains("#1"));
        assert!(text.contains("Session not found"));
    }

    #[test]
    fn test_report_rendered_for_open_session() {
        let mut history = HistoryController::new();
        let session = AttendanceSession::new(4, timestamp(), "class.jpg", Vec::new()).with_report("Focused");
        history.finish_sessions(Ok(vec![session.clone()]));
        history.finish_open(Ok(session));

        let text = screen_text(&history);
        assert!(text.contains("Focused"));
        assert!(!text.contains("Error:"));
    }
}
