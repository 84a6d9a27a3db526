use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width.saturating_sub(4));
    let height = height.min(area.height.saturating_sub(4));
    let x = area.x + (area.width - width) / 2;
    let y = area.y + (area.height - height) / 2;
    Rect::new(x, y, width, height)
}

pub fn render_help(frame: &mut Frame, area: Rect) {
    let dialog_area = centered(area, 60, 30);

    // Clear the area behind the dialog
    frame.render_widget(Clear, dialog_area);

    let heading = Style::default().add_modifier(Modifier::BOLD).fg(Color::Cyan);
    let help_text = vec![
        Line::from(Span::styled("Pages", heading)),
        Line::from(""),
        Line::from("  1 / 2 / 3  Dashboard / Roster / History"),
        Line::from("  Tab        Next page"),
        Line::from(""),
        Line::from(Span::styled("Dashboard", heading)),
        Line::from(""),
        Line::from("  o          Choose classroom photo"),
        Line::from("  m / ↵      Mark attendance"),
        Line::from("  e          Export last session"),
        Line::from(""),
        Line::from(Span::styled("Roster", heading)),
        Line::from(""),
        Line::from("  a          Edit the add-student form"),
        Line::from("  Tab        Next form field"),
        Line::from("  Ctrl+s     Add student"),
        Line::from("  j / k      Move selection"),
        Line::from("  d / Del    Delete selected student"),
        Line::from("  r          Reload roster"),
        Line::from(""),
        Line::from(Span::styled("History", heading)),
        Line::from(""),
        Line::from("  ↵          Open session report"),
        Line::from("  r          Reload sessions"),
        Line::from(""),
        Line::from("  ?          Show this help"),
        Line::from("  q          Quit"),
        Line::from(""),
        Line::from(Span::styled("Press any key to close", Style::default().fg(Color::DarkGray))),
    ];

    let paragraph = Paragraph::new(help_text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(" Help ")
                .title_style(Style::default().add_modifier(Modifier::BOLD)),
        )
        .wrap(Wrap { trim: false });

    frame.render_widget(paragraph, dialog_area);
}

/// Blocking error popup; the next key press dismisses it.
pub fn render_alert(frame: &mut Frame, message: &str, area: Rect) {
    let dialog_area = centered(area, 56, 7);
    frame.render_widget(Clear, dialog_area);

    let text = vec![
        Line::from(Span::styled(message.to_string(), Style::default().fg(Color::White))),
        Line::from(""),
        Line::from(Span::styled("Press any key to dismiss", Style::default().fg(Color::DarkGray))),
    ];

    let paragraph = Paragraph::new(text)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red))
                .title(" Error ")
                .title_style(Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)),
        );

    frame.render_widget(paragraph, dialog_area);
}
