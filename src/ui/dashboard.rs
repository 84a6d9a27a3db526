use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph, Wrap},
};

use super::attendance_table;
use crate::dashboard::UploadController;

pub fn render(frame: &mut Frame, upload: &UploadController, area: Rect) {
    let analysis = upload.analysis();
    let analysis_height = if analysis.is_empty() { 0 } else { 5 };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5),               // Upload card
            Constraint::Length(analysis_height), // Vibe analysis
            Constraint::Min(4),                  // Session results
        ])
        .split(area);

    render_upload_card(frame, upload, chunks[0]);

    if !analysis.is_empty() {
        let quote = Paragraph::new(Line::from(Span::styled(
            format!("\"{}\"", analysis),
            Style::default().fg(Color::LightBlue).add_modifier(Modifier::ITALIC),
        )))
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::LEFT)
                .border_style(Style::default().fg(Color::Magenta))
                .title(" ✨ Classroom Vibe Analysis ")
                .title_style(Style::default().add_modifier(Modifier::BOLD)),
        );
        frame.render_widget(quote, chunks[1]);
    }

    match upload.session() {
        Some(session) => {
            let mut title = vec![Span::styled(
                " Session Results ",
                Style::default().add_modifier(Modifier::BOLD),
            )];
            if let Some(badge) = session.unknown_faces_badge() {
                title.push(Span::styled(
                    format!(" {} ", badge),
                    Style::default().fg(Color::Black).bg(Color::Yellow),
                ));
                title.push(Span::raw(" "));
            }
            title.push(Span::styled(
                format!(" {} ", session.attendance_ratio()),
                Style::default().fg(Color::Black).bg(Color::Green),
            ));

            let block = Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .title(Line::from(title));
            attendance_table::render(frame, session.records(), block, chunks[2]);
        }
        None => {
            let hint = Paragraph::new(vec![
                Line::from(""),
                Line::from("Upload a classroom photo to identify students and analyze engagement."),
            ])
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::DarkGray)));
            frame.render_widget(hint, chunks[2]);
        }
    }
}

fn render_upload_card(frame: &mut Frame, upload: &UploadController, area: Rect) {
    let file_line = match upload.selected_file() {
        Some(path) => Line::from(vec![
            Span::styled("Photo: ", Style::default().fg(Color::DarkGray)),
            Span::raw(path.to_string_lossy().to_string()),
        ]),
        None => Line::from(Span::styled(
            "No photo selected (press o to choose)",
            Style::default().fg(Color::DarkGray),
        )),
    };

    let button = if upload.is_busy() {
        Span::styled(
            " ⠿ Processing... ",
            Style::default().fg(Color::White).bg(Color::DarkGray),
        )
    } else if upload.can_submit() {
        Span::styled(
            " Mark Attendance ",
            Style::default()
                .fg(Color::White)
                .bg(Color::Blue)
                .add_modifier(Modifier::BOLD),
        )
    } else {
        Span::styled(" Mark Attendance ", Style::default().fg(Color::DarkGray).bg(Color::Black))
    };

    let card = Paragraph::new(vec![
        file_line,
        Line::from(""),
        Line::from(vec![button, Span::styled("  m", Style::default().fg(Color::Yellow))]),
    ])
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Blue))
            .title(" Automated Attendance ")
            .title_style(Style::default().add_modifier(Modifier::BOLD)),
    );
    frame.render_widget(card, area);
}
