use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
};

use crate::roster::{Feedback, FormField, RosterController};

pub fn render(frame: &mut Frame, roster: &RosterController, editing: bool, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    render_form(frame, roster, editing, columns[0]);
    render_list(frame, roster, !editing, columns[1]);
}

fn render_form(frame: &mut Frame, roster: &RosterController, editing: bool, area: Rect) {
    let border_color = if editing { Color::Cyan } else { Color::DarkGray };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(" Add New Student ")
        .title_style(Style::default().add_modifier(Modifier::BOLD));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // Subtitle
            Constraint::Length(3), // Name
            Constraint::Length(3), // Student ID
            Constraint::Length(3), // Photo
            Constraint::Length(2), // Submit hint
            Constraint::Min(1),    // Feedback
        ])
        .split(inner);

    let subtitle = Paragraph::new("Register a student for automated facial recognition.")
        .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(subtitle, chunks[0]);

    let form = &roster.form;
    let photo = form
        .photo
        .as_ref()
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_default();

    let fields = [
        (FormField::Name, "Student Name", form.name.as_str()),
        (FormField::StudentId, "Student ID", form.student_id.as_str()),
        (FormField::Photo, "Reference Photo (↵ to browse)", photo.as_str()),
    ];

    for (i, (field, label, value)) in fields.iter().enumerate() {
        let focused = editing && form.focus == *field;
        let style = if focused {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::Gray)
        };
        let text = if focused && *field != FormField::Photo {
            format!("{}█", value)
        } else {
            value.to_string()
        };
        let input = Paragraph::new(text).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(style)
                .title(format!(" {} * ", label)),
        );
        frame.render_widget(input, chunks[i + 1]);
    }

    let submit_style = if form.is_complete() {
        Style::default().fg(Color::White).bg(Color::Blue).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let submit = Paragraph::new(Line::from(vec![
        Span::styled(" Add to Roster ", submit_style),
        Span::styled("  Ctrl+s", Style::default().fg(Color::Yellow)),
    ]));
    frame.render_widget(submit, chunks[4]);

    let feedback = match roster.feedback() {
        Feedback::Idle => None,
        Feedback::Success(msg) => Some((msg.as_str(), Color::Green)),
        Feedback::Error(msg) => Some((msg.as_str(), Color::Red)),
    };
    if let Some((msg, color)) = feedback {
        let paragraph = Paragraph::new(msg)
            .alignment(Alignment::Center)
            .style(Style::default().fg(color))
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, chunks[5]);
    }
}

fn render_list(frame: &mut Frame, roster: &RosterController, focused: bool, area: Rect) {
    let students = roster.students();
    let border_color = if focused { Color::Blue } else { Color::DarkGray };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(" Current Roster ")
        .title_style(Style::default().add_modifier(Modifier::BOLD))
        .title(
            Line::from(Span::styled(
                format!(" {} Students ", students.len()),
                Style::default().fg(Color::Black).bg(Color::LightBlue),
            ))
            .right_aligned(),
        );

    if students.is_empty() {
        let empty = Paragraph::new(vec![Line::from(""), Line::from("No students registered yet.")])
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let items: Vec<ListItem> = students
        .iter()
        .map(|student| {
            ListItem::new(vec![
                Line::from(Span::styled(
                    student.name.clone(),
                    Style::default().add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled(
                    format!("ID: {}", student.student_id),
                    Style::default().fg(Color::DarkGray),
                )),
            ])
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(Color::DarkGray))
        .highlight_symbol("▶ ");

    let mut state = ListState::default();
    state.select(Some(roster.selected_index));
    frame.render_stateful_widget(list, area, &mut state);
}
