//! Tabular view of a session's attendance records.
//!
//! Stateless: the output depends only on the records passed in.

use ratatui::{
    prelude::*,
    widgets::{Block, Cell, Paragraph, Row, Table, Widget},
};

use crate::models::{AttendanceRecord, AttendanceStatus};

pub const PLACEHOLDER: &str = "No records found.";
pub const HEADERS: [&str; 3] = ["Student Name", "ID", "Status"];

/// One rendered row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowView {
    pub name: String,
    pub external_id: String,
    pub status: AttendanceStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableView {
    /// Shown instead of an empty table
    Placeholder(&'static str),
    Rows(Vec<RowView>),
}

pub fn table_view(records: &[AttendanceRecord]) -> TableView {
    if records.is_empty() {
        return TableView::Placeholder(PLACEHOLDER);
    }

    TableView::Rows(
        records
            .iter()
            .map(|record| RowView {
                name: record.display_name(),
                external_id: record.external_id().to_string(),
                status: record.status,
            })
            .collect(),
    )
}

pub fn badge_style(status: AttendanceStatus) -> Style {
    match status {
        AttendanceStatus::Present => Style::default()
            .fg(Color::Black)
            .bg(Color::Green)
            .add_modifier(Modifier::BOLD),
        AttendanceStatus::Absent => Style::default()
            .fg(Color::White)
            .bg(Color::Red)
            .add_modifier(Modifier::BOLD),
    }
}

pub fn render(frame: &mut Frame, records: &[AttendanceRecord], block: Block, area: Rect) {
    draw(records, block, area, frame.buffer_mut());
}

pub fn draw(records: &[AttendanceRecord], block: Block, area: Rect, buf: &mut Buffer) {
    match table_view(records) {
        TableView::Placeholder(text) => {
            Paragraph::new(text)
                .alignment(Alignment::Center)
                .style(Style::default().fg(Color::DarkGray))
                .block(block)
                .render(area, buf);
        }
        TableView::Rows(rows) => {
            let header = Row::new(HEADERS.iter().map(|h| Cell::from(*h))).style(
                Style::default()
                    .fg(Color::Gray)
                    .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
            );

            let rows: Vec<Row> = rows
                .into_iter()
                .map(|row| {
                    Row::new(vec![
                        Cell::from(row.name).style(Style::default().fg(Color::White)),
                        Cell::from(row.external_id).style(Style::default().fg(Color::DarkGray)),
                        Cell::from(Span::styled(
                            format!(" {} ", row.status),
                            badge_style(row.status),
                        )),
                    ])
                })
                .collect();

            let table = Table::new(
                rows,
                [
                    Constraint::Percentage(50),
                    Constraint::Percentage(25),
                    Constraint::Percentage(25),
                ],
            )
            .header(header)
            .block(block);
            Widget::render(table, area, buf);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::record;

    fn buffer_text(buf: &Buffer) -> String {
        buf.content
            .chunks(buf.area.width as usize)
            .map(|line| line.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_empty_records_render_placeholder() {
        assert_eq!(table_view(&[]), TableView::Placeholder(PLACEHOLDER));

        let area = Rect::new(0, 0, 60, 5);
        let mut buf = Buffer::empty(area);
        draw(&[], Block::default(), area, &mut buf);
        let text = buffer_text(&buf);
        assert!(text.contains("No records found."));
        assert!(!text.contains("Student Name"));
    }

    #[test]
    fn test_missing_snapshot_falls_back_to_id() {
        let orphan = AttendanceRecord {
            id: 1,
            student_id: 42,
            status: AttendanceStatus::Absent,
            confidence: 0.0,
            student: None,
        };
        let TableView::Rows(rows) = table_view(&[orphan]) else {
            panic!("expected rows");
        };
        assert_eq!(
            rows,
            vec![RowView {
                name: "Student #42".to_string(),
                external_id: String::new(),
                status: AttendanceStatus::Absent,
            }]
        );
    }

    #[test]
    fn test_rows_keep_order_and_render() {
        let records = vec![
            record(1, 1, AttendanceStatus::Present),
            record(2, 2, AttendanceStatus::Absent),
        ];
        let TableView::Rows(rows) = table_view(&records) else {
            panic!("expected rows");
        };
        assert_eq!(rows[0].name, "Student 1");
        assert_eq!(rows[0].external_id, "S001");
        assert_eq!(rows[1].status, AttendanceStatus::Absent);

        let area = Rect::new(0, 0, 60, 5);
        let mut buf = Buffer::empty(area);
        draw(&records, Block::default(), area, &mut buf);
        let text = buffer_text(&buf);
        assert!(text.contains("Student Name"));
        assert!(text.contains("PRESENT"));
        assert!(text.contains("ABSENT"));
        assert!(!text.contains(PLACEHOLDER));
    }

    #[test]
    fn test_badge_keyed_off_status() {
        assert_eq!(badge_style(AttendanceStatus::Present).bg, Some(Color::Green));
        assert_eq!(badge_style(AttendanceStatus::Absent).bg, Some(Color::Red));
    }
}
