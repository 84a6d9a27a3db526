use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
};
use std::fs;
use std::path::{Path, PathBuf};

/// What the picked file will be used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickerTarget {
    ClassroomPhoto,
    ReferencePhoto,
}

impl PickerTarget {
    fn title(&self) -> &'static str {
        match self {
            PickerTarget::ClassroomPhoto => " Choose Classroom Photo ",
            PickerTarget::ReferencePhoto => " Choose Reference Photo ",
        }
    }
}

#[derive(Debug, Clone)]
pub struct PickerEntry {
    pub name: String,
    pub path: PathBuf,
    pub is_dir: bool,
    pub size: u64,
}

/// Directory browser that only offers image files.
pub struct FilePicker {
    pub target: PickerTarget,
    pub current_dir: PathBuf,
    pub entries: Vec<PickerEntry>,
    pub selected_index: usize,
    image_extensions: Vec<String>,
}

impl FilePicker {
    pub fn new(target: PickerTarget, start_dir: PathBuf, image_extensions: &[String]) -> Self {
        let mut picker = Self {
            target,
            current_dir: start_dir.clone(),
            entries: Vec::new(),
            selected_index: 0,
            image_extensions: image_extensions.iter().map(|e| e.to_lowercase()).collect(),
        };
        picker.load_directory(&start_dir);
        picker
    }

    pub fn load_directory(&mut self, path: &Path) {
        self.current_dir = path.to_path_buf();
        self.entries = read_directory(path, &self.image_extensions);
        self.selected_index = 0;
    }

    pub fn move_down(&mut self) {
        if self.selected_index + 1 < self.entries.len() {
            self.selected_index += 1;
        }
    }

    pub fn move_up(&mut self) {
        if self.selected_index > 0 {
            self.selected_index -= 1;
        }
    }

    pub fn go_parent(&mut self) {
        if let Some(parent) = self.current_dir.parent() {
            let parent = parent.to_path_buf();
            self.load_directory(&parent);
        }
    }

    pub fn selected(&self) -> Option<&PickerEntry> {
        self.entries.get(self.selected_index)
    }

    /// Enter the selected directory, or return the selected image.
    pub fn activate(&mut self) -> Option<PathBuf> {
        let entry = self.selected()?.clone();
        if entry.is_dir {
            self.load_directory(&entry.path);
            None
        } else {
            Some(entry.path)
        }
    }
}

fn read_directory(path: &Path, image_extensions: &[String]) -> Vec<PickerEntry> {
    let mut entries = Vec::new();

    if let Ok(read_dir) = fs::read_dir(path) {
        for entry in read_dir.flatten() {
            let name = entry.file_name().to_string_lossy().to_string();
            if name.starts_with('.') {
                continue;
            }

            let metadata = entry.metadata().ok();
            let is_dir = metadata.as_ref().map(|m| m.is_dir()).unwrap_or(false);
            let size = metadata.as_ref().map(|m| m.len()).unwrap_or(0);

            if !is_dir {
                let ext = entry
                    .path()
                    .extension()
                    .map(|e| e.to_string_lossy().to_lowercase())
                    .unwrap_or_default();
                if !image_extensions.contains(&ext) {
                    continue;
                }
            }

            entries.push(PickerEntry {
                name,
                path: entry.path(),
                is_dir,
                size,
            });
        }
    }

    // Directories first, then alphabetically
    entries.sort_by(|a, b| match (a.is_dir, b.is_dir) {
        (true, false) => std::cmp::Ordering::Less,
        (false, true) => std::cmp::Ordering::Greater,
        _ => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
    });

    entries
}

pub fn render(frame: &mut Frame, picker: &FilePicker, area: Rect) {
    let dialog_width = 90.min(area.width.saturating_sub(4));
    let dialog_height = 24.min(area.height.saturating_sub(4));

    let x = (area.width - dialog_width) / 2;
    let y = (area.height - dialog_height) / 2;

    let dialog_area = Rect::new(x, y, dialog_width, dialog_height);

    frame.render_widget(Clear, dialog_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(picker.target.title())
        .title_style(Style::default().add_modifier(Modifier::BOLD));
    let inner = block.inner(dialog_area);
    frame.render_widget(block, dialog_area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Current path
            Constraint::Min(3),    // Listing + info
            Constraint::Length(1), // Footer
        ])
        .split(inner);

    let path_line = Paragraph::new(Line::from(vec![
        Span::styled("Path: ", Style::default().fg(Color::DarkGray)),
        Span::raw(picker.current_dir.to_string_lossy().to_string()),
    ]));
    frame.render_widget(path_line, chunks[0]);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(chunks[1]);

    let items: Vec<ListItem> = if picker.entries.is_empty() {
        vec![ListItem::new("No images here").style(Style::default().fg(Color::DarkGray))]
    } else {
        picker
            .entries
            .iter()
            .map(|entry| {
                if entry.is_dir {
                    ListItem::new(format!("📁 {}/", entry.name)).style(Style::default().fg(Color::Cyan))
                } else {
                    ListItem::new(format!("   {}", entry.name))
                }
            })
            .collect()
    };

    let list = List::new(items)
        .block(Block::default().borders(Borders::RIGHT))
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        );
    let mut state = ListState::default();
    if !picker.entries.is_empty() {
        state.select(Some(picker.selected_index));
    }
    frame.render_stateful_widget(list, columns[0], &mut state);

    let info = Paragraph::new(entry_info(picker.selected())).wrap(Wrap { trim: true });
    frame.render_widget(info, columns[1].inner(Margin::new(1, 0)));

    let footer = Paragraph::new(Line::from(vec![
        Span::styled("↵", Style::default().fg(Color::Yellow)),
        Span::raw(" open/choose  "),
        Span::styled("h/⌫", Style::default().fg(Color::Yellow)),
        Span::raw(" parent  "),
        Span::styled("Esc", Style::default().fg(Color::Yellow)),
        Span::raw(" cancel"),
    ]));
    frame.render_widget(footer, chunks[2]);
}

fn entry_info(entry: Option<&PickerEntry>) -> Vec<Line<'static>> {
    let Some(entry) = entry else {
        return vec![Line::from(Span::styled("No selection", Style::default().fg(Color::DarkGray)))];
    };

    let mut lines = vec![Line::from(vec![
        Span::styled("Name: ", Style::default().fg(Color::DarkGray)),
        Span::raw(entry.name.clone()),
    ])];

    if entry.is_dir {
        return lines;
    }

    lines.push(Line::from(vec![
        Span::styled("Size: ", Style::default().fg(Color::DarkGray)),
        Span::raw(format_size(entry.size)),
    ]));

    if let Ok(reader) = image::ImageReader::open(&entry.path) {
        if let Ok((width, height)) = reader.into_dimensions() {
            lines.push(Line::from(vec![
                Span::styled("Dimensions: ", Style::default().fg(Color::DarkGray)),
                Span::raw(format!("{}x{}", width, height)),
            ]));
        }
    }

    lines
}

fn format_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    if size >= MB {
        format!("{:.1} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.1} KB", size as f64 / KB as f64)
    } else {
        format!("{} B", size)
    }
}
