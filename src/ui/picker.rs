use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem, ListState, Paragraph},
};

use super::status_bar::render_status_bar;

pub const REQUIRED_CHOICE_MESSAGE: &str = "Please select at least one value.";

/// Single or multi choice list with `/` filtering.
pub struct PickerState<T> {
    pub title: String,
    pub items: Vec<(String, T)>,
    pub checked: Vec<bool>,
    pub multi: bool,
    pub list_state: ListState,
    pub filtered_indices: Vec<usize>,
    pub search_query: String,
    pub search_mode: bool,
    pub error: Option<String>,
}

pub enum PickerAction<T> {
    None,
    Back,
    Quit,
    Confirm(Vec<T>),
}

impl<T: Clone> PickerState<T> {
    pub fn single(title: impl Into<String>, items: Vec<(String, T)>) -> Self {
        Self::build(title.into(), items, false)
    }

    pub fn multi(title: impl Into<String>, items: Vec<(String, T)>) -> Self {
        Self::build(title.into(), items, true)
    }

    fn build(title: String, items: Vec<(String, T)>, multi: bool) -> Self {
        let mut state = Self {
            title,
            checked: vec![false; items.len()],
            items,
            multi,
            list_state: ListState::default(),
            filtered_indices: Vec::new(),
            search_query: String::new(),
            search_mode: false,
            error: None,
        };
        state.rebuild_filter();
        state
    }

    pub fn rebuild_filter(&mut self) {
        let query = self.search_query.to_lowercase();
        self.filtered_indices = self
            .items
            .iter()
            .enumerate()
            .filter(|(_, (label, _))| query.is_empty() || label.to_lowercase().contains(&query))
            .map(|(i, _)| i)
            .collect();

        if self.filtered_indices.is_empty() {
            self.list_state.select(None);
        } else if let Some(selected) = self.list_state.selected() {
            if selected >= self.filtered_indices.len() {
                self.list_state.select(Some(self.filtered_indices.len() - 1));
            }
        } else {
            self.list_state.select(Some(0));
        }
    }

    fn selected_index(&self) -> Option<usize> {
        let selected = self.list_state.selected()?;
        self.filtered_indices.get(selected).copied()
    }

    /// Checked values in list order, regardless of the current filter.
    pub fn chosen(&self) -> Vec<T> {
        self.items
            .iter()
            .zip(&self.checked)
            .filter(|(_, checked)| **checked)
            .map(|((_, value), _)| value.clone())
            .collect()
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> PickerAction<T> {
        if self.search_mode {
            self.handle_search_key(key);
            return PickerAction::None;
        }

        match key.code {
            KeyCode::Char('q') => PickerAction::Quit,
            KeyCode::Esc => PickerAction::Back,
            KeyCode::Char('j') | KeyCode::Down => {
                self.move_selection(1);
                PickerAction::None
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.move_selection(-1);
                PickerAction::None
            }
            KeyCode::Char('/') => {
                self.search_mode = true;
                self.search_query.clear();
                PickerAction::None
            }
            KeyCode::Char(' ') if self.multi => {
                if let Some(idx) = self.selected_index() {
                    self.checked[idx] = !self.checked[idx];
                    self.error = None;
                }
                PickerAction::None
            }
            KeyCode::Char('a') if self.multi => {
                let all = self.filtered_indices.iter().all(|&i| self.checked[i]);
                for &i in &self.filtered_indices {
                    self.checked[i] = !all;
                }
                self.error = None;
                PickerAction::None
            }
            KeyCode::Enter => self.confirm(),
            _ => PickerAction::None,
        }
    }

    fn confirm(&mut self) -> PickerAction<T> {
        if !self.multi {
            return match self.selected_index() {
                Some(idx) => PickerAction::Confirm(vec![self.items[idx].1.clone()]),
                None => PickerAction::None,
            };
        }

        let chosen = self.chosen();
        if chosen.is_empty() {
            self.error = Some(REQUIRED_CHOICE_MESSAGE.to_string());
            return PickerAction::None;
        }
        PickerAction::Confirm(chosen)
    }

    fn handle_search_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.search_mode = false;
                self.search_query.clear();
                self.rebuild_filter();
            }
            KeyCode::Enter => self.search_mode = false,
            KeyCode::Char(c) => {
                self.search_query.push(c);
                self.rebuild_filter();
            }
            KeyCode::Backspace => {
                self.search_query.pop();
                self.rebuild_filter();
            }
            _ => {}
        }
    }

    fn move_selection(&mut self, delta: i32) {
        if self.filtered_indices.is_empty() {
            return;
        }
        let current = self.list_state.selected().unwrap_or(0) as i32;
        let max = self.filtered_indices.len() as i32 - 1;
        let next = (current + delta).clamp(0, max) as usize;
        self.list_state.select(Some(next));
    }
}

pub fn render_picker<T>(frame: &mut Frame, area: Rect, state: &mut PickerState<T>) {
    let layout = Layout::vertical([
        Constraint::Length(1), // title bar
        Constraint::Min(3),    // list
        Constraint::Length(1), // error
        Constraint::Length(1), // status bar
    ])
    .split(area);

    render_title_bar(frame, layout[0], state);

    let items: Vec<ListItem> = state
        .filtered_indices
        .iter()
        .map(|&idx| {
            let label = &state.items[idx].0;
            if state.multi {
                let (mark, style) = if state.checked[idx] {
                    ("[x] ", Style::default().fg(Color::Green))
                } else {
                    ("[ ] ", Style::default().fg(Color::DarkGray))
                };
                ListItem::new(Line::from(vec![
                    Span::styled(mark, style),
                    Span::raw(label.clone()),
                ]))
            } else {
                ListItem::new(label.clone())
            }
        })
        .collect();

    let list = List::new(items)
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("▸ ");
    frame.render_stateful_widget(list, layout[1], &mut state.list_state);

    if let Some(ref err) = state.error {
        let error = Paragraph::new(format!(" {err}")).style(Style::default().fg(Color::Red));
        frame.render_widget(error, layout[2]);
    }

    let hints = if state.search_mode {
        vec![("Enter", "Apply"), ("Esc", "Cancel"), ("type", "Filter")]
    } else if state.multi {
        vec![
            ("j/k", "Navigate"),
            ("Space", "Toggle"),
            ("a", "All"),
            ("/", "Search"),
            ("Enter", "Confirm"),
            ("Esc", "Back"),
            ("q", "Quit"),
        ]
    } else {
        vec![
            ("j/k", "Navigate"),
            ("/", "Search"),
            ("Enter", "Choose"),
            ("Esc", "Back"),
            ("q", "Quit"),
        ]
    };
    render_status_bar(frame, layout[3], &hints);
}

fn render_title_bar<T>(frame: &mut Frame, area: Rect, state: &PickerState<T>) {
    let mut spans = vec![
        Span::styled(
            " CodeJudger ",
            Style::default()
                .fg(Color::Black)
                .bg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
        Span::styled(
            state.title.clone(),
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
    ];

    let count = if state.multi {
        let checked = state.checked.iter().filter(|c| **c).count();
        format!("{checked} selected / {} items", state.items.len())
    } else {
        format!("{} / {} items", state.filtered_indices.len(), state.items.len())
    };
    spans.push(Span::styled(count, Style::default().fg(Color::DarkGray)));

    if state.search_mode || !state.search_query.is_empty() {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            format!("/{}", state.search_query),
            Style::default().fg(Color::Cyan),
        ));
        if state.search_mode {
            spans.push(Span::styled("▎", Style::default().fg(Color::Cyan)));
        }
    }

    let title = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));
    frame.render_widget(title, area);
}
