use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Margin, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};

use super::centered_rect;
use super::status_bar::render_status_bar;

const ACCOUNT: usize = 0;
const PASSWORD: usize = 1;
const OUTPUT: usize = 2;
const FIELD_COUNT: usize = 3;

const FIELD_LABELS: [&str; FIELD_COUNT] = ["Login account (email)", "Login password", "Output path"];
const FIELD_HINTS: [&str; FIELD_COUNT] = [
    "CodeJudger account",
    "Never saved to disk",
    "Problems are written below this directory",
];

pub const REQUIRED_MESSAGE: &str = "Please enter a value";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub account: String,
    pub password: String,
    pub output_dir: String,
}

pub struct LoginState {
    pub fields: [String; FIELD_COUNT],
    pub active_field: usize,
    pub error: Option<String>,
}

impl LoginState {
    pub fn new(account: Option<&str>, password: Option<&str>, output_dir: &str) -> Self {
        let mut state = Self {
            fields: [
                account.unwrap_or_default().to_string(),
                password.unwrap_or_default().to_string(),
                output_dir.to_string(),
            ],
            active_field: ACCOUNT,
            error: None,
        };
        // start on the first field that still needs input
        state.active_field = state.first_empty().unwrap_or(ACCOUNT);
        state
    }

    /// Filled-in credentials, or `None` while a field is still empty.
    pub fn credentials(&self) -> Option<Credentials> {
        if self.first_empty().is_some() {
            return None;
        }
        Some(Credentials {
            account: self.fields[ACCOUNT].trim().to_string(),
            password: self.fields[PASSWORD].clone(),
            output_dir: self.fields[OUTPUT].trim().to_string(),
        })
    }

    fn first_empty(&self) -> Option<usize> {
        self.fields.iter().position(|f| f.trim().is_empty())
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> LoginAction {
        match key.code {
            KeyCode::Tab | KeyCode::Down => {
                self.active_field = (self.active_field + 1) % FIELD_COUNT;
                LoginAction::None
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.active_field = (self.active_field + FIELD_COUNT - 1) % FIELD_COUNT;
                LoginAction::None
            }
            KeyCode::Char(c) => {
                self.fields[self.active_field].push(c);
                self.error = None;
                LoginAction::None
            }
            KeyCode::Backspace => {
                self.fields[self.active_field].pop();
                LoginAction::None
            }
            KeyCode::Enter => match self.first_empty() {
                Some(field) => {
                    self.active_field = field;
                    self.error = Some(REQUIRED_MESSAGE.to_string());
                    LoginAction::None
                }
                None => LoginAction::Submit,
            },
            KeyCode::Esc => LoginAction::Quit,
            _ => LoginAction::None,
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum LoginAction {
    None,
    Submit,
    Quit,
}

pub fn render_login(frame: &mut Frame, state: &LoginState) {
    let area = frame.area();

    let form_width = 64u16.min(area.width.saturating_sub(4));
    let form_height = 17u16.min(area.height.saturating_sub(2));
    let form_area = centered_rect(form_width, form_height, area);

    let block = Block::default()
        .title(" CodeJudger Downloader — Login ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    frame.render_widget(Clear, form_area);
    frame.render_widget(block, form_area);

    let inner = form_area.inner(Margin::new(2, 1));

    let layout = Layout::vertical([
        Constraint::Length(1), // welcome text
        Constraint::Length(1), // spacer
        Constraint::Length(3), // account
        Constraint::Length(3), // password
        Constraint::Length(3), // output path
        Constraint::Length(1), // error
        Constraint::Length(1), // spacer
        Constraint::Length(1), // status bar
    ])
    .split(inner);

    let welcome = Paragraph::new("Sign in to download exercises:")
        .style(Style::default().fg(Color::White));
    frame.render_widget(welcome, layout[0]);

    for i in 0..FIELD_COUNT {
        render_field(frame, layout[i + 2], i, state);
    }

    if let Some(ref err) = state.error {
        let error = Paragraph::new(format!(" {err}")).style(Style::default().fg(Color::Red));
        frame.render_widget(error, layout[5]);
    }

    render_status_bar(
        frame,
        layout[7],
        &[
            ("Tab/↓", "Next"),
            ("Shift+Tab/↑", "Prev"),
            ("Enter", "Login"),
            ("Esc", "Quit"),
        ],
    );
}

fn render_field(frame: &mut Frame, area: Rect, index: usize, state: &LoginState) {
    let is_active = state.active_field == index;
    let label_style = if is_active {
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Gray)
    };

    let value = if index == PASSWORD {
        "•".repeat(state.fields[index].chars().count())
    } else {
        state.fields[index].clone()
    };
    let cursor = if is_active { "▎" } else { "" };

    let layout = Layout::vertical([Constraint::Length(1), Constraint::Length(1)]).split(area);

    let label = Line::from(vec![
        Span::styled(FIELD_LABELS[index], label_style),
        Span::styled(
            format!("  {}", FIELD_HINTS[index]),
            Style::default().fg(Color::DarkGray),
        ),
    ]);
    frame.render_widget(Paragraph::new(label), layout[0]);

    let input = Line::from(vec![
        Span::styled(format!(" {value}"), Style::default().fg(Color::White)),
        Span::styled(cursor, Style::default().fg(Color::Cyan)),
    ]);
    let input_block = Paragraph::new(input).style(Style::default().bg(if is_active {
        Color::DarkGray
    } else {
        Color::Black
    }));
    frame.render_widget(input_block, layout[1]);
}
