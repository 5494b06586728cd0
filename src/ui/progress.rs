use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Wrap},
};
use std::path::PathBuf;

use super::status_bar::render_status_bar;

const SPINNER: [&str; 10] = [
    "\u{280b}", "\u{2819}", "\u{2839}", "\u{2838}", "\u{283c}", "\u{2834}", "\u{2826}",
    "\u{2827}", "\u{2807}", "\u{280f}",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogKind {
    Saved,
    Skipped,
    Failed,
}

pub struct DownloadState {
    pub output_dir: PathBuf,
    pub total: usize,
    pub finished: usize,
    pub current: Option<String>,
    pub log: Vec<(LogKind, String)>,
    pub done: bool,
    pub scroll_offset: u16,
    pub spinner_frame: usize,
}

impl DownloadState {
    pub fn new(output_dir: PathBuf, total: usize) -> Self {
        Self {
            output_dir,
            total,
            finished: 0,
            current: None,
            log: Vec::new(),
            done: false,
            scroll_offset: 0,
            spinner_frame: 0,
        }
    }

    pub fn start(&mut self, exercise: &str) {
        self.current = Some(exercise.to_string());
    }

    pub fn saved(&mut self, exercise: &str, problems: usize, skipped: &[usize]) {
        self.log.push((
            LogKind::Saved,
            format!("{exercise}: {problems} problem(s) saved"),
        ));
        for index in skipped {
            self.log.push((
                LogKind::Skipped,
                format!("{exercise}: No locales for problem #{index}, skipped"),
            ));
        }
        self.advance();
    }

    pub fn failed(&mut self, exercise: &str, error: String) {
        self.log.push((LogKind::Failed, format!("{exercise}: {error}")));
        self.advance();
    }

    fn advance(&mut self) {
        self.finished += 1;
        self.current = None;
    }

    pub fn finish(&mut self) {
        self.done = true;
        self.current = None;
    }

    pub fn failures(&self) -> usize {
        self.log
            .iter()
            .filter(|(kind, _)| *kind == LogKind::Failed)
            .count()
    }

    pub fn ratio(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            (self.finished as f64 / self.total as f64).min(1.0)
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> DownloadAction {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                self.scroll_offset = self.scroll_offset.saturating_add(1);
                DownloadAction::None
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.scroll_offset = self.scroll_offset.saturating_sub(1);
                DownloadAction::None
            }
            KeyCode::Char('q') | KeyCode::Enter | KeyCode::Esc if self.done => DownloadAction::Quit,
            _ => DownloadAction::None,
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum DownloadAction {
    None,
    Quit,
}

pub fn render_progress(frame: &mut Frame, area: Rect, state: &mut DownloadState) {
    let layout = Layout::vertical([
        Constraint::Length(3), // gauge
        Constraint::Length(1), // current exercise
        Constraint::Min(3),    // log
        Constraint::Length(1), // status bar
    ])
    .split(area);

    let label = format!("{} / {}", state.finished, state.total);
    let gauge = Gauge::default()
        .block(
            Block::default()
                .title(" Downloading ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .gauge_style(Style::default().fg(Color::Green).bg(Color::Black))
        .ratio(state.ratio())
        .label(label);
    frame.render_widget(gauge, layout[0]);

    let current = if state.done {
        let failures = state.failures();
        let (text, color) = if failures == 0 {
            (
                format!(" Done. Saved to {}", state.output_dir.display()),
                Color::Green,
            )
        } else {
            (
                format!(
                    " Finished with {failures} failure(s). Output in {}",
                    state.output_dir.display()
                ),
                Color::Red,
            )
        };
        Paragraph::new(text).style(Style::default().fg(color).add_modifier(Modifier::BOLD))
    } else if let Some(ref name) = state.current {
        let s = SPINNER[state.spinner_frame % SPINNER.len()];
        Paragraph::new(format!(" {s} {name}")).style(Style::default().fg(Color::Yellow))
    } else {
        Paragraph::new("")
    };
    frame.render_widget(current, layout[1]);

    let lines: Vec<Line> = state
        .log
        .iter()
        .map(|(kind, text)| {
            let (mark, color) = match kind {
                LogKind::Saved => ("\u{2714} ", Color::Green),
                LogKind::Skipped => ("- ", Color::Yellow),
                LogKind::Failed => ("\u{2718} ", Color::Red),
            };
            Line::from(vec![
                Span::styled(mark, Style::default().fg(color)),
                Span::styled(text.clone(), Style::default().fg(Color::Gray)),
            ])
        })
        .collect();

    let max_scroll = (lines.len() as u16).saturating_sub(layout[2].height);
    state.scroll_offset = state.scroll_offset.min(max_scroll);

    let log = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .scroll((state.scroll_offset, 0));
    frame.render_widget(log, layout[2]);

    let hints: &[(&str, &str)] = if state.done {
        &[("j/k", "Scroll"), ("Enter/q", "Exit")]
    } else {
        &[("j/k", "Scroll"), ("Ctrl+C", "Abort")]
    };
    render_status_bar(frame, layout[3], hints);
}
