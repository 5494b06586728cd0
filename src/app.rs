use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    style::{Color, Style},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};
use std::path::PathBuf;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use cjc::api::CodeJudgeClient;
use cjc::api::types::{Exercise, Group};
use cjc::config::{Config, expand_home};
use cjc::exercises::{self, ExerciseType};
use cjc::materialize::{self, Report};

use crate::event::{Event, EventHandler};
use crate::ui::centered_rect;
use crate::ui::login::{self, Credentials, LoginAction, LoginState};
use crate::ui::picker::{self, PickerAction, PickerState};
use crate::ui::progress::{self, DownloadAction, DownloadState};

const SPINNER: [&str; 10] = [
    "\u{280b}", "\u{2819}", "\u{2839}", "\u{2838}", "\u{283c}", "\u{2834}", "\u{2826}",
    "\u{2827}", "\u{2807}", "\u{280f}",
];

pub enum Screen {
    Login(LoginState),
    Groups(PickerState<Group>),
    Types(PickerState<Vec<Exercise>>),
    Exercises(PickerState<Exercise>),
    Download(DownloadState),
}

pub enum ApiResult {
    LoggedIn(Result<(CodeJudgeClient, Vec<Group>)>),
    Exercises(Result<Vec<Exercise>>),
    Download(DownloadEvent),
}

pub enum DownloadEvent {
    Started(String),
    Saved { exercise: String, report: Report },
    Failed { exercise: String, error: String },
    Finished,
}

/// Values given on the command line; they prefill the login form.
#[derive(Debug, Default, Clone)]
pub struct LaunchOptions {
    pub account: Option<String>,
    pub password: Option<String>,
    pub output_dir: Option<String>,
}

pub struct App {
    pub screen: Screen,
    pub config: Config,
    pub should_quit: bool,
    pub error_overlay: Option<String>,
    pub busy: Option<String>,
    pub exit_message: Option<String>,
    pub last_output_dir: Option<PathBuf>,
    auto_login: bool,
    spinner_frame: usize,
    credentials: Option<Credentials>,
    group: Option<Group>,
    groups: Vec<Group>,
    exercise_types: Vec<ExerciseType>,
    api_client: CodeJudgeClient,
    api_tx: mpsc::UnboundedSender<ApiResult>,
    api_rx: mpsc::UnboundedReceiver<ApiResult>,
}

impl App {
    pub fn new(config: Config, options: LaunchOptions) -> Result<Self> {
        let (api_tx, api_rx) = mpsc::unbounded_channel();
        let api_client = CodeJudgeClient::new(&config.base_url)?;

        let account = options.account.as_deref().or(config.account.as_deref());
        let output_dir = options.output_dir.as_deref().unwrap_or(&config.output_dir);
        let login = LoginState::new(account, options.password.as_deref(), output_dir);

        // both credentials on the command line: no need to show the form
        let auto_login =
            options.account.is_some() && options.password.is_some() && login.credentials().is_some();

        Ok(Self {
            screen: Screen::Login(login),
            config,
            should_quit: false,
            error_overlay: None,
            busy: None,
            exit_message: None,
            last_output_dir: None,
            auto_login,
            spinner_frame: 0,
            credentials: None,
            group: None,
            groups: Vec::new(),
            exercise_types: Vec::new(),
            api_client,
            api_tx,
            api_rx,
        })
    }

    pub async fn run(
        &mut self,
        terminal: &mut ratatui::DefaultTerminal,
        events: &mut EventHandler,
    ) -> Result<()> {
        if self.auto_login {
            self.start_login();
        }

        loop {
            terminal.draw(|f| self.render(f))?;

            if self.should_quit {
                break;
            }

            tokio::select! {
                event = events.next() => {
                    match event? {
                        Event::Key(key) => self.handle_key(key),
                        Event::Tick => self.handle_tick(),
                    }
                }
                Some(api_result) = self.api_rx.recv() => {
                    self.handle_api_result(api_result);
                }
            }
        }

        Ok(())
    }

    fn render(&mut self, frame: &mut Frame) {
        let area = frame.area();

        match &mut self.screen {
            Screen::Login(state) => login::render_login(frame, state),
            Screen::Groups(state) => picker::render_picker(frame, area, state),
            Screen::Types(state) => picker::render_picker(frame, area, state),
            Screen::Exercises(state) => picker::render_picker(frame, area, state),
            Screen::Download(state) => progress::render_progress(frame, area, state),
        }

        // Busy overlay (request in flight)
        if let Some(ref msg) = self.busy {
            let overlay_area = centered_rect(
                40u16.min(area.width.saturating_sub(4)),
                3u16.min(area.height),
                area,
            );
            let s = SPINNER[self.spinner_frame % SPINNER.len()];
            frame.render_widget(Clear, overlay_area);
            frame.render_widget(
                Paragraph::new(format!(" {s} {msg}"))
                    .block(
                        Block::default()
                            .borders(Borders::ALL)
                            .border_style(Style::default().fg(Color::Cyan)),
                    )
                    .style(Style::default().fg(Color::Yellow)),
                overlay_area,
            );
        }

        // Error overlay
        if let Some(ref msg) = self.error_overlay {
            let overlay_area = centered_rect(
                60u16.min(area.width.saturating_sub(4)),
                9u16.min(area.height.saturating_sub(4)),
                area,
            );
            frame.render_widget(Clear, overlay_area);
            let error_block = Paragraph::new(format!("\n{msg}\n\nPress Esc to dismiss"))
                .block(
                    Block::default()
                        .title(" Error ")
                        .borders(Borders::ALL)
                        .border_style(Style::default().fg(Color::Red)),
                )
                .style(Style::default().fg(Color::Red))
                .wrap(Wrap { trim: true });
            frame.render_widget(error_block, overlay_area);
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        // Global quit: Ctrl+C always exits
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        if self.error_overlay.is_some() {
            if matches!(key.code, KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q')) {
                self.error_overlay = None;
            }
            return;
        }

        // Ignore input while a request is running
        if self.busy.is_some() {
            return;
        }

        match &mut self.screen {
            Screen::Login(state) => match state.handle_key(key) {
                LoginAction::Submit => self.start_login(),
                LoginAction::Quit => self.should_quit = true,
                LoginAction::None => {}
            },
            Screen::Groups(state) => match state.handle_key(key) {
                PickerAction::Confirm(mut chosen) => {
                    if let Some(group) = chosen.pop() {
                        self.start_fetch_exercises(group);
                    }
                }
                PickerAction::Back => self.show_login(),
                PickerAction::Quit => self.should_quit = true,
                PickerAction::None => {}
            },
            Screen::Types(state) => match state.handle_key(key) {
                PickerAction::Confirm(types) => {
                    self.show_exercises(types.into_iter().flatten().collect());
                }
                PickerAction::Back => self.show_groups(),
                PickerAction::Quit => self.should_quit = true,
                PickerAction::None => {}
            },
            Screen::Exercises(state) => match state.handle_key(key) {
                PickerAction::Confirm(exercises) => self.start_download(exercises),
                PickerAction::Back => self.show_types(),
                PickerAction::Quit => self.should_quit = true,
                PickerAction::None => {}
            },
            Screen::Download(state) => {
                if state.handle_key(key) == DownloadAction::Quit {
                    self.last_output_dir = Some(state.output_dir.clone());
                    self.should_quit = true;
                }
            }
        }
    }

    fn handle_tick(&mut self) {
        self.spinner_frame = self.spinner_frame.wrapping_add(1);
        if let Screen::Download(ref mut state) = self.screen {
            state.spinner_frame = state.spinner_frame.wrapping_add(1);
        }
    }

    fn handle_api_result(&mut self, result: ApiResult) {
        match result {
            ApiResult::LoggedIn(Ok((client, groups))) => {
                self.busy = None;
                self.api_client = client;

                if groups.is_empty() {
                    self.exit_message = Some("No group found.".to_string());
                    self.should_quit = true;
                    return;
                }

                self.remember_login();
                self.groups = groups;
                self.show_groups();
            }
            ApiResult::LoggedIn(Err(e)) => {
                self.busy = None;
                error!("login failed: {e:#}");
                self.error_overlay = Some(format!("Login failed: {e:#}"));
                if !matches!(self.screen, Screen::Login(_)) {
                    self.show_login();
                }
            }
            ApiResult::Exercises(Ok(list)) => {
                self.busy = None;
                self.exercise_types = exercises::group_by_type(list);
                if self.exercise_types.is_empty() {
                    self.error_overlay = Some("No TQC+ exercises in this group.".to_string());
                    return;
                }
                self.show_types();
            }
            ApiResult::Exercises(Err(e)) => {
                self.busy = None;
                error!("exercise list failed: {e:#}");
                self.error_overlay = Some(format!("Failed to load exercises: {e:#}"));
            }
            ApiResult::Download(event) => {
                if let Screen::Download(ref mut state) = self.screen {
                    match event {
                        DownloadEvent::Started(name) => state.start(&name),
                        DownloadEvent::Saved { exercise, report } => {
                            state.saved(&exercise, report.written.len(), &report.skipped)
                        }
                        DownloadEvent::Failed { exercise, error } => state.failed(&exercise, error),
                        DownloadEvent::Finished => state.finish(),
                    }
                }
            }
        }
    }

    fn remember_login(&mut self) {
        let Some(credentials) = self.credentials.as_ref() else {
            return;
        };
        self.config.account = Some(credentials.account.clone());
        self.config.output_dir = credentials.output_dir.clone();
        if let Err(e) = self.config.save() {
            warn!("could not save config: {e:#}");
        }
    }

    fn show_login(&mut self) {
        let (account, output_dir) = match &self.credentials {
            Some(c) => (Some(c.account.as_str()), c.output_dir.as_str()),
            None => (self.config.account.as_deref(), self.config.output_dir.as_str()),
        };
        self.screen = Screen::Login(LoginState::new(account, None, output_dir));
    }

    fn show_groups(&mut self) {
        let items = self
            .groups
            .iter()
            .map(|g| (g.name.clone(), g.clone()))
            .collect();
        self.screen = Screen::Groups(PickerState::single("Choose a group", items));
    }

    fn show_types(&mut self) {
        let items = self
            .exercise_types
            .iter()
            .map(|t| (t.name.clone(), t.exercises.clone()))
            .collect();
        self.screen = Screen::Types(PickerState::multi("Choose types", items));
    }

    fn show_exercises(&mut self, list: Vec<Exercise>) {
        let items = list.into_iter().map(|e| (e.name.clone(), e)).collect();
        self.screen = Screen::Exercises(PickerState::multi("Choose exercises", items));
    }

    fn start_login(&mut self) {
        let Screen::Login(ref state) = self.screen else {
            return;
        };
        let Some(credentials) = state.credentials() else {
            return;
        };

        self.busy = Some("Logging in...".to_string());
        let mut client = self.api_client.clone();
        let tx = self.api_tx.clone();
        let account = credentials.account.clone();
        let password = credentials.password.clone();
        self.credentials = Some(credentials);

        tokio::spawn(async move {
            let result = async move {
                client.login(&account, &password).await?;
                let groups = client.groups().await?;
                info!(account = %account, groups = groups.len(), "logged in");
                Ok::<_, anyhow::Error>((client, groups))
            }
            .await;
            let _ = tx.send(ApiResult::LoggedIn(result));
        });
    }

    fn start_fetch_exercises(&mut self, group: Group) {
        self.busy = Some("Loading exercises...".to_string());
        let client = self.api_client.clone();
        let tx = self.api_tx.clone();
        let group_id = group.id;
        info!(group = %group.name, "group chosen");
        self.group = Some(group);

        tokio::spawn(async move {
            let result = client.exercises(group_id).await;
            let _ = tx.send(ApiResult::Exercises(result));
        });
    }

    fn start_download(&mut self, exercises: Vec<Exercise>) {
        let Some(group_id) = self.group.as_ref().map(|g| g.id) else {
            return;
        };
        let output_dir = self
            .credentials
            .as_ref()
            .map(|c| expand_home(&c.output_dir))
            .unwrap_or_else(|| self.config.expanded_output_dir());

        self.screen = Screen::Download(DownloadState::new(output_dir.clone(), exercises.len()));

        let client = self.api_client.clone();
        let tx = self.api_tx.clone();

        tokio::spawn(async move {
            for exercise in exercises {
                let send = |event| tx.send(ApiResult::Download(event)).is_ok();
                if !send(DownloadEvent::Started(exercise.name.clone())) {
                    return;
                }

                let outcome = match client.problem_set(group_id, exercise.problem_set_id).await {
                    Ok(problem_set) => {
                        let root = output_dir.clone();
                        tokio::task::spawn_blocking(move || {
                            materialize::materialize(&problem_set, &root)
                                .map_err(anyhow::Error::new)
                        })
                        .await
                        .map_err(anyhow::Error::new)
                        .and_then(|r| r)
                    }
                    Err(e) => Err(e),
                };

                let event = match outcome {
                    Ok(report) => DownloadEvent::Saved {
                        exercise: exercise.name,
                        report,
                    },
                    Err(e) => {
                        error!(exercise = %exercise.name, "download failed: {e:#}");
                        DownloadEvent::Failed {
                            exercise: exercise.name,
                            error: format!("{e:#}"),
                        }
                    }
                };
                if !send(event) {
                    return;
                }
            }
            let _ = tx.send(ApiResult::Download(DownloadEvent::Finished));
        });
    }
}
