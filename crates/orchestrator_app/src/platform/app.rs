use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use orchestrator_core::{update, AppState, AppViewModel, Msg};
use orchestrator_logging::{orch_info, orch_warn};

use super::config::AppConfig;
use super::effects::EffectRunner;
use super::logging;
use super::ui::commands::{parse_command, Command, HELP};
use super::ui::render::{domain_list, Renderer};

const TICK_INTERVAL: Duration = Duration::from_millis(75);

enum Input {
    Line(String),
    Closed,
}

pub fn run_app() -> anyhow::Result<()> {
    let config_path = std::env::args_os().nth(1).map(PathBuf::from);
    let config = AppConfig::load(config_path.as_deref())?;
    logging::initialize(config.log_destination);
    orch_info!(
        "Starting orchestrator client: orchestrator={} agent={}",
        config.orchestrator_url,
        config.agent_url
    );

    let (msg_tx, msg_rx) = mpsc::channel::<Msg>();
    let (input_tx, input_rx) = mpsc::channel::<Input>();

    let runner = EffectRunner::new(config.engine_config(), msg_tx.clone())?;
    let mut app = App::new(runner, Renderer::new(config.color));

    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if input_tx.send(Input::Line(line)).is_err() {
                return;
            }
        }
        let _ = input_tx.send(Input::Closed);
    });

    // Background tick so typed lines are picked up between engine replies.
    thread::spawn(move || {
        while msg_tx.send(Msg::Tick).is_ok() {
            thread::sleep(TICK_INTERVAL);
        }
    });

    app.print(&["Type :help for commands.".to_string()])?;
    app.dispatch_msg(Msg::SessionStarted);
    app.render()?;

    while let Ok(msg) = msg_rx.recv() {
        app.dispatch_msg(msg);
        while let Ok(msg) = msg_rx.try_recv() {
            app.dispatch_msg(msg);
        }
        while let Ok(input) = input_rx.try_recv() {
            let keep_going = match input {
                Input::Line(line) => app.handle_line(&line)?,
                Input::Closed => false,
            };
            if !keep_going {
                app.render()?;
                orch_info!("Session ended");
                return Ok(());
            }
        }
        app.render()?;
    }
    Ok(())
}

struct App {
    state: AppState,
    renderer: Renderer,
    runner: EffectRunner,
    rendered_once: bool,
}

impl App {
    fn new(runner: EffectRunner, renderer: Renderer) -> Self {
        Self {
            state: AppState::new(),
            renderer,
            runner,
            rendered_once: false,
        }
    }

    fn dispatch_msg(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let (state, effects) = update(state, msg);
        self.state = state;
        self.runner.enqueue(effects);
    }

    fn render(&mut self) -> io::Result<()> {
        let notices = self.state.take_notices();
        let dirty = self.state.consume_dirty();
        if self.rendered_once && !dirty && notices.is_empty() {
            return Ok(());
        }
        self.rendered_once = true;
        let lines = self.renderer.render(&self.state.view(), &notices);
        self.print(&lines)
    }

    fn print(&self, lines: &[String]) -> io::Result<()> {
        let mut out = io::stdout().lock();
        for line in lines {
            writeln!(out, "{line}")?;
        }
        out.flush()
    }

    /// Returns `false` when the user asked to quit.
    fn handle_line(&mut self, line: &str) -> io::Result<bool> {
        let command = match parse_command(line) {
            Ok(command) => command,
            Err(usage) => {
                self.print(&[usage])?;
                return Ok(true);
            }
        };
        let view = self.state.view();
        match command {
            Command::Ask(text) => {
                self.dispatch_msg(Msg::InputChanged(text));
                self.dispatch_msg(Msg::TaskSubmitted);
            }
            Command::Send => self.dispatch_msg(Msg::TaskSubmitted),
            Command::ListDomains => self.print(&domain_list(&view))?,
            Command::Domain(key) => {
                if view.domains.iter().any(|domain| domain.key == key) {
                    self.dispatch_msg(Msg::DomainSelected(key));
                } else {
                    self.print(&[format!("Unknown domain {key:?}; see :domains")])?;
                }
            }
            Command::Recommend(index) => match view.recommended.get(index - 1) {
                Some(item) => {
                    let question = item.question.clone();
                    self.print(&[format!("Input: {question} (:send to ask)")])?;
                    self.dispatch_msg(Msg::RecommendedPressed(question));
                }
                None => self.print(&[format!("No recommended question {index}")])?,
            },
            Command::Upload(path) => self.choose_file(&path)?,
            Command::Download => match view.latest_form {
                Some(form) => self.dispatch_msg(Msg::DownloadFormRequested(form.download_url)),
                None => self.print(&["No form has been offered yet".to_string()])?,
            },
            Command::Edit { key, value } => {
                if confirmation_has_field(&view, &key) {
                    self.dispatch_msg(Msg::ConfirmationFieldEdited { key, value });
                } else {
                    self.print(&[format!("No editable field {key:?} in an open confirmation")])?;
                }
            }
            Command::Submit => self.dispatch_msg(Msg::ConfirmationSubmitted),
            Command::Cancel => self.dispatch_msg(Msg::ConfirmationCancelled),
            Command::Dismiss => self.dispatch_msg(Msg::ErrorDialogDismissed),
            Command::Help => {
                let help: Vec<String> = HELP.iter().map(|line| line.to_string()).collect();
                self.print(&help)?;
            }
            Command::Quit => return Ok(false),
        }
        Ok(true)
    }

    fn choose_file(&mut self, path: &Path) -> io::Result<()> {
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned());
        match file_name {
            Some(file_name) if path.is_file() => {
                self.dispatch_msg(Msg::FileChosen {
                    file_name,
                    path: path.to_path_buf(),
                });
                Ok(())
            }
            _ => {
                orch_warn!("Upload path is not a file: {}", path.display());
                self.print(&[format!("Not a file: {}", path.display())])
            }
        }
    }
}

fn confirmation_has_field(view: &AppViewModel, key: &str) -> bool {
    view.show_confirmation && view.confirmation_rows.iter().any(|row| row.key == key)
}
