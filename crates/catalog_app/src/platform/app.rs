use std::io::{self, BufRead, Write};
use std::path::Path;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Context;
use catalog_core::{update, BrowserState, Msg};
use catalog_engine::ReqwestCatalogClient;
use catalog_logging::{catalog_info, catalog_warn};

use super::config::AppConfig;
use super::effects::EffectRunner;
use super::input::{self, Command};
use super::logging;
use super::render;

/// Poll interval for engine events and the filter quiescence gate.
const TICK: Duration = Duration::from_millis(50);

pub fn run_app(config_path: Option<&str>) -> anyhow::Result<()> {
    let config = AppConfig::load(config_path.map(Path::new))?;
    logging::initialize(config.log_destination);
    catalog_info!("catalog_app starting against {}", config.collection_url);

    let client = ReqwestCatalogClient::new(config.client_settings())
        .context("building catalog client")?;
    let runner = EffectRunner::new(Arc::new(client)).context("starting engine")?;

    let (cmd_tx, cmd_rx) = mpsc::channel::<Command>();
    thread::spawn(move || read_commands(cmd_tx));

    let mut browser = Browser {
        state: BrowserState::with_settings(config.browser_settings()),
        runner,
    };
    println!("{}", input::HELP);
    browser.dispatch(Msg::Mounted);

    loop {
        match cmd_rx.recv_timeout(TICK) {
            Ok(Command::Quit) | Err(mpsc::RecvTimeoutError::Disconnected) => break,
            Ok(command) => browser.handle_command(command),
            Err(mpsc::RecvTimeoutError::Timeout) => {}
        }
        browser.dispatch(Msg::Tick {
            now: Instant::now(),
        });
        for msg in browser.runner.drain_messages() {
            browser.dispatch(msg);
        }
    }

    browser.dispatch(Msg::Unmounted);
    browser.runner.shutdown();
    catalog_info!("catalog_app stopped");
    Ok(())
}

fn read_commands(cmd_tx: mpsc::Sender<Command>) {
    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let Ok(line) = line else {
            break;
        };
        match input::parse(&line) {
            Ok(Some(command)) => {
                let quit = command == Command::Quit;
                if cmd_tx.send(command).is_err() || quit {
                    break;
                }
            }
            Ok(None) => {}
            Err(message) => eprintln!("{message}"),
        }
    }
}

struct Browser {
    state: BrowserState,
    runner: EffectRunner,
}

impl Browser {
    fn dispatch(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let (state, effects) = update(state, msg);
        self.state = state;
        self.runner.enqueue(effects);
        if self.state.consume_dirty() {
            print_lines(&render::render(&self.state.view()));
        }
    }

    fn handle_command(&mut self, command: Command) {
        match command {
            Command::Filter(value) => self.dispatch(Msg::FilterInput {
                value,
                at: Instant::now(),
            }),
            Command::Refresh => self.dispatch(Msg::RefreshClicked),
            Command::More => {
                if !self.state.can_load_more() {
                    println!("Nothing more to load.");
                }
                self.dispatch(Msg::LoadMoreClicked);
            }
            Command::Toggle(row) => match input::resolve_row(self.state.items(), &row) {
                Ok(uid) => self.dispatch(Msg::SelectionToggled { uid }),
                Err(message) => {
                    catalog_warn!("toggle {:?} rejected: {}", row, message);
                    eprintln!("{message}");
                }
            },
            Command::SelectAll => self.dispatch(Msg::SelectAllVisible),
            Command::ClearSelection => {
                self.dispatch(Msg::SelectionReplaced(Default::default()))
            }
            Command::ShowSelected => {
                let selected = self.state.selected_items();
                let lines: Vec<String> = std::iter::once(format!("Selected: {}", selected.len()))
                    .chain(selected.iter().map(|item| {
                        format!(
                            "  {} | {}",
                            item.uid,
                            item.primary_class_key().unwrap_or("-")
                        )
                    }))
                    .collect();
                print_lines(&lines);
            }
            Command::ShowClasses => {
                let index = self.state.index();
                let mut lines: Vec<String> =
                    index.values().iter().map(|value| format!("  {value}")).collect();
                if index.is_building() {
                    lines.push("  (still scanning...)".to_string());
                }
                print_lines(&lines);
            }
            Command::Help => println!("{}", input::HELP),
            Command::Quit => {}
        }
    }
}

fn print_lines(lines: &[String]) {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    for line in lines {
        let _ = writeln!(out, "{line}");
    }
    let _ = out.flush();
}
