//! chatrev: review an agent's working-tree edits hunk by hunk.
//!
//! Each repository given on the command line becomes one review session whose
//! entries are the files that differ from the git index. Accepting stages
//! the proposed text; discarding restores the index version on disk.
//!
//! # Startup sequence
//!
//! 1. Config, then logging; both before the terminal so failures can still
//!    reach stderr.
//! 2. `install_panic_hook()` so a panic restores the terminal first.
//! 3. `register_sigterm()`, polled by the 50 ms heartbeat.
//! 4. `init_tui()`, the event task, then the git worker thread and the
//!    first load request.
//!
//! Every exit from the event loop goes through `restore_tui()`; draw errors
//! break out of the loop instead of returning past it.

mod app;
mod config;
mod event;
mod git;
mod logging;
mod theme;
mod tui;
mod ui;
mod workbench;

use std::path::PathBuf;
use std::sync::atomic::Ordering;
use std::time::Duration;

use anyhow::Context as _;
use clap::Parser;
use tracing::{error, info, warn};

use crate::app::App;
use crate::event::AppEvent;
use crate::ui::keybindings::{self, KeyAction};

#[derive(Debug, Parser)]
#[command(name = "chatrev", version, about = "Review agent-proposed edits in git working trees")]
struct Args {
    /// Repositories to review; each becomes one session.
    #[arg(default_value = ".")]
    repos: Vec<PathBuf>,

    /// Colour theme (`dark` or `catppuccin-mocha`); overrides the config file.
    #[arg(long)]
    theme: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let (config, config_error) = config::load();
    let _log_guard = match logging::init(&config.log_level) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("chatrev: logging disabled: {e:#}");
            None
        }
    };
    if let Some(message) = config_error {
        warn!("{message}");
    }
    info!(repos = ?args.repos, "starting");

    let theme = theme::Theme::from_name(args.theme.as_deref().unwrap_or(&config.theme));
    ui::highlight::warm_up();

    tui::install_panic_hook();
    let term_flag = tui::register_sigterm().context("registering SIGTERM handler")?;
    let mut terminal = tui::init_tui().context("initialising terminal")?;

    let handler = event::EventHandler::new();
    event::spawn_event_task(handler.tx.clone());
    let mut rx = handler.rx;

    let (git_tx, git_rx) = crossbeam_channel::unbounded();
    let event_tx = handler.tx.clone();
    let worker = std::thread::Builder::new()
        .name("git-worker".to_owned())
        .spawn(move || git::worker::git_worker_loop(git_rx, event_tx));
    if let Err(e) = worker {
        tui::restore_tui()?;
        return Err(e).context("spawning git worker");
    }

    let mut app = App::new(args.repos, git_tx, config.review_mode_default);
    app.request_reload();

    let mut outcome = Ok(());
    'event_loop: loop {
        tokio::select! {
            // Heartbeat: a quiet terminal would otherwise block in recv() and
            // never look at the SIGTERM flag.
            _ = tokio::time::sleep(Duration::from_millis(50)) => {}
            maybe_event = rx.recv() => {
                let Some(event) = maybe_event else { break 'event_loop };
                match event {
                    AppEvent::Render => {
                        if let Err(e) = terminal.draw(|frame| ui::render(frame, &mut app, &theme)) {
                            outcome = Err(e).context("drawing frame");
                            break 'event_loop;
                        }
                    }
                    AppEvent::Key(key) => match keybindings::handle_key(key, &mut app.state) {
                        KeyAction::Quit => break 'event_loop,
                        action => app.perform(action).await,
                    },
                    AppEvent::Mouse(mouse) => {
                        keybindings::handle_mouse(mouse, &mut app.state);
                    }
                    AppEvent::Tick => app.state.tick(),
                    AppEvent::SessionsLoaded(result) => app.apply_load(*result),
                    // ratatui picks up the new size from frame.area() on the next draw.
                    AppEvent::Resize(_, _) => {}
                }
            }
        }
        if term_flag.load(Ordering::Relaxed) {
            info!("SIGTERM received");
            break 'event_loop;
        }
    }

    // Dropping the app closes the git channel, which ends the worker loop.
    drop(app);
    tui::restore_tui()?;
    if let Err(e) = &outcome {
        error!("{e:#}");
    }
    outcome
}
