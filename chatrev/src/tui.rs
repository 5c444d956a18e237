//! Terminal lifecycle management for chatrev.
//!
//! **Why stderr, not stdout?**
//! The TUI renders entirely to stderr so stdout never carries escape
//! sequences. Shell pipelines (`chatrev | …`) and redirections stay clean, and
//! a wrapper script can capture stdout while the reviewer still sees the
//! interface on the terminal. Log output never goes to either stream; see
//! `logging`.

use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use signal_hook::consts::SIGTERM;
use signal_hook::flag::register;
use std::io::{stderr, BufWriter, Stderr};
use std::panic;
use std::sync::{atomic::AtomicBool, Arc};

/// CrosstermBackend over a buffered stderr writer.
///
/// `BufWriter<Stderr>` batches escape sequences into fewer write(2) syscalls,
/// which keeps the 30 FPS render interval from flickering.
pub type Tui = Terminal<CrosstermBackend<BufWriter<Stderr>>>;

/// Enables raw mode and enters the alternate screen.
///
/// Call [`restore_tui`] at every exit path.
///
/// # Errors
///
/// Returns `Err` if `enable_raw_mode`, `execute!`, or `Terminal::new` fails.
pub fn init_tui() -> std::io::Result<Tui> {
    let mut out = BufWriter::new(stderr());
    enable_raw_mode()?;
    execute!(out, EnterAlternateScreen, EnableMouseCapture)?;
    Terminal::new(CrosstermBackend::new(out))
}

/// Restores the terminal to its pre-TUI state. Idempotent.
///
/// ratatui 0.30 does not restore the terminal on `Drop`, so this runs on
/// every exit path including the panic hook.
pub fn restore_tui() -> std::io::Result<()> {
    disable_raw_mode()?;
    execute!(stderr(), LeaveAlternateScreen, DisableMouseCapture)?;
    Ok(())
}

/// Installs a panic hook that restores the terminal before the panic message prints.
///
/// Must be called before [`init_tui`]. Chains onto the previously installed hook.
pub fn install_panic_hook() {
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = restore_tui();
        original_hook(panic_info);
    }));
}

/// Registers a SIGTERM handler that flips the returned flag to `true`.
///
/// The main loop polls the flag on its heartbeat.
///
/// # Errors
///
/// Returns `Err` if the OS refuses to register the handler.
pub fn register_sigterm() -> std::io::Result<Arc<AtomicBool>> {
    let term = Arc::new(AtomicBool::new(false));
    // The handler only performs an atomic store, which is async-signal-safe.
    register(SIGTERM, Arc::clone(&term))?;
    Ok(term)
}
