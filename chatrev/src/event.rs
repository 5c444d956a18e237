//! Event bus.
//!
//! Terminal input, timer ticks, and git worker results are normalised into a
//! single `AppEvent` enum and sent over a tokio unbounded MPSC channel. The
//! main loop receives from this channel and dispatches accordingly.
//!
//! Two independent intervals drive the render and logic cycles:
//! - **Render interval** (33 ms ≈ 30 FPS) triggers a `terminal.draw()` call.
//! - **Tick interval** (250 ms = 4 Hz) drives status-message expiry.

use crossterm::event::{Event, EventStream, KeyEvent, KeyEventKind, MouseEvent};
use futures::{FutureExt, StreamExt};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::interval;

use crate::git::types::LoadResult;

/// All events the application can receive from any source.
#[derive(Debug)]
pub enum AppEvent {
    /// A key press (`KeyEventKind::Press` only; release and repeat are filtered).
    Key(KeyEvent),
    /// Scroll wheel and clicks.
    Mouse(MouseEvent),
    /// Terminal was resized to (columns, rows).
    Resize(u16, u16),
    /// Logic tick (4 Hz / 250 ms).
    Tick,
    /// Render tick (≈30 FPS / 33 ms).
    Render,
    /// Fresh snapshots of every repository from the git worker.
    SessionsLoaded(Box<LoadResult>),
}

/// Sender and receiver ends of the unified event channel.
pub struct EventHandler {
    /// Cloned into every background task that produces events.
    pub tx: mpsc::UnboundedSender<AppEvent>,
    /// Owned by the main loop.
    pub rx: mpsc::UnboundedReceiver<AppEvent>,
}

impl EventHandler {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self { tx, rx }
    }
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new()
    }
}

/// Spawns the task that feeds terminal input and timer ticks into `tx`.
///
/// `reader.next().fuse()` keeps `select!` from polling a finished stream, and
/// the `Press` filter stops Windows from delivering every key twice. The task
/// exits once the receiver is gone.
pub fn spawn_event_task(tx: mpsc::UnboundedSender<AppEvent>) {
    tokio::spawn(async move {
        let mut tick_interval = interval(Duration::from_millis(250));
        let mut render_interval = interval(Duration::from_millis(33));
        let mut reader = EventStream::new();

        loop {
            let tick_tick = tick_interval.tick();
            let render_tick = render_interval.tick();
            let crossterm_event = reader.next().fuse();

            let sent = tokio::select! {
                _ = tick_tick => tx.send(AppEvent::Tick),
                _ = render_tick => tx.send(AppEvent::Render),
                maybe_event = crossterm_event => match maybe_event {
                    Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                        tx.send(AppEvent::Key(key))
                    }
                    Some(Ok(Event::Resize(w, h))) => tx.send(AppEvent::Resize(w, h)),
                    Some(Ok(Event::Mouse(mouse))) => tx.send(AppEvent::Mouse(mouse)),
                    _ => Ok(()),
                },
            };
            if sent.is_err() {
                break;
            }
        }
    });
}
