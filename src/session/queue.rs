//! Event queue between the input threads and the dispatcher.
//!
//! The hotkey listener and the console thread send events; the dispatcher on
//! the main thread receives and handles them one at a time.

use std::sync::mpsc::{channel, Receiver, Sender};

use super::busy::BusyGuard;
use crate::hotkeys::Action;

/// Something the dispatcher must react to.
#[derive(Debug)]
pub enum Event {
    /// An admitted hotkey press. The guard keeps other presses out until the
    /// handler has finished and the event is dropped.
    Hotkey(Action, BusyGuard),
    /// The console stopped reading commands (EOF or `exit`).
    ConsoleClosed,
}

/// Creates an unbounded event channel.
pub fn create_event_queue() -> (Sender<Event>, Receiver<Event>) {
    channel()
}
