//! Input-event sources.
//!
//! The engine consumes raw UI events from a channel rather than from any
//! real browser API. `ScriptedSource` is the in-process implementation used
//! by the demo binary and by headless tests; a real front end would push
//! into the same channel from its own event listeners.

use crate::adapter::types::RawUiEvent;
use crossbeam_channel::{bounded, Receiver, Sender};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;

/// Errors from source lifecycle management.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("source is already running")]
    AlreadyRunning,
}

/// A subscribable stream of raw UI events.
///
/// Sources are started when a tracked session opens and stopped when it
/// ends, so no listener outlives the session that registered it.
pub trait InputEventSource {
    fn start(&mut self) -> Result<(), SourceError>;
    fn stop(&mut self);
    fn is_running(&self) -> bool;
    fn receiver(&self) -> &Receiver<RawUiEvent>;
}

/// Channel-backed source fed programmatically.
pub struct ScriptedSource {
    sender: Sender<RawUiEvent>,
    receiver: Receiver<RawUiEvent>,
    running: Arc<AtomicBool>,
}

impl ScriptedSource {
    pub fn new() -> Self {
        let (sender, receiver) = bounded(10_000);
        Self {
            sender,
            receiver,
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Push an event into the stream. Dropped silently when the source is
    /// stopped or the channel is full; event delivery is best-effort.
    pub fn push(&self, event: RawUiEvent) {
        if self.running.load(Ordering::SeqCst) {
            let _ = self.sender.try_send(event);
        }
    }

    /// A cloneable sender for feeding the stream from another thread.
    pub fn sender(&self) -> Sender<RawUiEvent> {
        self.sender.clone()
    }
}

impl Default for ScriptedSource {
    fn default() -> Self {
        Self::new()
    }
}

impl InputEventSource for ScriptedSource {
    fn start(&mut self) -> Result<(), SourceError> {
        if self.running.load(Ordering::SeqCst) {
            return Err(SourceError::AlreadyRunning);
        }
        self.running.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        // Drain anything still queued so a restarted source begins clean.
        while self.receiver.try_recv().is_ok() {}
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    fn receiver(&self) -> &Receiver<RawUiEvent> {
        &self.receiver
    }
}
