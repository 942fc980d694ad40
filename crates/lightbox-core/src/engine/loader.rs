//! Running decode requests off the calling thread.

use std::sync::mpsc;
use std::sync::Arc;

use log::debug;

use super::{DecodeOutcome, DecodeRequest};
use crate::storage::Storage;

/// Runs each [`DecodeRequest`] on its own worker thread.
///
/// Outcomes come back in completion order, which need not match submission
/// order; the engine's generation check sorts out which one still matters.
pub struct BackgroundDecoder {
    storage: Arc<dyn Storage>,
    tx: mpsc::Sender<DecodeOutcome>,
    rx: mpsc::Receiver<DecodeOutcome>,
    in_flight: usize,
}

impl BackgroundDecoder {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            storage,
            tx,
            rx,
            in_flight: 0,
        }
    }

    /// Start decoding in the background.
    pub fn submit(&mut self, request: DecodeRequest) {
        debug!(
            "decoding {} in background (generation {})",
            request.path(),
            request.generation()
        );
        let storage = Arc::clone(&self.storage);
        let tx = self.tx.clone();
        self.in_flight += 1;

        std::thread::spawn(move || {
            let outcome = request.run(storage.as_ref());
            // The receiver only goes away with the decoder itself
            let _ = tx.send(outcome);
        });
    }

    /// Take a finished outcome without blocking.
    pub fn poll(&mut self) -> Option<DecodeOutcome> {
        let outcome = self.rx.try_recv().ok()?;
        self.in_flight -= 1;
        Some(outcome)
    }

    /// Block until the next outcome arrives.
    ///
    /// Returns `None` immediately when nothing is in flight.
    pub fn wait(&mut self) -> Option<DecodeOutcome> {
        if self.in_flight == 0 {
            return None;
        }
        let outcome = self.rx.recv().ok()?;
        self.in_flight -= 1;
        Some(outcome)
    }

    /// Number of submitted requests whose outcome has not been taken yet.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }
}
