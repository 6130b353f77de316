//! Background model loading.
//!
//! Parsing runs on a tokio blocking thread under a timeout. Finished loads are
//! queued on a channel and drained once per frame by the viewer, so results
//! land on the UI timeline. Every request carries the [`LoadGeneration`] it was
//! issued under; the viewer drops anything older than its current one.

use std::time::Duration;

use tokio::runtime::Runtime;
use tokio::sync::mpsc;

use crate::document::SceneDocument;
use crate::error::LoadError;
use crate::format::{self, Detection, ProbeOrder};
use crate::resource::{ByteSource, SourceHandle};

/// Monotonic tag of a load attempt
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LoadGeneration(pub u64);

impl LoadGeneration {
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl std::fmt::Display for LoadGeneration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Clone, Debug)]
pub struct LoadRequest {
    pub generation: LoadGeneration,
    pub source: ByteSource,
    pub probe_order: ProbeOrder,
}

/// A finished load, successful or not
#[derive(Debug)]
pub struct LoadOutcome {
    pub generation: LoadGeneration,
    pub handle: SourceHandle,
    pub name: Option<String>,
    pub size: usize,
    pub result: Result<(Detection, SceneDocument), LoadError>,
}

impl LoadOutcome {
    fn new(request: &LoadRequest, result: Result<(Detection, SceneDocument), LoadError>) -> Self {
        Self {
            generation: request.generation,
            handle: request.source.handle(),
            name: request.source.name().map(str::to_string),
            size: request.source.len(),
            result,
        }
    }
}

/// Detect and parse on the calling thread
pub fn load_blocking(request: &LoadRequest) -> LoadOutcome {
    let result = format::parse_detected(request.source.bytes(), request.source.name(), request.probe_order);
    LoadOutcome::new(request, result)
}

pub struct LoadQueue {
    runtime: Option<Runtime>,
    tx: mpsc::UnboundedSender<LoadOutcome>,
    rx: mpsc::UnboundedReceiver<LoadOutcome>,
    timeout: Duration,
    in_flight: usize,
}

impl LoadQueue {
    pub fn new(timeout: Duration) -> std::io::Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("mesh-loader")
            .enable_time()
            .build()?;
        let (tx, rx) = mpsc::unbounded_channel();
        Ok(Self {
            runtime: Some(runtime),
            tx,
            rx,
            timeout,
            in_flight: 0,
        })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    /// Loads submitted but not yet returned by [`poll`](Self::poll)
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn submit(&mut self, request: LoadRequest) {
        let Some(runtime) = &self.runtime else {
            return;
        };
        let tx = self.tx.clone();
        let timeout = self.timeout;
        self.in_flight += 1;
        tracing::debug!("Submitting load {}", request.generation);

        runtime.spawn(async move {
            let job = request.clone();
            let parse = tokio::task::spawn_blocking(move || load_blocking(&job));
            let outcome = match tokio::time::timeout(timeout, parse).await {
                Ok(Ok(outcome)) => outcome,
                Ok(Err(join_err)) => {
                    LoadOutcome::new(&request, Err(LoadError::malformed(format!("parser failed: {join_err}"))))
                }
                Err(_) => LoadOutcome::new(&request, Err(LoadError::TimedOut { after: timeout })),
            };
            // Receiver gone means the queue was dropped; nothing to deliver to
            let _ = tx.send(outcome);
        });
    }

    /// Drain finished loads without blocking
    pub fn poll(&mut self) -> Vec<LoadOutcome> {
        let mut out = Vec::new();
        while let Ok(outcome) = self.rx.try_recv() {
            out.push(outcome);
        }
        self.in_flight = self.in_flight.saturating_sub(out.len());
        out
    }

    /// Block until the next load finishes or `wait` elapses
    pub fn wait_next(&mut self, wait: Duration) -> Option<LoadOutcome> {
        let runtime = self.runtime.as_ref()?;
        let rx = &mut self.rx;
        let outcome = runtime.block_on(async { tokio::time::timeout(wait, rx.recv()).await.ok().flatten() });
        if outcome.is_some() {
            self.in_flight = self.in_flight.saturating_sub(1);
        }
        outcome
    }
}

impl Drop for LoadQueue {
    fn drop(&mut self) {
        // Parsers stuck past their timeout must not block shutdown
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
    }
}
