//! Debounced, superseding record fetches.
//!
//! Every filter change is sent to a background task with [`FetchCoordinator::request`].
//! The task waits for a quiet window after the latest request, fetches from the
//! [`ImageSource`], applies [`filter_images`], and publishes the outcome on a
//! `watch` channel. A request arriving while a fetch is in flight cancels that
//! fetch; its result is never published.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, field, info, instrument, warn, Span};

use sowonee_core::logging::GENERATION;
use sowonee_core::{filter_images, FilterSpec, ImageRecord};

use crate::source::ImageSource;

/// Latest published fetch outcome.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchState {
    /// Number of results published so far; 0 before the first one.
    pub generation: u64,
    /// Spec the images were filtered with.
    pub spec: FilterSpec,
    /// Visible records matching `spec`, in display order.
    pub images: Vec<ImageRecord>,
    /// Set when the last fetch failed; `images` is then empty.
    pub error: Option<String>,
    /// A fetch is running or waiting out the debounce window.
    pub loading: bool,
}

/// Handle to the background fetch task.
pub struct FetchCoordinator {
    requests: mpsc::UnboundedSender<FilterSpec>,
    state: watch::Receiver<FetchState>,
    task: JoinHandle<()>,
}

impl FetchCoordinator {
    /// Spawn the fetch task on the current tokio runtime.
    pub fn spawn(source: Arc<dyn ImageSource>, debounce: Duration) -> Self {
        let (requests, request_rx) = mpsc::unbounded_channel();
        let (state_tx, state) = watch::channel(FetchState::default());

        let task = tokio::spawn(run(source, debounce, request_rx, state_tx));
        info!(
            subsystem = "gallery",
            component = "fetch",
            debounce_ms = debounce.as_millis() as u64,
            "Fetch coordinator started"
        );

        Self {
            requests,
            state,
            task,
        }
    }

    /// Queue a fetch for `spec`. Supersedes any pending or running fetch.
    pub fn request(&self, spec: FilterSpec) {
        if self.requests.send(spec).is_err() {
            warn!(subsystem = "gallery", component = "fetch", "Fetch task is gone, request dropped");
        }
    }

    /// Receiver notified on every state change.
    pub fn subscribe(&self) -> watch::Receiver<FetchState> {
        self.state.clone()
    }

    pub fn current(&self) -> FetchState {
        self.state.borrow().clone()
    }

    /// Stop accepting requests and wait for the task to finish.
    pub async fn shutdown(self) {
        drop(self.requests);
        if let Err(e) = self.task.await {
            warn!(error = %e, "Fetch task ended abnormally");
        }
    }
}

#[instrument(skip_all, fields(subsystem = "gallery", component = "fetch", generation = field::Empty))]
async fn run(
    source: Arc<dyn ImageSource>,
    debounce: Duration,
    mut requests: mpsc::UnboundedReceiver<FilterSpec>,
    state: watch::Sender<FetchState>,
) {
    let mut generation = 0u64;
    let mut pending: Option<FilterSpec> = None;

    'requests: loop {
        let mut spec = match pending.take() {
            Some(spec) => spec,
            None => match requests.recv().await {
                Some(spec) => spec,
                None => break,
            },
        };
        state.send_modify(|s| s.loading = true);

        // Quiet window: every newer request restarts it.
        loop {
            match timeout(debounce, requests.recv()).await {
                Ok(Some(newer)) => spec = newer,
                Ok(None) => break 'requests,
                Err(_) => break,
            }
        }

        let started = Instant::now();
        let outcome = tokio::select! {
            result = source.fetch_visible() => result,
            newer = requests.recv() => match newer {
                Some(newer) => {
                    debug!("In-flight fetch superseded");
                    pending = Some(newer);
                    continue 'requests;
                }
                None => break 'requests,
            },
        };

        generation += 1;
        Span::current().record(GENERATION, generation);
        let next = match outcome {
            Ok(records) => {
                let images: Vec<ImageRecord> =
                    filter_images(&records, &spec).into_iter().cloned().collect();
                debug!(
                    input_count = records.len(),
                    result_count = images.len(),
                    duration_ms = started.elapsed().as_millis() as u64,
                    "Fetch published"
                );
                FetchState {
                    generation,
                    spec,
                    images,
                    error: None,
                    loading: false,
                }
            }
            Err(e) => {
                warn!(error = %e, "Fetch failed");
                FetchState {
                    generation,
                    spec,
                    images: Vec::new(),
                    error: Some(e.to_string()),
                    loading: false,
                }
            }
        };
        state.send_replace(next);
    }

    state.send_modify(|s| s.loading = false);
    debug!("Fetch coordinator stopped");
}
