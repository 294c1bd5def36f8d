//! Generation form controller
//!
//! Owns the prompt text and the lifecycle of the image request, and publishes
//! every change as a [`FormSnapshot`] over a `watch` channel so a render
//! surface can follow along.
//!
//! Submissions may overlap. Each one takes a generation number, and only the
//! most recent submission is allowed to write the settled state; outcomes of
//! superseded submissions are dropped.

use crate::ai::ImageGenerationService;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Lifecycle of the current image request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RequestState {
    #[default]
    Idle,
    InFlight,
    Succeeded(String),
    Failed(String),
}

impl RequestState {
    pub fn is_in_flight(&self) -> bool {
        matches!(self, Self::InFlight)
    }

    pub fn image_url(&self) -> Option<&str> {
        match self {
            Self::Succeeded(url) => Some(url),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed(message) => Some(message),
            _ => None,
        }
    }
}

/// Everything the render surface needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormSnapshot {
    pub prompt: String,
    pub state: RequestState,
}

struct FormState {
    prompt: String,
    request: RequestState,
    generation: u64,
}

impl FormState {
    fn snapshot(&self) -> FormSnapshot {
        FormSnapshot {
            prompt: self.prompt.clone(),
            state: self.request.clone(),
        }
    }
}

pub struct FormController {
    service: Arc<dyn ImageGenerationService>,
    state: Mutex<FormState>,
    updates: watch::Sender<FormSnapshot>,
}

impl FormController {
    pub fn new(service: Arc<dyn ImageGenerationService>, initial_prompt: String) -> Arc<Self> {
        let state = FormState {
            prompt: initial_prompt,
            request: RequestState::Idle,
            generation: 0,
        };
        let (updates, _) = watch::channel(state.snapshot());

        Arc::new(Self {
            service,
            state: Mutex::new(state),
            updates,
        })
    }

    fn lock(&self) -> MutexGuard<'_, FormState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, state: &FormState) {
        self.updates.send_replace(state.snapshot());
    }

    pub fn snapshot(&self) -> FormSnapshot {
        self.lock().snapshot()
    }

    /// Receiver that observes every published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<FormSnapshot> {
        self.updates.subscribe()
    }

    /// Replace the prompt text. No validation is applied.
    pub fn update_prompt(&self, text: impl Into<String>) {
        let mut state = self.lock();
        state.prompt = text.into();
        self.publish(&state);
    }

    /// Move to `InFlight` for the current prompt and hand back the pending call.
    ///
    /// The state change is visible before this returns, so observers see
    /// `InFlight` before the outbound call can settle. Dropping the returned
    /// [`Submission`] without running it to completion clears `InFlight`.
    pub fn start_submission(self: &Arc<Self>) -> Submission {
        let mut state = self.lock();
        state.generation += 1;
        state.request = RequestState::InFlight;
        self.publish(&state);

        debug!("Submission {} started", state.generation);

        Submission {
            controller: Arc::clone(self),
            generation: state.generation,
            prompt: state.prompt.clone(),
            settled: false,
        }
    }

    /// Submit the current prompt and wait for the call to settle.
    pub async fn submit(self: &Arc<Self>) -> RequestState {
        self.start_submission().run().await
    }

    /// Write a settled outcome if `generation` is still the latest submission.
    fn settle(&self, generation: u64, outcome: RequestState) -> bool {
        let mut state = self.lock();
        if state.generation != generation {
            warn!(
                "Discarding outcome of submission {} superseded by {}",
                generation, state.generation
            );
            return false;
        }

        state.request = outcome;
        self.publish(&state);
        true
    }

    fn abandon(&self, generation: u64) {
        let mut state = self.lock();
        if state.generation == generation && state.request.is_in_flight() {
            warn!("Submission {} dropped before settling", generation);
            state.request = RequestState::Idle;
            self.publish(&state);
        }
    }
}

/// One outstanding request started by [`FormController::start_submission`].
pub struct Submission {
    controller: Arc<FormController>,
    generation: u64,
    prompt: String,
    settled: bool,
}

impl Submission {
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Issue the outbound call and settle the controller state.
    ///
    /// Returns this submission's outcome. It is only applied to the
    /// controller when no newer submission has started in the meantime.
    pub async fn run(mut self) -> RequestState {
        let outcome = match self.controller.service.generate_image(&self.prompt).await {
            Ok(url) => {
                info!("Submission {} produced image {}", self.generation, url);
                RequestState::Succeeded(url)
            }
            Err(e) => {
                info!("Submission {} failed: {}", self.generation, e);
                RequestState::Failed(e.user_message())
            }
        };

        self.settled = true;
        self.controller.settle(self.generation, outcome.clone());
        outcome
    }
}

impl Drop for Submission {
    fn drop(&mut self) {
        if !self.settled {
            self.controller.abandon(self.generation);
        }
    }
}
