use super::ImageGenerationService;
use crate::{Error, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Scripted outcome for one call to [`MockImageGenerationClient`].
#[derive(Debug, Clone)]
pub enum MockOutcome {
    Url(String),
    StatusFailure(u16),
    MissingImage,
    Message(String),
}

impl MockOutcome {
    fn into_result(self) -> Result<String> {
        match self {
            Self::Url(url) => Ok(url),
            Self::StatusFailure(status) => Err(Error::GenerationFailed { status }),
            Self::MissingImage => Err(Error::MissingImage),
            Self::Message(message) => Err(Error::Generic(message)),
        }
    }
}

#[derive(Clone)]
pub struct MockImageGenerationClient {
    outcomes: Arc<Mutex<Vec<(MockOutcome, Duration)>>>,
    prompts: Arc<Mutex<Vec<String>>>,
    call_count: Arc<Mutex<usize>>,
}

impl MockImageGenerationClient {
    pub fn new() -> Self {
        Self {
            outcomes: Arc::new(Mutex::new(Vec::new())),
            prompts: Arc::new(Mutex::new(Vec::new())),
            call_count: Arc::new(Mutex::new(0)),
        }
    }

    pub fn with_outcome(self, outcome: MockOutcome) -> Self {
        self.with_delayed_outcome(outcome, Duration::ZERO)
    }

    /// Queue an outcome that settles only after `delay`.
    pub fn with_delayed_outcome(self, outcome: MockOutcome, delay: Duration) -> Self {
        self.outcomes.lock().unwrap().push((outcome, delay));
        self
    }

    pub fn with_image_url(self, url: &str) -> Self {
        self.with_outcome(MockOutcome::Url(url.to_string()))
    }

    pub fn get_call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }

    pub fn get_prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

impl Default for MockImageGenerationClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImageGenerationService for MockImageGenerationClient {
    async fn generate_image(&self, prompt: &str) -> Result<String> {
        let index = {
            let mut count = self.call_count.lock().unwrap();
            *count += 1;
            *count - 1
        };
        self.prompts.lock().unwrap().push(prompt.to_string());

        let scripted = {
            let outcomes = self.outcomes.lock().unwrap();
            if outcomes.is_empty() {
                None
            } else {
                Some(outcomes[index % outcomes.len()].clone())
            }
        };

        match scripted {
            Some((outcome, delay)) => {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                outcome.into_result()
            }
            None => Ok(format!("https://mock-images.example.com/{}.png", index)),
        }
    }
}
