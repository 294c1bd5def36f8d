//! Text-to-image service integration
//!
//! Provides the interface to the external image generation API. The service
//! only hands back a reference to the hosted image; nothing is downloaded.

pub mod client;
pub mod mock;

pub use client::BriaImageClient;
pub use mock::MockImageGenerationClient;

use crate::Result;
use async_trait::async_trait;

#[async_trait]
pub trait ImageGenerationService: Send + Sync {
    /// Generate one image for `prompt` and return its URL.
    async fn generate_image(&self, prompt: &str) -> Result<String>;
}
