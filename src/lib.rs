//! Text-to-image generation form
//!
//! Collects a prompt, submits it to a hosted text-to-image API and renders
//! the reference to the generated image, tracking the request lifecycle in
//! between.

pub mod ai;
pub mod app;
pub mod controller;
pub mod error;
pub mod models;
pub mod render;

pub use error::{Error, Result};
