//! Terminal render surface for the generation form.

use crate::controller::{FormSnapshot, RequestState};
use colored::Colorize;

pub const TITLE: &str = "Text to Image Generator";
pub const SUBMIT_LABEL: &str = "Generate Image";
pub const LOADING_LABEL: &str = "Generating...";
pub const PLACEHOLDER: &str = "No image generated yet";

/// Label of the submit control for the given state.
pub fn submit_label(state: &RequestState) -> &'static str {
    if state.is_in_flight() {
        LOADING_LABEL
    } else {
        SUBMIT_LABEL
    }
}

/// Render the whole form. Exactly one of placeholder, spinner, image or
/// error is shown.
pub fn render(snapshot: &FormSnapshot) -> String {
    let mut lines = vec![
        TITLE.bold().to_string(),
        String::new(),
        format!("{} {}", "Image Description:".dimmed(), snapshot.prompt),
        format!("[ {} ]", submit_label(&snapshot.state)),
    ];

    lines.push(status_line(&snapshot.state));

    lines.join("\n")
}

/// One-line status used after each state change in the interactive loop.
pub fn status_line(state: &RequestState) -> String {
    match state {
        RequestState::Idle => PLACEHOLDER.dimmed().to_string(),
        RequestState::InFlight => format!("{} {}", "⠋".cyan(), LOADING_LABEL),
        RequestState::Succeeded(url) => format!("{} {}", "Generated Image:".bold(), url),
        RequestState::Failed(message) => message.red().to_string(),
    }
}
