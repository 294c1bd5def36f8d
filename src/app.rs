//! Terminal front end for the generation form.

use crate::ai::{BriaImageClient, ImageGenerationService};
use crate::controller::{FormController, RequestState};
use crate::models::Config;
use crate::render::{render, status_line};
use crate::{Error, Result};
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::task::JoinSet;
use tracing::{info, warn};

pub const EMPTY_PROMPT_NOTICE: &str = "Please fill out the image description.";

/// A line of user input, interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormCommand {
    /// Submit, replacing the prompt first when text is given.
    Submit(Option<String>),
    SetPrompt(String),
    Show,
    Quit,
}

pub fn parse_command(line: &str) -> FormCommand {
    let line = line.trim_end_matches(['\r', '\n']);

    if line == ":prompt" {
        return FormCommand::SetPrompt(String::new());
    }
    if let Some(rest) = line
        .strip_prefix(":prompt")
        .filter(|rest| rest.starts_with(char::is_whitespace))
    {
        return FormCommand::SetPrompt(rest.trim_start().to_string());
    }

    match line.trim() {
        ":quit" | ":q" => FormCommand::Quit,
        ":show" => FormCommand::Show,
        "" => FormCommand::Submit(None),
        _ => FormCommand::Submit(Some(line.to_string())),
    }
}

/// Injectable service bundle used to construct [`App`] in tests/harnesses.
pub struct AppServices {
    pub image_gen: Arc<dyn ImageGenerationService>,
}

pub struct App {
    controller: Arc<FormController>,
}

impl App {
    pub fn with_services(services: AppServices, initial_prompt: String) -> Self {
        Self {
            controller: FormController::new(services.image_gen, initial_prompt),
        }
    }

    /// Construct an app talking to the configured text-to-image service.
    pub fn new(config: &Config) -> Result<Self> {
        info!(
            "Image provider: {} (model version {})",
            config.base_url, config.model_version
        );
        let image_gen = Arc::new(BriaImageClient::new(config)?);

        Ok(Self::with_services(
            AppServices { image_gen },
            config.default_prompt.clone(),
        ))
    }

    pub fn controller(&self) -> &Arc<FormController> {
        &self.controller
    }

    /// Submit once and wait for the outcome.
    pub async fn run_once(&self, prompt: Option<String>) -> Result<RequestState> {
        if let Some(prompt) = prompt {
            self.controller.update_prompt(prompt);
        }
        if self.controller.snapshot().prompt.is_empty() {
            return Err(Error::Generic(EMPTY_PROMPT_NOTICE.to_string()));
        }

        Ok(self.controller.submit().await)
    }

    /// Drive the form from `input` until `:quit` or end of input.
    ///
    /// Submissions run in the background so input keeps being read while a
    /// request is outstanding. At end of input, outstanding submissions are
    /// awaited; on `:quit` they are abandoned.
    pub async fn run_interactive<R, W>(&self, input: R, mut output: W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = input.lines();
        let mut updates = self.controller.subscribe();
        let mut pending = JoinSet::new();
        let mut last_state = self.controller.snapshot().state;

        write_line(&mut output, &render(&self.controller.snapshot())).await?;

        loop {
            tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line? else {
                        while let Some(joined) = pending.join_next().await {
                            if let Err(e) = joined {
                                warn!("Submission task failed: {}", e);
                            }
                        }
                        break;
                    };

                    match parse_command(&line) {
                        FormCommand::Quit => {
                            pending.abort_all();
                            break;
                        }
                        FormCommand::Show => {
                            write_line(&mut output, &render(&self.controller.snapshot())).await?;
                        }
                        FormCommand::SetPrompt(text) => self.controller.update_prompt(text),
                        FormCommand::Submit(text) => {
                            if let Some(text) = text {
                                self.controller.update_prompt(text);
                            }
                            if self.controller.snapshot().prompt.is_empty() {
                                write_line(&mut output, EMPTY_PROMPT_NOTICE).await?;
                                continue;
                            }
                            let submission = self.controller.start_submission();
                            pending.spawn(submission.run());
                        }
                    }
                }
                changed = updates.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let state = updates.borrow_and_update().state.clone();
                    if state != last_state {
                        write_line(&mut output, &status_line(&state)).await?;
                        last_state = state;
                    }
                }
                Some(joined) = pending.join_next() => {
                    if let Err(e) = joined {
                        warn!("Submission task failed: {}", e);
                    }
                }
            }
        }

        // Drain the abort so abandoned submissions have cleared InFlight.
        while pending.join_next().await.is_some() {}

        let state = self.controller.snapshot().state;
        if state != last_state {
            write_line(&mut output, &status_line(&state)).await?;
        }
        output.flush().await?;
        Ok(())
    }
}

async fn write_line<W: AsyncWrite + Unpin>(output: &mut W, text: &str) -> Result<()> {
    output.write_all(text.as_bytes()).await?;
    output.write_all(b"\n").await?;
    Ok(())
}
