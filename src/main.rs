use anyhow::Result;
use clap::Parser;
use text_to_image_generator::app::App;
use text_to_image_generator::controller::RequestState;
use text_to_image_generator::models::Config;
use text_to_image_generator::render::status_line;
use tokio::io::BufReader;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "text-to-image-generator")]
#[command(about = "Generate an image from a text prompt")]
struct CliArgs {
    /// Submit this prompt once and exit instead of opening the form.
    #[arg(long, value_name = "TEXT", value_parser = parse_prompt_arg)]
    prompt: Option<String>,

    /// API token; overrides BRIA_API_TOKEN.
    #[arg(long, value_name = "TOKEN")]
    api_token: Option<String>,

    /// Model version embedded in the endpoint path; overrides BRIA_MODEL_VERSION.
    #[arg(long, value_name = "VERSION")]
    model_version: Option<String>,

    /// Service base URL; overrides BRIA_BASE_URL.
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,
}

fn parse_prompt_arg(input: &str) -> std::result::Result<String, String> {
    if input.is_empty() {
        Err("Prompt must not be empty".to_string())
    } else {
        Ok(input.to_string())
    }
}

/// CLI flags win over values loaded from the environment.
fn apply_overrides(config: &mut Config, args: &CliArgs) {
    if let Some(model_version) = &args.model_version {
        config.model_version = model_version.clone();
    }
    if let Some(base_url) = &args.base_url {
        config.base_url = base_url.clone();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "text_to_image_generator=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = CliArgs::parse();

    let mut config = Config::from_env_with_token(args.api_token.clone())?;
    apply_overrides(&mut config, &args);

    let app = match App::new(&config) {
        Ok(app) => app,
        Err(e) => {
            error!("Failed to initialize application: {}", e);
            std::process::exit(1);
        }
    };

    match args.prompt {
        Some(prompt) => {
            let state = app.run_once(Some(prompt)).await?;
            println!("{}", status_line(&state));
            if !matches!(state, RequestState::Succeeded(_)) {
                std::process::exit(1);
            }
        }
        None => {
            info!("Starting text-to-image form");
            app.run_interactive(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
                .await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_prompt_arg_valid() {
        assert_eq!(parse_prompt_arg("a red fox").unwrap(), "a red fox");
    }

    #[test]
    fn test_parse_prompt_arg_empty() {
        let err = parse_prompt_arg("").unwrap_err();
        assert!(err.contains("must not be empty"));
    }

    #[test]
    fn test_cli_overrides_parse() {
        let args = CliArgs::parse_from([
            "text-to-image-generator",
            "--prompt",
            "a red fox in snow",
            "--model-version",
            "3.0",
        ]);
        assert_eq!(args.prompt.as_deref(), Some("a red fox in snow"));
        assert_eq!(args.model_version.as_deref(), Some("3.0"));
        assert!(args.api_token.is_none());
    }

    #[test]
    fn test_apply_overrides() {
        let args = CliArgs::parse_from([
            "text-to-image-generator",
            "--model-version",
            "3.0",
            "--base-url",
            "https://bria.test",
        ]);
        let mut config = Config::with_token("token".to_string());
        apply_overrides(&mut config, &args);
        assert_eq!(config.model_version, "3.0");
        assert_eq!(config.base_url, "https://bria.test");

        let bare = CliArgs::parse_from(["text-to-image-generator"]);
        let mut config = Config::with_token("token".to_string());
        apply_overrides(&mut config, &bare);
        assert_eq!(config.model_version, "2.3");
    }
}
