use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Parser;
use client_core::{
    config::{load_settings, SettingsOverrides},
    Completion, FormDocument, HttpGreetService, SubmitEvent, SubmitHandler,
};
use shared::domain::{FailurePolicy, GREETING_OUTPUT_ID, NAME_INPUT_ID};
use tokio::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Fills in the greeting form once and prints what it renders.
#[derive(Parser, Debug)]
struct Args {
    /// Value typed into the name field; may be empty.
    #[arg(long, default_value = "")]
    name: String,
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    server_url: Option<String>,
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    timeout_ms: Option<u64>,
    #[arg(long, value_parser = parse_failure_policy)]
    failure_policy: Option<FailurePolicy>,
}

fn parse_failure_policy(raw: &str) -> Result<FailurePolicy, String> {
    FailurePolicy::parse(raw).ok_or_else(|| format!("unknown failure policy '{raw}'"))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let settings = load_settings(
        args.config.as_deref(),
        &SettingsOverrides {
            server_url: args.server_url,
            request_timeout_ms: args.timeout_ms,
            failure_policy: args.failure_policy,
        },
    )?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&settings.log_filter))
        .with_writer(std::io::stderr)
        .init();

    let service = HttpGreetService::new(&settings.server_url, settings.request_timeout())?;
    tracing::info!(endpoint = %service.endpoint(), "submitting greeting form");
    let mut document = FormDocument::new();
    document.set_value(NAME_INPUT_ID, args.name)?;
    let document = Mutex::new(document);

    let mut handler = SubmitHandler::new(settings.failure_policy);
    let mut event = SubmitEvent::new();
    let completion = handler.submit(&mut event, &document, &service).await;

    let document = document.into_inner();
    match completion {
        Completion::Rendered => {
            println!("{}", document.text_content(GREETING_OUTPUT_ID)?);
            Ok(())
        }
        Completion::FailedLeftDisabled | Completion::FailedRecovered => {
            bail!("{}", document.status().unwrap_or("greeting failed"))
        }
    }
}
