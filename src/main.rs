//! covercrew - local launcher for the cover-letter crew
//!
//! CLI entry point: installs and runs the multi-agent application against
//! a local Ollama runtime.

#![forbid(unsafe_code)]

use clap::Parser;
use covercrew_core::{format_error_for_cli, EXIT_FAILURE};
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
mod settings;

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();

    // COVERCREW_LOG_FORMAT=json switches to structured output
    let json = std::env::var("COVERCREW_LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json"));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "covercrew=info,covercrew_core=info,covercrew_ollama=info".into()
            }),
        )
        .with(json.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json).then(tracing_subscriber::fmt::layer))
        .init();

    let cli = cli::Cli::parse();
    debug!("covercrew v{}", env!("CARGO_PKG_VERSION"));

    let code = match cli::run(cli).await {
        Ok(code) => code,
        Err(err) => {
            match err.downcast_ref::<covercrew_core::Error>() {
                Some(core) => eprintln!("{}", format_error_for_cli(core)),
                None => eprintln!("❌ {:#}", err),
            }
            EXIT_FAILURE
        }
    };

    ExitCode::from(u8::try_from(code).unwrap_or(EXIT_FAILURE as u8))
}
