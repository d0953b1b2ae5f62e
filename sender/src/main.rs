#![recursion_limit = "256"]

mod console;
mod generator;
mod samples;
mod session;
mod telemetry;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use session::{Session, DEFAULT_TARGET_URL};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Generate mock Tive payloads and send them to a webhook receiver.
#[derive(Debug, Parser)]
#[command(name = "tive-sender", version)]
struct Cli {
    /// Where payloads are POSTed (the relay, or a receiver directly)
    #[arg(long, env = "TIVE_SENDER_URL", default_value = DEFAULT_TARGET_URL)]
    url: String,

    /// Sent as the X-API-Key header
    #[arg(long, env = "TIVE_API_KEY", default_value = "", hide_env_values = true)]
    api_key: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Interactive form (the default)
    Console,
    /// Print a generated payload
    Generate {
        #[arg(long)]
        minimal: bool,
    },
    /// List the sample payloads
    Samples,
    /// Send one payload; a random full record unless a source is given
    Send {
        #[arg(long, conflicts_with_all = ["minimal", "file"])]
        sample: Option<String>,
        #[arg(long, conflicts_with = "file")]
        minimal: bool,
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Send 10 freshly generated payloads, one after another
    Batch,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut session = Session::new(cli.url, cli.api_key);
    info!("Target: {}", session.target_url());

    match cli.command.unwrap_or(Command::Console) {
        Command::Console => console::run(&mut session).await?,
        Command::Generate { minimal } => {
            if minimal {
                session.generate_minimal();
            } else {
                session.generate_random();
            }
            println!("{}", session.payload());
        }
        Command::Samples => println!("{}", console::render_samples(None)),
        Command::Send {
            sample,
            minimal,
            file,
        } => {
            if let Some(arg) = sample {
                let name = console::resolve_sample(&arg)
                    .with_context(|| format!("no sample named {:?}", arg))?;
                session.select_sample(name);
            } else if let Some(path) = file {
                let text = tokio::fs::read_to_string(&path)
                    .await
                    .with_context(|| format!("cannot read {}", path.display()))?;
                session.set_payload(text);
            } else if minimal {
                session.generate_minimal();
            } else {
                session.generate_random();
            }

            let result = session.send().await?;
            println!("{}", console::render_result(result));
            if !result.success {
                bail!("send failed");
            }
        }
        Command::Batch => {
            let batch = session.send_batch().await?;
            println!("{}", console::render_results(batch));
            let failed = batch.iter().filter(|r| !r.success).count();
            if failed > 0 {
                bail!("{} of {} payloads failed", failed, batch.len());
            }
        }
    }

    Ok(())
}
