//! `sniplet-cli` binary entrypoint.
//!
//! Sends a prompt to a running relay and prints the generated text as it
//! streams in.

use anyhow::Context;
use clap::Parser;
use futures::StreamExt;
use sniplet_core::client::{RelayClient, DEFAULT_RELAY_URL};
use sniplet_core::output::OutputBuffer;
use sniplet_core::protocol::Prompt;
use std::io::{self, Write};
use std::process::ExitCode;
use tracing::error;

#[derive(Parser, Debug)]
#[command(name = "sniplet-cli")]
#[command(version, long_about = None)]
#[command(about = "Generate UI code from a prompt through a Sniplet relay")]
struct Cli {
    /// Base URL of the relay
    #[arg(long, default_value = DEFAULT_RELAY_URL)]
    url: String,

    /// Print only the fenced code blocks once generation has finished
    #[arg(long)]
    code_only: bool,

    /// Prompt text; multiple words are joined with spaces
    #[arg(required = true, trailing_var_arg = true)]
    prompt: Vec<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Logs go to stderr so stdout carries only generated text.
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    let prompt = match Prompt::parse(&cli.prompt.join(" ")) {
        Ok(prompt) => prompt,
        Err(_) => {
            eprintln!("error: the prompt must not be blank");
            return ExitCode::from(2);
        }
    };

    let mut output = OutputBuffer::new();
    match generate(&cli, &prompt, &mut output).await {
        Ok(()) => {
            if cli.code_only {
                println!("{}", output.code());
            } else {
                println!();
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %format!("{:#}", e), "Generation failed");
            output.fail();
            println!("{}", output.as_str());
            ExitCode::FAILURE
        }
    }
}

async fn generate(cli: &Cli, prompt: &Prompt, output: &mut OutputBuffer) -> anyhow::Result<()> {
    let client = RelayClient::new(cli.url.as_str())?;
    let mut deltas = client
        .generate(prompt)
        .await
        .with_context(|| format!("request to {} failed", client.generate_url()))?;

    let mut stdout = io::stdout();
    while let Some(delta) = deltas.next().await {
        let delta = delta.context("stream interrupted")?;
        output.push(&delta);

        if !cli.code_only {
            write!(stdout, "{}", delta)?;
            stdout.flush()?;
        }
    }

    Ok(())
}
