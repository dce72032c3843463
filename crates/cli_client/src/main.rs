//! Dry-run client for the presenter protocol
//! Negotiates against a simulated server range and prints the frames it would send.

mod dry_run;

use anyhow::{Context, Result};
use clap::Parser;
use dry_run::DryRunTransport;
use presenter_core::{ClientConfig, Command, PresenterClient, VersionRange};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Presenter remote - protocol dry run
#[derive(Parser, Debug)]
#[command(name = "presenter-cli")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Negotiate with a simulated server and print outgoing frames")]
#[command(long_about = None)]
struct Args {
    /// Lowest protocol version this client speaks
    #[arg(long, default_value_t = presenter_core::MIN_PROTOCOL_VERSION)]
    local_min: u32,

    /// Highest protocol version this client speaks
    #[arg(long, default_value_t = presenter_core::LATEST_PROTOCOL_VERSION)]
    local_max: u32,

    /// Lowest protocol version the simulated server advertises
    #[arg(long, default_value_t = 1)]
    remote_min: u32,

    /// Highest protocol version the simulated server advertises
    #[arg(long, default_value_t = 1)]
    remote_max: u32,

    /// Handshake timeout in milliseconds
    #[arg(long, default_value_t = 5000)]
    timeout_ms: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Command tokens to send (prevSlide, nextSlide, endPres, begin).
    /// Reads one token per line from stdin when omitted.
    commands: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    setup_logging(&args.log_level)?;
    run(args, std::io::stdout()).await
}

/// Negotiate with the simulated server and write every sent frame to `out`
async fn run<W>(args: Args, out: W) -> Result<()>
where
    W: std::io::Write + Send,
{
    let config = ClientConfig::default()
        .with_local_range(VersionRange {
            min: args.local_min,
            max: args.local_max,
        })
        .with_handshake_timeout(Duration::from_millis(args.timeout_ms));

    // Remote range is passed through unvalidated, like a peer's handshake
    let remote = VersionRange {
        min: args.remote_min,
        max: args.remote_max,
    };
    let transport = DryRunTransport::new(remote, out);
    let mut client = PresenterClient::new(transport, config);

    let version = client
        .connect()
        .await
        .context("Cannot start presenter session")?;
    info!("Agreed protocol version {}", version);

    let available: Vec<&str> = client
        .sendable_commands()
        .into_iter()
        .map(Command::token)
        .collect();
    info!("Sendable commands: {}", available.join(", "));

    if args.commands.is_empty() {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Some(line) = lines.next_line().await? {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            send_token(&mut client, line).await;
        }
    } else {
        for token in &args.commands {
            send_token(&mut client, token).await;
        }
    }

    client.disconnect().await?;
    Ok(())
}

/// Parse and send one token; usage errors are reported and do not end the session
async fn send_token<W>(client: &mut PresenterClient<DryRunTransport<W>>, token: &str)
where
    W: std::io::Write + Send,
{
    let result = match token.parse::<Command>() {
        Ok(command) => client.send(command).await,
        Err(e) => Err(e),
    };
    if let Err(e) = result {
        eprintln!("Skipped {:?}: {}", token, e);
    }
}

fn setup_logging(level: &str) -> Result<()> {
    let log_level = level.parse::<Level>().unwrap_or(Level::INFO);

    let filter = EnvFilter::builder()
        .with_default_directive(log_level.into())
        .from_env_lossy();

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    Ok(())
}
