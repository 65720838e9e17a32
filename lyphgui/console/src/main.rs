//! Lyph Console - Line-Oriented Surface for the Lyph Client
//!
//! Reads commands from stdin, forwards them to the Composer and prints every
//! view message it emits. Logs go to stderr so stdout carries only rendered
//! output.
//!
//! # Usage
//!
//! ```bash
//! # Default server (http://localhost:5052)
//! lyph-console
//!
//! # Another server, HTML fragments instead of text
//! lyph-console --server http://lyphs.example:5052 --format html
//!
//! # Scripted session
//! printf 'layer FMA_1\nlayer FMA_2\ncreate Skin shell\n' | lyph-console
//!
//! # Verbose logging
//! RUST_LOG=debug lyph-console
//! ```

mod commands;
mod render;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tracing::{info, warn};

use lyphgui_core::backend::{HttpService, LyphService};
use lyphgui_core::config::{load_config, load_config_from_path, ConfigOverrides};
use lyphgui_core::{Composer, ViewMessage};

use render::OutputFormat;

/// Lyph Console - compose lyphs and query the lyph graph server
#[derive(Parser, Debug)]
#[command(name = "lyph-console")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Lyph server base URL
    #[arg(short = 's', long, value_name = "URL")]
    server: Option<String>,

    /// Configuration file path
    #[arg(short = 'c', long, env = "LYPHGUI_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Request timeout in milliseconds
    #[arg(short = 't', long, value_name = "MS")]
    timeout_ms: Option<u64>,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Let requests of the same kind overlap
    #[arg(long)]
    no_serialize: bool,
}

/// Initialize logging to stderr
fn init_logging() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("lyphgui_core=info".parse()?)
                .add_directive("lyph_console=info".parse()?),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logging()?;

    let mut config = match args.config {
        Some(ref path) => load_config_from_path(Some(path.clone())),
        None => load_config(),
    }
    .context("Failed to load configuration")?;

    let mut overrides = ConfigOverrides::new();
    if let Some(ref url) = args.server {
        overrides = overrides.with_base_url(url.clone());
    }
    if let Some(ms) = args.timeout_ms {
        overrides = overrides.with_timeout_ms(ms);
    }
    if args.no_serialize {
        overrides = overrides.with_serialize_per_kind(false);
    }
    overrides.apply(&mut config);
    config.validate()?;

    info!(
        server = %config.service.base_url,
        source = %config.source(),
        serialize_per_kind = config.serialize_per_kind,
        "Starting lyph console"
    );

    let service =
        HttpService::from_config(&config.service).context("Failed to create HTTP client")?;
    if !service.health_check().await {
        warn!(server = %service.base_url(), "Lyph server is not reachable yet");
    }

    let (tx, mut rx) = mpsc::channel(config.channel_capacity);
    let mut composer = Composer::new(service, config, tx);

    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        let command = match commands::parse_line(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                stdout.write_all(e.render().to_string().as_bytes()).await?;
                stdout.flush().await?;
                continue;
            }
        };

        let Some(action) = command.into_action() else {
            break;
        };

        composer.handle_action(action).await;
        composer.run_until_idle().await;

        // Messages that did not fit the channel are released as it drains
        loop {
            let held = composer.flush_view();
            print_messages(&mut rx, &mut stdout, args.format).await?;
            if held == 0 {
                break;
            }
        }
    }

    info!("Lyph console exiting");
    Ok(())
}

/// Print every view message waiting in the channel
async fn print_messages(
    rx: &mut mpsc::Receiver<ViewMessage>,
    stdout: &mut tokio::io::Stdout,
    format: OutputFormat,
) -> Result<()> {
    while let Ok(message) = rx.try_recv() {
        if let Some(text) = render::render(&message, format) {
            stdout.write_all(text.as_bytes()).await?;
            stdout.write_all(b"\n").await?;
        }
    }
    stdout.flush().await?;
    Ok(())
}
