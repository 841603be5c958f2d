//! dom-relay
//!
//! Runs the WebSocket relay that turns scraped chat replies into Markdown, or
//! converts a single captured message.

use anyhow::Context;
use clap::{Parser, Subcommand};
use dom_relay::config::{AppConfig, DEFAULT_CONFIG_PATH, RelayConfig};
use dom_relay::handlers::HandlerRegistry;
use dom_relay::markdown::DomExtractor;
use dom_relay::relay::{RelayServer, pump_lines};
use std::io::Read;
use std::path::PathBuf;
use tokio::io::BufReader;
use tokio_util::sync::CancellationToken;

#[derive(Parser)]
#[command(name = "dom-relay")]
#[command(version)]
#[command(about = "Relay scraped chat DOM over a local WebSocket and print it as Markdown", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the WebSocket relay
    Serve {
        /// Configuration document
        #[arg(long, short = 'c', value_name = "PATH", default_value = DEFAULT_CONFIG_PATH)]
        config: PathBuf,

        /// Listen address (overrides config)
        #[arg(long, value_name = "ADDR")]
        listen: Option<String>,

        /// Listen port (overrides config)
        #[arg(long, short = 'p')]
        port: Option<u16>,

        /// Keep each client's latest raw message in this directory (overrides config)
        #[arg(long, value_name = "DIR")]
        archive_dir: Option<PathBuf>,
    },

    /// Convert one captured message to Markdown
    Extract {
        /// Configuration document; its blacklist is applied
        #[arg(long, short = 'c', value_name = "PATH", default_value = DEFAULT_CONFIG_PATH)]
        config: PathBuf,

        /// Message file; reads stdin when omitted
        #[arg(value_name = "FILE")]
        input: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve {
            config,
            listen,
            port,
            archive_dir,
        } => serve(config, listen, port, archive_dir).await,
        Command::Extract { config, input } => extract(config, input),
    }
}

async fn serve(
    config_path: PathBuf,
    listen: Option<String>,
    port: Option<u16>,
    archive_dir: Option<PathBuf>,
) -> anyhow::Result<()> {
    let mut app_config = AppConfig::load(&config_path)?;
    let mut relay_config = RelayConfig::load_or_bootstrap(&mut app_config)?;

    if let Some(addr) = listen {
        relay_config = relay_config.listen_addr(addr);
    }
    if let Some(port) = port {
        relay_config = relay_config.listen_port(port);
    }
    if let Some(dir) = archive_dir {
        relay_config = relay_config.archive_dir(dir);
    }

    let (server, mut transcripts) = RelayServer::bind(&relay_config, HandlerRegistry::with_defaults())
        .await
        .context("Failed to start relay")?;
    let hub = server.hub();

    let cancel = CancellationToken::new();
    let shutdown = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::info!("Shutting down");
        }
        shutdown.cancel();
    });

    tokio::spawn(async move {
        while let Some(transcript) = transcripts.recv().await {
            println!("{}", transcript.markdown);
        }
    });

    tokio::spawn(async move {
        let stdin = BufReader::new(tokio::io::stdin());
        if let Err(e) = pump_lines(stdin, &hub).await {
            log::error!("Console input stopped: {}", e);
        }
    });

    server.run(cancel).await?;
    Ok(())
}

fn extract(config_path: PathBuf, input: Option<PathBuf>) -> anyhow::Result<()> {
    let relay_config = RelayConfig::from_app_config(&AppConfig::load(&config_path)?)?;

    let message = match input {
        Some(path) => std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read stdin")?;
            buf
        }
    };

    let extractor = DomExtractor::from_json(&message)?.with_blacklist(relay_config.to_blacklist());
    print!("{}", extractor.extract());
    Ok(())
}
