use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use colored::*;

mod list;
mod render;
mod server;
mod storage;
mod sync;

use list::{Entry, Snapshot};
use render::{HtmlList, Render, TextList};
use sync::{ListSync, RemoteList, StoreClient};

#[derive(Parser)]
#[command(name = "leadlist")]
#[command(
    about = "Real-time lead-capture list synchronized with a remote append/remove store",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a leadlist store directory and config
    Init {
        #[arg(short, long, default_value = ".")]
        path: PathBuf,

        /// Default store endpoint written to the config
        #[arg(long, default_value = "ws://localhost:3000/ws")]
        endpoint: String,
    },

    /// Start the collection store server
    Serve {
        #[arg(short, long, default_value = "3000")]
        port: u16,

        #[arg(short, long, default_value = ".")]
        path: PathBuf,
    },

    /// Append a lead to the remote collection
    Add {
        /// The value to save (a URL in the usual case)
        value: String,

        /// Store endpoint, e.g. ws://localhost:3000/ws
        #[arg(long)]
        url: Option<String>,
    },

    /// Delete the entire remote collection
    Clear {
        #[arg(long)]
        url: Option<String>,
    },

    /// Fetch the current snapshot once and print it
    List {
        #[arg(long)]
        url: Option<String>,
    },

    /// Print the collection straight from a local store directory
    Log {
        #[arg(short, long, default_value = ".")]
        path: PathBuf,
    },

    /// Subscribe and re-render the list on every change
    Watch {
        #[arg(long)]
        url: Option<String>,

        /// Print the view as HTML link items instead of terminal output
        #[arg(long)]
        html: bool,
    },
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "leadlist=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init { path, endpoint } => {
            println!("{}", "🚀 Initializing leadlist store...".cyan().bold());
            storage::init(&path, &endpoint).await?;
            println!("{}", "✓ Store initialized successfully!".green());
            println!("\n{}", "Next steps:".yellow());
            println!(
                "  1. {} - Start the store server",
                "leadlist serve".bright_white()
            );
            println!(
                "  2. {} - Save a lead",
                "leadlist add <url>".bright_white()
            );
            println!(
                "  3. {} - Follow the list live",
                "leadlist watch".bright_white()
            );
        }

        Commands::Serve { port, path } => {
            server::start(port, path).await?;
        }

        Commands::Add { value, url } => {
            let url = resolve_url(url).await?;
            let client = StoreClient::connect(&url).await?;
            let mut snapshots = client.subscribe();

            client.append(&value)?;
            let snapshot = await_snapshot(&mut snapshots, |snap| {
                snap.values().iter().any(|e| e.as_str() == value)
            })
            .await?;

            println!(
                "{} Saved {} {}",
                "✓".green(),
                value.bright_blue(),
                format!("({} total)", snapshot.len()).bright_black()
            );
        }

        Commands::Clear { url } => {
            let url = resolve_url(url).await?;
            let client = StoreClient::connect(&url).await?;
            let mut snapshots = client.subscribe();

            client.clear_all()?;
            await_snapshot(&mut snapshots, |snap| !snap.exists()).await?;

            println!("{} Collection cleared", "✓".green());
        }

        Commands::List { url } => {
            let url = resolve_url(url).await?;
            let client = StoreClient::connect(&url).await?;
            let mut snapshots = client.subscribe();

            // The first message is the current state.
            let snapshot = await_snapshot(&mut snapshots, |_| true).await?;
            TextList::new().render(snapshot.values());
        }

        Commands::Log { path } => {
            storage::show_list(&path).await?;
        }

        Commands::Watch { url, html } => {
            let url = resolve_url(url).await?;
            println!(
                "{} {}",
                "👁  Watching".cyan().bold(),
                url.bright_blue()
            );

            let client = StoreClient::connect(&url).await?;
            let snapshots = client.subscribe();

            let render: Box<dyn Render> = if html {
                let mut view = HtmlList::new();
                Box::new(move |entries: &[Entry]| {
                    view.render(entries);
                    println!("{}", view.html());
                })
            } else {
                Box::new(TextList::new())
            };

            let mut sync = ListSync::new(client, render);
            sync.drive(snapshots).await;

            // drive only returns once the snapshot channel closes
            anyhow::bail!("store connection closed");
        }
    }

    Ok(())
}

/// Use the explicit --url when given, otherwise fall back to the endpoint
/// recorded by `leadlist init` in the current directory.
async fn resolve_url(url: Option<String>) -> Result<String> {
    if let Some(url) = url {
        return Ok(url);
    }
    storage::configured_endpoint(Path::new("."))
        .await
        .ok_or_else(|| {
            anyhow!("no store endpoint: pass --url or run `leadlist init` first")
        })
}

/// Wait up to three seconds for a snapshot matching `accept`.
async fn await_snapshot(
    snapshots: &mut tokio::sync::broadcast::Receiver<Arc<Snapshot>>,
    accept: impl Fn(&Snapshot) -> bool,
) -> Result<Arc<Snapshot>> {
    tokio::time::timeout(Duration::from_secs(3), async {
        loop {
            match snapshots.recv().await {
                Ok(snapshot) if accept(snapshot.as_ref()) => return Ok(snapshot),
                Ok(_) => {}
                Err(tokio::sync::broadcast::error::RecvError::Lagged(_)) => {}
                Err(tokio::sync::broadcast::error::RecvError::Closed) => {
                    return Err(anyhow!("store connection closed"));
                }
            }
        }
    })
    .await
    .map_err(|_| anyhow!("timed out waiting for store notification"))?
}
