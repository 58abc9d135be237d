//! quotewheel - a quote-of-the-day display with an offline asset cache.
//!
//! One quote from the content tree is "current" at any moment: the tree is
//! flattened, permuted once per calendar day, and mapped onto equal time
//! slots across the day. Static assets are served through a versioned
//! cache so everything keeps working offline.

mod app;
mod cache;
mod config;
mod models;
mod net;
mod rotation;
mod sync;
mod utils;

use std::io;

use anyhow::Result;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use app::App;

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // Set up logging with environment-based filter
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

fn print_usage() {
    eprintln!("Usage: quotewheel [--schedule | --precache | --nicknames]");
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    init_tracing();
    info!("quotewheel starting");

    let config = config::Config::load()?;
    let mut app = App::new(config)?;

    let args: Vec<String> = std::env::args().collect();
    match args.get(1).map(String::as_str) {
        Some("--precache") => {
            app.precache().await?;
        }
        Some("--schedule") => {
            if let Err(e) = app.precache().await {
                warn!(error = %e, "Pre-cache failed, continuing with existing cache");
            }
            if let Err(e) = app.load_content().await {
                warn!(error = %e, "Content tree unavailable");
            }
            app.print_schedule();
        }
        Some("--nicknames") => {
            for nickname in app.suggest_nicknames().await? {
                println!("{}", nickname);
            }
        }
        Some(other) => {
            eprintln!("Unknown option: {}", other);
            print_usage();
            std::process::exit(2);
        }
        None => {
            if let Err(e) = app.precache().await {
                warn!(error = %e, "Pre-cache failed, continuing with existing cache");
            }
            if let Err(e) = app.load_content().await {
                warn!(error = %e, "Content tree unavailable");
            }
            app.run().await?;
        }
    }

    info!("quotewheel shutting down");
    Ok(())
}
