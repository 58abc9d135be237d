//! Application wiring for quotewheel.
//!
//! `App` owns the configuration, the versioned asset cache, and the
//! rotation scheduler. The content tree is always loaded through the
//! cache router, so a previously cached copy keeps the daily rotation
//! working with no network at all.

use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Local;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::cache::{CacheLifecycleManager, CacheRouter, CacheStore, Request, Routed};
use crate::config::Config;
use crate::models::{ContentTree, NicknameFile};
use crate::net::HttpFetcher;
use crate::rotation::{flatten, RotationScheduler};
use crate::utils::format_minute_of_day;

// ============================================================================
// Constants
// ============================================================================

/// Buffer size for the rotation tick channel. One outstanding timer means
/// one pending tick; a little headroom costs nothing.
const TICK_CHANNEL_SIZE: usize = 8;

/// Shown whenever no quote can be computed.
const UNAVAILABLE_PLACEHOLDER: &str = "Quotes are currently unavailable.";

pub struct App {
    config: Config,
    lifecycle: CacheLifecycleManager,
    fetcher: HttpFetcher,
    scheduler: RotationScheduler,
}

impl App {
    pub fn new(config: Config) -> Result<Self> {
        let store = CacheStore::new(config.cache_dir()?)?;
        let lifecycle = CacheLifecycleManager::new(store, config.cache_manifest());
        let fetcher = HttpFetcher::new()?;
        Ok(Self {
            config,
            lifecycle,
            fetcher,
            scheduler: RotationScheduler::new(Vec::new()),
        })
    }

    /// Install the asset manifest and activate it, purging stale cache
    /// generations.
    pub async fn precache(&mut self) -> Result<()> {
        let cached = self.lifecycle.install(&self.fetcher).await?;
        let purged = self.lifecycle.activate()?;
        info!(
            version = self.lifecycle.version(),
            cached,
            purged = purged.len(),
            "Asset cache ready"
        );
        Ok(())
    }

    /// Fetch an asset through the cache router.
    async fn routed_asset(&self, url: &str) -> Result<Vec<u8>> {
        let router = CacheRouter::new(&self.lifecycle, &self.fetcher, &self.config.backend_host);
        match router.handle(&Request::get(url)).await {
            Routed::Network(response) if response.is_success() => Ok(response.body),
            Routed::Network(response) => {
                anyhow::bail!("Fetch of {} returned status {}", url, response.status)
            }
            Routed::Cached(entry) => Ok(entry.body),
            _ => anyhow::bail!("Asset unavailable: {}", url),
        }
    }

    /// (Re)load the content tree and rebuild the rotation source list.
    pub async fn load_content(&mut self) -> Result<()> {
        let url = self.config.content_url();
        let body = self.routed_asset(&url).await?;
        let tree: ContentTree =
            serde_json::from_slice(&body).context("Failed to parse content tree")?;

        let quotes = flatten(&tree);
        info!(parts = tree.parts.len(), quotes = quotes.len(), "Content tree loaded");
        self.scheduler.reload(quotes);
        Ok(())
    }

    /// Render the quote occupying the current time slot, or the
    /// placeholder when rotation is unavailable.
    pub fn render_current(&mut self) {
        match self.scheduler.current_quote(Local::now()) {
            Ok(quote) => {
                println!();
                println!("== {} ==", quote.theme);
                println!("{}", quote.text);
                println!("  ({})", quote.kind.label());
            }
            Err(e) => {
                warn!(error = %e, "No current quote");
                println!("{}", UNAVAILABLE_PLACEHOLDER);
            }
        }
    }

    /// Print today's schedule: the stats header plus one line per slot.
    pub fn print_schedule(&mut self) {
        let now = Local::now();
        let schedule = match self.scheduler.day_schedule(now) {
            Ok(schedule) => schedule,
            Err(e) => {
                warn!(error = %e, "No schedule");
                println!("{}", UNAVAILABLE_PLACEHOLDER);
                return;
            }
        };

        // slot_minutes cannot fail once day_schedule succeeded
        let slot = self.scheduler.slot_minutes().unwrap_or(0);
        println!("Schedule for {}:", now.format("%Y-%m-%d"));
        println!("  quotes: {}", self.scheduler.total_quotes());
        println!("  minutes per quote: {}", slot);
        println!("  changes per day: {}", schedule.len());
        println!();
        for entry in &schedule {
            println!(
                "  {}  [{}] {} - {}",
                format_minute_of_day(entry.start_minute),
                entry.kind.label(),
                entry.theme,
                entry.preview
            );
        }

        if let (Ok(current), Ok(delay)) = (
            self.scheduler.current_quote(now),
            self.scheduler.next_transition(now),
        ) {
            println!();
            println!("Current theme: {}", current.theme);
            println!("Next change in {} min", delay.as_secs() / 60);
        }
    }

    /// Suggest five nicknames from the nickname file, spread across it.
    pub async fn suggest_nicknames(&self) -> Result<Vec<String>> {
        let body = self.routed_asset(&self.config.nicknames_url()).await?;
        let file: NicknameFile =
            serde_json::from_slice(&body).context("Failed to parse nickname file")?;
        Ok(file.suggest(&mut rand::thread_rng()))
    }

    /// The display loop: render the current quote, arm the one-shot
    /// transition timer, re-render on every tick. Returns once rotation
    /// becomes unavailable or the tick channel closes.
    pub async fn run(&mut self) -> Result<()> {
        let (tx, mut rx) = mpsc::channel(TICK_CHANNEL_SIZE);
        loop {
            self.render_current();

            let delay = match self.scheduler.reschedule(Local::now(), tx.clone()) {
                Ok(delay) => delay,
                Err(e) => {
                    warn!(error = %e, "Rotation stopped");
                    return Ok(());
                }
            };

            // At an exact slot edge the delay clamps to zero; wait out the
            // rest of the second so the loop cannot spin.
            if delay.is_zero() {
                tokio::time::sleep(Duration::from_secs(1)).await;
                continue;
            }

            if rx.recv().await.is_none() {
                return Ok(());
            }
        }
    }
}
