//! The rotation scheduler: which quote is current, and when it changes.
//!
//! The day is partitioned into `floor(1440 / n)`-minute slots, one per
//! quote of the day's permuted order. The permuted order and slot width
//! live in `RotationState`, owned exclusively by the scheduler and rebuilt
//! whenever the content is reloaded or the day boundary is crossed.

use std::time::Duration;

use chrono::{DateTime, Local, Timelike};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::models::{QuoteItem, QuoteKind};
use crate::rotation::permute::{day_seed, permute};
use crate::utils::truncate_string;

// ============================================================================
// Constants
// ============================================================================

/// Minutes in a calendar day; also the upper bound on rotatable quotes.
pub const MINUTES_PER_DAY: u32 = 1440;

/// Length of the quote preview shown in the day schedule.
const PREVIEW_LENGTH: usize = 50;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RotationError {
    /// The flattened quote list is empty; callers show a placeholder.
    #[error("no quotes available")]
    Empty,

    /// More quotes than minutes in a day would make the slot width zero.
    /// Defined failure condition, not special-cased beyond reporting.
    #[error("{0} quotes exceed the {MINUTES_PER_DAY} minute slots in a day")]
    TooManyQuotes(usize),
}

/// One row of the day schedule.
#[derive(Debug, Clone)]
pub struct ScheduleEntry {
    pub start_minute: u32,
    pub theme: String,
    pub kind: QuoteKind,
    pub preview: String,
}

/// Per-day derived state: the permuted order and slot width for one
/// calendar day, tagged with the day-epoch seed it was built from.
#[derive(Debug)]
struct RotationState {
    permuted: Vec<QuoteItem>,
    slot_minutes: u32,
    day_epoch_ms: i64,
}

pub struct RotationScheduler {
    /// Flattened quotes in tree order, the permutation input.
    source: Vec<QuoteItem>,
    state: Option<RotationState>,
    /// At most one outstanding transition timer.
    timer: Option<JoinHandle<()>>,
}

impl RotationScheduler {
    pub fn new(quotes: Vec<QuoteItem>) -> Self {
        Self {
            source: quotes,
            state: None,
            timer: None,
        }
    }

    pub fn total_quotes(&self) -> usize {
        self.source.len()
    }

    /// Slot width in minutes for the current quote count.
    pub fn slot_minutes(&self) -> Result<u32, RotationError> {
        let n = self.source.len();
        if n == 0 {
            return Err(RotationError::Empty);
        }
        let slot = MINUTES_PER_DAY / n as u32;
        if slot == 0 {
            return Err(RotationError::TooManyQuotes(n));
        }
        Ok(slot)
    }

    /// Replace the quote list after a content reload. The day state is
    /// discarded and rebuilt on the next query.
    pub fn reload(&mut self, quotes: Vec<QuoteItem>) {
        self.source = quotes;
        self.state = None;
    }

    /// Rebuild the day state if the content was reloaded or the stored
    /// day epoch no longer matches today's.
    fn ensure_state(&mut self, now: DateTime<Local>) -> Result<&RotationState, RotationError> {
        let slot_minutes = self.slot_minutes()?;
        let seed = day_seed(now);

        let fresh = match &self.state {
            Some(state) => state.day_epoch_ms != seed,
            None => true,
        };
        if fresh {
            let mut permuted = self.source.clone();
            permute(&mut permuted, seed);
            debug!(
                quotes = permuted.len(),
                slot_minutes,
                day_epoch_ms = seed,
                "Rebuilt rotation state"
            );
            self.state = Some(RotationState {
                permuted,
                slot_minutes,
                day_epoch_ms: seed,
            });
        }

        // Just ensured above
        self.state.as_ref().ok_or(RotationError::Empty)
    }

    /// The quote occupying the slot that contains `now`.
    pub fn current_quote(&mut self, now: DateTime<Local>) -> Result<QuoteItem, RotationError> {
        let state = self.ensure_state(now)?;
        let minute = minute_of_day(now);
        let index = (minute / state.slot_minutes) as usize % state.permuted.len();
        Ok(state.permuted[index].clone())
    }

    /// Delay until the next slot boundary, clamped to zero at an edge.
    pub fn next_transition(&mut self, now: DateTime<Local>) -> Result<Duration, RotationError> {
        let state = self.ensure_state(now)?;
        let slot = state.slot_minutes;
        let minute = minute_of_day(now);
        let next_edge = minute.div_ceil(slot) * slot;
        let delay_ms =
            (i64::from(next_edge) - i64::from(minute)) * 60_000 - i64::from(now.second()) * 1_000;
        Ok(Duration::from_millis(delay_ms.max(0) as u64))
    }

    /// Today's full schedule: one entry per slot in permuted order.
    pub fn day_schedule(&mut self, now: DateTime<Local>) -> Result<Vec<ScheduleEntry>, RotationError> {
        let state = self.ensure_state(now)?;
        Ok(state
            .permuted
            .iter()
            .enumerate()
            .map(|(i, quote)| ScheduleEntry {
                start_minute: i as u32 * state.slot_minutes,
                theme: quote.theme.clone(),
                kind: quote.kind,
                preview: truncate_string(&quote.text, PREVIEW_LENGTH),
            })
            .collect())
    }

    /// Arm the transition timer: cancel any outstanding one, then schedule
    /// a single tick on `tx` at the next slot boundary. Returns the delay.
    pub fn reschedule(
        &mut self,
        now: DateTime<Local>,
        tx: mpsc::Sender<()>,
    ) -> Result<Duration, RotationError> {
        let delay = self.next_transition(now)?;
        self.cancel_timer();
        debug!(delay_ms = delay.as_millis() as u64, "Arming rotation timer");
        self.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(()).await;
        }));
        Ok(delay)
    }

    pub fn cancel_timer(&mut self) {
        if let Some(handle) = self.timer.take() {
            handle.abort();
        }
    }
}

impl Drop for RotationScheduler {
    fn drop(&mut self) {
        self.cancel_timer();
    }
}

fn minute_of_day(now: DateTime<Local>) -> u32 {
    now.hour() * 60 + now.minute()
}

// ============================================================================
// Tests
// ============================================================================
