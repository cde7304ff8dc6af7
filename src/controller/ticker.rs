//! Status ticker
//!
//! Cycles an index through a fixed list of loading phrases on a periodic
//! cadence. Each [`StatusTicker::start`] call begins a fresh run at index 0
//! and hands back a [`TickerHandle`]; dropping the handle aborts the
//! scheduled task, so no tick can fire after the owner lets go of it.

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::trace;

/// Next position in a cycle of `len` phrases
pub fn next_index(index: usize, len: usize) -> usize {
    if len == 0 { 0 } else { (index + 1) % len }
}

/// Phrase list plus cadence; cheap to clone
#[derive(Debug, Clone)]
pub struct StatusTicker {
    phrases: Arc<[String]>,
    period: Duration,
}

impl StatusTicker {
    pub fn new(phrases: Vec<String>, period: Duration) -> Self {
        Self {
            phrases: phrases.into(),
            period,
        }
    }

    pub fn phrase(&self, index: usize) -> Option<&str> {
        self.phrases.get(index).map(String::as_str)
    }

    /// Spawn a run that calls `on_tick` with the new index once per period
    ///
    /// The first call happens one full period after start; index 0 is the
    /// starting position and is never reported through `on_tick`.
    pub fn start<F>(&self, on_tick: F) -> TickerHandle
    where
        F: Fn(usize) + Send + 'static,
    {
        let len = self.phrases.len();
        let period = self.period;

        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut index = 0;
            loop {
                interval.tick().await;
                index = next_index(index, len);
                trace!("status ticker advanced to {}", index);
                on_tick(index);
            }
        });

        TickerHandle { task }
    }
}

/// Owner of one ticker run; aborts it on drop
#[derive(Debug)]
pub struct TickerHandle {
    task: JoinHandle<()>,
}

impl Drop for TickerHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}
