//! Simulated work. Nothing is actually created; the bot only waits.

use std::{
    future::Future,
    sync::atomic::{AtomicU64, AtomicUsize, Ordering},
    time::Duration,
};

use async_trait::async_trait;

use crate::Result;

/// Largest group count `/createbulk` accepts.
pub const MAX_BULK_GROUPS: u32 = 5;

#[async_trait]
pub trait WorkSimulator: Send + Sync {
    async fn pause(&self, duration: Duration);
}

/// Real delays via `tokio::time::sleep`.
#[derive(Clone, Copy, Debug, Default)]
pub struct SleepSimulator;

#[async_trait]
impl WorkSimulator for SleepSimulator {
    async fn pause(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Completes immediately while recording what would have been waited.
#[derive(Debug, Default)]
pub struct InstantSimulator {
    pauses: AtomicUsize,
    total_ms: AtomicU64,
}

impl InstantSimulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pauses(&self) -> usize {
        self.pauses.load(Ordering::SeqCst)
    }

    pub fn total(&self) -> Duration {
        Duration::from_millis(self.total_ms.load(Ordering::SeqCst))
    }
}

#[async_trait]
impl WorkSimulator for InstantSimulator {
    async fn pause(&self, duration: Duration) {
        self.pauses.fetch_add(1, Ordering::SeqCst);
        self.total_ms
            .fetch_add(duration.as_millis() as u64, Ordering::SeqCst);
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProgressStep {
    pub done: u32,
    pub total: u32,
    pub percent: u32,
}

impl ProgressStep {
    pub fn new(done: u32, total: u32) -> Self {
        let percent = if total == 0 { 100 } else { done * 100 / total };
        Self {
            done,
            total,
            percent,
        }
    }
}

/// Drive a bulk run: `on_step` fires once per group with a rising percentage,
/// each step followed by one `step` pause. The first error aborts the run.
pub async fn run_bulk<F, Fut>(
    count: u32,
    step: Duration,
    simulator: &dyn WorkSimulator,
    mut on_step: F,
) -> Result<()>
where
    F: FnMut(ProgressStep) -> Fut,
    Fut: Future<Output = Result<()>>,
{
    for done in 1..=count {
        on_step(ProgressStep::new(done, count)).await?;
        simulator.pause(step).await;
    }
    Ok(())
}

/// Parse a group count the lenient way: skip leading whitespace, read an
/// optional sign and the leading digits, ignore the rest.
pub fn parse_leading_int(text: &str) -> Option<i64> {
    let s = text.trim_start();
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let digits: &str = {
        let end = rest
            .bytes()
            .position(|b| !b.is_ascii_digit())
            .unwrap_or(rest.len());
        &rest[..end]
    };
    if digits.is_empty() {
        return None;
    }

    // Anything too long to fit is out of range anyway.
    let value = digits.parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -value } else { value })
}

/// A usable bulk count in `1..=MAX_BULK_GROUPS`.
pub fn parse_bulk_count(text: &str) -> Option<u32> {
    let n = parse_leading_int(text)?;
    if (1..=MAX_BULK_GROUPS as i64).contains(&n) {
        Some(n as u32)
    } else {
        None
    }
}
