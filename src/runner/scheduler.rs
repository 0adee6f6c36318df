use std::future::Future;
use std::time::Duration;

use futures::future::{self, Either};
use futures::stream::{FuturesUnordered, StreamExt};
use tracing::{debug, warn};

use crate::config::{Config, RunMode};
use crate::error::{Error, Result};
use crate::testing::Asserter;

use super::report::{Aggregator, Outcome};
use super::suite::TestEntry;

/// Runs discovered entries serially or all at once, under one wall-clock budget.
///
/// Everything is driven from the calling task: parallel entries are
/// multiplexed, not spawned, so outcomes are recorded by a single owner.
#[derive(Debug, Clone, Copy)]
pub struct Scheduler {
    mode: RunMode,
    timeout: Duration,
}

impl Scheduler {
    pub fn new(mode: RunMode, timeout: Duration) -> Self {
        Self { mode, timeout }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.run_mode, config.timeout)
    }

    /// Runs every entry, recording each outcome as it completes.
    ///
    /// Returns [`Error::Timeout`] when the budget runs out first; entries
    /// still pending at that point are dropped without completing.
    pub async fn run(&self, entries: Vec<TestEntry>, aggregator: &mut Aggregator) -> Result<()> {
        debug!(mode = ?self.mode, entries = entries.len(), timeout = ?self.timeout, "scheduling tests");
        match tokio::time::timeout(self.timeout, self.drive(entries, aggregator)).await {
            Ok(()) => Ok(()),
            Err(_) => {
                warn!(completed = aggregator.completed(), "tests timed out");
                Err(Error::Timeout(self.timeout))
            }
        }
    }

    async fn drive(&self, entries: Vec<TestEntry>, aggregator: &mut Aggregator) {
        match self.mode {
            RunMode::Serial => {
                for entry in entries {
                    let outcome = start(entry).await;
                    aggregator.record(outcome);
                }
            }
            RunMode::Parallel => {
                let mut pending: FuturesUnordered<_> = entries.into_iter().map(start).collect();
                while let Some(outcome) = pending.next().await {
                    aggregator.record(outcome);
                }
            }
        }
    }
}

/// Invokes the entry's test immediately and returns its completion.
///
/// The entry is finished when its asserter is done, even if the test body's
/// own future is still pending; a body that returns first just leaves the
/// signal outstanding.
fn start(entry: TestEntry) -> impl Future<Output = Outcome> {
    let TestEntry { file, name, test } = entry;
    let (asserter, completion) = Asserter::new();
    let body = test.call(asserter);

    async move {
        let verdict = match future::select(body, completion).await {
            Either::Left(((), completion)) => completion.await,
            Either::Right((verdict, _body)) => verdict,
        };
        Outcome {
            file,
            name,
            verdict,
        }
    }
}
