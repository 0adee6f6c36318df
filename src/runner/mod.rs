//! # Test Runner
//!
//! Discovers tests across modules, schedules them serially or in parallel
//! under a global timeout, and aggregates the outcomes into a [`Summary`].

pub mod discovery;
pub mod loader;
pub mod report;
pub mod scheduler;
pub mod suite;

use tracing::info;

use crate::config::Config;
use crate::error::Result;
use crate::testing::Harness;

pub use discovery::{Discovery, Matcher, discover};
pub use loader::{JsonLoader, ModuleLoader, Registry};
pub use report::{Aggregator, Outcome, RunResult, Summary};
pub use scheduler::Scheduler;
pub use suite::{FnTest, Suite, Test, TestEntry};

/// One runner invocation: discovery, scheduling and aggregation.
pub struct Runner<'a> {
    config: &'a Config,
    harness: &'a Harness,
    loader: &'a dyn ModuleLoader,
    echo: bool,
}

impl<'a> Runner<'a> {
    pub fn new(config: &'a Config, harness: &'a Harness, loader: &'a dyn ModuleLoader) -> Self {
        Self {
            config,
            harness,
            loader,
            echo: true,
        }
    }

    /// Suppresses the per-test lines and the discovery banner.
    pub fn quiet(mut self) -> Self {
        self.echo = false;
        self
    }

    /// Runs every selected test in `files`.
    ///
    /// Per-test failures end up in the returned [`Summary`]; only an invalid
    /// pattern, a module that fails to load or the timeout produce an `Err`.
    pub async fn run(&self, files: &[String]) -> Result<Summary> {
        let mut aggregator = if self.echo {
            Aggregator::new()
        } else {
            Aggregator::quiet()
        };

        let matcher = Matcher::new(&self.config.test_pattern)?;
        let discovery = discover(files, self.loader, self.harness, &matcher)?;
        info!(tests = discovery.count(), files = discovery.file_count, "discovery finished");
        if self.echo {
            println!("{}", discovery.banner());
        }

        Scheduler::from_config(self.config)
            .run(discovery.entries, &mut aggregator)
            .await?;
        Ok(aggregator.finish())
    }
}
