use std::fmt::Write;
use std::time::{Duration, Instant};

use crate::testing::{AssertionError, Verdict};

/// What one entry reported when it completed.
#[derive(Debug, Clone)]
pub struct Outcome {
    pub file: String,
    pub name: String,
    pub verdict: Verdict,
}

/// A failed entry, kept for the final summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunResult {
    pub file: String,
    pub name: String,
    pub errors: Vec<AssertionError>,
}

/// Collects outcomes as entries complete and echoes one pass/fail block each.
#[derive(Debug)]
pub struct Aggregator {
    started: Instant,
    passed: usize,
    failures: Vec<RunResult>,
    echo: bool,
}

impl Aggregator {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            passed: 0,
            failures: Vec::new(),
            echo: true,
        }
    }

    /// An aggregator that records without printing.
    pub fn quiet() -> Self {
        Self {
            echo: false,
            ..Self::new()
        }
    }

    pub fn record(&mut self, outcome: Outcome) {
        if self.echo {
            print!("{}", render_outcome(&outcome));
        }
        let Outcome {
            file,
            name,
            verdict,
        } = outcome;
        if verdict.passed() {
            self.passed += 1;
        } else {
            self.failures.push(RunResult {
                file,
                name,
                errors: verdict.errors,
            });
        }
    }

    pub fn completed(&self) -> usize {
        self.passed + self.failures.len()
    }

    pub fn finish(self) -> Summary {
        Summary {
            passed: self.passed,
            failures: self.failures,
            elapsed: self.started.elapsed(),
        }
    }
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::new()
    }
}

/// The pass/fail line for one entry, its error messages and any log lines.
pub fn render_outcome(outcome: &Outcome) -> String {
    let mut out = String::new();
    let Outcome {
        file,
        name,
        verdict,
    } = outcome;

    // Writing into a String cannot fail.
    if verdict.passed() {
        let _ = writeln!(out, "SUCCESS {file} {name}");
    } else {
        let _ = writeln!(out, "FAILURE {file} {name}");
        for error in &verdict.errors {
            let _ = writeln!(out, "{}", error.message);
        }
    }

    if !verdict.logs.is_empty() {
        let _ = writeln!(out, "Log Lines:");
        for line in &verdict.logs {
            let _ = writeln!(out, "{line}");
        }
        let _ = writeln!(out, "---");
    }
    out
}

/// Final tally of a completed run.
#[derive(Debug, Clone)]
pub struct Summary {
    pub passed: usize,
    pub failures: Vec<RunResult>,
    pub elapsed: Duration,
}

impl Summary {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn exit_code(&self) -> u8 {
        if self.is_success() { 0 } else { 1 }
    }

    pub fn render(&self) -> String {
        let time = format!(" ({}ms)", self.elapsed.as_millis());
        if self.is_success() {
            return format!("No errors, good job!{time}");
        }

        let failed = self
            .failures
            .iter()
            .map(|result| format!("{}:{}", result.file, result.name))
            .collect::<Vec<_>>()
            .join("\n");
        format!(
            "FINISHED WITH {} FAILURES{time}\n\nFailed tests:\n{failed}",
            self.failures.len()
        )
    }
}
