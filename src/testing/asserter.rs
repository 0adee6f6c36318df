use std::fmt::Debug;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use thiserror::Error;
use tokio::sync::oneshot;

/// A single recorded failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct AssertionError {
    pub message: String,
}

impl AssertionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Collects the outcome of one test case and is told when it is finished.
///
/// `done` consumes the sink, so completion can be signaled at most once.
pub trait AssertionSink: Send {
    fn fail(&mut self, error: AssertionError);

    fn log(&mut self, line: String);

    fn done(self: Box<Self>);

    /// Records `message` as a failure unless `condition` holds.
    fn check(&mut self, condition: bool, message: &str) {
        if !condition {
            self.fail(AssertionError::new(message));
        }
    }
}

/// Everything a test reported by the time it called `done`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Verdict {
    pub errors: Vec<AssertionError>,
    pub logs: Vec<String>,
}

impl Verdict {
    pub fn passed(&self) -> bool {
        self.errors.is_empty()
    }
}

/// The sink handed to every discovered test by the runner.
#[derive(Debug)]
pub struct Asserter {
    verdict: Verdict,
    signal: Option<oneshot::Sender<Verdict>>,
}

impl Asserter {
    /// Creates an asserter and the completion handle that resolves once it is done.
    pub fn new() -> (Self, Completion) {
        let (tx, rx) = oneshot::channel();
        let asserter = Self {
            verdict: Verdict::default(),
            signal: Some(tx),
        };
        (asserter, Completion(rx))
    }

    pub fn ok(&mut self, condition: bool, message: &str) {
        self.check(condition, message);
    }

    pub fn equal<T: PartialEq + Debug>(&mut self, actual: T, expected: T, message: &str) {
        if actual != expected {
            self.fail(AssertionError::new(format!(
                "{message}: expected {expected:?}, got {actual:?}"
            )));
        }
    }

    pub fn errors(&self) -> &[AssertionError] {
        &self.verdict.errors
    }

    pub fn done(mut self) {
        if let Some(signal) = self.signal.take() {
            let verdict = std::mem::take(&mut self.verdict);
            // The runner may already have given up on this test after a timeout.
            let _ = signal.send(verdict);
        }
    }
}

impl AssertionSink for Asserter {
    fn fail(&mut self, error: AssertionError) {
        self.verdict.errors.push(error);
    }

    fn log(&mut self, line: String) {
        self.verdict.logs.push(line);
    }

    fn done(self: Box<Self>) {
        Asserter::done(*self)
    }
}

/// Resolves with the [`Verdict`] once the paired [`Asserter`] is done.
///
/// An asserter dropped without `done` resolves as a failure.
#[derive(Debug)]
pub struct Completion(oneshot::Receiver<Verdict>);

impl Future for Completion {
    type Output = Verdict;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.0).poll(cx).map(|result| {
            result.unwrap_or_else(|_| Verdict {
                errors: vec![AssertionError::new("Test finished without calling done()")],
                logs: Vec::new(),
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn done_delivers_failures_and_logs() {
        let (mut asserter, completion) = Asserter::new();
        asserter.ok(false, "status should be 200");
        asserter.equal(1, 2, "count");
        asserter.log("saw response".to_string());
        asserter.done();

        let verdict = completion.await;
        assert!(!verdict.passed());
        assert_eq!(verdict.errors.len(), 2);
        assert_eq!(verdict.errors[0].message, "status should be 200");
        assert_eq!(verdict.errors[1].message, "count: expected 2, got 1");
        assert_eq!(verdict.logs, vec!["saw response".to_string()]);
    }

    #[tokio::test]
    async fn passing_checks_record_nothing() {
        let (mut asserter, completion) = Asserter::new();
        asserter.ok(true, "unused");
        asserter.equal("a", "a", "unused");
        asserter.done();
        assert!(completion.await.passed());
    }

    #[tokio::test]
    async fn dropping_without_done_is_a_failure() {
        let (asserter, completion) = Asserter::new();
        drop(asserter);
        let verdict = completion.await;
        assert_eq!(verdict.errors[0].message, "Test finished without calling done()");
    }

    #[tokio::test]
    async fn boxed_sink_signals_through_trait() {
        let (asserter, completion) = Asserter::new();
        let mut sink: Box<dyn AssertionSink> = Box::new(asserter);
        sink.check(false, "boom");
        sink.done();
        assert_eq!(completion.await.errors, vec![AssertionError::new("boom")]);
    }
}
