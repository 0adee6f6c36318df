//! # Test Cases & Assertions
//!
//! A [`TestCase`] is one declaratively built HTTP request. Running it sends the
//! request, buffers the full response, hands it to an optional verifier and
//! then signals completion on its [`AssertionSink`].
//!
//! Status codes and bodies are never asserted here; verification belongs to
//! the caller's verifier or test body.

pub mod asserter;
pub mod case;
pub mod dump;
pub mod encode;
pub mod harness;

pub use asserter::{AssertionError, AssertionSink, Asserter, Completion, Verdict};
pub use case::{TestCase, Verifier};
pub use harness::Harness;
