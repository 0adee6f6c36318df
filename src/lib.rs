//! Falkor: fluent HTTP integration tests and a runner for them.
//!
//! ```no_run
//! use falkor::{Asserter, Config, Harness, Registry, Runner, Suite};
//! use serde_json::json;
//!
//! # async fn demo() -> falkor::Result<()> {
//! let config = Config {
//!     base_url: Some("http://localhost:3000".into()),
//!     ..Config::default()
//! };
//! let harness = Harness::new(&config)?;
//! let registry = Registry::new().register("users", |harness: &Harness| {
//!     Suite::new()
//!         .test(
//!             "create user",
//!             harness
//!                 .fetch("/users")
//!                 .with_method("post")
//!                 .with_json_payload(&json!({"name": "ann"}))
//!                 .with_verifier(|response, sink| {
//!                     sink.check(response.status.as_u16() == 201, "expected 201 Created");
//!                 }),
//!         )
//!         .test_fn("custom", |mut asserter: Asserter| async move {
//!             asserter.ok(true, "always passes");
//!             asserter.done();
//!         })
//! });
//!
//! let summary = Runner::new(&config, &harness, &registry)
//!     .run(&["users".to_string()])
//!     .await?;
//! println!("{}", summary.render());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod http;
pub mod runner;
pub mod testing;

pub use config::{Config, RunMode};
pub use error::{Error, Result, TransportError};
pub use runner::{JsonLoader, ModuleLoader, Registry, Runner, Suite, Summary, Test};
pub use testing::{AssertionError, AssertionSink, Asserter, Harness, TestCase};
