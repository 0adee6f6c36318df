mod cli;

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;

use falkor::{Error, Harness, JsonLoader, Runner};

use cli::{Cli, init_tracing};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = cli.config();
    let harness = Harness::new(&config).context("failed to set up the HTTP harness")?;
    let loader = JsonLoader;

    match Runner::new(&config, &harness, &loader).run(&cli.files).await {
        Ok(summary) => {
            println!("{}", summary.render());
            Ok(ExitCode::from(summary.exit_code()))
        }
        Err(Error::Timeout(_)) => {
            eprintln!("FAILURE: Tests timed out, maybe done() was not called.");
            Ok(ExitCode::FAILURE)
        }
        Err(err) => Err(err.into()),
    }
}
