//! # gomarket
//!
//! Binary entry point. All logic lives in the library crate so it can be
//! tested without spawning a process.

use std::process::ExitCode;

use clap::Parser;
use gomarket_cli::{init_tracing, run, to_json, Cli};

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    match run(Cli::parse()).await {
        Ok(cart) => {
            println!("{}", to_json(&cart));
            ExitCode::SUCCESS
        }
        Err(err) => {
            println!("{}", to_json(&err));
            ExitCode::FAILURE
        }
    }
}
