//! `refdata`: load reference data files into the bi-temporal store and
//! query point-in-time snapshots.
//!
//! ```bash
//! # Load a JSON-lines file, stamping every row with the current time
//! refdata run --input data/securities.jsonl
//!
//! # What did we believe on 2025-03-10 about 2025-02-20?
//! refdata query 2025-03-10T00:00:00Z --valid-time 2025-02-20 --security-id EQ1
//! ```

mod cli;
mod commands;
mod logging;

use clap::Parser;

use cli::{Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli.load_config()?;
    logging::init(&config.observability);

    match cli.command {
        Command::Run(args) => commands::run(&config, args).await,
        Command::Query(args) => commands::query(&config, args).await,
    }
}
