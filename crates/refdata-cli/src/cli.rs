//! Argument parsing and config resolution.

use std::path::PathBuf;

use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};

use refdata_core::config::RefdataConfig;
use refdata_core::time::parse_ts;

#[derive(Parser, Debug)]
#[command(name = "refdata")]
#[command(about = "Bi-temporal reference data pipeline")]
#[command(version)]
pub struct Cli {
    /// TOML config file; missing sections fall back to defaults
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// SQLite database path (overrides storage.db_path)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Log level when RUST_LOG is unset (overrides observability.log_level)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Extract, normalise and merge a file of raw records
    Run(RunArgs),
    /// Reconstruct the rows known at a knowledge time
    Query(QueryArgs),
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// JSON array or JSON-lines file of raw records
    #[arg(long)]
    pub input: PathBuf,

    /// Accept facts older than the watermark
    #[arg(long)]
    pub allow_late: bool,

    /// Knowledge time stamped on this load (defaults to now)
    #[arg(long, value_parser = parse_instant)]
    pub knowledge_time: Option<DateTime<Utc>>,
}

#[derive(Args, Debug)]
pub struct QueryArgs {
    /// Knowledge instant, e.g. 2025-03-01T00:00:00Z
    #[arg(value_parser = parse_instant)]
    pub knowledge_time: DateTime<Utc>,

    /// Valid instant; omit to list every interval known at the knowledge instant
    #[arg(long, value_parser = parse_instant)]
    pub valid_time: Option<DateTime<Utc>>,

    /// Restrict to a business key (repeatable)
    #[arg(long = "security-id")]
    pub security_ids: Vec<String>,
}

fn parse_instant(raw: &str) -> Result<DateTime<Utc>, String> {
    parse_ts(raw).map_err(|e| e.to_string())
}

impl Cli {
    /// File config (or defaults), then flag overrides, then validation.
    pub fn load_config(&self) -> anyhow::Result<RefdataConfig> {
        let mut config = match &self.config {
            Some(path) => RefdataConfig::from_file(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => RefdataConfig::default(),
        };
        if let Some(db) = &self.db {
            config.storage.db_path = db.clone();
        }
        if let Some(level) = &self.log_level {
            config.observability.log_level = level.clone();
        }
        if self.json_logs {
            config.observability.json_logs = true;
        }
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_accepts_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "refdata",
            "run",
            "--input",
            "records.jsonl",
            "--allow-late",
            "--db",
            "/tmp/x.db",
            "--knowledge-time",
            "2025-01-05",
        ])
        .unwrap();
        let Command::Run(args) = &cli.command else {
            panic!("expected run");
        };
        assert!(args.allow_late);
        assert_eq!(args.knowledge_time, Some(parse_ts("2025-01-05").unwrap()));

        let config = cli.load_config().unwrap();
        assert_eq!(config.storage.db_path, PathBuf::from("/tmp/x.db"));
    }

    #[test]
    fn query_collects_repeated_keys() {
        let cli = Cli::try_parse_from([
            "refdata",
            "query",
            "2025-03-10T00:00:00Z",
            "--valid-time",
            "2025-02-20",
            "--security-id",
            "EQ1",
            "--security-id",
            "EQ2",
        ])
        .unwrap();
        let Command::Query(args) = cli.command else {
            panic!("expected query");
        };
        assert_eq!(args.security_ids, vec!["EQ1", "EQ2"]);
        assert_eq!(args.valid_time, Some(parse_ts("2025-02-20").unwrap()));
    }

    #[test]
    fn bad_instant_is_a_usage_error() {
        assert!(Cli::try_parse_from(["refdata", "query", "yesterday"]).is_err());
    }

    #[test]
    fn flags_override_defaults() {
        let cli = Cli::try_parse_from(["refdata", "--log-level", "debug", "--json-logs", "query", "2025-01-01"])
            .unwrap();
        let config = cli.load_config().unwrap();
        assert_eq!(config.observability.log_level, "debug");
        assert!(config.observability.json_logs);
        assert_eq!(config.storage.db_path, PathBuf::from("reference_data.db"));
    }
}
