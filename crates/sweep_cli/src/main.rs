mod args;
mod config;
mod mysql;

use std::io::Read;
use std::process;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use regex::Regex;
use tracing::debug;

use sweep_core::conn::ConnectionParams;
use sweep_core::discover::ShardFilter;
use sweep_core::error::ConfigError;
use sweep_core::pipeline::run_gather;
use sweep_core::render::lookup_renderer;
use sweep_core::template::QueryTemplate;

use args::Args;
use config::{FileConfig, Settings};
use mysql::MySqlConnector;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("ssql: error: {:#}", e);
        process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let file = match &args.config {
        Some(path) => FileConfig::load(path)?,
        None => FileConfig::default(),
    };
    let settings = Settings::resolve(&args, &file)?;

    // Configuration mistakes surface here, before anything touches the
    // network or the operator types a password.
    let render = lookup_renderer(&settings.renderer)?;
    let pattern = Regex::new(&settings.shard_pattern).map_err(|e| ConfigError::Invalid {
        field: "database.shard_name_pattern",
        reason: e.to_string(),
    })?;

    let sql = read_sql(&args.sql)?;
    let template = QueryTemplate::new(sql);

    print_summary(&settings, &template);

    let password = match args.password.clone() {
        Some(password) => password,
        None => rpassword::prompt_password("Password: ").context("cannot read password")?,
    };

    let params = ConnectionParams::new(&settings.hostname, &settings.username, password);
    debug!(?params, "connecting");
    let connector = Arc::new(MySqlConnector::new(params));
    let filter = ShardFilter::new(settings.shard_pattern.clone(), move |name: &str| {
        pattern.is_match(name)
    });

    let report = run_gather(connector, template, &filter, settings.pool_size).await?;

    print!("{}", render(&report.aggregated));

    // Partial failure is reported, not fatal: the shards that answered
    // were rendered above, and the exit code stays zero. Discovery and
    // configuration problems have already aborted with non-zero by now.
    let failed = report.aggregated.failed_count();
    if failed > 0 {
        eprintln!("{} of {} shards failed:", failed, report.discovered.len());
        for failure in report.aggregated.failures() {
            eprintln!("  {}: {}", failure.shard, failure.error);
        }
    }

    Ok(())
}

fn read_sql(source: &str) -> Result<String> {
    if source == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("cannot read SQL from stdin")?;
        Ok(buf)
    } else {
        std::fs::read_to_string(source)
            .with_context(|| format!("cannot read SQL file: {source}"))
    }
}

fn print_summary(settings: &Settings, template: &QueryTemplate) {
    println!("Host: {}", settings.hostname);
    println!("Username: {}", settings.username);
    println!("Renderer: {}", settings.renderer);
    println!("Executor pool size: {}", settings.pool_size);
    println!("SQL to be executed for each shard:\n\n{}", template.raw());
}
