use std::path::PathBuf;

use clap::Parser;

/// ssql: run one SQL statement across every shard database
#[derive(Debug, Parser)]
#[command(
    name = "ssql",
    about = "Cross-shard SQL gatherer for MySQL-compatible servers",
    version
)]
pub struct Args {
    /// SQL template file; `-` reads the template from stdin.
    /// `{db_name}` in the template is replaced with each shard's name.
    pub sql: String,

    /// Config file (TOML)
    #[arg(short = 'c', long, env = "SSQL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Database host
    #[arg(short = 'H', long, env = "SSQL_HOST")]
    pub host: Option<String>,

    /// Database user
    #[arg(short = 'u', long, env = "SSQL_USER")]
    pub user: Option<String>,

    /// Regex matched against database names to pick shards
    #[arg(short = 'p', long = "pattern", env = "SSQL_SHARD_PATTERN")]
    pub shard_pattern: Option<String>,

    /// Concurrent shard connections (default 5)
    #[arg(long, env = "SSQL_POOL_SIZE")]
    pub pool_size: Option<i64>,

    /// Output renderer: table, csv, json
    #[arg(short = 'r', long, env = "SSQL_RENDERER")]
    pub renderer: Option<String>,

    /// Password (use MYSQL_PWD to skip the interactive prompt)
    #[arg(short = 'W', long, env = "MYSQL_PWD", hide_env_values = true)]
    pub password: Option<String>,
}
