//! Core pipeline for running one SQL statement across many shard
//! databases: discover the shards by name, fan the statement out over a
//! bounded worker pool, fold the per-shard outcomes into a single result
//! keyed by shard, and hand that to a named renderer.
//!
//! The database driver lives behind the [`conn::Connector`] seam so the
//! whole pipeline runs against a fake in tests.

pub mod aggregate;
pub mod collect;
pub mod conn;
pub mod discover;
pub mod dispatch;
pub mod error;
pub mod pipeline;
pub mod render;
pub mod row;
pub mod template;

pub use aggregate::{AggregatedResult, ShardFailure};
pub use collect::ShardOutcome;
pub use conn::{Connection, ConnectionParams, Connector};
pub use discover::ShardFilter;
pub use dispatch::DEFAULT_POOL_SIZE;
pub use error::{ConfigError, DatabaseError, DiscoveryError, SweepError, SweepResult};
pub use pipeline::{run_gather, GatherReport};
pub use render::{lookup_renderer, renderer_names, RenderFn, DEFAULT_RENDERER};
pub use row::{RowSet, Value};
pub use template::QueryTemplate;
