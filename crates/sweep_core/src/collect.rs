use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::conn::Connector;
use crate::error::DatabaseError;
use crate::row::RowSet;
use crate::template::QueryTemplate;

/// One unit of fan-out work: a single shard plus the template to run on
/// it. Immutable once built.
#[derive(Debug, Clone)]
pub struct CollectTask {
    pub shard: String,
    pub template: Arc<QueryTemplate>,
}

/// The result of collecting one shard.
///
/// Exactly one outcome exists per discovered shard. Failures are data,
/// not control flow: a failed shard is reported, never silently dropped
/// and never allowed to abort its siblings.
#[derive(Debug, Clone)]
pub enum ShardOutcome {
    Success { shard: String, rows: RowSet },
    Failure { shard: String, error: DatabaseError },
}

impl ShardOutcome {
    pub fn shard(&self) -> &str {
        match self {
            ShardOutcome::Success { shard, .. } | ShardOutcome::Failure { shard, .. } => shard,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ShardOutcome::Success { .. })
    }
}

/// Run the task's query on its shard.
///
/// Opens a fresh connection scoped to the shard database, substitutes the
/// shard name into the template, executes, and closes the connection on
/// every exit path. Nothing escapes this boundary as an `Err`.
pub async fn collect_shard(connector: &dyn Connector, task: &CollectTask) -> ShardOutcome {
    info!(shard = %task.shard, "running on shard");
    match try_collect(connector, task).await {
        Ok(rows) => {
            info!(shard = %task.shard, rows = rows.len(), "rows returned");
            ShardOutcome::Success {
                shard: task.shard.clone(),
                rows,
            }
        }
        Err(error) => {
            warn!(shard = %task.shard, %error, "shard collection failed");
            ShardOutcome::Failure {
                shard: task.shard.clone(),
                error,
            }
        }
    }
}

async fn try_collect(
    connector: &dyn Connector,
    task: &CollectTask,
) -> Result<RowSet, DatabaseError> {
    let mut conn = connector.connect(Some(&task.shard)).await?;
    let sql = task.template.resolve(&task.shard);
    let result = conn.query(&sql).await;
    // Teardown runs whether the query succeeded or not; a teardown
    // problem after a collected result set does not lose the data.
    if let Err(e) = conn.close().await {
        debug!(shard = %task.shard, %e, "connection teardown failed");
    }
    result
}
