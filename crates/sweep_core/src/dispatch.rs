use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::Semaphore;
use tracing::debug;

use crate::collect::{collect_shard, CollectTask, ShardOutcome};
use crate::conn::Connector;
use crate::error::SweepError;
use crate::template::QueryTemplate;

/// Default number of concurrent shard workers.
pub const DEFAULT_POOL_SIZE: usize = 5;

/// Clamp a configured pool size to something usable.
///
/// Unset, zero, or negative values fall back to the default so a
/// misconfigured pool can never deadlock at zero workers.
pub fn normalize_pool_size(configured: Option<i64>) -> usize {
    match configured {
        Some(n) if n > 0 => n as usize,
        _ => DEFAULT_POOL_SIZE,
    }
}

/// Fan the template out over every discovered shard with at most
/// `pool_size` collections in flight.
///
/// Tasks are submitted in discovery order: a permit is taken before each
/// spawn, so the next shard is only submitted once a worker slot frees
/// up. Completion order is unconstrained. Returns only when every shard
/// has produced its outcome (bulk-synchronous barrier), in submission
/// order.
///
/// A shard failure is an outcome, never an error here; `fan_out` itself
/// fails only if the task mechanism breaks underneath us.
pub async fn fan_out(
    connector: Arc<dyn Connector>,
    template: Arc<QueryTemplate>,
    shards: &[String],
    pool_size: usize,
) -> Result<Vec<ShardOutcome>, SweepError> {
    let pool_size = pool_size.max(1);
    let permits = Arc::new(Semaphore::new(pool_size));
    debug!(shards = shards.len(), pool_size, "dispatching shard tasks");

    let mut handles = Vec::with_capacity(shards.len());
    for shard in shards {
        let permit = Arc::clone(&permits)
            .acquire_owned()
            .await
            .map_err(|e| SweepError::Internal(format!("worker pool unavailable: {e}")))?;
        let task = CollectTask {
            shard: shard.clone(),
            template: Arc::clone(&template),
        };
        let connector = Arc::clone(&connector);
        handles.push(tokio::spawn(async move {
            let _permit = permit;
            collect_shard(connector.as_ref(), &task).await
        }));
    }

    let mut outcomes = Vec::with_capacity(handles.len());
    for joined in join_all(handles).await {
        match joined {
            Ok(outcome) => outcomes.push(outcome),
            Err(e) => {
                return Err(SweepError::Internal(format!("shard worker aborted: {e}")));
            }
        }
    }
    Ok(outcomes)
}
