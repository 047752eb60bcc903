use std::sync::Arc;

use tracing::info;

use crate::aggregate::AggregatedResult;
use crate::conn::Connector;
use crate::discover::{discover_shards, ShardFilter};
use crate::dispatch::fan_out;
use crate::error::SweepResult;
use crate::template::QueryTemplate;

/// Everything one gather run produced: the folded per-shard results and
/// the shard list discovery targeted.
#[derive(Debug)]
pub struct GatherReport {
    pub aggregated: AggregatedResult,
    pub discovered: Vec<String>,
}

/// The full gather pipeline: discover shards, fan the template out across
/// them, fold the outcomes.
///
/// Rendering is deliberately the caller's last step, so a renderer
/// mistake is rejected before this ever runs. Shard failures do not fail the
/// pipeline; they come back inside the aggregate for the caller to
/// report.
pub async fn run_gather(
    connector: Arc<dyn Connector>,
    template: QueryTemplate,
    filter: &ShardFilter,
    pool_size: usize,
) -> SweepResult<GatherReport> {
    let shards = discover_shards(connector.as_ref(), filter).await?;
    info!(shards = shards.len(), "shards discovered");

    let outcomes = fan_out(connector, Arc::new(template), &shards, pool_size).await?;
    let aggregated = AggregatedResult::from_outcomes(outcomes);
    if aggregated.failed_count() > 0 {
        info!(
            failed = aggregated.failed_count(),
            total = shards.len(),
            "gather finished with failures"
        );
    }

    Ok(GatherReport {
        aggregated,
        discovered: shards,
    })
}
