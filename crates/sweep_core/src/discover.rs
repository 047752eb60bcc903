use tracing::debug;

use crate::conn::Connector;
use crate::error::DiscoveryError;

const LIST_DATABASES: &str = "SHOW DATABASES";

/// Decides which database names count as shards.
///
/// The predicate is opaque to the pipeline; the label is whatever the
/// caller wants an operator to see when the filter matches nothing
/// (typically the regex source).
pub struct ShardFilter {
    label: String,
    predicate: Box<dyn Fn(&str) -> bool + Send + Sync>,
}

impl ShardFilter {
    pub fn new(
        label: impl Into<String>,
        predicate: impl Fn(&str) -> bool + Send + Sync + 'static,
    ) -> Self {
        ShardFilter {
            label: label.into(),
            predicate: Box::new(predicate),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn accepts(&self, name: &str) -> bool {
        (self.predicate)(name)
    }
}

impl std::fmt::Debug for ShardFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShardFilter")
            .field("label", &self.label)
            .finish()
    }
}

/// List every database on the server and keep the ones the filter
/// accepts, preserving the server-reported order.
///
/// One connection with no database selected, closed on every exit path.
/// Both failure modes are fatal: the server cannot be enumerated, or the
/// filter accepts nothing.
pub async fn discover_shards(
    connector: &dyn Connector,
    filter: &ShardFilter,
) -> Result<Vec<String>, DiscoveryError> {
    let mut conn = connector.connect(None).await?;
    let listed = conn.query(LIST_DATABASES).await;
    if let Err(e) = conn.close().await {
        debug!(%e, "discovery connection teardown failed");
    }
    let names = listed?;

    let shards: Vec<String> = names
        .rows()
        .iter()
        .filter_map(|row| row.first())
        .filter_map(|value| value.to_text())
        .filter(|name| filter.accepts(name))
        .collect();
    debug!(
        listed = names.len(),
        matched = shards.len(),
        "database discovery complete"
    );

    if shards.is_empty() {
        return Err(DiscoveryError::NoMatch {
            pattern: filter.label().to_string(),
        });
    }
    Ok(shards)
}
