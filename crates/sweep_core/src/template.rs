/// The one placeholder a query template may carry. Substitution is a
/// plain textual replacement, not a general formatting language.
pub const SHARD_PLACEHOLDER: &str = "{db_name}";

/// A SQL statement template, executed once per shard after the shard name
/// has been substituted for every [`SHARD_PLACEHOLDER`] occurrence.
///
/// Immutable once loaded; shared read-only by all workers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryTemplate {
    raw: String,
}

impl QueryTemplate {
    pub fn new(raw: impl Into<String>) -> Self {
        QueryTemplate { raw: raw.into() }
    }

    /// The template text as loaded.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Resolve the template for one shard.
    pub fn resolve(&self, shard: &str) -> String {
        self.raw.replace(SHARD_PLACEHOLDER, shard)
    }

    /// Whether the template references the shard placeholder at all.
    pub fn mentions_shard(&self) -> bool {
        self.raw.contains(SHARD_PLACEHOLDER)
    }
}
