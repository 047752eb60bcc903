//! End-to-end pipeline tests against a fake connection capability: no
//! server, fully deterministic.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use sweep_core::conn::{Connection, Connector};
use sweep_core::discover::{discover_shards, ShardFilter};
use sweep_core::dispatch::fan_out;
use sweep_core::error::{DatabaseError, DiscoveryError, SweepError};
use sweep_core::pipeline::run_gather;
use sweep_core::row::{RowSet, Value};
use sweep_core::template::QueryTemplate;

/// In-memory stand-in for a MySQL-compatible server.
#[derive(Default)]
struct FakeServer {
    /// Databases in server listing order (shards and non-shards alike).
    databases: Vec<String>,
    /// Rows each shard returns for any non-listing query.
    rows: HashMap<String, RowSet>,
    /// Shards whose queries fail.
    failing: HashSet<String>,
    /// Whether `SHOW DATABASES` itself fails.
    fail_listing: bool,
    /// Every `connect` call's database argument, in call order.
    connects: Mutex<Vec<Option<String>>>,
    /// Every executed statement, in execution order.
    statements: Mutex<Vec<String>>,
}

impl FakeServer {
    fn with_databases(names: &[&str]) -> Self {
        FakeServer {
            databases: names.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    fn put_rows(&mut self, shard: &str, n: i64) {
        let mut set = RowSet::new(vec!["n".into()]);
        set.push_row(vec![Value::Int(n)]);
        self.rows.insert(shard.to_string(), set);
    }

    fn shard_connects(&self) -> Vec<String> {
        self.connects
            .lock()
            .unwrap()
            .iter()
            .filter_map(|db| db.clone())
            .collect()
    }
}

struct FakeConnector(Arc<FakeServer>);

struct FakeConnection {
    server: Arc<FakeServer>,
    database: Option<String>,
}

#[async_trait]
impl Connector for FakeConnector {
    async fn connect(
        &self,
        database: Option<&str>,
    ) -> Result<Box<dyn Connection>, DatabaseError> {
        self.0
            .connects
            .lock()
            .unwrap()
            .push(database.map(str::to_string));
        Ok(Box::new(FakeConnection {
            server: Arc::clone(&self.0),
            database: database.map(str::to_string),
        }))
    }
}

#[async_trait]
impl Connection for FakeConnection {
    async fn query(&mut self, sql: &str) -> Result<RowSet, DatabaseError> {
        self.server.statements.lock().unwrap().push(sql.to_string());

        if sql == "SHOW DATABASES" {
            if self.server.fail_listing {
                return Err(DatabaseError::query("server", "listing refused"));
            }
            let mut listing = RowSet::new(vec!["Database".into()]);
            for name in &self.server.databases {
                listing.push_row(vec![Value::Text(name.clone())]);
            }
            return Ok(listing);
        }

        let shard = self.database.as_deref().unwrap_or("server");
        if self.server.failing.contains(shard) {
            return Err(DatabaseError::query(shard, "synthetic shard failure"));
        }
        Ok(self
            .server
            .rows
            .get(shard)
            .cloned()
            .unwrap_or_else(|| RowSet::new(vec!["n".into()])))
    }

    async fn close(self: Box<Self>) -> Result<(), DatabaseError> {
        Ok(())
    }
}

fn shard_filter() -> ShardFilter {
    ShardFilter::new("^shard_", |name: &str| name.starts_with("shard_"))
}

fn count_template() -> QueryTemplate {
    QueryTemplate::new("SELECT COUNT(*) AS n FROM {db_name}.users")
}

#[tokio::test]
async fn all_shards_succeed() {
    let mut server = FakeServer::with_databases(&["shard_1", "shard_2", "shard_3", "other"]);
    server.put_rows("shard_1", 10);
    server.put_rows("shard_2", 20);
    server.put_rows("shard_3", 30);
    let server = Arc::new(server);
    let connector = Arc::new(FakeConnector(Arc::clone(&server)));

    let report = run_gather(connector, count_template(), &shard_filter(), 5)
        .await
        .unwrap();

    assert_eq!(report.discovered, ["shard_1", "shard_2", "shard_3"]);
    let keys: Vec<&str> = report.aggregated.shards().collect();
    assert_eq!(keys, ["shard_1", "shard_2", "shard_3"]);
    assert_eq!(report.aggregated.failed_count(), 0);
    assert_eq!(
        report.aggregated.get("shard_2").unwrap().rows()[0][0],
        Value::Int(20)
    );
}

#[tokio::test]
async fn one_failing_shard_is_reported_not_fatal() {
    let mut server = FakeServer::with_databases(&["shard_1", "shard_2", "shard_3"]);
    server.put_rows("shard_1", 1);
    server.put_rows("shard_3", 3);
    server.failing.insert("shard_2".into());
    let connector = Arc::new(FakeConnector(Arc::new(server)));

    let report = run_gather(connector, count_template(), &shard_filter(), 5)
        .await
        .unwrap();

    assert_eq!(report.aggregated.len(), 2);
    assert_eq!(report.aggregated.failed_count(), 1);
    assert_eq!(report.aggregated.failures()[0].shard, "shard_2");
    assert!(report.aggregated.get("shard_2").is_none());
}

#[tokio::test]
async fn all_shards_failing_is_still_not_discovery_error() {
    let mut server = FakeServer::with_databases(&["shard_1", "shard_2"]);
    server.failing.insert("shard_1".into());
    server.failing.insert("shard_2".into());
    let connector = Arc::new(FakeConnector(Arc::new(server)));

    let report = run_gather(connector, count_template(), &shard_filter(), 5)
        .await
        .unwrap();

    assert!(report.aggregated.is_empty());
    assert_eq!(report.aggregated.failed_count(), 2);
    assert_eq!(report.discovered.len(), 2);
}

#[tokio::test]
async fn submission_order_follows_discovery_order() {
    let mut server = FakeServer::with_databases(&["shard_1", "shard_2", "shard_3"]);
    server.put_rows("shard_1", 1);
    server.put_rows("shard_2", 2);
    server.put_rows("shard_3", 3);
    let server = Arc::new(server);
    let connector = Arc::new(FakeConnector(Arc::clone(&server)));

    // pool of one serializes the workers, exposing submission order
    let report = run_gather(connector, count_template(), &shard_filter(), 1)
        .await
        .unwrap();

    assert_eq!(report.discovered, ["shard_1", "shard_2", "shard_3"]);
    assert_eq!(server.shard_connects(), ["shard_1", "shard_2", "shard_3"]);
}

#[tokio::test]
async fn discovery_filters_and_preserves_server_order() {
    let server = Arc::new(FakeServer::with_databases(&[
        "shard_1",
        "shard_2",
        "other",
        "information_schema",
    ]));
    let connector = FakeConnector(Arc::clone(&server));

    let shards = discover_shards(&connector, &shard_filter()).await.unwrap();
    assert_eq!(shards, ["shard_1", "shard_2"]);
}

#[tokio::test]
async fn empty_match_is_fatal_before_any_collection() {
    let server = Arc::new(FakeServer::with_databases(&[
        "shard_1",
        "shard_2",
        "other",
        "information_schema",
    ]));
    let connector = Arc::new(FakeConnector(Arc::clone(&server)));

    let filter = ShardFilter::new("^nomatch_", |name: &str| name.starts_with("nomatch_"));
    let err = run_gather(connector, count_template(), &filter, 5)
        .await
        .unwrap_err();

    match err {
        SweepError::Discovery(DiscoveryError::NoMatch { pattern }) => {
            assert_eq!(pattern, "^nomatch_");
        }
        other => panic!("expected NoMatch, got {other}"),
    }
    // no shard connection was ever opened
    assert!(server.shard_connects().is_empty());
}

#[tokio::test]
async fn listing_failure_is_fatal() {
    let mut server = FakeServer::with_databases(&["shard_1"]);
    server.fail_listing = true;
    let connector = Arc::new(FakeConnector(Arc::new(server)));

    let err = run_gather(connector, count_template(), &shard_filter(), 5)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        SweepError::Discovery(DiscoveryError::Enumerate(_))
    ));
}

#[tokio::test]
async fn template_is_resolved_per_shard() {
    let mut server = FakeServer::with_databases(&["shard_1", "shard_2"]);
    server.put_rows("shard_1", 1);
    server.put_rows("shard_2", 2);
    let server = Arc::new(server);
    let connector = Arc::new(FakeConnector(Arc::clone(&server)));

    run_gather(connector, count_template(), &shard_filter(), 1)
        .await
        .unwrap();

    let statements = server.statements.lock().unwrap().clone();
    assert!(statements.contains(&"SELECT COUNT(*) AS n FROM shard_1.users".to_string()));
    assert!(statements.contains(&"SELECT COUNT(*) AS n FROM shard_2.users".to_string()));
    assert!(!statements.iter().any(|s| s.contains("{db_name}")));
}

#[tokio::test]
async fn fan_out_handles_more_shards_than_workers() {
    let mut server = FakeServer::with_databases(&[]);
    let shards: Vec<String> = (0..20).map(|i| format!("shard_{i}")).collect();
    for (i, shard) in shards.iter().enumerate() {
        server.put_rows(shard, i as i64);
    }
    let connector: Arc<dyn Connector> = Arc::new(FakeConnector(Arc::new(server)));

    let outcomes = fan_out(connector, Arc::new(count_template()), &shards, 3)
        .await
        .unwrap();

    assert_eq!(outcomes.len(), 20);
    assert!(outcomes.iter().all(|o| o.is_success()));
    // barrier result stays in submission order
    let order: Vec<&str> = outcomes.iter().map(|o| o.shard()).collect();
    let expected: Vec<&str> = shards.iter().map(String::as_str).collect();
    assert_eq!(order, expected);
}
