//! MySQL driver adapter: the one place that knows `mysql_async`.

use async_trait::async_trait;
use mysql_async::prelude::Queryable;
use mysql_async::{Conn, OptsBuilder, Row as MySqlRow, Value as MySqlValue};

use sweep_core::conn::{Connection, ConnectionParams, Connector};
use sweep_core::error::DatabaseError;
use sweep_core::row::{RowSet, Value};

/// [`Connector`] backed by a MySQL-compatible server.
///
/// Every `connect` opens a fresh connection; workers never share one.
pub struct MySqlConnector {
    params: ConnectionParams,
}

impl MySqlConnector {
    pub fn new(params: ConnectionParams) -> Self {
        MySqlConnector { params }
    }

    fn opts(&self, database: Option<&str>) -> OptsBuilder {
        let mut builder = OptsBuilder::default()
            .ip_or_hostname(self.params.hostname.clone())
            .user(Some(self.params.username.clone()))
            .pass(Some(self.params.password.clone()));
        if let Some(db) = database {
            builder = builder.db_name(Some(db.to_string()));
        }
        builder
    }
}

#[async_trait]
impl Connector for MySqlConnector {
    async fn connect(
        &self,
        database: Option<&str>,
    ) -> Result<Box<dyn Connection>, DatabaseError> {
        let target = database.unwrap_or(&self.params.hostname).to_string();
        let conn = Conn::new(self.opts(database))
            .await
            .map_err(|e| DatabaseError::connect(&target, e.to_string()))?;
        Ok(Box::new(MySqlConnection { conn, target }))
    }
}

struct MySqlConnection {
    conn: Conn,
    target: String,
}

#[async_trait]
impl Connection for MySqlConnection {
    async fn query(&mut self, sql: &str) -> Result<RowSet, DatabaseError> {
        let rows: Vec<MySqlRow> = self
            .conn
            .query(sql)
            .await
            .map_err(|e| DatabaseError::query(&self.target, e.to_string()))?;
        Ok(rowset_from_driver(rows))
    }

    async fn close(self: Box<Self>) -> Result<(), DatabaseError> {
        self.conn
            .disconnect()
            .await
            .map_err(|e| DatabaseError::close(&self.target, e.to_string()))
    }
}

fn rowset_from_driver(rows: Vec<MySqlRow>) -> RowSet {
    let columns: Vec<String> = rows
        .first()
        .map(|row| {
            row.columns_ref()
                .iter()
                .map(|c| c.name_str().into_owned())
                .collect()
        })
        .unwrap_or_default();

    let mut set = RowSet::new(columns);
    for row in rows {
        let values = row.unwrap().into_iter().map(value_from_driver).collect();
        set.push_row(values);
    }
    set
}

fn value_from_driver(value: MySqlValue) -> Value {
    match value {
        MySqlValue::NULL => Value::Null,
        // the text protocol returns strings as bytes; keep real binary as-is
        MySqlValue::Bytes(bytes) => match String::from_utf8(bytes) {
            Ok(text) => Value::Text(text),
            Err(e) => Value::Bytes(e.into_bytes()),
        },
        MySqlValue::Int(v) => Value::Int(v),
        MySqlValue::UInt(v) => Value::UInt(v),
        MySqlValue::Float(v) => Value::Float(v as f64),
        MySqlValue::Double(v) => Value::Float(v),
        MySqlValue::Date(y, mo, d, h, mi, s, us) => Value::Text(format_date(y, mo, d, h, mi, s, us)),
        MySqlValue::Time(neg, days, h, mi, s, us) => Value::Text(format_time(neg, days, h, mi, s, us)),
    }
}

fn format_date(y: u16, mo: u8, d: u8, h: u8, mi: u8, s: u8, us: u32) -> String {
    let mut out = format!("{y:04}-{mo:02}-{d:02}");
    if h != 0 || mi != 0 || s != 0 || us != 0 {
        out.push_str(&format!(" {h:02}:{mi:02}:{s:02}"));
        if us != 0 {
            out.push_str(&format!(".{us:06}"));
        }
    }
    out
}

fn format_time(neg: bool, days: u32, h: u8, mi: u8, s: u8, us: u32) -> String {
    let hours = u64::from(days) * 24 + u64::from(h);
    let mut out = format!(
        "{}{hours:02}:{mi:02}:{s:02}",
        if neg { "-" } else { "" }
    );
    if us != 0 {
        out.push_str(&format!(".{us:06}"));
    }
    out
}
