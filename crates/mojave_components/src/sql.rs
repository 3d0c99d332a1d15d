//! `SqlSink`: a sink described by an ADO-style connection string.

use crate::component::{sink_path, Component, Sink};
use crate::error::{ComponentError, ComponentResult};
use mojave_config::{ConnectionString, SinkInstance, Timeout};

pub const SQL_SINK: &str = "SqlSink";

const SERVER_KEYS: &[&str] = &["Server", "Data Source", "Address"];
const DATABASE_KEYS: &[&str] = &["Database", "Initial Catalog"];

/// `Debug` goes through [`ConnectionString`], so passwords stay hidden.
#[derive(Debug, Clone)]
pub struct SqlSink {
    name: String,
    connection_string: ConnectionString,
    server: String,
    database: String,
    timeout: Timeout,
}

impl SqlSink {
    pub fn from_instance(instance: &SinkInstance) -> ComponentResult<Self> {
        let path = format!("{}.connectionString", sink_path(instance));
        let connection_string = instance.connection_string.clone();

        let server = first_value(&connection_string, SERVER_KEYS)
            .ok_or_else(|| ComponentError::invalid(&path, "connection string has no Server"))?;
        let database = first_value(&connection_string, DATABASE_KEYS)
            .ok_or_else(|| ComponentError::invalid(&path, "connection string has no Database"))?;

        Ok(Self {
            name: instance.name.clone(),
            server: server.to_string(),
            database: database.to_string(),
            connection_string,
            timeout: instance.timeout,
        })
    }

    pub fn server(&self) -> &str {
        &self.server
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    pub fn connection_string(&self) -> &ConnectionString {
        &self.connection_string
    }
}

fn first_value<'a>(connection: &'a ConnectionString, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .find_map(|key| connection.get(key))
        .filter(|value| !value.is_empty())
}

impl Component for SqlSink {
    fn kind(&self) -> &str {
        SQL_SINK
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn describe(&self) -> String {
        format!(
            "{} '{}' to {}/{} (timeout {})",
            SQL_SINK, self.name, self.server, self.database, self.timeout
        )
    }
}

impl Sink for SqlSink {
    fn timeout(&self) -> Timeout {
        self.timeout
    }
}
