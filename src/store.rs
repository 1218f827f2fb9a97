use std::path::Path;

use rusqlite::types::{ToSqlOutput, Value, ValueRef};
use rusqlite::{Connection, ToSql, params_from_iter};
use tracing::debug;

use crate::error::StoreError;
use crate::record::FieldValue;
use crate::record::encode::{integer_array_literal, text_array_literal, timestamp_literal};

/// Synchronous execution primitive the sync and insert paths run against.
pub trait Store {
    fn exec(&self, sql: &str) -> Result<usize, StoreError>;

    fn exec_with(&self, sql: &str, params: &[FieldValue]) -> Result<usize, StoreError>;

    fn select_i64_column(&self, sql: &str) -> Result<Vec<i64>, StoreError>;

    fn select_i64_pairs(&self, sql: &str) -> Result<Vec<(i64, i64)>, StoreError>;
}

pub struct SqliteStore {
    connection: Connection,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let connection = Connection::open(path)?;
        configure_connection(&connection)?;
        debug!(path = %path.display(), "opened sqlite store");
        Ok(Self { connection })
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Ok(Self {
            connection: Connection::open_in_memory()?,
        })
    }

    pub fn connection(&self) -> &Connection {
        &self.connection
    }
}

fn configure_connection(connection: &Connection) -> Result<(), StoreError> {
    connection.pragma_update(None, "journal_mode", "WAL")?;
    connection.pragma_update(None, "synchronous", "NORMAL")?;
    Ok(())
}

impl Store for SqliteStore {
    fn exec(&self, sql: &str) -> Result<usize, StoreError> {
        Ok(self.connection.execute(sql, [])?)
    }

    fn exec_with(&self, sql: &str, params: &[FieldValue]) -> Result<usize, StoreError> {
        Ok(self.connection.execute(sql, params_from_iter(params.iter()))?)
    }

    fn select_i64_column(&self, sql: &str) -> Result<Vec<i64>, StoreError> {
        let mut statement = self.connection.prepare(sql)?;
        let values = statement
            .query_map([], |row| row.get::<_, i64>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(values)
    }

    fn select_i64_pairs(&self, sql: &str) -> Result<Vec<(i64, i64)>, StoreError> {
        let mut statement = self.connection.prepare(sql)?;
        let pairs = statement
            .query_map([], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(pairs)
    }
}

impl ToSql for FieldValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        let output = match self {
            Self::Integer(value) => ToSqlOutput::Owned(Value::Integer(*value)),
            Self::Float(value) if value.is_finite() => ToSqlOutput::Owned(Value::Real(*value)),
            Self::Boolean(value) => ToSqlOutput::Owned(Value::Integer(i64::from(*value))),
            Self::Text(value) => ToSqlOutput::Borrowed(ValueRef::Text(value.as_bytes())),
            Self::TextArray(values) => ToSqlOutput::Owned(Value::Text(text_array_literal(values))),
            Self::IntegerArray(values) => {
                ToSqlOutput::Owned(Value::Text(integer_array_literal(values)))
            }
            Self::Timestamp(Some(value)) => ToSqlOutput::Owned(Value::Text(timestamp_literal(value))),
            Self::Float(_) | Self::Timestamp(None) | Self::Excluded | Self::Unsupported { .. } => {
                ToSqlOutput::Owned(Value::Null)
            }
        };
        Ok(output)
    }
}
