use tracing::debug;

use crate::error::{EncodeError, InsertError};
use crate::record::{EncoderConfig, FieldValue, Record, UnknownFieldPolicy, introspect};
use crate::store::Store;
use crate::util::to_snake_case;

#[cfg(test)]
mod tests;

#[derive(Clone, Debug, Default)]
pub struct StatementBuilder {
    config: EncoderConfig,
}

impl StatementBuilder {
    pub fn new(config: EncoderConfig) -> Self {
        Self { config }
    }

    /// Renders `INSERT INTO table(cols) SELECT values condition`.
    ///
    /// The output is PostgreSQL dialect: text, arrays and timestamps are
    /// dollar-quoted, which SQLite rejects. Use [`insert_record`] to run a
    /// record against a [`Store`] with bound parameters instead.
    ///
    /// `condition` is spliced verbatim, typically a `WHERE NOT EXISTS (...)`
    /// guard. Pretty output only adds line breaks.
    pub fn build<R: Record>(
        &self,
        table: &str,
        record: &R,
        condition: &str,
        pretty: bool,
    ) -> Result<String, EncodeError> {
        let columns = introspect(record, &self.config)?;
        if columns.is_empty() {
            return Err(EncodeError::EmptyRecord(R::type_name().to_string()));
        }

        let condition = condition.trim();
        let mut statement = if pretty {
            format!(
                "INSERT INTO {table}\n({})\n SELECT {}",
                columns.names.join(","),
                columns.values.join(",\n")
            )
        } else {
            format!(
                "INSERT INTO {table}({}) SELECT {}",
                columns.names.join(","),
                columns.values.join(",")
            )
        };
        if !condition.is_empty() {
            statement.push_str(if pretty { " \n" } else { " " });
            statement.push_str(condition);
        }

        debug!(table, columns = columns.len(), pretty, "built insert statement");
        Ok(statement)
    }

    /// Compact PostgreSQL-dialect statement for the record's own table, `;`-terminated.
    pub fn build_named<R: Record>(
        &self,
        record: &R,
        condition: &str,
    ) -> Result<String, EncodeError> {
        let mut statement = self.build(&R::table_name(), record, condition, false)?;
        statement.push(';');
        Ok(statement)
    }

    pub fn plan<R: Record>(&self, record: &R) -> Result<InsertPlan, EncodeError> {
        let mut plan = InsertPlan {
            table: R::table_name(),
            columns: Vec::new(),
            values: Vec::new(),
        };

        for field in record.fields() {
            match field.value {
                FieldValue::Excluded => continue,
                FieldValue::Unsupported { type_name } => match self.config.unknown_fields() {
                    UnknownFieldPolicy::Fail => {
                        return Err(EncodeError::UnsupportedField {
                            field: field.name,
                            type_name,
                        });
                    }
                    UnknownFieldPolicy::Skip => continue,
                },
                value => {
                    plan.columns.push(to_snake_case(field.name));
                    plan.values.push(value);
                }
            }
        }

        if plan.columns.is_empty() {
            return Err(EncodeError::EmptyRecord(R::type_name().to_string()));
        }

        Ok(plan)
    }
}

/// A conditional insert with bound values instead of inline literals.
#[derive(Clone, Debug, PartialEq)]
pub struct InsertPlan {
    pub table: String,
    pub columns: Vec<String>,
    pub values: Vec<FieldValue>,
}

impl InsertPlan {
    pub fn sql(&self, condition: &str) -> String {
        let placeholders = (1..=self.values.len())
            .map(|idx| format!("?{idx}"))
            .collect::<Vec<_>>()
            .join(",");

        let mut sql = format!(
            "INSERT INTO {}({}) SELECT {placeholders}",
            self.table,
            self.columns.join(",")
        );
        let condition = condition.trim();
        if !condition.is_empty() {
            sql.push(' ');
            sql.push_str(condition);
        }
        sql
    }

    pub fn value_of(&self, column: &str) -> Option<&FieldValue> {
        self.columns
            .iter()
            .position(|name| name == column)
            .and_then(|idx| self.values.get(idx))
    }
}

pub fn where_not_exists(table: &str, column: &str, literal: &str) -> String {
    format!("WHERE NOT EXISTS (SELECT 1 FROM {table} WHERE {column}={literal})")
}

// Inserts through the store with bound parameters; returns affected rows (0 when the guard held).
pub fn insert_record<R: Record, S: Store + ?Sized>(
    store: &S,
    builder: &StatementBuilder,
    record: &R,
    condition: &str,
) -> Result<usize, InsertError> {
    let plan = builder.plan(record)?;
    let sql = plan.sql(condition);
    let affected = store.exec_with(&sql, &plan.values)?;
    debug!(table = %plan.table, affected, "inserted record");
    Ok(affected)
}
