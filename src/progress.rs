use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{error, info};

use crate::error::SyncError;
use crate::store::Store;
use crate::util::is_plain_identifier;


pub type ProgressMap = BTreeMap<i64, i64>;

const ERROR_MARKER: &str = "$$$error$$$";

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProgressColumns {
    pub id: String,
    pub current: String,
    pub max: String,
}

impl Default for ProgressColumns {
    fn default() -> Self {
        Self {
            id: "id".to_string(),
            current: "current_eps".to_string(),
            max: "max_ep".to_string(),
        }
    }
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum FetchMode {
    #[default]
    Combined,
    TwoQuery,
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct WriteBackReport {
    pub updated: usize,
    pub failed: Vec<i64>,
}

#[derive(Clone, Debug)]
pub struct ProgressSync {
    table: String,
    columns: ProgressColumns,
    mode: FetchMode,
}

impl ProgressSync {
    pub fn new(table: &str) -> Result<Self, SyncError> {
        Self::with_columns(table, ProgressColumns::default())
    }

    pub fn with_columns(table: &str, columns: ProgressColumns) -> Result<Self, SyncError> {
        for name in [
            table,
            columns.id.as_str(),
            columns.current.as_str(),
            columns.max.as_str(),
        ] {
            if !is_plain_identifier(name) {
                return Err(SyncError::InvalidIdentifier(name.to_string()));
            }
        }

        Ok(Self {
            table: table.to_string(),
            columns,
            mode: FetchMode::default(),
        })
    }

    pub fn fetch_mode(mut self, mode: FetchMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Rows whose current progress is behind their maximum, keyed by id.
    pub fn fetch_behind<S: Store + ?Sized>(&self, store: &S) -> Result<ProgressMap, SyncError> {
        let ProgressColumns { id, current, max } = &self.columns;
        let filter = format!("FROM {} WHERE {current} < {max} ORDER BY {id} DESC", self.table);

        let pairs: Vec<(i64, i64)> = match self.mode {
            FetchMode::Combined => {
                store.select_i64_pairs(&format!("SELECT {id}, {current} {filter}"))?
            }
            FetchMode::TwoQuery => {
                let ids = store.select_i64_column(&format!("SELECT {id} {filter}"))?;
                let progress = store.select_i64_column(&format!("SELECT {current} {filter}"))?;
                if ids.len() != progress.len() {
                    return Err(SyncError::LengthMismatch {
                        ids: ids.len(),
                        progress: progress.len(),
                    });
                }
                ids.into_iter().zip(progress).collect()
            }
        };

        let behind: ProgressMap = pairs.into_iter().collect();
        info!(table = %self.table, rows = behind.len(), "fetched rows behind max progress");
        Ok(behind)
    }

    // Failed updates are logged and skipped; the rest of the batch still runs.
    pub fn write_back<S: Store + ?Sized>(
        &self,
        store: &S,
        progress: &ProgressMap,
    ) -> WriteBackReport {
        let mut report = WriteBackReport::default();

        for (entity_id, current) in progress.iter().rev() {
            let statement = format!(
                "UPDATE {} SET {}={current} WHERE {}={entity_id}",
                self.table, self.columns.current, self.columns.id
            );
            match store.exec(&statement) {
                Ok(_) => report.updated += 1,
                Err(err) => {
                    error!(
                        table = %self.table,
                        entity_id = *entity_id,
                        error = %err,
                        "{ERROR_MARKER}{statement}{ERROR_MARKER}"
                    );
                    report.failed.push(*entity_id);
                }
            }
        }

        info!(
            table = %self.table,
            updated = report.updated,
            failed = report.failed.len(),
            "wrote back progress"
        );
        report
    }
}
