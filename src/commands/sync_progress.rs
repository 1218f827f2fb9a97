use std::collections::BTreeMap;
use std::fs;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{info, warn};

use catalog_sql::util::{now_utc_string, write_json_pretty};
use catalog_sql::{ProgressColumns, ProgressMap, ProgressSync, SqliteStore, WriteBackReport};

use crate::cli::SyncProgressArgs;

#[derive(Debug, Serialize)]
struct SyncProgressReport {
    generated_at: String,
    table: String,
    behind_count: usize,
    changed_count: usize,
    dry_run: bool,
    write_back: WriteBackReport,
}

pub fn run(args: SyncProgressArgs) -> Result<()> {
    let columns = ProgressColumns {
        id: args.id_column.clone(),
        current: args.current_column.clone(),
        max: args.max_column.clone(),
    };
    let sync = ProgressSync::with_columns(&args.table, columns)?.fetch_mode(args.fetch_mode.into());
    let store = SqliteStore::open(&args.db_path)
        .with_context(|| format!("failed to open {}", args.db_path.display()))?;

    let mut progress = sync
        .fetch_behind(&store)
        .with_context(|| format!("failed to fetch progress from {}", sync.table()))?;
    let behind_count = progress.len();

    let mut changed_count = 0_usize;
    if let Some(updates_path) = &args.updates_path {
        let raw = fs::read(updates_path)
            .with_context(|| format!("failed to read {}", updates_path.display()))?;
        let updates: BTreeMap<i64, i64> = serde_json::from_slice(&raw)
            .with_context(|| format!("failed to parse {}", updates_path.display()))?;
        changed_count = apply_updates(&mut progress, &updates);
    }

    let write_back = if args.dry_run {
        info!(table = sync.table(), rows = progress.len(), "dry run, skipping write-back");
        WriteBackReport::default()
    } else {
        sync.write_back(&store, &progress)
    };

    if !write_back.failed.is_empty() {
        warn!(failed_ids = ?write_back.failed, "some progress updates failed");
    }

    let report = SyncProgressReport {
        generated_at: now_utc_string(),
        table: sync.table().to_string(),
        behind_count,
        changed_count,
        dry_run: args.dry_run,
        write_back,
    };

    match &args.report_path {
        Some(path) => {
            write_json_pretty(path, &report)?;
            info!(path = %path.display(), "wrote sync report");
        }
        None => println!("{}", serde_json::to_string_pretty(&report)?),
    }

    Ok(())
}

// Only rows that were behind are eligible; updates for other ids are ignored.
fn apply_updates(progress: &mut ProgressMap, updates: &BTreeMap<i64, i64>) -> usize {
    let mut changed = 0;
    for (entity_id, current) in updates {
        match progress.get_mut(entity_id) {
            Some(existing) if existing != current => {
                *existing = *current;
                changed += 1;
            }
            Some(_) => {}
            None => warn!(entity_id = *entity_id, "update ignored, row is not behind"),
        }
    }
    changed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_updates_only_touches_rows_that_were_behind() {
        let mut progress: ProgressMap = [(3, 1), (5, 2)].into_iter().collect();
        let updates: BTreeMap<i64, i64> = [(3, 4), (5, 2), (9, 7)].into_iter().collect();

        let changed = apply_updates(&mut progress, &updates);

        assert_eq!(changed, 1);
        assert_eq!(progress.get(&3), Some(&4));
        assert_eq!(progress.get(&5), Some(&2));
        assert!(!progress.contains_key(&9));
    }
}
