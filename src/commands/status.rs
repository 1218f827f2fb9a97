use anyhow::{Context, Result, bail};
use rusqlite::Connection;
use tracing::{info, warn};

use catalog_sql::util::is_plain_identifier;

use crate::cli::StatusArgs;

#[derive(Debug, PartialEq, Eq)]
struct TableStatus {
    rows: i64,
    // None when the table has no progress columns
    behind: Option<i64>,
}

pub fn run(args: StatusArgs) -> Result<()> {
    if !args.db_path.exists() {
        warn!(path = %args.db_path.display(), "database file missing");
        return Ok(());
    }

    let conn = Connection::open(&args.db_path)
        .with_context(|| format!("failed to open {}", args.db_path.display()))?;

    let tables = if args.tables.is_empty() {
        vec!["hdvmovies".to_string(), "csnvideos".to_string()]
    } else {
        args.tables.clone()
    };

    for table in &tables {
        let status = match table_status(&conn, table) {
            Ok(status) => status,
            Err(err) => {
                warn!(table = %table, error = %err, "table unavailable");
                continue;
            }
        };

        info!(
            table = %table,
            rows = status.rows,
            behind = %status.behind.map(|value| value.to_string()).unwrap_or_else(|| "n/a".to_string()),
            "table status"
        );
    }

    Ok(())
}

fn table_status(conn: &Connection, table: &str) -> Result<TableStatus> {
    if !is_plain_identifier(table) {
        bail!("invalid table name: {table}");
    }

    let rows = query_count(conn, &format!("SELECT COUNT(*) FROM {table}"))?;
    let behind = query_count(
        conn,
        &format!("SELECT COUNT(*) FROM {table} WHERE current_eps < max_ep"),
    )
    .ok();

    Ok(TableStatus { rows, behind })
}

fn query_count(conn: &Connection, sql: &str) -> Result<i64> {
    let count = conn.query_row(sql, [], |row| row.get(0))?;
    Ok(count)
}
