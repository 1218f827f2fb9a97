use anyhow::{Context, Result, bail};
use tracing::{info, warn};

use catalog_sql::model::CatalogRecord;
use catalog_sql::util::is_plain_identifier;
use catalog_sql::{Record, SqliteStore, StatementBuilder, insert_record, where_not_exists};

use super::{encoder_config, load_records};
use crate::cli::InsertArgs;

pub fn run(args: InsertArgs) -> Result<()> {
    if !is_plain_identifier(&args.key_column) {
        bail!("invalid key column: {}", args.key_column);
    }

    let builder = StatementBuilder::new(encoder_config(&args.encoding)?);
    let records = load_records(&args.input)?;
    let store = SqliteStore::open(&args.db_path)
        .with_context(|| format!("failed to open {}", args.db_path.display()))?;

    info!(
        input = %args.input.display(),
        db_path = %args.db_path.display(),
        records = records.len(),
        "inserting records"
    );

    let mut inserted = 0_usize;
    let mut skipped = 0_usize;
    for record in &records {
        let affected = match record {
            CatalogRecord::Movie(movie) => {
                insert_one(&store, &builder, movie, &args.key_column, record.id())
            }
            CatalogRecord::Video(video) => {
                insert_one(&store, &builder, video, &args.key_column, record.id())
            }
        }
        .with_context(|| format!("failed to insert record {}", record.id()))?;

        if affected == 0 {
            skipped += 1;
        } else {
            inserted += affected;
        }
    }

    if skipped > 0 {
        warn!(skipped, "records already present were left untouched");
    }
    info!(inserted, skipped, "insert complete");

    Ok(())
}

fn insert_one<R: Record>(
    store: &SqliteStore,
    builder: &StatementBuilder,
    record: &R,
    key_column: &str,
    id: i64,
) -> Result<usize> {
    let table = R::table_name();
    let condition = where_not_exists(&table, key_column, &id.to_string());
    Ok(insert_record(store, builder, record, &condition)?)
}
