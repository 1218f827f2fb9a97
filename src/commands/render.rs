use anyhow::{Context, Result};
use tracing::info;

use catalog_sql::model::CatalogRecord;
use catalog_sql::{Record, StatementBuilder, where_not_exists};

use super::{encoder_config, load_records};
use crate::cli::RenderArgs;

pub fn run(args: RenderArgs) -> Result<()> {
    let builder = StatementBuilder::new(encoder_config(&args.encoding)?);
    let records = load_records(&args.input)?;

    info!(input = %args.input.display(), records = records.len(), "rendering insert statements");

    for record in &records {
        let statement = match record {
            CatalogRecord::Movie(movie) => render_one(&builder, movie, record.id(), args.pretty),
            CatalogRecord::Video(video) => render_one(&builder, video, record.id(), args.pretty),
        }
        .with_context(|| format!("failed to render record {}", record.id()))?;
        println!("{statement}");
    }

    Ok(())
}

fn render_one<R: Record>(
    builder: &StatementBuilder,
    record: &R,
    id: i64,
    pretty: bool,
) -> Result<String> {
    let table = R::table_name();
    let condition = where_not_exists(&table, "id", &id.to_string());
    if pretty {
        let mut statement = builder.build(&table, record, &condition, true)?;
        statement.push(';');
        Ok(statement)
    } else {
        Ok(builder.build_named(record, &condition)?)
    }
}
