use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use catalog_sql::EncoderConfig;
use catalog_sql::model::CatalogRecord;

use crate::cli::EncodingArgs;

pub mod insert;
pub mod render;
pub mod status;
pub mod sync_progress;

fn encoder_config(args: &EncodingArgs) -> Result<EncoderConfig> {
    EncoderConfig::new(args.delimiter_tag.clone(), args.unknown_fields.into())
        .context("invalid --delimiter-tag")
}

fn load_records(path: &Path) -> Result<Vec<CatalogRecord>> {
    let raw = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let mut records: Vec<CatalogRecord> = serde_json::from_slice(&raw)
        .with_context(|| format!("failed to parse {}", path.display()))?;
    for record in &mut records {
        record.normalize();
    }
    Ok(records)
}
