use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use catalog_sql::{FetchMode, UnknownFieldPolicy};

#[derive(Parser, Debug)]
#[command(
    name = "catalog-sql",
    version,
    about = "Materialize scraped media catalog records as SQL"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print PostgreSQL-dialect (dollar-quoted) insert statements; not runnable on SQLite
    Render(RenderArgs),
    /// Insert records into a SQLite database with bound parameters
    Insert(InsertArgs),
    SyncProgress(SyncProgressArgs),
    Status(StatusArgs),
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum UnknownFields {
    Fail,
    Skip,
}

impl From<UnknownFields> for UnknownFieldPolicy {
    fn from(value: UnknownFields) -> Self {
        match value {
            UnknownFields::Fail => Self::Fail,
            UnknownFields::Skip => Self::Skip,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum FetchStrategy {
    Combined,
    TwoQuery,
}

impl From<FetchStrategy> for FetchMode {
    fn from(value: FetchStrategy) -> Self {
        match value {
            FetchStrategy::Combined => Self::Combined,
            FetchStrategy::TwoQuery => Self::TwoQuery,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct EncodingArgs {
    #[arg(long, default_value = "delim")]
    pub delimiter_tag: String,

    #[arg(long, value_enum, default_value_t = UnknownFields::Fail)]
    pub unknown_fields: UnknownFields,
}

#[derive(Args, Debug, Clone)]
pub struct RenderArgs {
    #[arg(long)]
    pub input: PathBuf,

    #[arg(long, default_value_t = false)]
    pub pretty: bool,

    #[command(flatten)]
    pub encoding: EncodingArgs,
}

#[derive(Args, Debug, Clone)]
pub struct InsertArgs {
    #[arg(long)]
    pub input: PathBuf,

    #[arg(long)]
    pub db_path: PathBuf,

    #[arg(long, default_value = "id")]
    pub key_column: String,

    #[command(flatten)]
    pub encoding: EncodingArgs,
}

#[derive(Args, Debug, Clone)]
pub struct SyncProgressArgs {
    #[arg(long)]
    pub db_path: PathBuf,

    #[arg(long, default_value = "hdvmovies")]
    pub table: String,

    #[arg(long, default_value = "id")]
    pub id_column: String,

    #[arg(long, default_value = "current_eps")]
    pub current_column: String,

    #[arg(long, default_value = "max_ep")]
    pub max_column: String,

    #[arg(long, value_enum, default_value_t = FetchStrategy::Combined)]
    pub fetch_mode: FetchStrategy,

    #[arg(long)]
    pub updates_path: Option<PathBuf>,

    #[arg(long)]
    pub report_path: Option<PathBuf>,

    #[arg(long, default_value_t = false)]
    pub dry_run: bool,
}

#[derive(Args, Debug, Clone)]
pub struct StatusArgs {
    #[arg(long)]
    pub db_path: PathBuf,

    #[arg(long = "table")]
    pub tables: Vec<String>,
}
