use thiserror::Error;

#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("field `{field}` has type `{type_name}` which has no column encoding")]
    UnsupportedField {
        field: &'static str,
        type_name: &'static str,
    },
    #[error("`{0}` is not a valid dollar-quote tag")]
    InvalidDelimiterTag(String),
    #[error("record `{0}` has no persisted fields")]
    EmptyRecord(String),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("{0}")]
    Backend(String),
}

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("length of ids ({ids}) and progress values ({progress}) do not correspond")]
    LengthMismatch { ids: usize, progress: usize },
    #[error("`{0}` is not a plain SQL identifier")]
    InvalidIdentifier(String),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

#[derive(Debug, Error)]
pub enum InsertError {
    #[error("encode error: {0}")]
    Encode(#[from] EncodeError),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}
