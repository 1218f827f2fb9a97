pub mod error;
pub mod model;
pub mod progress;
pub mod record;
pub mod statement;
pub mod store;
pub mod util;

pub use error::{EncodeError, InsertError, StoreError, SyncError};
pub use progress::{FetchMode, ProgressColumns, ProgressMap, ProgressSync, WriteBackReport};
pub use record::{
    EncoderConfig, Field, FieldKind, FieldValue, IntoFieldValue, Record, UnknownFieldPolicy,
    introspect,
};
pub use statement::{InsertPlan, StatementBuilder, insert_record, where_not_exists};
pub use store::{SqliteStore, Store};
