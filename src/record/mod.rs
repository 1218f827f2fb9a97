use std::fmt;

use chrono::{DateTime, NaiveDateTime, TimeZone};
use tracing::debug;

use crate::error::EncodeError;

pub mod encode;

pub use encode::{EncoderConfig, UnknownFieldPolicy, encode_field, quote_dollar, unquote_dollar};

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum FieldKind {
    Integer,
    Float,
    Boolean,
    Text,
    TextArray,
    IntegerArray,
    Timestamp,
    Excluded,
    Unsupported,
}

impl FieldKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Boolean => "boolean",
            Self::Text => "text",
            Self::TextArray => "text_array",
            Self::IntegerArray => "integer_array",
            Self::Timestamp => "timestamp",
            Self::Excluded => "excluded",
            Self::Unsupported => "unsupported",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Semantic value of one record field. `Timestamp(None)` is the zero time.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldValue {
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Text(String),
    TextArray(Vec<String>),
    IntegerArray(Vec<i64>),
    Timestamp(Option<NaiveDateTime>),
    Excluded,
    Unsupported { type_name: &'static str },
}

impl FieldValue {
    pub fn kind(&self) -> FieldKind {
        match self {
            Self::Integer(_) => FieldKind::Integer,
            Self::Float(_) => FieldKind::Float,
            Self::Boolean(_) => FieldKind::Boolean,
            Self::Text(_) => FieldKind::Text,
            Self::TextArray(_) => FieldKind::TextArray,
            Self::IntegerArray(_) => FieldKind::IntegerArray,
            Self::Timestamp(_) => FieldKind::Timestamp,
            Self::Excluded => FieldKind::Excluded,
            Self::Unsupported { .. } => FieldKind::Unsupported,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Field {
    pub name: &'static str,
    pub value: FieldValue,
}

impl Field {
    pub fn new(name: &'static str, value: FieldValue) -> Self {
        Self { name, value }
    }
}

/// A scraped entity that can be materialized as one table row.
///
/// `fields` must list every declared field exactly once, in declaration
/// order; that order becomes the column order of generated statements.
pub trait Record {
    fn fields(&self) -> Vec<Field>;

    fn type_name() -> &'static str
    where
        Self: Sized,
    {
        std::any::type_name::<Self>()
    }

    fn table_name() -> String
    where
        Self: Sized,
    {
        derive_table_name(Self::type_name())
    }
}

impl<R: Record> Record for &R {
    fn fields(&self) -> Vec<Field> {
        (**self).fields()
    }

    fn type_name() -> &'static str {
        R::type_name()
    }

    fn table_name() -> String {
        R::table_name()
    }
}

// `crate::model::Movie` -> `movies`; generic arguments are ignored.
pub fn derive_table_name(type_name: &str) -> String {
    let bare = type_name.split('<').next().unwrap_or(type_name);
    let bare = bare.rsplit("::").next().unwrap_or(bare);
    let mut table = bare.replace('.', "").to_lowercase();
    table.push('s');
    table
}

pub trait IntoFieldValue {
    fn into_field_value(self) -> FieldValue;
}

macro_rules! integer_field_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl IntoFieldValue for $ty {
                fn into_field_value(self) -> FieldValue {
                    FieldValue::Integer(i64::from(self))
                }
            }
        )*
    };
}

integer_field_value!(i8, i16, i32, i64, u8, u16, u32);

impl IntoFieldValue for f32 {
    fn into_field_value(self) -> FieldValue {
        FieldValue::Float(f64::from(self))
    }
}

impl IntoFieldValue for f64 {
    fn into_field_value(self) -> FieldValue {
        FieldValue::Float(self)
    }
}

impl IntoFieldValue for bool {
    fn into_field_value(self) -> FieldValue {
        FieldValue::Boolean(self)
    }
}

impl IntoFieldValue for String {
    fn into_field_value(self) -> FieldValue {
        FieldValue::Text(self)
    }
}

impl IntoFieldValue for &str {
    fn into_field_value(self) -> FieldValue {
        FieldValue::Text(self.to_string())
    }
}

impl IntoFieldValue for Vec<String> {
    fn into_field_value(self) -> FieldValue {
        FieldValue::TextArray(self)
    }
}

impl IntoFieldValue for Vec<i64> {
    fn into_field_value(self) -> FieldValue {
        FieldValue::IntegerArray(self)
    }
}

impl IntoFieldValue for NaiveDateTime {
    fn into_field_value(self) -> FieldValue {
        FieldValue::Timestamp(Some(self))
    }
}

impl<Tz: TimeZone> IntoFieldValue for DateTime<Tz> {
    fn into_field_value(self) -> FieldValue {
        FieldValue::Timestamp(Some(self.naive_local()))
    }
}

impl IntoFieldValue for Option<NaiveDateTime> {
    fn into_field_value(self) -> FieldValue {
        FieldValue::Timestamp(self)
    }
}

impl<Tz: TimeZone> IntoFieldValue for Option<DateTime<Tz>> {
    fn into_field_value(self) -> FieldValue {
        FieldValue::Timestamp(self.map(|value| value.naive_local()))
    }
}

impl IntoFieldValue for FieldValue {
    fn into_field_value(self) -> FieldValue {
        self
    }
}

/// Implements [`Record`] from a field list.
///
/// ```ignore
/// impl_record!(Movie { id, title, tags, released });
/// impl_record!(Video as "csnvideos" { id, title, kind = "type", formats: skip });
/// ```
#[macro_export]
macro_rules! impl_record {
    (@field $self:ident, $field:ident) => {
        $crate::record::Field::new(
            stringify!($field),
            $crate::record::IntoFieldValue::into_field_value(::std::clone::Clone::clone(
                &$self.$field,
            )),
        )
    };
    (@field $self:ident, $field:ident : skip) => {
        $crate::record::Field::new(stringify!($field), $crate::record::FieldValue::Excluded)
    };
    (@field $self:ident, $field:ident = $column:literal) => {
        $crate::record::Field::new(
            $column,
            $crate::record::IntoFieldValue::into_field_value(::std::clone::Clone::clone(
                &$self.$field,
            )),
        )
    };
    ($ty:ident { $($field:ident $(: $skip:ident)? $(= $column:literal)?),* $(,)? }) => {
        impl $crate::record::Record for $ty {
            fn fields(&self) -> ::std::vec::Vec<$crate::record::Field> {
                ::std::vec![$($crate::impl_record!(@field self, $field $(: $skip)? $(= $column)?)),*]
            }
        }
    };
    ($ty:ident as $table:literal { $($field:ident $(: $skip:ident)? $(= $column:literal)?),* $(,)? }) => {
        impl $crate::record::Record for $ty {
            fn fields(&self) -> ::std::vec::Vec<$crate::record::Field> {
                ::std::vec![$($crate::impl_record!(@field self, $field $(: $skip)? $(= $column)?)),*]
            }

            fn table_name() -> ::std::string::String {
                ::std::string::String::from($table)
            }
        }
    };
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Columns {
    pub names: Vec<String>,
    pub values: Vec<String>,
}

impl Columns {
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

pub fn introspect<R: Record>(record: &R, config: &EncoderConfig) -> Result<Columns, EncodeError> {
    let mut columns = Columns::default();

    for field in record.fields() {
        match encode_field(field.name, &field.value, config)? {
            Some((name, value)) => {
                columns.names.push(name);
                columns.values.push(value);
            }
            None => {
                debug!(
                    record = R::type_name(),
                    field = field.name,
                    kind = %field.value.kind(),
                    "field not persisted"
                );
            }
        }
    }

    Ok(columns)
}
