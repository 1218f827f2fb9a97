use std::fmt::Write as _;

use chrono::NaiveDateTime;

use super::FieldValue;
use crate::error::EncodeError;
use crate::util::to_snake_case;

pub const DEFAULT_DELIMITER_TAG: &str = "delim";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum UnknownFieldPolicy {
    #[default]
    Fail,
    Skip,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EncoderConfig {
    delimiter_tag: String,
    unknown_fields: UnknownFieldPolicy,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            delimiter_tag: DEFAULT_DELIMITER_TAG.to_string(),
            unknown_fields: UnknownFieldPolicy::default(),
        }
    }
}

impl EncoderConfig {
    pub fn new(
        delimiter_tag: impl Into<String>,
        unknown_fields: UnknownFieldPolicy,
    ) -> Result<Self, EncodeError> {
        Self {
            unknown_fields,
            ..Self::default()
        }
        .with_delimiter_tag(delimiter_tag)
    }

    pub fn tolerant() -> Self {
        Self {
            unknown_fields: UnknownFieldPolicy::Skip,
            ..Self::default()
        }
    }

    pub fn with_delimiter_tag(mut self, tag: impl Into<String>) -> Result<Self, EncodeError> {
        let tag = tag.into();
        if !is_valid_delimiter_tag(&tag) {
            return Err(EncodeError::InvalidDelimiterTag(tag));
        }
        self.delimiter_tag = tag;
        Ok(self)
    }

    pub fn delimiter_tag(&self) -> &str {
        &self.delimiter_tag
    }

    pub fn unknown_fields(&self) -> UnknownFieldPolicy {
        self.unknown_fields
    }
}

// Dollar-quote tags follow identifier rules: `[A-Za-z_][A-Za-z0-9_]*`.
pub fn is_valid_delimiter_tag(tag: &str) -> bool {
    let mut chars = tag.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
}

/// Encodes one field as `(column, literal)`.
///
/// Returns `Ok(None)` for fields that produce no column: explicitly excluded
/// fields, and unsupported fields under [`UnknownFieldPolicy::Skip`].
pub fn encode_field(
    field_name: &'static str,
    value: &FieldValue,
    config: &EncoderConfig,
) -> Result<Option<(String, String)>, EncodeError> {
    let literal = match value {
        FieldValue::Integer(value) => value.to_string(),
        FieldValue::Float(value) if value.is_finite() => value.to_string(),
        FieldValue::Float(_) => "NULL".to_string(),
        FieldValue::Boolean(value) => value.to_string(),
        FieldValue::Text(value) => quote_dollar(value, &config.delimiter_tag)?,
        FieldValue::TextArray(values) => {
            quote_dollar(&text_array_literal(values), &config.delimiter_tag)?
        }
        FieldValue::IntegerArray(values) => {
            quote_dollar(&integer_array_literal(values), &config.delimiter_tag)?
        }
        FieldValue::Timestamp(Some(value)) => {
            quote_dollar(&timestamp_literal(value), &config.delimiter_tag)?
        }
        FieldValue::Timestamp(None) => "NULL".to_string(),
        FieldValue::Excluded => return Ok(None),
        FieldValue::Unsupported { type_name } => {
            return match config.unknown_fields {
                UnknownFieldPolicy::Fail => Err(EncodeError::UnsupportedField {
                    field: field_name,
                    type_name,
                }),
                UnknownFieldPolicy::Skip => Ok(None),
            };
        }
    };

    Ok(Some((to_snake_case(field_name), literal)))
}

// Picks `$tag$`, or `$tagN$` for the first N whose token only occurs as the closing delimiter.
pub fn quote_dollar(text: &str, tag: &str) -> Result<String, EncodeError> {
    if !is_valid_delimiter_tag(tag) {
        return Err(EncodeError::InvalidDelimiterTag(tag.to_string()));
    }

    let mut token = format!("${tag}$");
    let mut suffix = 0_u32;
    while !closes_at_end(text, &token) {
        suffix += 1;
        token = format!("${tag}{suffix}$");
    }

    Ok(format!("{token}{text}{token}"))
}

fn closes_at_end(text: &str, token: &str) -> bool {
    format!("{text}{token}").find(token) == Some(text.len())
}

pub fn unquote_dollar(literal: &str) -> Option<&str> {
    let rest = literal.strip_prefix('$')?;
    let tag_end = rest.find('$')?;
    let token = &literal[..tag_end + 2];
    if !is_valid_delimiter_tag(&token[1..token.len() - 1]) {
        return None;
    }

    let body = literal.strip_prefix(token)?.strip_suffix(token)?;
    closes_at_end(body, token).then_some(body)
}

pub fn timestamp_literal(value: &NaiveDateTime) -> String {
    value.format(TIMESTAMP_FORMAT).to_string().trim().to_string()
}

pub fn text_array_literal(values: &[String]) -> String {
    let mut literal = String::from("{");
    for (idx, value) in values.iter().enumerate() {
        if idx > 0 {
            literal.push(',');
        }
        literal.push('"');
        for ch in value.chars() {
            if ch == '"' || ch == '\\' {
                literal.push('\\');
            }
            literal.push(ch);
        }
        literal.push('"');
    }
    literal.push('}');
    literal
}

pub fn integer_array_literal(values: &[i64]) -> String {
    let mut literal = String::from("{");
    for (idx, value) in values.iter().enumerate() {
        if idx > 0 {
            literal.push(',');
        }
        let _ = write!(literal, "{value}");
    }
    literal.push('}');
    literal
}
