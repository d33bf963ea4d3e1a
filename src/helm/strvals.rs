// src/helm/strvals.rs

//! `--set` style value overrides
//!
//! Each [`KeyValue`] is one assignment:
//! - `image.tag=1.2` sets a nested key
//! - `servers[1].port=80` indexes into a list, padding with nulls
//! - `tags={a,b,c}` assigns a list
//! - `\.`, `\[`, `\,` escape the separators
//!
//! `true`, `false`, `null` and integers are typed; everything else stays a
//! string.

use crate::model::KeyValue;
use serde_json::{Map, Number, Value};
use thiserror::Error;

/// Largest list index a key may address
const MAX_INDEX: usize = 65536;

/// Errors parsing an override key
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SetParseError {
    #[error("empty key segment in {0:?}")]
    EmptyKey(String),

    #[error("unclosed list index in {0:?}")]
    UnclosedIndex(String),

    #[error("invalid list index {index:?} in {key:?}")]
    InvalidIndex { key: String, index: String },

    #[error("list index {index} too large in {key:?}")]
    IndexTooLarge { key: String, index: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Key(String),
    Index(usize),
}

/// Apply every override to `values`, in order
pub fn apply_set_values(values: &mut Value, sets: &[KeyValue]) -> Result<(), SetParseError> {
    if values.is_null() {
        *values = Value::Object(Map::new());
    }
    for kv in sets {
        let path = parse_key(&kv.key)?;
        set_path(values, &path, parse_value(&kv.value));
    }
    Ok(())
}

fn parse_key(key: &str) -> Result<Vec<Segment>, SetParseError> {
    let mut segments = Vec::new();
    let mut buf = String::new();
    let mut after_index = false;
    let mut chars = key.chars();

    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                buf.push(chars.next().unwrap_or('\\'));
                after_index = false;
            }
            '.' => {
                if !buf.is_empty() {
                    segments.push(Segment::Key(std::mem::take(&mut buf)));
                } else if !after_index {
                    return Err(SetParseError::EmptyKey(key.to_string()));
                }
                after_index = false;
            }
            '[' => {
                if !buf.is_empty() {
                    segments.push(Segment::Key(std::mem::take(&mut buf)));
                } else if segments.is_empty() {
                    return Err(SetParseError::EmptyKey(key.to_string()));
                }

                let mut raw = String::new();
                loop {
                    match chars.next() {
                        Some(']') => break,
                        Some(d) => raw.push(d),
                        None => return Err(SetParseError::UnclosedIndex(key.to_string())),
                    }
                }
                let index = raw.trim().parse::<usize>().map_err(|_| SetParseError::InvalidIndex {
                    key: key.to_string(),
                    index: raw.clone(),
                })?;
                if index > MAX_INDEX {
                    return Err(SetParseError::IndexTooLarge {
                        key: key.to_string(),
                        index,
                    });
                }
                segments.push(Segment::Index(index));
                after_index = true;
            }
            _ => {
                buf.push(c);
                after_index = false;
            }
        }
    }

    if !buf.is_empty() {
        segments.push(Segment::Key(buf));
    } else if !after_index {
        return Err(SetParseError::EmptyKey(key.to_string()));
    }
    Ok(segments)
}

fn set_path(node: &mut Value, path: &[Segment], value: Value) {
    let Some((first, rest)) = path.split_first() else {
        *node = value;
        return;
    };

    match first {
        Segment::Key(key) => {
            if !node.is_object() {
                *node = Value::Object(Map::new());
            }
            if let Value::Object(map) = node {
                let child = map.entry(key.clone()).or_insert(Value::Null);
                set_path(child, rest, value);
            }
        }
        Segment::Index(index) => {
            if !node.is_array() {
                *node = Value::Array(Vec::new());
            }
            if let Value::Array(list) = node {
                while list.len() <= *index {
                    list.push(Value::Null);
                }
                set_path(&mut list[*index], rest, value);
            }
        }
    }
}

fn parse_value(raw: &str) -> Value {
    if raw.len() >= 2 && raw.starts_with('{') && raw.ends_with('}') {
        let inner = &raw[1..raw.len() - 1];
        if inner.is_empty() {
            return Value::Array(Vec::new());
        }
        return Value::Array(split_unescaped(inner, ',').iter().map(|s| typed(s)).collect());
    }
    typed(&unescape(raw))
}

fn split_unescaped(s: &str, sep: char) -> Vec<String> {
    let mut parts = Vec::new();
    let mut buf = String::new();
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            buf.push(chars.next().unwrap_or('\\'));
        } else if c == sep {
            parts.push(std::mem::take(&mut buf));
        } else {
            buf.push(c);
        }
    }
    parts.push(buf);
    parts
}

fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            out.push(chars.next().unwrap_or('\\'));
        } else {
            out.push(c);
        }
    }
    out
}

fn typed(s: &str) -> Value {
    match s {
        "true" => return Value::Bool(true),
        "false" => return Value::Bool(false),
        "null" => return Value::Null,
        _ => {}
    }

    let digits = s.strip_prefix('-').unwrap_or(s);
    let leading_zero = digits.len() > 1 && digits.starts_with('0');
    if !digits.is_empty() && !leading_zero && digits.chars().all(|c| c.is_ascii_digit()) {
        if let Ok(n) = s.parse::<i64>() {
            return Value::Number(Number::from(n));
        }
    }
    Value::String(s.to_string())
}
