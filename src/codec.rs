//! Value Codec
//!
//! Converts field values to the store's scalar representation and back.
//! Strings, booleans and integers map to native scalars; everything else is
//! carried as JSON bytes and decoded again into the target's shape.

use crate::error::{CodecError, StoreError};
use crate::store::{Edge, Value};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value as Json;

/// A field that can be rendered for the store.
///
/// Implemented for every `Serialize` type. The JSON form lets the mapper
/// apply `omitempty` before encoding.
pub trait Encode {
    fn to_json(&self) -> Result<Json, CodecError>;
}

impl<T: Serialize + ?Sized> Encode for T {
    fn to_json(&self) -> Result<Json, CodecError> {
        Ok(serde_json::to_value(self)?)
    }
}

/// A field that can be overwritten from a stored scalar.
pub trait Decode {
    fn assign(&mut self, value: &Value) -> Result<(), CodecError>;
}

impl<T: DeserializeOwned> Decode for T {
    fn assign(&mut self, value: &Value) -> Result<(), CodecError> {
        *self = decode(value)?;
        Ok(())
    }
}

pub fn encode<T: Serialize + ?Sized>(value: &T) -> Result<Value, CodecError> {
    encode_json(serde_json::to_value(value)?)
}

/// Encode an already rendered JSON value.
///
/// Blank strings fail with [`CodecError::Empty`]; zero integers and `false`
/// are ordinary values.
pub fn encode_json(json: Json) -> Result<Value, CodecError> {
    if let Some(i) = json.as_i64() {
        return Ok(Value::Int(i));
    }
    match json {
        Json::String(s) => {
            if s.trim().is_empty() {
                return Err(CodecError::Empty);
            }
            Ok(Value::Str(escape_quotes(&s)))
        }
        Json::Bool(b) => Ok(Value::Bool(b)),
        other => Ok(Value::Bytes(serde_json::to_vec(&other)?)),
    }
}

/// Attach an encoded value to `edge` through its typed setter
pub fn set_edge(edge: &mut Edge, value: Value) -> Result<(), CodecError> {
    match value {
        Value::Str(s) => edge.set_string(s)?,
        Value::Bool(b) => edge.set_bool(b)?,
        Value::Int(i) => edge.set_int(i)?,
        Value::Bytes(b) => edge.set_bytes(b)?,
        Value::Uid(_) => {
            return Err(StoreError::UidValue(edge.predicate().to_string()).into());
        }
    }
    Ok(())
}

pub fn decode<T: DeserializeOwned>(value: &Value) -> Result<T, CodecError> {
    let json = match value {
        Value::Str(s) => Json::String(unescape_quotes(s)),
        Value::Bool(b) => Json::Bool(*b),
        Value::Int(i) => Json::from(*i),
        Value::Uid(uid) => Json::from(*uid),
        Value::Bytes(raw) => return Ok(serde_json::from_slice(raw)?),
    };
    Ok(serde_json::from_value(json)?)
}

/// Values skipped by `omitempty`: blank strings and nulls
pub fn is_blank(json: &Json) -> bool {
    match json {
        Json::Null => true,
        Json::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

pub fn escape_quotes(s: &str) -> String {
    s.replace('"', "\\\"")
}

pub fn unescape_quotes(s: &str) -> String {
    s.replace("\\\"", "\"")
}
