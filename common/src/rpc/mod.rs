mod context;
mod error;
mod handler;

pub use context::*;
pub use error::*;
pub use handler::*;

use serde::de::DeserializeOwned;
use serde_json::Value;

pub const JSON_RPC_VERSION: &str = "2.0";

// Parse the params of a request, a missing body is read as `null`
pub fn parse_params<P: DeserializeOwned>(value: Value) -> Result<P, InternalRpcError> {
    serde_json::from_value(value).map_err(InternalRpcError::InvalidJSONParams)
}

// Methods without parameters accept `null` or an empty object/array only
pub fn require_no_params(value: Value) -> Result<(), InternalRpcError> {
    match value {
        Value::Null => Ok(()),
        Value::Object(map) if map.is_empty() => Ok(()),
        Value::Array(values) if values.is_empty() => Ok(()),
        _ => Err(InternalRpcError::UnexpectedParams),
    }
}
