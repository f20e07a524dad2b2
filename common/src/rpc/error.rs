use super::JSON_RPC_VERSION;
use anyhow::Error as AnyError;
use serde_json::{Error as SerdeError, Value};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum InternalRpcError {
    #[error("Internal error: {}", _0)]
    InternalError(&'static str),
    #[error("Invalid JSON-RPC request")]
    InvalidRequest,
    #[error("Invalid params: {}", _0)]
    InvalidJSONParams(#[from] SerdeError),
    #[error("Invalid params: {}", _0)]
    InvalidParams(&'static str),
    #[error("Unexpected parameters for this method")]
    UnexpectedParams,
    #[error("Method '{}' in request was not found", _0)]
    MethodNotFound(String),
    #[error(transparent)]
    AnyError(#[from] AnyError),
    // Custom errors must have a code between -3 and -31999
    #[error("{}", _1)]
    Custom(i16, String),
}

impl InternalRpcError {
    pub fn get_code(&self) -> i16 {
        match self {
            Self::InvalidRequest => -32600,
            Self::MethodNotFound(_) => -32601,
            Self::InvalidJSONParams(_) | Self::InvalidParams(_) | Self::UnexpectedParams => -32602,
            Self::InternalError(_) => -32603,
            Self::AnyError(_) => -32004,
            Self::Custom(code, _) => *code,
        }
    }

    // JSON-RPC error object, the message is the Display output unchanged
    pub fn to_json(&self) -> Value {
        let mut error = serde_json::Map::new();
        error.insert("code".to_owned(), Value::from(self.get_code()));
        error.insert("message".to_owned(), Value::from(format!("{:#}", self)));

        let mut obj = serde_json::Map::new();
        obj.insert("jsonrpc".to_owned(), Value::from(JSON_RPC_VERSION));
        obj.insert("error".to_owned(), Value::Object(error));
        Value::Object(obj)
    }
}
