pub mod rpc;

use crate::core::{
    blockchain::Blockchain,
    error::BlockchainError,
    storage::Storage,
};
use chainsim_common::rpc::{Context, InternalRpcError, RPCHandler};
use log::trace;
use serde_json::Value;
use std::sync::Arc;

// Error codes of the engine errors, the messages are sent unchanged
pub const ADMISSION_ERROR_CODE: i16 = -3;
pub const QUERY_ERROR_CODE: i16 = -4;
pub const BLOCKCHAIN_ERROR_CODE: i16 = -5;

impl From<BlockchainError> for InternalRpcError {
    fn from(e: BlockchainError) -> Self {
        let code = match &e {
            BlockchainError::Admission(_) => ADMISSION_ERROR_CODE,
            BlockchainError::Query(_) => QUERY_ERROR_CODE,
            _ => BLOCKCHAIN_ERROR_CODE,
        };
        InternalRpcError::Custom(code, e.to_string())
    }
}

// In-process RPC surface of the daemon
// Requests are dispatched by method name with JSON params, no transport is attached
pub struct DaemonRpc<S: Storage> {
    handler: RPCHandler,
    blockchain: Arc<Blockchain<S>>,
}

impl<S: Storage> DaemonRpc<S> {
    pub fn new(blockchain: Arc<Blockchain<S>>) -> Self {
        let mut context = Context::new();
        context.store(Arc::clone(&blockchain));

        let mut handler = RPCHandler::new(context);
        rpc::register_methods::<S>(&mut handler);

        Self {
            handler,
            blockchain,
        }
    }

    pub fn get_blockchain(&self) -> &Arc<Blockchain<S>> {
        &self.blockchain
    }

    // Call a method, returns its JSON result
    pub async fn call(&self, method: &str, params: Value) -> Result<Value, InternalRpcError> {
        trace!("rpc call {}", method);
        self.handler.execute_method(method, params).await
    }

    // Handle a complete JSON-RPC request object
    pub async fn handle_request(&self, request: Value) -> Value {
        self.handler.handle_request(request).await
    }
}
