use super::{Context, InternalRpcError, JSON_RPC_VERSION};
use log::{debug, trace};
use serde::Deserialize;
use serde_json::{json, Value};
use std::{collections::HashMap, future::Future, pin::Pin};

pub type HandlerResult<'a> = Pin<Box<dyn Future<Output = Result<Value, InternalRpcError>> + Send + 'a>>;

pub type Handler = fn(&'_ Context, Value) -> HandlerResult<'_>;

// Wrap an async fn(&Context, Value) so it can be registered
#[macro_export]
macro_rules! async_handler {
    ($func: expr) => {
        move |context, body| Box::pin($func(context, body))
    };
}

#[derive(Deserialize)]
pub struct RpcRequest {
    pub jsonrpc: String,
    #[serde(default)]
    pub id: Option<Value>,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

// Method registry with the shared context of the handlers
pub struct RPCHandler {
    methods: HashMap<&'static str, Handler>,
    context: Context,
}

impl RPCHandler {
    pub fn new(context: Context) -> Self {
        Self {
            methods: HashMap::new(),
            context,
        }
    }

    pub fn register_method(&mut self, name: &'static str, handler: Handler) {
        if self.has_method(name) {
            debug!("RPC method '{}' registered twice, keeping the last one", name);
        }
        self.methods.insert(name, handler);
    }

    pub fn has_method(&self, name: &str) -> bool {
        self.methods.contains_key(name)
    }

    // Call a method by name with its raw params
    pub async fn execute_method(&self, method: &str, params: Value) -> Result<Value, InternalRpcError> {
        let handler = self
            .methods
            .get(method)
            .ok_or_else(|| InternalRpcError::MethodNotFound(method.to_owned()))?;
        trace!("executing RPC method '{}'", method);
        handler(&self.context, params).await
    }

    // Handle a full JSON-RPC request object and build the response object
    pub async fn handle_request(&self, request: Value) -> Value {
        let request: RpcRequest = match serde_json::from_value(request) {
            Ok(request) => request,
            Err(e) => return InternalRpcError::InvalidJSONParams(e).to_json(),
        };

        if request.jsonrpc != JSON_RPC_VERSION {
            return InternalRpcError::InvalidRequest.to_json();
        }

        let id = request.id.unwrap_or(Value::Null);
        match self.execute_method(&request.method, request.params).await {
            Ok(result) => json!({
                "jsonrpc": JSON_RPC_VERSION,
                "id": id,
                "result": result,
            }),
            Err(e) => {
                debug!("RPC method '{}' failed: {}", request.method, e);
                let mut response = e.to_json();
                response["id"] = id;
                response
            }
        }
    }
}
