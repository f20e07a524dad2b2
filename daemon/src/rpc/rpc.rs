use crate::core::{blockchain::Blockchain, storage::Storage};
use chainsim_common::{
    api::daemon::{
        BlockResponse, GetBalanceParams, GetBlockParams, GetNonceParams, GetTransactionParams,
        SendTransactionParams, TransactionResponse,
    },
    async_handler,
    config::DEFAULT_TX_GAS_LIMIT,
    rpc::{parse_params, require_no_params, Context, InternalRpcError, RPCHandler},
};
use log::debug;
use serde_json::{json, Value};
use std::sync::Arc;

pub fn register_methods<S: Storage>(handler: &mut RPCHandler) {
    handler.register_method("send_transaction", async_handler!(send_transaction::<S>));
    handler.register_method("get_balance", async_handler!(get_balance::<S>));
    handler.register_method("get_block", async_handler!(get_block::<S>));
    handler.register_method("get_block_number", async_handler!(get_block_number::<S>));
    handler.register_method("get_nonce", async_handler!(get_nonce::<S>));
    handler.register_method("get_transaction", async_handler!(get_transaction::<S>));
    handler.register_method("get_accounts", async_handler!(get_accounts::<S>));
    handler.register_method(
        "get_pending_transactions",
        async_handler!(get_pending_transactions::<S>),
    );
}

async fn send_transaction<S: Storage>(
    context: &Context,
    body: Value,
) -> Result<Value, InternalRpcError> {
    let params: SendTransactionParams = parse_params(body)?;
    let blockchain: &Arc<Blockchain<S>> = context.get()?;

    let gas_limit = params.gas_limit.unwrap_or(DEFAULT_TX_GAS_LIMIT);
    let hash = blockchain
        .send_transfer(params.from, params.to, params.nonce, params.value, gas_limit)
        .await?;
    debug!("send_transaction accepted {}", hash);
    Ok(json!(hash))
}

async fn get_balance<S: Storage>(context: &Context, body: Value) -> Result<Value, InternalRpcError> {
    let params: GetBalanceParams = parse_params(body)?;
    let blockchain: &Arc<Blockchain<S>> = context.get()?;
    let balance = blockchain
        .get_balance(&params.address, params.block_tag)
        .await?;
    Ok(json!(balance))
}

async fn get_block<S: Storage>(context: &Context, body: Value) -> Result<Value, InternalRpcError> {
    let params: GetBlockParams = parse_params(body)?;
    let blockchain: &Arc<Blockchain<S>> = context.get()?;
    let block = blockchain.get_block_at(params.number).await?;
    Ok(json!(BlockResponse::from(&*block)))
}

async fn get_block_number<S: Storage>(
    context: &Context,
    body: Value,
) -> Result<Value, InternalRpcError> {
    require_no_params(body)?;
    let blockchain: &Arc<Blockchain<S>> = context.get()?;
    Ok(json!(blockchain.get_top_block_number().await?))
}

async fn get_nonce<S: Storage>(context: &Context, body: Value) -> Result<Value, InternalRpcError> {
    let params: GetNonceParams = parse_params(body)?;
    let blockchain: &Arc<Blockchain<S>> = context.get()?;
    Ok(json!(blockchain.get_nonce(&params.address).await?))
}

async fn get_transaction<S: Storage>(
    context: &Context,
    body: Value,
) -> Result<Value, InternalRpcError> {
    let params: GetTransactionParams = parse_params(body)?;
    let blockchain: &Arc<Blockchain<S>> = context.get()?;
    let (tx, block_number) = blockchain.get_transaction(&params.hash).await?;
    Ok(json!(TransactionResponse::new(params.hash, &tx, block_number)))
}

async fn get_accounts<S: Storage>(context: &Context, body: Value) -> Result<Value, InternalRpcError> {
    require_no_params(body)?;
    let blockchain: &Arc<Blockchain<S>> = context.get()?;
    Ok(json!(blockchain.get_accounts()))
}

async fn get_pending_transactions<S: Storage>(
    context: &Context,
    body: Value,
) -> Result<Value, InternalRpcError> {
    require_no_params(body)?;
    let blockchain: &Arc<Blockchain<S>> = context.get()?;
    Ok(json!(blockchain.get_pending_transactions().await))
}
