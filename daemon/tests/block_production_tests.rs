// Block production scenarios driven through the blockchain with a manual clock

mod common;

use chainsim_common::{
    api::daemon::BlockTag,
    crypto::Address,
};
use chainsim_daemon::core::{
    assembler::AssemblerState,
    error::{AdmissionError, BlockchainError, QueryError},
    simulator::Simulator,
};
use common::*;

#[tokio::test]
async fn test_three_transactions_fit_in_one_block() {
    let chain = create_test_chain().await;
    let to = chain.account(1);

    let mut hashes = Vec::new();
    for nonce in 0..3 {
        hashes.push(chain.send(0, to, nonce, 0, 2_000_000).await.unwrap());
    }

    let block = chain.tick().await;
    assert_eq!(block.get_number(), 1);
    assert_eq!(block.get_transactions(), hashes.as_slice());
    assert_eq!(block.gas_used, 6_000_000);

    // following ticks produce empty blocks
    for expected in 2..=3 {
        let block = chain.tick().await;
        assert_eq!(block.get_number(), expected);
        assert!(block.is_empty());
    }

    let genesis = chain.blockchain.get_block_at(0).await.unwrap();
    assert!(genesis.is_empty());
}

#[tokio::test]
async fn test_transactions_split_when_exceeding_block_gas_limit() {
    let chain = create_test_chain().await;
    let to = chain.account(1);

    let first = chain.send(0, to, 0, 0, 2_000_000).await.unwrap();
    let second = chain.send(0, to, 1, 0, 2_000_001).await.unwrap();
    let third = chain.send(0, to, 2, 0, 2_000_000).await.unwrap();

    let block = chain.tick().await;
    assert_eq!(block.get_transactions(), &[first, second]);
    assert_eq!(block.gas_used, 4_000_001);
    assert_eq!(chain.blockchain.get_pending_transactions().await, vec![third.clone()]);

    let block = chain.tick().await;
    assert_eq!(block.get_transactions(), &[third]);

    assert!(chain.tick().await.is_empty());
    assert_eq!(chain.blockchain.get_nonce(&chain.account(0)).await.unwrap(), 3);
}

#[tokio::test]
async fn test_no_transaction_queueing() {
    let chain = create_test_chain().await;
    let to = chain.account(1);

    chain.send(0, to, 0, 0, 21_000).await.unwrap();
    chain.send(0, to, 1, 0, 21_000).await.unwrap();
    let err = chain.send(0, to, 3, 0, 2_000_000).await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "the tx doesn't have the correct nonce. account has nonce of: 2 tx has nonce of: 3"
    );

    // nothing was queued for later
    assert_eq!(chain.blockchain.get_mempool_size().await, 2);
    let block = chain.tick().await;
    assert_eq!(block.get_txs_count(), 2);
    assert_eq!(chain.blockchain.get_mempool_size().await, 0);
}

#[tokio::test]
async fn test_insufficient_balance_at_inclusion_is_dropped() {
    let chain = create_test_chain().await;
    let b = chain.account(1);
    let three_quarters = INITIAL_BALANCE * 3 / 4;

    let burn = chain.send(1, Address::zero(), 0, 1_234, 21_000).await.unwrap();
    let first = chain.send(0, b, 0, three_quarters, 21_000).await.unwrap();
    // admitted: the pending spend is not deducted at admission
    let second = chain.send(0, b, 1, three_quarters, 21_000).await.unwrap();

    let block = chain.tick().await;
    assert_eq!(block.get_transactions(), &[burn, first]);
    assert!(chain.blockchain.get_transaction(&second).await.is_err());
    assert_eq!(chain.blockchain.get_mempool_size().await, 0);

    let a = chain.account(0);
    assert_eq!(chain.blockchain.get_nonce(&a).await.unwrap(), 1);
    assert_eq!(
        chain.blockchain.get_balance(&a, BlockTag::Latest).await.unwrap(),
        INITIAL_BALANCE - three_quarters
    );
    assert_eq!(
        chain.blockchain.get_balance(&b, BlockTag::Latest).await.unwrap(),
        INITIAL_BALANCE - 1_234 + three_quarters
    );
    assert_eq!(
        chain
            .blockchain
            .get_balance(&Address::zero(), BlockTag::Latest)
            .await
            .unwrap(),
        1_234
    );
}

#[tokio::test]
async fn test_failed_transfer_does_not_fail_the_block() {
    let chain = create_test_chain().await;
    let to = chain.account(2);

    // admitted against the full balance
    chain.send(0, to, 0, INITIAL_BALANCE, 21_000).await.unwrap();
    chain.send(1, to, 0, INITIAL_BALANCE, 21_000).await.unwrap();
    // account 0 is empty once its first transfer is applied
    chain.send(0, to, 1, 1, 21_000).await.unwrap();

    let block = chain.tick().await;
    assert_eq!(block.get_number(), 1);
    assert_eq!(block.get_txs_count(), 2);
    assert_eq!(chain.blockchain.get_nonce(&chain.account(0)).await.unwrap(), 1);
}

#[tokio::test]
async fn test_stranded_transactions_are_dropped() {
    let chain = create_test_chain().await;
    let to = chain.account(1);

    chain.send(0, to, 0, INITIAL_BALANCE, 21_000).await.unwrap();
    // fails on balance, the next one from the same sender can not follow
    chain.send(0, to, 1, INITIAL_BALANCE, 21_000).await.unwrap();
    chain.send(0, to, 2, 0, 21_000).await.unwrap();

    let block = chain.tick().await;
    assert_eq!(block.get_txs_count(), 1);

    // the sender continues from its ledger nonce
    let a = chain.account(0);
    assert_eq!(chain.blockchain.get_next_nonce(&a).await.unwrap(), 1);
    chain.send(0, to, 1, 0, 21_000).await.unwrap();
    assert_eq!(chain.tick().await.get_txs_count(), 1);
}

#[tokio::test]
async fn test_sender_recovers_after_drop_with_carried_tail() {
    let chain = create_test_chain().await;
    let to = chain.account(1);
    let a = chain.account(0);

    chain.send(0, to, 0, INITIAL_BALANCE, 3_000_000).await.unwrap();
    // empty balance once the first one is applied
    chain.send(0, to, 1, 1, 3_000_000).await.unwrap();
    // does not fit in the first block, left in the pool
    let carried = chain.send(0, to, 2, 0, 3_000_000).await.unwrap();
    assert_eq!(chain.blockchain.get_next_nonce(&a).await.unwrap(), 3);

    let block = chain.tick().await;
    assert_eq!(block.get_txs_count(), 1);
    assert_eq!(chain.blockchain.get_nonce(&a).await.unwrap(), 1);

    // the carried transaction can never follow and is gone with the dropped one
    assert!(!chain
        .blockchain
        .get_pending_transactions()
        .await
        .contains(&carried));
    assert_eq!(chain.blockchain.get_next_nonce(&a).await.unwrap(), 1);

    let err = chain.send(0, to, 3, 0, 21_000).await.unwrap_err();
    assert_eq!(
        err,
        BlockchainError::from(AdmissionError::NonceMismatch {
            expected: 1,
            got: 3
        })
    );
    let retry = chain.send(0, to, 1, 0, 21_000).await.unwrap();

    let block = chain.tick().await;
    assert_eq!(block.get_transactions(), &[retry]);
    assert_eq!(chain.blockchain.get_nonce(&a).await.unwrap(), 2);
    assert_eq!(chain.blockchain.get_mempool_size().await, 0);
}

#[tokio::test]
async fn test_drop_keeps_other_senders_queued() {
    let chain = create_test_chain().await;
    let to = chain.account(2);

    chain.send(0, to, 0, INITIAL_BALANCE, 3_000_000).await.unwrap();
    chain.send(0, to, 1, 1, 3_000_000).await.unwrap();
    // behind the budget, from a sender with nothing dropped
    let other = chain.send(1, to, 0, 1, 21_000).await.unwrap();

    let block = chain.tick().await;
    assert_eq!(block.get_txs_count(), 1);
    assert_eq!(chain.blockchain.get_pending_transactions().await, vec![other.clone()]);

    let block = chain.tick().await;
    assert_eq!(block.get_transactions(), &[other]);
}

#[tokio::test]
async fn test_pending_balance_reads_latest_state() {
    let chain = create_test_chain().await;
    let b = chain.account(1);
    let initial = chain.blockchain.get_balance(&b, BlockTag::Latest).await.unwrap();

    chain.send(0, b, 0, 500, 21_000).await.unwrap();
    let pending = chain.blockchain.get_balance(&b, BlockTag::Pending).await.unwrap();
    // the queued transfer is not reflected
    assert_eq!(pending, initial);
    assert_ne!(pending, initial + 500);

    chain.tick().await;
    assert_eq!(
        chain.blockchain.get_balance(&b, BlockTag::Pending).await.unwrap(),
        initial + 500
    );
    assert_eq!(
        chain.blockchain.get_balance(&b, BlockTag::Earliest).await.unwrap(),
        initial
    );
}

#[tokio::test]
async fn test_block_index_out_of_range() {
    let chain = create_test_chain().await;
    chain.tick().await;

    let err = chain.blockchain.get_block_at(2).await.unwrap_err();
    assert_eq!(
        err,
        BlockchainError::Query(QueryError::IndexOutOfRange {
            index: 2,
            length: 2
        })
    );
    assert_eq!(
        err.to_string(),
        "'blocks' index out of range: index 2; length: 2"
    );
}

#[tokio::test]
async fn test_admission_rejections() {
    let chain = create_test_chain().await;
    let to = chain.account(1);
    let stranger = Address::derive("stranger", 0);

    let err = chain
        .blockchain
        .add_tx_to_mempool(chainsim_common::transaction::Transaction::new(
            stranger, to, 0, 0, 21_000,
        ))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        BlockchainError::from(AdmissionError::InvalidSender(stranger))
    );

    assert!(matches!(
        chain.send(0, to, 0, 0, 20_000).await,
        Err(BlockchainError::Admission(AdmissionError::IntrinsicGasTooLow { .. }))
    ));
    assert!(matches!(
        chain.send(0, to, 0, 0, BLOCK_GAS_LIMIT + 1).await,
        Err(BlockchainError::Admission(AdmissionError::ExceedsBlockGasLimit { .. }))
    ));
    assert!(matches!(
        chain.send(0, to, 0, INITIAL_BALANCE + 1, 21_000).await,
        Err(BlockchainError::Admission(AdmissionError::InsufficientFunds { .. }))
    ));
    assert_eq!(chain.blockchain.get_mempool_size().await, 0);
}

#[tokio::test]
async fn test_block_links_and_timestamps() {
    let chain = create_test_chain().await;
    let numbers = Simulator::advance(&chain.blockchain, 3).await.unwrap();
    assert_eq!(numbers, vec![1, 2, 3]);

    let mut parent = chain.blockchain.get_block_at(0).await.unwrap();
    for number in 1..=3 {
        let block = chain.blockchain.get_block_at(number).await.unwrap();
        assert_eq!(&block.parent_hash, parent.get_hash());
        assert!(block.timestamp >= parent.timestamp);
        assert_eq!(block.gas_limit, BLOCK_GAS_LIMIT);
        parent = block;
    }

    let top = chain.blockchain.get_top_block().await.unwrap();
    let by_hash = chain.blockchain.get_block_by_hash(top.get_hash()).await.unwrap();
    assert_eq!(by_hash.get_number(), 3);
    assert_eq!(chain.blockchain.get_assembler_state(), AssemblerState::Idle);
}

#[tokio::test]
async fn test_notifications_follow_append_order() {
    let chain = create_test_chain().await;
    let mut first = chain.blockchain.subscribe().await;
    let mut second = chain.blockchain.subscribe().await;

    chain.send(0, chain.account(1), 0, 1, 21_000).await.unwrap();
    let b1 = chain.tick().await;
    let b2 = chain.tick().await;

    for sub in [&mut first, &mut second] {
        let event = sub.receiver.recv().await.unwrap();
        assert_eq!((event.number, event.txs_count), (1, 1));
        assert_eq!(&event.hash, b1.get_hash());
        let event = sub.receiver.recv().await.unwrap();
        assert_eq!((event.number, event.txs_count), (2, 0));
        assert_eq!(&event.hash, b2.get_hash());
    }

    assert!(chain.blockchain.unsubscribe(first.id).await);
    chain.tick().await;
    assert!(first.receiver.recv().await.is_none());
    assert_eq!(second.receiver.recv().await.unwrap().number, 3);
}
