//! Integration tests for the transfer executor on in-memory SQLite.

#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]

mod common;

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use sea_orm::{ConnectionTrait, TransactionTrait};
use tokio::sync::Barrier;

use kassa_core::transfer::{IdempotencyKey, TransferFailure, TransferRequest, TransferStatus};
use kassa_db::{AccountRepository, TransferExecutor, TransferRepository};
use kassa_shared::types::{AccountNumber, MinorUnits};

fn request(from: &AccountNumber, to: &AccountNumber, amount: i64) -> TransferRequest {
    TransferRequest::new(from.clone(), to.clone(), MinorUnits::new(amount))
}

#[tokio::test]
async fn test_valid_transfer_moves_funds_and_appends_one_record() {
    let db = common::sqlite().await;
    let alice = common::user(&db, "Alice").await;
    let bob = common::user(&db, "Bob").await;
    let a = common::account(&db, alice, 1000).await;
    let b = common::account(&db, bob, 200).await;

    let executor = TransferExecutor::new(db.clone());
    let record = executor
        .execute(request(&a, &b, 300))
        .await
        .expect("Transfer should succeed");

    assert_eq!(common::balance_of(&db, &a).await, 700);
    assert_eq!(common::balance_of(&db, &b).await, 500);
    assert_eq!(common::transfer_count(&db).await, 1);

    assert_eq!(record.amount, MinorUnits::new(300));
    assert_eq!(record.from_number, a);
    assert_eq!(record.to_number, b);
    assert_eq!(record.status, TransferStatus::Success);
    assert!(record.completed_at.is_some());

    let stored = TransferRepository::new(db.clone())
        .find_by_id(record.id)
        .await
        .expect("Lookup should succeed")
        .expect("Record should be stored");
    assert_eq!(stored.from_account, record.from_account);
    assert_eq!(stored.to_account, record.to_account);
    assert_eq!(stored.amount, MinorUnits::new(300));
}

#[tokio::test]
async fn test_rejected_transfers_change_nothing() {
    let db = common::sqlite().await;
    let alice = common::user(&db, "Alice").await;
    let a = common::account(&db, alice, 1000).await;
    let b = common::account(&db, alice, 200).await;
    let c = common::account(&db, alice, 0).await;
    AccountRepository::new(db.clone())
        .close_account(&c, alice)
        .await
        .expect("Close should succeed");

    let executor = TransferExecutor::new(db.clone());
    let missing = AccountNumber::from("ACC999999");

    let cases = [
        (request(&a, &b, -5), "invalid_amount"),
        (request(&a, &b, 0), "invalid_amount"),
        (request(&a, &a, 100), "self_transfer"),
        (request(&missing, &b, 10), "source_not_found"),
        (request(&a, &missing, 10), "destination_not_found"),
        (request(&a, &c, 50), "account_closed"),
        (request(&c, &a, 50), "account_closed"),
        (request(&a, &b, 1001), "insufficient_funds"),
    ];

    for (req, code) in cases {
        let err = executor
            .execute(req)
            .await
            .expect_err("Transfer should be rejected");
        assert_eq!(err.code(), code);
    }

    assert_eq!(common::balance_of(&db, &a).await, 1000);
    assert_eq!(common::balance_of(&db, &b).await, 200);
    assert_eq!(common::balance_of(&db, &c).await, 0);
    assert_eq!(common::transfer_count(&db).await, 0);
}

#[tokio::test]
async fn test_failed_transfer_is_retryable() {
    let db = common::sqlite().await;
    let user = common::user(&db, "Alice").await;
    let a = common::account(&db, user, 100).await;
    let b = common::account(&db, user, 500).await;

    let executor = TransferExecutor::new(db.clone());
    let err = executor.execute(request(&a, &b, 300)).await.unwrap_err();
    assert!(matches!(err, TransferFailure::InsufficientFunds { .. }));

    executor
        .execute(request(&b, &a, 250))
        .await
        .expect("Top-up should succeed");
    executor
        .execute(request(&a, &b, 300))
        .await
        .expect("Retry should succeed");

    assert_eq!(common::balance_of(&db, &a).await, 50);
    assert_eq!(common::balance_of(&db, &b).await, 550);
    assert_eq!(common::transfer_count(&db).await, 2);
}

#[tokio::test]
async fn test_ledger_write_failure_rolls_back_balances() {
    let db = common::sqlite().await;
    let user = common::user(&db, "Alice").await;
    let a = common::account(&db, user, 1000).await;
    let b = common::account(&db, user, 200).await;

    db.execute_unprepared(
        "CREATE TRIGGER fail_ledger_append BEFORE INSERT ON transfers \
         BEGIN SELECT RAISE(ABORT, 'ledger unavailable'); END",
    )
    .await
    .expect("Failed to install trigger");

    let executor = TransferExecutor::new(db.clone());
    let err = executor.execute(request(&a, &b, 300)).await.unwrap_err();
    assert!(matches!(err, TransferFailure::StorageError(_)), "got {err:?}");
    assert_eq!(err.code(), "storage_error");

    assert_eq!(common::balance_of(&db, &a).await, 1000);
    assert_eq!(common::balance_of(&db, &b).await, 200);
    assert_eq!(common::transfer_count(&db).await, 0);

    db.execute_unprepared("DROP TRIGGER fail_ledger_append")
        .await
        .expect("Failed to drop trigger");
    executor
        .execute(request(&a, &b, 300))
        .await
        .expect("Transfer should succeed once the ledger accepts writes");
    assert_eq!(common::balance_of(&db, &a).await, 700);
    assert_eq!(common::transfer_count(&db).await, 1);
}

#[tokio::test]
async fn test_sum_of_balances_is_invariant() {
    let db = common::sqlite().await;
    let user = common::user(&db, "Alice").await;
    let accounts = [
        common::account(&db, user, 1000).await,
        common::account(&db, user, 250).await,
        common::account(&db, user, 0).await,
    ];
    let before = common::total_balance(&db).await;

    let executor = TransferExecutor::new(db.clone());
    let moves = [(0, 1, 300), (1, 2, 500), (2, 0, 120), (0, 2, 5000), (1, 1, 1), (2, 1, 380)];
    for (from, to, amount) in moves {
        // Outcomes vary; none may create or destroy funds
        let _ = executor
            .execute(request(&accounts[from], &accounts[to], amount))
            .await;
        assert_eq!(common::total_balance(&db).await, before);
    }
}

#[tokio::test]
async fn test_idempotent_replay_returns_stored_record() {
    let db = common::sqlite().await;
    let user = common::user(&db, "Alice").await;
    let a = common::account(&db, user, 1000).await;
    let b = common::account(&db, user, 0).await;

    let executor = TransferExecutor::new(db.clone());
    let key = IdempotencyKey::parse("order-42").unwrap();

    let first = executor
        .execute(request(&a, &b, 400).with_idempotency_key(key.clone()))
        .await
        .expect("First attempt should succeed");
    let replay = executor
        .execute(request(&a, &b, 400).with_idempotency_key(key.clone()))
        .await
        .expect("Replay should succeed");

    assert_eq!(replay.id, first.id);
    assert_eq!(replay.idempotency_key.as_deref(), Some("order-42"));
    assert_eq!(common::balance_of(&db, &a).await, 600);
    assert_eq!(common::balance_of(&db, &b).await, 400);
    assert_eq!(common::transfer_count(&db).await, 1);
}

#[tokio::test]
async fn test_replay_succeeds_even_when_funds_are_now_short() {
    let db = common::sqlite().await;
    let user = common::user(&db, "Alice").await;
    let a = common::account(&db, user, 400).await;
    let b = common::account(&db, user, 0).await;

    let executor = TransferExecutor::new(db.clone());
    let key = IdempotencyKey::parse("drain").unwrap();
    let first = executor
        .execute(request(&a, &b, 400).with_idempotency_key(key.clone()))
        .await
        .unwrap();
    let replay = executor
        .execute(request(&a, &b, 400).with_idempotency_key(key))
        .await
        .expect("Replay should not re-validate funds");

    assert_eq!(replay.id, first.id);
    assert_eq!(common::balance_of(&db, &a).await, 0);
}

#[tokio::test]
async fn test_reused_key_with_different_parameters_is_rejected() {
    let db = common::sqlite().await;
    let user = common::user(&db, "Alice").await;
    let a = common::account(&db, user, 1000).await;
    let b = common::account(&db, user, 0).await;

    let executor = TransferExecutor::new(db.clone());
    let key = IdempotencyKey::parse("invoice-7").unwrap();
    executor
        .execute(request(&a, &b, 100).with_idempotency_key(key.clone()))
        .await
        .unwrap();

    let err = executor
        .execute(request(&a, &b, 150).with_idempotency_key(key))
        .await
        .unwrap_err();
    assert_eq!(err, TransferFailure::IdempotencyKeyReused("invoice-7".into()));
    assert_eq!(common::balance_of(&db, &a).await, 900);
    assert_eq!(common::transfer_count(&db).await, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_debits_never_overdraw() {
    const TASKS: usize = 20;
    const AMOUNT: i64 = 100;
    const START: i64 = 1000;

    let db = common::sqlite().await;
    let user = common::user(&db, "Alice").await;
    let x = common::account(&db, user, START).await;
    let y = common::account(&db, user, 0).await;

    let executor = TransferExecutor::new(db.clone());
    let barrier = Arc::new(Barrier::new(TASKS));

    let handles: Vec<_> = (0..TASKS)
        .map(|_| {
            let executor = executor.clone();
            let barrier = Arc::clone(&barrier);
            let (x, y) = (x.clone(), y.clone());
            tokio::spawn(async move {
                barrier.wait().await;
                executor.execute(request(&x, &y, AMOUNT)).await
            })
        })
        .collect();

    let results: Vec<_> = join_all(handles)
        .await
        .into_iter()
        .map(|r| r.expect("Task panicked"))
        .collect();

    let successes = results.iter().filter(|r| r.is_ok()).count() as i64;
    let insufficient = results
        .iter()
        .filter(|r| matches!(r, Err(TransferFailure::InsufficientFunds { .. })))
        .count() as i64;

    assert_eq!(successes, START / AMOUNT);
    assert_eq!(successes + insufficient, TASKS as i64);
    assert_eq!(common::balance_of(&db, &x).await, START - successes * AMOUNT);
    assert_eq!(common::balance_of(&db, &y).await, successes * AMOUNT);
    assert_eq!(common::transfer_count(&db).await, successes as u64);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_opposite_transfers_complete() {
    let db = common::sqlite().await;
    let user = common::user(&db, "Alice").await;
    let a = common::account(&db, user, 5000).await;
    let b = common::account(&db, user, 5000).await;

    let executor = TransferExecutor::new(db.clone());
    let futures = (0..20).map(|i| {
        let executor = executor.clone();
        let (from, to) = if i % 2 == 0 { (a.clone(), b.clone()) } else { (b.clone(), a.clone()) };
        async move { executor.execute(request(&from, &to, 10)).await }
    });
    let results = join_all(futures).await;

    assert!(results.iter().all(Result::is_ok));
    assert_eq!(common::balance_of(&db, &a).await, 5000);
    assert_eq!(common::balance_of(&db, &b).await, 5000);
    assert_eq!(common::transfer_count(&db).await, 20);
}

#[tokio::test]
async fn test_cancel_before_begin_applies_nothing() {
    let db = common::sqlite().await;
    let user = common::user(&db, "Alice").await;
    let a = common::account(&db, user, 1000).await;
    let b = common::account(&db, user, 0).await;

    // Hold the only pooled connection so the executor cannot begin
    let blocker = db.begin().await.unwrap();

    let executor = TransferExecutor::new(db.clone());
    let outcome = tokio::time::timeout(
        Duration::from_millis(100),
        executor.execute(request(&a, &b, 300)),
    )
    .await;
    assert!(outcome.is_err(), "Execute should still be waiting on begin");

    blocker.rollback().await.unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(common::balance_of(&db, &a).await, 1000);
    assert_eq!(common::balance_of(&db, &b).await, 0);
    assert_eq!(common::transfer_count(&db).await, 0);
}
