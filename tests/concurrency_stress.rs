use std::sync::Arc;

use festipay::application::engine::LedgerEngine;
use festipay::domain::account::{AccountId, AccountType};
use festipay::domain::transaction::{Leg, Transaction, TransactionKind, TransactionMetadata};
use festipay::error::LedgerError;
use festipay::infrastructure::in_memory::InMemoryLog;
use rand::Rng;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn sale(customer: AccountId, exit: AccountId, amount: Decimal) -> Transaction {
    Transaction::new(
        TransactionKind::Sale,
        vec![Leg::new(customer, -amount), Leg::new(exit, amount)],
        TransactionMetadata::default(),
    )
}

/// Many tasks hammer a shared set of customer accounts with sales in
/// random order. Whatever interleaving the scheduler picks, the engine
/// must neither deadlock nor create or destroy value, and replaying the
/// log must match the live balances.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_sales_conserve_value() {
    let engine = Arc::new(LedgerEngine::new(Box::new(InMemoryLog::new())));
    let source = engine
        .accounts()
        .register(AccountType::CashTopupSource, "top-up source")
        .await
        .id;
    let exit = engine
        .accounts()
        .register(AccountType::SaleExit, "sale exit")
        .await
        .id;

    let mut customers = Vec::new();
    for i in 0..8 {
        let account = engine
            .accounts()
            .register(AccountType::Private, format!("customer {i}"))
            .await;
        engine
            .submit(Transaction::new(
                TransactionKind::TopUp,
                vec![Leg::new(source, dec!(-1000)), Leg::new(account.id, dec!(1000))],
                TransactionMetadata::default(),
            ))
            .await
            .unwrap();
        customers.push(account.id);
    }

    let mut handles = Vec::new();
    for _ in 0..16 {
        let engine = Arc::clone(&engine);
        let customers = customers.clone();
        handles.push(tokio::spawn(async move {
            let mut committed = 0u32;
            for _ in 0..50 {
                let (customer, amount) = {
                    let mut rng = rand::thread_rng();
                    (
                        customers[rng.gen_range(0..customers.len())],
                        Decimal::from(rng.gen_range(1..=5)),
                    )
                };
                match engine.submit(sale(customer, exit, amount)).await {
                    Ok(_) => committed += 1,
                    // Running a customer dry is expected under load.
                    Err(LedgerError::InsufficientFunds { .. }) => {}
                    Err(other) => panic!("unexpected rejection: {other}"),
                }
            }
            committed
        }));
    }

    let mut total_committed = 0u32;
    for handle in handles {
        total_committed += handle.await.unwrap();
    }
    assert!(total_committed > 0);

    // Conservation: all balances sum to zero.
    let total: Decimal = engine
        .accounts()
        .all()
        .await
        .iter()
        .map(|a| a.balance.value())
        .sum();
    assert_eq!(total, dec!(0));

    // Non-negativity held throughout.
    for id in &customers {
        assert!(engine.accounts().get(*id).await.unwrap().balance.value() >= dec!(0));
    }

    engine.verify_replay().await.unwrap();
}

/// Transfers that name their accounts in opposite orders must not
/// deadlock; the lock controller sorts ids before acquiring.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn opposite_leg_orders_do_not_deadlock() {
    let engine = Arc::new(LedgerEngine::new(Box::new(InMemoryLog::new())));
    let source = engine
        .accounts()
        .register(AccountType::CashTopupSource, "top-up source")
        .await
        .id;
    let a = engine
        .accounts()
        .register(AccountType::Private, "a")
        .await
        .id;
    let b = engine
        .accounts()
        .register(AccountType::Private, "b")
        .await
        .id;
    let exit = engine
        .accounts()
        .register(AccountType::SaleExit, "sale exit")
        .await
        .id;
    for customer in [a, b] {
        engine
            .submit(Transaction::new(
                TransactionKind::TopUp,
                vec![Leg::new(source, dec!(-10000)), Leg::new(customer, dec!(10000))],
                TransactionMetadata::default(),
            ))
            .await
            .unwrap();
    }

    let mut handles = Vec::new();
    for i in 0..64u64 {
        let engine = Arc::clone(&engine);
        let customer = if i % 2 == 0 { a } else { b };
        // Alternate which account comes first in the leg list.
        let legs = if i % 2 == 0 {
            vec![Leg::new(customer, dec!(-1)), Leg::new(exit, dec!(1))]
        } else {
            vec![Leg::new(exit, dec!(1)), Leg::new(customer, dec!(-1))]
        };
        handles.push(tokio::spawn(async move {
            engine
                .submit(Transaction::new(
                    TransactionKind::Sale,
                    legs,
                    TransactionMetadata::default(),
                ))
                .await
                .unwrap();
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(
        engine.accounts().get(exit).await.unwrap().balance.value(),
        dec!(64)
    );
}
