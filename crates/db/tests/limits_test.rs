//! Daily and monthly spend limits with lazy reset on a pinned clock.

mod common;

use chrono::{Duration, TimeZone, Utc};
use common::TestContext;
use tijori_db::repositories::TransferRequest;
use tijori_shared::AppError;
use tijori_shared::types::WalletId;

async fn transfer(
    ctx: &TestContext,
    from: WalletId,
    to: WalletId,
    amount: i64,
    key: &str,
) -> Result<(), AppError> {
    ctx.processor
        .process_transfer(TransferRequest::new(from, to, amount, key))
        .await
        .map(|_| ())
        .map_err(AppError::from)
}

#[tokio::test]
async fn test_daily_limit_blocks_without_side_effects() {
    let ctx = TestContext::new().await;
    let w1 = ctx.funded_wallet(5_000_000).await;
    let w2 = ctx.wallet().await;

    transfer(&ctx, w1, w2, 600_000, "d1").await.unwrap();
    transfer(&ctx, w1, w2, 400_000, "d2").await.unwrap();

    let err = transfer(&ctx, w1, w2, 1, "d3").await.unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));
    assert!(err.message().contains("exceeds daily limit"));
    assert!(err.message().contains("remaining 0"));

    assert_eq!(ctx.balance(w1).await, 4_000_000);
    assert_eq!(ctx.balance(w2).await, 1_000_000);
    let limits = ctx.limits.get_limits(w1).await.unwrap();
    assert_eq!(limits.daily_spent, 1_000_000);
    assert_eq!(limits.monthly_spent, 1_000_000);

    // The failed key was never recorded, so it can be used again later.
    ctx.clock.advance(Duration::days(1));
    transfer(&ctx, w1, w2, 1, "d3").await.unwrap();
}

#[tokio::test]
async fn test_single_transfer_over_daily_limit() {
    let ctx = TestContext::new().await;
    let w1 = ctx.funded_wallet(5_000_000).await;
    let w2 = ctx.wallet().await;

    let err = transfer(&ctx, w1, w2, 1_000_001, "big").await.unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));
    assert_eq!(ctx.balance(w1).await, 5_000_000);
    assert_eq!(ctx.limits.get_limits(w1).await.unwrap().daily_spent, 0);
}

#[tokio::test]
async fn test_daily_reset_at_utc_midnight() {
    let ctx = TestContext::new().await;
    let w1 = ctx.funded_wallet(5_000_000).await;
    let w2 = ctx.wallet().await;

    transfer(&ctx, w1, w2, 1_000_000, "day1").await.unwrap();

    ctx.clock
        .set(Utc.with_ymd_and_hms(2026, 10, 19, 23, 59, 59).unwrap());
    assert!(transfer(&ctx, w1, w2, 1, "late").await.is_err());

    ctx.clock.set(Utc.with_ymd_and_hms(2026, 10, 20, 0, 0, 0).unwrap());
    let fresh = ctx.limits.get_limits(w1).await.unwrap();
    assert_eq!(fresh.daily_spent, 0);
    assert_eq!(fresh.monthly_spent, 1_000_000);
    assert_eq!(
        fresh.daily_reset_at,
        Utc.with_ymd_and_hms(2026, 10, 21, 0, 0, 0).unwrap()
    );

    transfer(&ctx, w1, w2, 1_000_000, "day2").await.unwrap();
}

#[tokio::test]
async fn test_monthly_limit_and_reset() {
    let ctx = TestContext::new().await;
    let w1 = ctx.funded_wallet(5_000_000).await;
    let w2 = ctx.wallet().await;
    ctx.limits.update_limits(w1, 1_000_000, 1_500_000).await.unwrap();

    transfer(&ctx, w1, w2, 1_000_000, "m1").await.unwrap();
    ctx.clock.advance(Duration::days(1));

    let err = transfer(&ctx, w1, w2, 600_000, "m2").await.unwrap_err();
    assert!(err.message().contains("exceeds monthly limit"));
    assert!(err.message().contains("remaining 500000"));
    transfer(&ctx, w1, w2, 500_000, "m3").await.unwrap();

    ctx.clock.set(Utc.with_ymd_and_hms(2026, 11, 1, 0, 0, 0).unwrap());
    transfer(&ctx, w1, w2, 600_000, "m4").await.unwrap();
    let limits = ctx.limits.get_limits(w1).await.unwrap();
    assert_eq!(limits.monthly_spent, 600_000);
    assert_eq!(
        limits.monthly_reset_at,
        Utc.with_ymd_and_hms(2026, 12, 1, 0, 0, 0).unwrap()
    );
}

#[tokio::test]
async fn test_limits_apply_to_source_only() {
    let ctx = TestContext::new().await;
    let w1 = ctx.funded_wallet(2_000_000).await;
    let w2 = ctx.wallet().await;

    transfer(&ctx, w1, w2, 1_000_000, "out").await.unwrap();
    // The destination's own counters are untouched.
    assert_eq!(ctx.limits.get_limits(w2).await.unwrap().daily_spent, 0);
    transfer(&ctx, w2, w1, 1_000_000, "back").await.unwrap();
}

#[tokio::test]
async fn test_update_limits_validation() {
    let ctx = TestContext::new().await;
    let w1 = ctx.wallet().await;

    let err = ctx.limits.update_limits(w1, 2_000, 1_000).await.unwrap_err();
    assert!(matches!(AppError::from(err), AppError::Validation(_)));

    let err = ctx.limits.update_limits(w1, 0, 1_000).await.unwrap_err();
    assert!(matches!(AppError::from(err), AppError::Validation(_)));

    let missing = ctx
        .limits
        .update_limits(WalletId::new(), 1_000, 2_000)
        .await
        .unwrap_err();
    assert!(matches!(AppError::from(missing), AppError::NotFound(_)));

    let updated = ctx.limits.update_limits(w1, 5_000, 50_000).await.unwrap();
    assert_eq!(updated.daily_limit, 5_000);
    assert_eq!(ctx.limits.get_limits(w1).await.unwrap().monthly_limit, 50_000);
}

#[tokio::test]
async fn test_check_and_reserve_follows_caller_transaction() {
    use sea_orm::TransactionTrait;

    let ctx = TestContext::new().await;
    let w1 = ctx.wallet().await;

    let txn = ctx.db.begin().await.unwrap();
    let state = ctx.limits.check_and_reserve(&txn, w1, 400_000).await.unwrap();
    assert_eq!(state.daily_spent, 400_000);

    let err = ctx
        .limits
        .check_and_reserve(&txn, w1, 600_001)
        .await
        .unwrap_err();
    assert!(matches!(AppError::from(err), AppError::BadRequest(_)));
    txn.rollback().await.unwrap();

    assert_eq!(ctx.limits.get_limits(w1).await.unwrap().daily_spent, 0);
}
