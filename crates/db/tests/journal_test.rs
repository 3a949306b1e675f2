//! Journal entry lifecycle against the chart of accounts.

mod common;

use common::TestContext;
use rstest::rstest;
use tijori_core::DomainEvent;
use tijori_core::ledger::{
    AccountStatus, AccountType, EntryStatus, JournalEntryType, LineInput, NewJournalEntry,
};
use tijori_db::entities::sea_orm_active_enums::{EntryStatus as DbEntryStatus, EntryType};
use tijori_db::repositories::UpdateAccountInput;
use tijori_shared::AppError;
use tijori_shared::types::{AccountId, JournalEntryId, PageRequest, UserId};

fn entry(lines: Vec<LineInput>) -> NewJournalEntry {
    NewJournalEntry {
        entry_type: JournalEntryType::Standard,
        description: "Test entry".into(),
        reference: None,
        lines,
        created_by: UserId::new(),
    }
}

async fn posted(
    ctx: &TestContext,
    debit: AccountId,
    credit: AccountId,
    amount: i64,
) -> JournalEntryId {
    let draft = ctx
        .journal
        .create_entry(entry(vec![
            LineInput::debit(debit, amount),
            LineInput::credit(credit, amount),
        ]))
        .await
        .unwrap();
    let id = JournalEntryId::from_uuid(draft.entry.id);
    ctx.journal.post_entry(id, UserId::new()).await.unwrap();
    id
}

#[tokio::test]
async fn test_entry_numbers_are_sequential() {
    let ctx = TestContext::new().await;
    let cash = ctx.account("1000", AccountType::Asset).await;
    let equity = ctx.account("3000", AccountType::Equity).await;

    let mut numbers = Vec::new();
    for _ in 0..3 {
        let draft = ctx
            .journal
            .create_entry(entry(vec![LineInput::debit(cash, 10), LineInput::credit(equity, 10)]))
            .await
            .unwrap();
        assert_eq!(draft.entry.status, DbEntryStatus::Draft);
        numbers.push(draft.entry.entry_number);
    }
    assert_eq!(numbers, ["JE-00000001", "JE-00000002", "JE-00000003"]);
}

#[tokio::test]
async fn test_draft_does_not_touch_balances() {
    let ctx = TestContext::new().await;
    let cash = ctx.account("1000", AccountType::Asset).await;
    let equity = ctx.account("3000", AccountType::Equity).await;

    ctx.journal
        .create_entry(entry(vec![LineInput::debit(cash, 500), LineInput::credit(equity, 500)]))
        .await
        .unwrap();

    let balance = ctx.accounts.get_balance(cash).await.unwrap();
    assert_eq!(balance.balance, 0);
    assert_eq!(balance.debit_total, 0);
}

#[tokio::test]
async fn test_post_applies_normal_sides() {
    let ctx = TestContext::new().await;
    let cash = ctx.account("1000", AccountType::Asset).await;
    let deposits = ctx.account("2000", AccountType::Liability).await;

    let id = posted(&ctx, cash, deposits, 7_500).await;

    let cash_balance = ctx.accounts.get_balance(cash).await.unwrap();
    assert_eq!(cash_balance.balance, 7_500);
    assert_eq!(cash_balance.debit_total, 7_500);
    assert_eq!(cash_balance.credit_total, 0);

    let liability = ctx.accounts.get_balance(deposits).await.unwrap();
    assert_eq!(liability.balance, 7_500);
    assert_eq!(liability.credit_total, 7_500);

    let stored = ctx.journal.get_entry(id).await.unwrap();
    assert_eq!(stored.entry.status, DbEntryStatus::Posted);
    assert!(stored.entry.posted_at.is_some());
    assert_eq!(stored.lines.len(), 2);
    assert_eq!(stored.lines[0].line_number, 1);

    assert!(ctx.events.events().iter().any(|event| matches!(
        event,
        DomainEvent::EntryPosted { entry_id, .. } if *entry_id == id
    )));
}

#[tokio::test]
async fn test_missing_account_is_not_found() {
    let ctx = TestContext::new().await;
    let cash = ctx.account("1000", AccountType::Asset).await;

    let err = ctx
        .journal
        .create_entry(entry(vec![
            LineInput::debit(cash, 10),
            LineInput::credit(AccountId::new(), 10),
        ]))
        .await
        .unwrap_err();
    assert!(matches!(AppError::from(err), AppError::NotFound(_)));
}

#[tokio::test]
async fn test_post_to_inactive_account_is_rejected() {
    let ctx = TestContext::new().await;
    let cash = ctx.account("1000", AccountType::Asset).await;
    let equity = ctx.account("3000", AccountType::Equity).await;

    let draft = ctx
        .journal
        .create_entry(entry(vec![LineInput::debit(cash, 10), LineInput::credit(equity, 10)]))
        .await
        .unwrap();

    ctx.accounts
        .update_account(
            equity,
            UpdateAccountInput {
                name: None,
                status: Some(AccountStatus::Inactive),
            },
        )
        .await
        .unwrap();

    let id = JournalEntryId::from_uuid(draft.entry.id);
    let err = ctx.journal.post_entry(id, UserId::new()).await.unwrap_err();
    assert!(matches!(AppError::from(err), AppError::BadRequest(_)));

    // Nothing was applied and the entry stays a draft.
    assert_eq!(ctx.accounts.get_balance(cash).await.unwrap().balance, 0);
    let stored = ctx.journal.get_entry(id).await.unwrap();
    assert_eq!(stored.entry.status, DbEntryStatus::Draft);
}

#[tokio::test]
async fn test_void_is_audit_only() {
    let ctx = TestContext::new().await;
    let cash = ctx.account("1000", AccountType::Asset).await;
    let equity = ctx.account("3000", AccountType::Equity).await;
    let id = posted(&ctx, cash, equity, 2_000).await;

    let blank = ctx.journal.void_entry(id, UserId::new(), "  ").await.unwrap_err();
    assert!(matches!(AppError::from(blank), AppError::Validation(_)));

    let voided = ctx
        .journal
        .void_entry(id, UserId::new(), "entered twice")
        .await
        .unwrap();
    assert_eq!(voided.status, DbEntryStatus::Voided);
    assert_eq!(voided.void_reason.as_deref(), Some("entered twice"));

    assert_eq!(ctx.accounts.get_balance(cash).await.unwrap().balance, 2_000);

    let again = ctx
        .journal
        .void_entry(id, UserId::new(), "entered twice")
        .await
        .unwrap_err();
    assert!(matches!(AppError::from(again), AppError::Conflict(_)));
}

#[tokio::test]
async fn test_reverse_restores_balances_and_links_entries() {
    let ctx = TestContext::new().await;
    let cash = ctx.account("1000", AccountType::Asset).await;
    let revenue = ctx.account("4000", AccountType::Revenue).await;
    let id = posted(&ctx, cash, revenue, 3_000).await;

    let short = ctx.journal.reverse_entry(id, UserId::new(), "oops").await.unwrap_err();
    assert!(matches!(AppError::from(short), AppError::Validation(_)));

    let outcome = ctx
        .journal
        .reverse_entry(id, UserId::new(), "posted to the wrong account")
        .await
        .unwrap();

    assert_eq!(outcome.original.status, DbEntryStatus::Reversed);
    assert_eq!(outcome.original.reversed_by_entry_id, Some(outcome.reversal.entry.id));
    assert_eq!(outcome.reversal.entry.reverses_entry_id, Some(outcome.original.id));
    assert_eq!(outcome.reversal.entry.entry_type, EntryType::Reversing);
    assert_eq!(outcome.reversal.entry.status, DbEntryStatus::Posted);
    assert_eq!(outcome.reversal.entry.entry_number, "JE-00000002");
    assert!(outcome.reversal.entry.description.contains("JE-00000001"));

    let cash_balance = ctx.accounts.get_balance(cash).await.unwrap();
    assert_eq!(cash_balance.balance, 0);
    assert_eq!(cash_balance.debit_total, 3_000);
    assert_eq!(cash_balance.credit_total, 3_000);
    assert_eq!(ctx.accounts.get_balance(revenue).await.unwrap().balance, 0);

    let twice = ctx
        .journal
        .reverse_entry(id, UserId::new(), "posted to the wrong account")
        .await
        .unwrap_err();
    assert!(matches!(AppError::from(twice), AppError::Conflict(_)));
}

#[rstest]
#[case::void(true)]
#[case::reverse(false)]
#[tokio::test]
async fn test_draft_cannot_be_voided_or_reversed(#[case] void: bool) {
    let ctx = TestContext::new().await;
    let cash = ctx.account("1000", AccountType::Asset).await;
    let equity = ctx.account("3000", AccountType::Equity).await;
    let draft = ctx
        .journal
        .create_entry(entry(vec![LineInput::debit(cash, 10), LineInput::credit(equity, 10)]))
        .await
        .unwrap();
    let id = JournalEntryId::from_uuid(draft.entry.id);

    let err = if void {
        ctx.journal.void_entry(id, UserId::new(), "not needed").await.unwrap_err()
    } else {
        ctx.journal
            .reverse_entry(id, UserId::new(), "not needed at all")
            .await
            .map(|_| ())
            .unwrap_err()
    };
    let err = AppError::from(err);
    assert!(matches!(err, AppError::Conflict(_)));
    assert!(err.message().contains("entry is not posted"));
}

#[tokio::test]
async fn test_delete_draft_only() {
    let ctx = TestContext::new().await;
    let cash = ctx.account("1000", AccountType::Asset).await;
    let equity = ctx.account("3000", AccountType::Equity).await;

    let draft = ctx
        .journal
        .create_entry(entry(vec![LineInput::debit(cash, 10), LineInput::credit(equity, 10)]))
        .await
        .unwrap();
    let draft_id = JournalEntryId::from_uuid(draft.entry.id);
    ctx.journal.delete_draft(draft_id).await.unwrap();
    let gone = ctx.journal.get_entry(draft_id).await.unwrap_err();
    assert!(matches!(AppError::from(gone), AppError::NotFound(_)));

    let id = posted(&ctx, cash, equity, 10).await;
    let err = ctx.journal.delete_draft(id).await.unwrap_err();
    assert!(matches!(AppError::from(err), AppError::Conflict(_)));
}

#[tokio::test]
async fn test_list_entries_by_status() {
    let ctx = TestContext::new().await;
    let cash = ctx.account("1000", AccountType::Asset).await;
    let equity = ctx.account("3000", AccountType::Equity).await;

    posted(&ctx, cash, equity, 10).await;
    posted(&ctx, cash, equity, 20).await;
    ctx.journal
        .create_entry(entry(vec![LineInput::debit(cash, 30), LineInput::credit(equity, 30)]))
        .await
        .unwrap();

    let page = ctx
        .journal
        .list_entries(Some(EntryStatus::Posted), PageRequest::new(1, 0))
        .await
        .unwrap();
    assert_eq!(page.meta.total, 2);
    assert_eq!(page.data.len(), 1);
    assert_eq!(page.data[0].entry_number, "JE-00000001");

    let all = ctx
        .journal
        .list_entries(None, PageRequest::new(10, 0))
        .await
        .unwrap();
    assert_eq!(all.meta.total, 3);
}
