//! Property-based tests for journal line validation rules.
//!
//! Every accepted set of lines satisfies the double-entry and single-side
//! invariants; every violation is rejected with the matching error.

use proptest::prelude::*;
use tijori_shared::types::AccountId;

use super::error::LedgerError;
use super::types::LineInput;
use super::validation::validate_lines;

/// Strategy to generate a valid positive amount in minor units.
fn positive_amount() -> impl Strategy<Value = i64> {
    1i64..100_000_000i64
}

/// Strategy to generate a balanced set of lines: random debits plus credits
/// that split the same total.
fn balanced_lines() -> impl Strategy<Value = Vec<LineInput>> {
    (
        prop::collection::vec(positive_amount(), 1..8),
        1usize..4,
    )
        .prop_map(|(debits, credit_count)| {
            let total: i64 = debits.iter().sum();
            let mut lines: Vec<LineInput> = debits
                .iter()
                .map(|d| LineInput::debit(AccountId::new(), *d))
                .collect();

            let credit_count = i64::try_from(credit_count).unwrap_or(1).min(total);
            let share = total / credit_count;
            let mut remaining = total;
            for i in 0..credit_count {
                let amount = if i == credit_count - 1 { remaining } else { share };
                remaining -= amount;
                lines.push(LineInput::credit(AccountId::new(), amount));
            }
            lines
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// *For any* balanced set of lines, validation accepts it and the totals match.
    #[test]
    fn prop_balanced_lines_accepted(lines in balanced_lines()) {
        let totals = validate_lines(&lines);
        prop_assert!(totals.is_ok(), "Balanced lines rejected: {:?}", totals);
        let totals = totals.unwrap();
        prop_assert_eq!(totals.debits, totals.credits);
        for line in &lines {
            prop_assert!((line.debit_amount > 0) ^ (line.credit_amount > 0));
        }
    }

    /// *For any* balanced entry, nudging one debit makes it unbalanced.
    #[test]
    fn prop_unbalanced_lines_rejected(
        mut lines in balanced_lines(),
        delta in 1i64..1_000,
    ) {
        lines[0].debit_amount += delta;
        let result = validate_lines(&lines);
        prop_assert!(
            matches!(result, Err(LedgerError::Unbalanced { .. })),
            "Unbalanced lines should be rejected, got: {:?}",
            result
        );
    }

    /// *For any* line with both sides set, validation rejects it.
    #[test]
    fn prop_double_sided_line_rejected(
        debit in positive_amount(),
        credit in positive_amount(),
    ) {
        let account = AccountId::new();
        let lines = vec![
            LineInput { account_id: account, debit_amount: debit, credit_amount: credit, description: None },
            LineInput::credit(account, debit),
        ];
        prop_assert_eq!(validate_lines(&lines), Err(LedgerError::InvalidLineSides { line: 0 }));
    }

    /// *For any* single line, validation rejects it.
    #[test]
    fn prop_single_line_rejected(amount in positive_amount()) {
        let lines = vec![LineInput::debit(AccountId::new(), amount)];
        prop_assert_eq!(validate_lines(&lines), Err(LedgerError::InsufficientLines));
    }
}
