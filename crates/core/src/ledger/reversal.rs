//! Reversing entry construction.
//!
//! A reversal books a new entry whose lines swap debits and credits of the
//! original, so every account returns to its pre-posting balance.

use super::types::LineInput;

/// Builds the swapped lines for a reversing entry.
///
/// Every debit becomes a credit of the same amount and vice versa. Line
/// descriptions are prefixed with `Reversal: `.
#[must_use]
pub fn reversing_lines(original: &[LineInput]) -> Vec<LineInput> {
    original
        .iter()
        .map(|line| LineInput {
            account_id: line.account_id,
            debit_amount: line.credit_amount,
            credit_amount: line.debit_amount,
            description: Some(format!(
                "Reversal: {}",
                line.description.clone().unwrap_or_default()
            )),
        })
        .collect()
}

/// Description of the reversing entry.
#[must_use]
pub fn reversal_description(original_entry_number: &str, reason: &str) -> String {
    format!("Reversal of {original_entry_number}. Reason: {}", reason.trim())
}
