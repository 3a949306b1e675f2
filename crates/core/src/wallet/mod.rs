//! Wallet status rules and balance/hold arithmetic.
//!
//! - `types` - Wallet domain types
//! - `rules` - Status transitions, ownership, and balance mutations
//! - `error` - Wallet-specific error types

pub mod error;
pub mod rules;
pub mod types;

pub use error::WalletError;
pub use rules::{ensure_active, ensure_owner, validate_close, validate_status_change};
pub use types::{WalletBalance, WalletSnapshot, WalletStatus, WalletType};
