//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.

pub mod account;
pub mod journal;
pub mod limits;
pub mod processor;
pub mod wallet;

pub use account::{AccountError, AccountFilter, AccountRepository, UpdateAccountInput};
pub use journal::{EntryWithLines, JournalError, JournalRepository, ReversalOutcome};
pub use limits::LimitRepository;
pub use processor::{MovementRequest, ProcessorError, TransferProcessor, TransferRequest};
pub use wallet::{WalletRepository, WalletStoreError};
