//! Account repository for chart of accounts database operations.
//!
//! Balances on the `accounts` table are written only by the journal
//! repository when an entry is posted; nothing here touches them.

use std::sync::Arc;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use tijori_core::{Clock, LedgerPort, SystemClock};
use tijori_core::ledger::{
    self, AccountBalance, LedgerAccount, LedgerError, NewAccount, validate_new_account,
};
use tijori_shared::types::{AccountId, PageRequest, PageResponse};
use tijori_shared::{AppError, AppResult};
use tracing::{debug, instrument};

use crate::entities::{
    accounts,
    sea_orm_active_enums::{AccountStatus, AccountType},
};
use crate::error::is_unique_violation;

/// Error types for account operations.
#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    /// Account code already exists.
    #[error("Account code '{0}' already exists")]
    DuplicateCode(String),

    /// Parent account not found.
    #[error("Parent account not found: {0}")]
    ParentNotFound(AccountId),

    /// Account not found.
    #[error("Account not found: {0}")]
    NotFound(AccountId),

    /// No account with this code.
    #[error("Account not found: {0}")]
    CodeNotFound(String),

    /// Input failed validation.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<AccountError> for AppError {
    fn from(err: AccountError) -> Self {
        match err {
            AccountError::DuplicateCode(_) => Self::Conflict(err.to_string()),
            AccountError::ParentNotFound(_)
            | AccountError::NotFound(_)
            | AccountError::CodeNotFound(_) => Self::NotFound(err.to_string()),
            AccountError::Ledger(err) => err.into(),
            AccountError::Database(err) => crate::error::database_error(&err),
        }
    }
}

/// Input for updating an account. Balances are not editable.
#[derive(Debug, Clone, Default)]
pub struct UpdateAccountInput {
    /// New display name.
    pub name: Option<String>,
    /// New status.
    pub status: Option<ledger::AccountStatus>,
}

/// Filter options for listing accounts.
#[derive(Debug, Clone, Copy, Default)]
pub struct AccountFilter {
    /// Filter by account type.
    pub account_type: Option<ledger::AccountType>,
    /// Filter by status.
    pub status: Option<ledger::AccountStatus>,
}

/// Converts a stored account into the view exposed through [`LedgerPort`].
#[must_use]
pub fn to_ledger_account(model: accounts::Model) -> LedgerAccount {
    LedgerAccount {
        id: AccountId::from_uuid(model.id),
        code: model.code,
        name: model.name,
        account_type: model.account_type.into(),
        currency: model.currency,
        status: model.status.into(),
    }
}

/// Account repository for chart of accounts operations.
#[derive(Clone)]
pub struct AccountRepository {
    db: DatabaseConnection,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for AccountRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountRepository").finish_non_exhaustive()
    }
}

impl AccountRepository {
    /// Creates a new account repository using the system clock.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            clock: Arc::new(SystemClock),
        }
    }

    /// Replaces the clock.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Creates a new account with zero balances.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The code is empty, longer than 50 characters, or the currency is unknown
    /// - The code already exists (pre-check or unique index)
    /// - The parent account does not exist
    #[instrument(skip(self, input), fields(code = %input.code))]
    pub async fn create_account(&self, input: NewAccount) -> Result<accounts::Model, AccountError> {
        validate_new_account(&input)?;
        let code = input.code.trim().to_string();

        if self.find_account_by_code(&code).await?.is_some() {
            return Err(AccountError::DuplicateCode(code));
        }

        if let Some(parent_id) = input.parent_id {
            accounts::Entity::find_by_id(parent_id.into_inner())
                .one(&self.db)
                .await?
                .ok_or(AccountError::ParentNotFound(parent_id))?;
        }

        let now = self.clock.now().into();
        let account = accounts::ActiveModel {
            id: Set(AccountId::new().into_inner()),
            code: Set(code.clone()),
            name: Set(input.name.trim().to_string()),
            account_type: Set(input.account_type.into()),
            currency: Set(input.currency.to_uppercase()),
            balance: Set(0),
            debit_total: Set(0),
            credit_total: Set(0),
            status: Set(AccountStatus::Active),
            parent_id: Set(input.parent_id.map(AccountId::into_inner)),
            created_at: Set(now),
            updated_at: Set(now),
        };

        // A concurrent creator can win between the pre-check and the insert.
        let account = account.insert(&self.db).await.map_err(|err| {
            if is_unique_violation(&err) {
                AccountError::DuplicateCode(code.clone())
            } else {
                AccountError::Database(err)
            }
        })?;

        debug!(account_id = %account.id, "account created");
        Ok(account)
    }

    /// Finds an account by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_account(&self, id: AccountId) -> Result<Option<accounts::Model>, AccountError> {
        Ok(accounts::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await?)
    }

    /// Gets an account by ID.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the account does not exist.
    pub async fn get_account(&self, id: AccountId) -> Result<accounts::Model, AccountError> {
        self.find_account(id)
            .await?
            .ok_or(AccountError::NotFound(id))
    }

    /// Finds an account by code. Absence is `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_account_by_code(
        &self,
        code: &str,
    ) -> Result<Option<accounts::Model>, AccountError> {
        Ok(accounts::Entity::find()
            .filter(accounts::Column::Code.eq(code.trim()))
            .one(&self.db)
            .await?)
    }

    /// Gets an account by code.
    ///
    /// # Errors
    ///
    /// Returns `CodeNotFound` if no account has this code.
    pub async fn get_account_by_code(&self, code: &str) -> Result<accounts::Model, AccountError> {
        self.find_account_by_code(code)
            .await?
            .ok_or_else(|| AccountError::CodeNotFound(code.to_string()))
    }

    /// Lists accounts ordered by code.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_accounts(
        &self,
        filter: AccountFilter,
        page: PageRequest,
    ) -> Result<PageResponse<accounts::Model>, AccountError> {
        let mut query = accounts::Entity::find().order_by_asc(accounts::Column::Code);

        if let Some(account_type) = filter.account_type {
            query = query.filter(accounts::Column::AccountType.eq(AccountType::from(account_type)));
        }
        if let Some(status) = filter.status {
            query = query.filter(accounts::Column::Status.eq(AccountStatus::from(status)));
        }

        let total = query.clone().count(&self.db).await?;
        let data = query
            .limit(page.limit())
            .offset(page.offset())
            .all(&self.db)
            .await?;

        Ok(PageResponse::new(data, page, total))
    }

    /// Updates the name or status of an account.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the account does not exist.
    #[instrument(skip(self, input))]
    pub async fn update_account(
        &self,
        id: AccountId,
        input: UpdateAccountInput,
    ) -> Result<accounts::Model, AccountError> {
        let account = self.get_account(id).await?;
        let mut active: accounts::ActiveModel = account.into();

        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(status) = input.status {
            active.status = Set(status.into());
        }
        active.updated_at = Set(self.clock.now().into());

        Ok(active.update(&self.db).await?)
    }

    /// Gets the stored balance fields of an account.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the account does not exist.
    pub async fn get_balance(&self, id: AccountId) -> Result<AccountBalance, AccountError> {
        let account = self.get_account(id).await?;
        Ok(AccountBalance {
            balance: account.balance,
            debit_total: account.debit_total,
            credit_total: account.credit_total,
        })
    }
}

#[async_trait::async_trait]
impl LedgerPort for AccountRepository {
    async fn create_account(&self, input: NewAccount) -> AppResult<LedgerAccount> {
        let model = Self::create_account(self, input).await?;
        Ok(to_ledger_account(model))
    }

    async fn get_account_by_code(&self, code: &str) -> AppResult<Option<LedgerAccount>> {
        let model = self.find_account_by_code(code).await?;
        Ok(model.map(to_ledger_account))
    }
}
