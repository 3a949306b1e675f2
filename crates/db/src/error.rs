//! Storage error helpers shared by the repositories.

use sea_orm::{DbErr, SqlErr};
use tijori_shared::AppError;

/// Returns true if the engine reported a unique constraint violation.
#[must_use]
pub fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

/// Maps a raw database error into the application taxonomy.
#[must_use]
pub fn database_error(err: &DbErr) -> AppError {
    if is_unique_violation(err) {
        AppError::Conflict(err.to_string())
    } else {
        AppError::Database(err.to_string())
    }
}
