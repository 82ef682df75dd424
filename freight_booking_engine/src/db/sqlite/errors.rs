use thiserror::Error;

use crate::traits::BookingGatewayError;

#[derive(Debug, Error)]
pub enum SqliteDatabaseError {
    #[error("Database connection error: {0}")]
    DriverError(#[from] sqlx::Error),
    #[error("Database migration error: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),
    #[error("Cannot process duplicate load {0}")]
    DuplicateLoad(String),
    #[error("The load row version has moved on. The write was refused.")]
    VersionConflict,
    #[error("Capacity decrement of {0} refused. It would drive the count negative.")]
    CapacityExhausted(i64),
}

impl From<SqliteDatabaseError> for BookingGatewayError {
    fn from(e: SqliteDatabaseError) -> Self {
        BookingGatewayError::DatabaseError(e.to_string())
    }
}
