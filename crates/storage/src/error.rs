use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Not found")]
    NotFound,

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Heats of event {event_id} for category {category_id} have already started")]
    HeatsAlreadyStarted { event_id: Uuid, category_id: Uuid },

    #[error("Every event of category {category_id} already has heats")]
    NothingToSchedule { category_id: Uuid },
}

pub type Result<T> = std::result::Result<T, StorageError>;

impl StorageError {
    pub fn is_unique_violation(&self) -> bool {
        matches!(
            self,
            StorageError::Database(sqlx::Error::Database(e))
                if e.code().as_deref() == Some("23505")
        )
    }

    pub fn is_foreign_key_violation(&self) -> bool {
        matches!(
            self,
            StorageError::Database(sqlx::Error::Database(e))
                if e.code().as_deref() == Some("23503")
        )
    }

    /// Rejections caused by the request rather than by the store.
    pub fn is_precondition_failure(&self) -> bool {
        matches!(
            self,
            StorageError::HeatsAlreadyStarted { .. } | StorageError::NothingToSchedule { .. }
        )
    }
}
