/// Boxed error coming from a store implementation (database driver, etc.).
pub type StoreError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),

    /// A data-layer failure, passed through untouched.
    #[error(transparent)]
    Store(StoreError),
}

impl CoreError {
    /// Shorthand for [`CoreError::NotFound`] with any displayable id.
    pub fn not_found(entity: &'static str, id: impl std::fmt::Display) -> Self {
        CoreError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Wrap a store error without altering it.
    pub fn store<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        CoreError::Store(Box::new(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, thiserror::Error)]
    #[error("Database connection failed")]
    struct FakeDbError;

    #[test]
    fn store_error_keeps_original_message() {
        let err = CoreError::store(FakeDbError);
        assert_eq!(err.to_string(), "Database connection failed");
    }

    #[test]
    fn store_error_can_be_downcast() {
        let err = CoreError::store(FakeDbError);
        match err {
            CoreError::Store(inner) => assert!(inner.downcast_ref::<FakeDbError>().is_some()),
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn not_found_formats_entity_and_id() {
        let err = CoreError::not_found("ApprovalRule", 7);
        assert_eq!(err.to_string(), "Entity not found: ApprovalRule with id 7");
    }
}
