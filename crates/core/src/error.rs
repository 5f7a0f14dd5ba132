use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Missing or invalid startup configuration. Fatal.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The authoritative store could not be reached or rejected the request.
    #[error("Remote store unavailable: {0}")]
    RemoteUnavailable(String),

    /// The local mirror is missing, corrupt, or could not be rebuilt.
    #[error("Search unavailable: {0}")]
    MirrorUnavailable(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Internal error: {0}")]
    Internal(String),
}
