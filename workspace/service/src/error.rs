use thiserror::Error;

/// Error types for the service layer.
///
/// Authentication failures (bad credentials, bad or expired reset
/// tokens) are deliberately *not* part of this enum: those surface as
/// `Ok(None)` so callers cannot tell the causes apart.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// The username is already taken (case-sensitive exact match)
    #[error("username '{0}' is already taken")]
    DuplicateUsername(String),

    /// The email is already registered (case-sensitive exact match)
    #[error("email '{0}' is already registered")]
    DuplicateEmail(String),

    /// A referenced record does not exist
    #[error("{0} {1} not found")]
    NotFound(&'static str, i32),

    /// A strict pagination request asked for a page past the end
    #[error("page {page} is out of range (total pages: {total_pages})")]
    PageOutOfRange { page: u64, total_pages: u64 },

    /// The password hashing backend failed
    #[error("password hashing failed: {0}")]
    PasswordHash(String),

    /// Signing a reset token failed (verification failures are `None`)
    #[error("token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    /// Error from the database operations
    #[error("database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

/// Type alias for Result with ServiceError
pub type Result<T> = std::result::Result<T, ServiceError>;
