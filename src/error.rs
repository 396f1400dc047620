use crate::database::DatabaseError;
use crate::models::ContributionStatus;
use rust_decimal::Decimal;
use sqlx::Error as SqlxError;
use thiserror::Error;
use uuid::Uuid;

/// Business-rule failures of the gift-exchange and funding core.
///
/// These are expected outcomes surfaced to the caller, never faults.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("At least {required} participants are required, got {actual}")]
    InsufficientParticipants { required: usize, actual: usize },

    #[error("Could not produce a valid assignment after {attempts} attempts")]
    DrawFailed { attempts: u32 },

    #[error("The draw has already been performed for this room")]
    RoomAlreadyDrawn,

    #[error("An active room already exists for this group or event")]
    DuplicateRoom,

    #[error("Not authorized: {0}")]
    NotAuthorized(String),

    #[error("Only the event organizer can do this")]
    NotOrganizer,

    #[error("Invalid amount: {0}")]
    InvalidAmount(Decimal),

    /// `status` is `None` when the event has no such contribution
    #[error(
        "Contribution {id} is {}, expected PENDING",
        .status.map_or("missing", |s| s.as_str())
    )]
    InvalidContributionState {
        id: Uuid,
        status: Option<ContributionStatus>,
    },

    #[error("Wishlist item is already booked")]
    AlreadyBooked,

    #[error("Wishlist item is not booked for this event")]
    NotBooked,

    #[error("The beneficiary cannot open the funding of their own event")]
    BeneficiaryAccessDenied,

    #[error("Participant has no assignment in this room")]
    NotAParticipant,

    #[error("The draw has not been performed yet")]
    DrawNotPerformed,
}

impl DomainError {
    /// Stable machine-readable code for API clients
    pub fn code(&self) -> &'static str {
        match self {
            DomainError::InsufficientParticipants { .. } => "insufficient_participants",
            DomainError::DrawFailed { .. } => "draw_failed",
            DomainError::RoomAlreadyDrawn => "room_already_drawn",
            DomainError::DuplicateRoom => "duplicate_room",
            DomainError::NotAuthorized(_) => "not_authorized",
            DomainError::NotOrganizer => "not_organizer",
            DomainError::InvalidAmount(_) => "invalid_amount",
            DomainError::InvalidContributionState { .. } => "invalid_contribution_state",
            DomainError::AlreadyBooked => "already_booked",
            DomainError::NotBooked => "not_booked",
            DomainError::BeneficiaryAccessDenied => "beneficiary_access_denied",
            DomainError::NotAParticipant => "not_a_participant",
            DomainError::DrawNotPerformed => "draw_not_performed",
        }
    }

    /// HTTP status code for the failure
    pub fn status_code(&self) -> u16 {
        match self {
            DomainError::InsufficientParticipants { .. }
            | DomainError::InvalidAmount(_)
            | DomainError::DrawNotPerformed => 400,
            DomainError::NotAuthorized(_)
            | DomainError::NotOrganizer
            | DomainError::BeneficiaryAccessDenied => 403,
            DomainError::NotAParticipant | DomainError::NotBooked => 404,
            DomainError::RoomAlreadyDrawn
            | DomainError::DuplicateRoom
            | DomainError::InvalidContributionState { .. }
            | DomainError::AlreadyBooked => 409,
            DomainError::DrawFailed { .. } => 500,
        }
    }
}

/// Application-level error types
#[derive(Error, Debug)]
pub enum AppError {
    /// Business rule outcomes
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// SQLx database errors
    #[error("SQL error: {0}")]
    Sqlx(#[from] SqlxError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Not found errors
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// External service errors
    #[error("External service error: {0}")]
    ExternalService(String),

    /// Generic error with message
    #[error("{0}")]
    Message(String),
}

/// Result type alias for application errors
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Check if error is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, AppError::NotFound(_))
    }

    /// Get the domain failure, if this is one
    pub fn as_domain(&self) -> Option<&DomainError> {
        match self {
            AppError::Domain(err) => Some(err),
            _ => None,
        }
    }

    /// Get HTTP status code for the error
    pub fn status_code(&self) -> u16 {
        match self {
            AppError::Domain(err) => err.status_code(),
            AppError::NotFound(_) => 404,
            AppError::Validation(_) => 400,
            AppError::Config(_) => 500,
            AppError::Database(_) | AppError::Sqlx(_) => 500,
            AppError::ExternalService(_) => 502,
            _ => 500,
        }
    }

    /// Machine-readable error code
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Domain(err) => err.code(),
            AppError::NotFound(_) => "not_found",
            AppError::Validation(_) => "validation",
            AppError::ExternalService(_) => "external_service",
            _ => "internal",
        }
    }
}

/// Repository-specific error types
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// Database query error
    #[error("Query error: {0}")]
    Query(SqlxError),

    /// Record not found
    #[error("Record not found")]
    NotFound(String),

    /// Duplicate record
    #[error("Duplicate record: {0}")]
    Duplicate(String),

    /// Constraint violation
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    /// Stored data that does not decode into a valid model
    #[error("Corrupt record: {0}")]
    Corrupt(String),
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound(msg) => AppError::NotFound(msg),
            RepositoryError::Query(e) => AppError::Sqlx(e),
            RepositoryError::Duplicate(msg) => AppError::Validation(format!("Duplicate: {}", msg)),
            RepositoryError::ConstraintViolation(msg) => AppError::Validation(msg),
            RepositoryError::Corrupt(msg) => AppError::Message(format!("Corrupt record: {}", msg)),
        }
    }
}

impl From<SqlxError> for RepositoryError {
    fn from(err: SqlxError) -> Self {
        match &err {
            SqlxError::RowNotFound => RepositoryError::NotFound("Record not found".to_string()),
            SqlxError::Database(db_err) => {
                // Check for common PostgreSQL error codes
                let code = db_err.code().map(|c| c.to_string());
                if code.as_deref() == Some("23505") {
                    // Unique violation
                    RepositoryError::Duplicate(db_err.message().to_string())
                } else if code.as_deref() == Some("23503") {
                    // Foreign key violation
                    RepositoryError::ConstraintViolation(db_err.message().to_string())
                } else if code.as_deref() == Some("23514") {
                    // Check constraint violation
                    RepositoryError::ConstraintViolation(db_err.message().to_string())
                } else {
                    RepositoryError::Query(err)
                }
            }
            _ => RepositoryError::Query(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_status_codes() {
        assert_eq!(DomainError::RoomAlreadyDrawn.status_code(), 409);
        assert_eq!(DomainError::NotOrganizer.status_code(), 403);
        assert_eq!(DomainError::BeneficiaryAccessDenied.status_code(), 403);
        assert_eq!(DomainError::DrawNotPerformed.status_code(), 400);
        assert_eq!(
            DomainError::InsufficientParticipants { required: 3, actual: 2 }.status_code(),
            400
        );
    }

    #[test]
    fn test_app_error_wraps_domain() {
        let err: AppError = DomainError::AlreadyBooked.into();
        assert_eq!(err.status_code(), 409);
        assert_eq!(err.code(), "already_booked");
        assert_eq!(err.as_domain(), Some(&DomainError::AlreadyBooked));
    }

    #[test]
    fn test_missing_contribution_message() {
        let id = Uuid::nil();
        let err = DomainError::InvalidContributionState { id, status: None };
        assert_eq!(err.status_code(), 409);
        assert_eq!(
            err.to_string(),
            format!("Contribution {} is missing, expected PENDING", id)
        );

        let err = DomainError::InvalidContributionState {
            id,
            status: Some(ContributionStatus::Rejected),
        };
        assert!(err.to_string().contains("is REJECTED"));
    }

    #[test]
    fn test_repository_error_conversion() {
        let err: AppError = RepositoryError::NotFound("Room not found".into()).into();
        assert!(err.is_not_found());
        assert_eq!(err.status_code(), 404);
    }

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        let err: RepositoryError = SqlxError::RowNotFound.into();
        assert!(matches!(err, RepositoryError::NotFound(_)));
    }
}
