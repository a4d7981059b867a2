use thiserror::Error;

use crate::booking::BookingRejection;

#[derive(Error, Debug)]
pub enum SchedulingError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Booking rejected: {0}")]
    Conflict(BookingRejection),

    #[error("External service error: {0}")]
    ExternalService(String),

    #[error("Database error: {0}")]
    Database(#[from] eyre::Report),

    #[error("Internal server error: {0}")]
    Internal(#[from] Box<dyn std::error::Error + Send + Sync>),
}

pub type SchedulingResult<T> = Result<T, SchedulingError>;
