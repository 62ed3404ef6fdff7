//! The module contains the error the engine can throw.
//!
//! The errors are:
//!
//! - [`SlotConflict`] thrown when a booking overlaps an existing one.
//! - [`KeyNotFound`] thrown when an item are not found.
//!
//!  [`SlotConflict`]: EngineError::SlotConflict
//!  [`KeyNotFound`]: EngineError::KeyNotFound
use thiserror::Error;

use crate::appointments::AppointmentStatus;
use crate::storage::StorageError;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid time format: {0}")]
    InvalidTimeFormat(String),
    #[error("Time slot already taken: {0}")]
    SlotConflict(String),
    #[error("Illegal status transition: {from} -> {to}")]
    IllegalTransition {
        from: AppointmentStatus,
        to: AppointmentStatus,
    },
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("\"{0}\" already present!")]
    ExistingKey(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Insufficient stock: {0}")]
    InsufficientStock(String),
    #[error("Export failed: {0}")]
    Export(String),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::InvalidTimeFormat(a), Self::InvalidTimeFormat(b)) => a == b,
            (Self::SlotConflict(a), Self::SlotConflict(b)) => a == b,
            (
                Self::IllegalTransition { from: a, to: b },
                Self::IllegalTransition { from: c, to: d },
            ) => a == c && b == d,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::InsufficientStock(a), Self::InsufficientStock(b)) => a == b,
            (Self::Export(a), Self::Export(b)) => a == b,
            (Self::Storage(a), Self::Storage(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
