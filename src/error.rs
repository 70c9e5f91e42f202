//! Error types.
//!
//! [`MontageError`] covers everything the matcher can reject outright.
//! Operator selection has its own [`crate::ranking::SelectionRejection`]
//! because a rejected selection is an expected outcome, not a failure.
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MontageError {
    #[error("wrong position method '{0}', expected 'position' or 'channel_name'")]
    InvalidMethod(String),

    #[error("duplicate channel name: {0}")]
    DuplicateChannel(String),

    #[error("unknown montage: {0}")]
    UnknownMontage(String),

    #[error("failed to load montage '{name}': {reason}")]
    MontageLoad { name: String, reason: String },

    #[error("no montage in the catalog has a usable position score; assign a montage manually")]
    NoUsableMontage,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, MontageError>;
