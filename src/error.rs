//! # Error Types
//!
//! This module defines error types used throughout the petprint library.

use thiserror::Error;

/// Main error type for petprint operations
#[derive(Debug, Error)]
pub enum PetprintError {
    /// Transport-level errors (device open, TTY setup, write)
    #[error("Transport error: {0}")]
    Transport(String),

    /// Font table errors (missing or wrongly sized ROM images)
    #[error("Font error: {0}")]
    Font(String),

    /// Image output error (PNG preview)
    #[error("Image error: {0}")]
    Image(String),

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
