//! Error handling for the Tadawul tracker
//!
//! Defines custom error types and establishes a unified Result type
//! using anyhow for context chaining and error propagation.

use thiserror::Error;

/// Core error types for portfolio operations
#[derive(Error, Debug)]
pub enum PortfolioError {
    #[error("invalid transaction: {0}")]
    InvalidTransaction(String),

    #[error("store error: {0}")]
    StoreError(String),

    #[error("parse error: {0}")]
    ParseError(String),

    #[error("pricing error: {0}")]
    PricingError(String),

    #[error("io error")]
    Io(#[from] std::io::Error),
}

/// Result type alias for portfolio operations
pub type Result<T> = anyhow::Result<T>;
