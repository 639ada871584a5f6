//! # Error Types
//!
//! Errors raised at the edges of the engine: loading configuration and decoding
//! caption payloads handed over by the player.
//!
//! The core operations (caption parsing, grouping, selection resolving, scoring
//! and every loop-controller transition) never fail on degenerate input. They
//! return empty collections, `None`, or an outcome value instead, so nothing in
//! this module is ever produced by them.
//!
//! ## Error Types
//! - `Config` - The YAML configuration could not be deserialized
//! - `InvalidConfig` - The configuration deserialized but holds unusable values
//! - `CaptionPayload` - The caption payload is not valid JSON
//! - `Io` - Reading a configuration or caption file failed
//!
//! ## Usage
//! ```rust
//! use shadowing::{EngineConfig, ShadowingError};
//!
//! match EngineConfig::from_yaml_str("scoring:\n  window: 0\n") {
//!     Ok(_) => unreachable!(),
//!     Err(ShadowingError::InvalidConfig(message)) => assert!(message.contains("window")),
//!     Err(e) => panic!("unexpected error: {}", e),
//! }
//! ```

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ShadowingError {
    /// The YAML configuration could not be deserialized.
    #[error("Config error: {0}")]
    Config(#[from] serde_yaml::Error),

    /// The configuration holds values the engine cannot work with.
    ///
    /// # Example
    /// ```
    /// # use shadowing::ShadowingError;
    /// let err = ShadowingError::InvalidConfig("scoring.window must be at least 1".to_string());
    /// assert_eq!(err.to_string(), "Invalid config: scoring.window must be at least 1");
    /// ```
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// The caption payload is not valid JSON.
    ///
    /// A payload that is valid JSON but has the wrong shape is not an error; it
    /// simply yields no events.
    #[error("Caption payload error: {0}")]
    CaptionPayload(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for the boundary operations of this crate.
pub type Result<T> = std::result::Result<T, ShadowingError>;
