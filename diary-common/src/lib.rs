//! # Deep Diary Common Library
//!
//! Shared code for the Deep Diary service:
//! - Error types
//! - Configuration loading
//! - The closed emotion label set

pub mod config;
pub mod emotion;
pub mod error;

pub use emotion::Emotion;
pub use error::{Error, Result};
