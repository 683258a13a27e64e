//! # Registry Common
//!
//! Types shared by every crate of the system/topic registry.
//!
//! This crate provides the foundational pieces the service builds upon:
//! the error type used across the storage and API layers, and the
//! identifier newtypes for registered entities.

pub mod errors;
pub mod types;

// Re-export commonly used items
pub use errors::{Error, Result};
pub use types::{SystemName, TopicName};
