//! Data types for the registry.
//!
//! # Rust Learning Note
//!
//! The JSON field names are part of the public contract (`systemName`,
//! `topicName`, `applicationEndpoint`), so they are pinned with `serde`
//! attributes while the Rust fields keep snake_case names:
//!
//! ```rust,ignore
//! #[derive(Serialize, Deserialize)]
//! #[serde(rename_all = "camelCase")]
//! pub struct System {
//!     #[serde(rename = "systemName")]
//!     pub name: SystemName,
//!     pub application_endpoint: String,
//! }
//! ```
//!
//! Missing fields are a decode error - there is no silent zero value.

use registry_common::{Error, Result, SystemName, TopicName};
use serde::{Deserialize, Serialize};

/// A registered application with a reachable endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct System {
    /// Unique system name (primary key).
    #[serde(rename = "systemName")]
    pub name: SystemName,

    /// URL or host reference the application is reachable at.
    pub application_endpoint: String,
}

impl System {
    /// Creates a new System.
    pub fn new(name: impl Into<SystemName>, application_endpoint: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            application_endpoint: application_endpoint.into(),
        }
    }

    /// Checks the invariants serde cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.name.is_blank() {
            return Err(Error::validation("systemName must not be empty"));
        }
        Ok(())
    }
}

/// A named message channel with descriptive metadata and an owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    /// Unique topic name (primary key).
    #[serde(rename = "topicName")]
    pub name: TopicName,

    pub description: String,

    /// Responsible system or user.
    pub owner: String,

    /// JSON-encoded schema describing the message shape.
    pub structure: String,

    /// Subscriber identifiers.
    ///
    /// Accepted on input for shape compatibility but never persisted by
    /// any write path; reads return an empty list.
    #[serde(default)]
    pub subscribers: Vec<String>,
}

impl Topic {
    /// Creates a new Topic with no subscribers.
    pub fn new(
        name: impl Into<TopicName>,
        description: impl Into<String>,
        owner: impl Into<String>,
        structure: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            owner: owner.into(),
            structure: structure.into(),
            subscribers: Vec::new(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.is_blank() {
            return Err(Error::validation("topicName must not be empty"));
        }
        Ok(())
    }
}

/// Response from a successful registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub id: u32,
}

impl RegisterResponse {
    /// The fixed acknowledgement returned by every registration.
    pub fn registered() -> Self {
        Self { id: 1 }
    }
}

/// Error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
