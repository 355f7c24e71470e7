// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for model access operations

use crate::EntityId;
use thiserror::Error;

/// Result type alias for model access
pub type Result<T> = std::result::Result<T, ModelError>;

/// Errors raised while opening a model or reading from it
#[derive(Error, Debug)]
pub enum ModelError {
    /// The model content is not in a form the loader understands
    #[error("Invalid model format: {0}")]
    InvalidFormat(String),

    /// Entity not found
    #[error("Entity {0} not found")]
    EntityNotFound(EntityId),

    /// An attribute that should hold a reference does not resolve
    #[error("Invalid entity reference at {entity}: attribute {attribute}")]
    InvalidReference { entity: EntityId, attribute: usize },

    /// Type mismatch when accessing attribute
    #[error(
        "Type mismatch at entity {entity} attribute {attribute}: expected {expected}, got {actual}"
    )]
    TypeMismatch {
        entity: EntityId,
        attribute: usize,
        expected: String,
        actual: String,
    },

    /// Missing required attribute
    #[error("Missing required attribute {attribute} on entity {entity}")]
    MissingAttribute { entity: EntityId, attribute: usize },

    /// Volume evaluation failed for an entity
    #[error("Geometry error for entity {entity}: {message}")]
    Geometry { entity: EntityId, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ModelError {
    /// Create a new format error
    pub fn format(msg: impl Into<String>) -> Self {
        ModelError::InvalidFormat(msg.into())
    }

    /// Create a type mismatch error for an attribute slot
    pub fn type_mismatch(
        entity: EntityId,
        attribute: usize,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        ModelError::TypeMismatch {
            entity,
            attribute,
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Create a new geometry error
    pub fn geometry(entity: EntityId, msg: impl Into<String>) -> Self {
        ModelError::Geometry {
            entity,
            message: msg.into(),
        }
    }
}
