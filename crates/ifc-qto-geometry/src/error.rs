// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for volume evaluation

use ifc_qto_model::ModelError;
use thiserror::Error;

/// Geometry evaluation result type
pub type Result<T> = std::result::Result<T, Error>;

/// Geometry evaluation errors
#[derive(Error, Debug)]
pub enum Error {
    #[error("Geometry error: {0}")]
    Geometry(String),

    #[error("Entity not found: #{0}")]
    EntityNotFound(u32),

    #[error("Invalid attribute at index {index}: {message}")]
    InvalidAttribute { index: usize, message: String },

    #[error("Profile error: {0}")]
    Profile(String),

    /// The solid does not enclose a volume (open shell, zero depth, ...)
    #[error("Degenerate solid: {0}")]
    Degenerate(String),

    /// Unsupported geometry type
    #[error("Unsupported geometry type: {0}")]
    UnsupportedType(String),

    #[error(transparent)]
    Model(#[from] ModelError),
}

impl Error {
    /// Create a geometry error
    pub fn geometry(msg: impl Into<String>) -> Self {
        Error::Geometry(msg.into())
    }

    /// Create a profile error
    pub fn profile(msg: impl Into<String>) -> Self {
        Error::Profile(msg.into())
    }

    /// Create a degenerate solid error
    pub fn degenerate(msg: impl Into<String>) -> Self {
        Error::Degenerate(msg.into())
    }

    /// Create an entity not found error
    pub fn entity_not_found(id: u32) -> Self {
        Error::EntityNotFound(id)
    }

    /// Create an invalid attribute error
    pub fn invalid_attribute(index: usize, msg: impl Into<String>) -> Self {
        Error::InvalidAttribute {
            index,
            message: msg.into(),
        }
    }

    /// Create an unsupported type error
    pub fn unsupported_type(type_name: impl Into<String>) -> Self {
        Error::UnsupportedType(type_name.into())
    }
}
