// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error handling facilities for the simulation engine

use crate::api::ResourceType;
use serde::Deserialize;
use serde::Serialize;

/// An error that can be generated while simulating a provisioning call
///
/// These are deliberately transport-agnostic.  The intercepting proxy that
/// hosts the engine decides how each variant is rendered back to the
/// provisioning client (a missing resource, for example, is conventionally
/// rendered as an empty JSON object).
#[derive(Clone, Debug, Deserialize, thiserror::Error, PartialEq, Serialize)]
pub enum Error {
    /// An object needed as part of this operation was not found.
    #[error("Object (of type {lookup_type:?}) not found: {type_name}")]
    ObjectNotFound { type_name: ResourceType, lookup_type: LookupType },
    /// The request was missing a block or field that the engine cannot
    /// synthesize around.  Failing loudly here beats storing a corrupt
    /// record that would poison later lookups.
    #[error("Invalid Request: {message}")]
    InvalidRequest { message: String },
    /// The engine's own bookkeeping is inconsistent (e.g. a poll for an
    /// operation that was never registered).
    #[error("Internal Error: {internal_message}")]
    InternalError { internal_message: String },
}

/// Indicates how an object was looked up (for an `ObjectNotFound` error)
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub enum LookupType {
    /// a specific name was requested
    ByName(String),
    /// a specific id was requested with some composite type
    /// (caller summarizes it)
    ByCompositeId(String),
}

impl LookupType {
    /// Returns an ObjectNotFound error appropriate for the case where this
    /// lookup failed
    pub fn into_not_found(self, type_name: ResourceType) -> Error {
        Error::ObjectNotFound { type_name, lookup_type: self }
    }
}

impl Error {
    /// Generates an [`Error::ObjectNotFound`] error for a lookup by name.
    pub fn not_found_by_name(type_name: ResourceType, name: &str) -> Error {
        LookupType::ByName(name.to_owned()).into_not_found(type_name)
    }

    /// Generates an [`Error::InvalidRequest`] error with the specific
    /// message
    pub fn invalid_request(message: &str) -> Error {
        Error::InvalidRequest { message: message.to_owned() }
    }

    /// Generates an [`Error::InternalError`] error with the specific
    /// message
    pub fn internal_error(internal_message: &str) -> Error {
        Error::InternalError { internal_message: internal_message.to_owned() }
    }
}
