// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Data structures for the simulated provisioning APIs
//!
//! The contents here are wire representations only; none of these types
//! know anything about the store that holds them or the transport that
//! delivers them.

mod error;
pub mod gcp;

pub use error::Error;
pub use error::LookupType;

use serde::Deserialize;
use serde::Serialize;
use std::fmt;

/// Result of a create operation for the specified type
pub type CreateResult<T> = Result<T, Error>;
/// Result of a lookup operation for the specified type
pub type LookupResult<T> = Result<T, Error>;
/// Result of an update operation for the specified type
pub type UpdateResult<T> = Result<T, Error>;

/// Kinds of resources the engine synthesizes
///
/// The key prefix doubles as the changeset type tag, which is why these
/// are platform-specific strings rather than generic nouns.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum ResourceType {
    ServiceAccount,
    IamPolicy,
    ComputeInstance,
}

impl ResourceType {
    /// Returns the store-key prefix (and changeset type tag) for this kind
    /// of resource.
    pub fn key_prefix(&self) -> &'static str {
        match self {
            ResourceType::ServiceAccount => "gcp_iam_serviceaccount",
            ResourceType::IamPolicy => "gcp_cloudresourcemanager_iam_policy",
            ResourceType::ComputeInstance => "gcp_compute_instance",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ResourceType::ServiceAccount => "service account",
            ResourceType::IamPolicy => "IAM policy",
            ResourceType::ComputeInstance => "compute instance",
        };
        write!(f, "{}", s)
    }
}
