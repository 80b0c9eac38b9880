// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-family service simulators and the dispatcher that owns them

mod compute;
mod iam;
mod resource_manager;
mod simulator;

pub use compute::ComputeSimulator;
pub use iam::IamSimulator;
pub use resource_manager::ResourceManagerSimulator;
pub use simulator::Simulator;

use crate::request::SimResponse;
use crate::store::Store;
use async_trait::async_trait;
use mirage_common::api::Error;
use serde::Serialize;
use serde_json::Value;

/// Common contract implemented by each service family's simulator
///
/// A simulator maps one family's classified requests onto store reads and
/// writes and builds the synthesized body.  Simulators never see requests
/// belonging to another family; the dispatcher guarantees that by
/// construction.
#[async_trait]
pub trait ServiceSimulator {
    /// The family's classified request type
    type Request;

    async fn simulate(
        &self,
        store: &Store,
        request: Self::Request,
    ) -> Result<SimResponse, Error>;
}

/// Serializes a synthesized record for the wire.
///
/// Failure here means a bug in our own wire types, not bad caller input.
pub(crate) fn to_json<T: Serialize>(record: &T) -> Result<Value, Error> {
    serde_json::to_value(record).map_err(|e| {
        Error::internal_error(&format!(
            "serializing synthesized record: {}",
            e
        ))
    })
}
