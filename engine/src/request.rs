// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Input and outcome types at the engine's boundary with the transport

use http::Method;
use serde_json::Value;

/// A decoded provisioning call, as delivered by the intercepting proxy
///
/// The proxy has already terminated the connection and decoded the body;
/// the engine sees only this HTTP-shaped summary and never performs network
/// I/O of its own.
#[derive(Clone, Debug)]
pub struct ApiRequest {
    /// Target host of the intercepted call, e.g. `compute.googleapis.com`
    pub host: String,
    pub method: Method,
    /// URL path, with or without a query string
    pub path: String,
    /// Decoded JSON body, when the call carried one
    pub body: Option<Value>,
}

/// Outcome of simulating one provisioning call
///
/// Pass-through is an explicit variant rather than an empty body: it tells
/// the transport to leave the exchange unmodified, which is a routing
/// decision and not an error.  Missing resources are reported through
/// [`mirage_common::api::Error::ObjectNotFound`] so that the three cases
/// (synthesized, pass-through, not-found) can never be conflated.
#[derive(Clone, Debug, PartialEq)]
pub enum SimResponse {
    /// Respond to the caller with this synthesized JSON body
    Synthesized(Value),
    /// Take no action; the exchange should proceed unintercepted
    PassThrough,
}

impl SimResponse {
    /// Returns the synthesized body, if there is one.
    pub fn into_body(self) -> Option<Value> {
        match self {
            SimResponse::Synthesized(body) => Some(body),
            SimResponse::PassThrough => None,
        }
    }

    pub fn is_pass_through(&self) -> bool {
        matches!(self, SimResponse::PassThrough)
    }
}
