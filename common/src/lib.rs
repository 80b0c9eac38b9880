// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Types shared by the mirage simulation engine and its collaborators
//!
//! Everything here is HTTP-agnostic: the transport that intercepts
//! provisioning calls and the orchestration that owns a simulated session
//! both live outside this workspace and consume these types over the
//! engine's Rust API.

pub mod api;
