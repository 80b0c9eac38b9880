// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Simulation engine for a cloud provisioning control plane
//!
//! The engine interprets decoded provisioning requests (host, method, path,
//! JSON body), synthesizes platform-shaped responses, and accumulates every
//! resource it fabricates so that a changeset can be derived at the end of
//! the run.  Terminating connections, matching on user agents, and driving
//! the provisioning client are all the job of the intercepting proxy and
//! orchestration collaborators, which sit outside this crate and talk to it
//! through [`sim::Simulator`].

pub mod changeset;
pub mod config;
pub mod operation;
pub mod parse;
pub mod request;
pub mod sim;
pub mod store;
