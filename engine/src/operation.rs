// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Describes the lifecycle of simulated long-running operations
//!
//! The model is deliberately simple: an operation is registered `PENDING`
//! and completes on the first poll that observes it.  There is no
//! timer-driven progress; the point is that provisioning clients exercise
//! their poll loop at full test speed, not that completion takes realistic
//! wall-clock time.

use chrono::Utc;
use mirage_common::api::gcp::Operation;
use mirage_common::api::gcp::OperationStatus;

/// Derives the name an instance-create operation is registered (and later
/// polled) under.
pub fn derive_operation_name(project: &str, zone: &str, name: &str) -> String {
    format!("operation-compute-create-{}-{}-{}", project, zone, name)
}

/// Advances an operation's state for one poll, in place.
///
/// Any status that is neither `RUNNING` nor `DONE` flips to `DONE` with
/// full progress and an end time stamped exactly once.  Transitions are
/// one-directional: once `DONE`, further polls leave the record untouched,
/// so repeated polls return byte-identical operations.
///
/// Returns whether the operation transitioned.
pub fn poll_transition(operation: &mut Operation) -> bool {
    match operation.status {
        OperationStatus::Running | OperationStatus::Done => false,
        OperationStatus::Pending => {
            operation.status = OperationStatus::Done;
            operation.progress = 100;
            operation.end_time = Utc::now();
            true
        }
    }
}
