// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Run-scoped storage for synthesized state
//!
//! One `Store` owns everything a simulated session fabricates: the resource
//! table the changeset is later derived from, the per-project policy table,
//! and the long-running operation table.  Nothing here is module-level
//! state; callers that want isolated sessions construct isolated stores.

use crate::operation::poll_transition;
use futures::lock::Mutex;
use indexmap::IndexMap;
use mirage_common::api::gcp::IamPolicy;
use mirage_common::api::gcp::Operation;
use mirage_common::api::Error;
use mirage_common::api::LookupResult;
use mirage_common::api::ResourceType;
use serde_json::Value;
use slog::debug;
use slog::Logger;
use std::collections::HashMap;
use std::fmt;

/// Composite key for a synthesized resource
///
/// Rendered as `<type tag>:<natural identifier>`, e.g.
/// `gcp_compute_instance:https://.../instances/vm1`.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct ResourceKey {
    pub resource_type: ResourceType,
    pub id: String,
}

impl ResourceKey {
    pub fn new(resource_type: ResourceType, id: impl Into<String>) -> Self {
        ResourceKey { resource_type, id: id.into() }
    }

    /// Returns the changeset type tag, i.e. the key's prefix.
    pub fn type_tag(&self) -> &'static str {
        self.resource_type.key_prefix()
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.resource_type.key_prefix(), self.id)
    }
}

struct StoreInner {
    /// Synthesized resources, in insertion order.  Insertion order is the
    /// only order the changeset defines.
    resources: IndexMap<ResourceKey, Value>,
    /// IAM policies by project id
    policies: HashMap<String, IamPolicy>,
    /// Long-running operations by derived name
    operations: HashMap<String, Operation>,
}

/// Shared mutable state for one simulated session
///
/// Each table is guarded by a single mutex so that a read-modify-write on
/// a key (notably the poll-time operation transition) is atomic even if
/// the transport chooses to serve requests concurrently.
pub struct Store {
    inner: Mutex<StoreInner>,
    log: Logger,
}

impl Store {
    pub fn new(log: Logger) -> Store {
        Store {
            inner: Mutex::new(StoreInner {
                resources: IndexMap::new(),
                policies: HashMap::new(),
                operations: HashMap::new(),
            }),
            log,
        }
    }

    /// Records a synthesized resource.  Re-creating an existing key
    /// replaces the value but keeps the original changeset position.
    pub async fn insert_resource(&self, key: ResourceKey, data: Value) {
        debug!(self.log, "storing resource"; "key" => %key);
        self.inner.lock().await.resources.insert(key, data);
    }

    /// Returns the stored resource for `key`, if one was ever created.
    pub async fn get_resource(&self, key: &ResourceKey) -> Option<Value> {
        self.inner.lock().await.resources.get(key).cloned()
    }

    /// Snapshots the resource table in insertion order without mutating it.
    pub async fn snapshot_resources(&self) -> Vec<(ResourceKey, Value)> {
        self.inner
            .lock()
            .await
            .resources
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Stores (or replaces) the IAM policy for a project.
    pub async fn set_policy(&self, project: &str, policy: IamPolicy) {
        debug!(self.log, "storing IAM policy"; "project" => project);
        self.inner.lock().await.policies.insert(project.to_string(), policy);
    }

    /// Returns the IAM policy for a project.  `None` means no policy was
    /// ever set in this session, which the caller treats as pass-through.
    pub async fn get_policy(&self, project: &str) -> Option<IamPolicy> {
        self.inner.lock().await.policies.get(project).cloned()
    }

    /// Registers a new long-running operation under its derived name.
    pub async fn insert_operation(&self, operation: Operation) {
        debug!(self.log, "storing operation";
            "operation" => &operation.name,
            "status" => ?operation.status,
        );
        self.inner
            .lock()
            .await
            .operations
            .insert(operation.name.clone(), operation);
    }

    /// Looks up an operation by name and advances its lifecycle, returning
    /// the post-transition record.  The lookup and transition happen under
    /// one lock hold.
    ///
    /// An unknown name is an engine-integrity error: the only names a
    /// caller can have were handed out by instance creation, so a miss
    /// means identifier derivation has diverged.  It is never silently
    /// mapped to an empty operation.
    pub async fn poll_operation(&self, name: &str) -> LookupResult<Operation> {
        let mut inner = self.inner.lock().await;
        let operation = inner.operations.get_mut(name).ok_or_else(|| {
            Error::internal_error(&format!(
                "poll for operation that was never registered: {}",
                name
            ))
        })?;
        if poll_transition(operation) {
            debug!(self.log, "operation completed"; "operation" => name);
        }
        Ok(operation.clone())
    }
}
