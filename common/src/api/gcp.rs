// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Wire representations of the simulated platform's payloads
//!
//! Each type models only the subset of fields the engine actually reads or
//! writes.  Every request-body type carries an open passthrough map
//! (`extra`) so that fields the engine does not interpret survive a
//! round-trip without the type having to enumerate them.  Synthesized
//! response types are closed: the engine is the author of those documents
//! and emits exactly the fields the real platform would.

use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

/*
 * Identity-and-Access
 */

/// Body of a "create service account" request
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceAccountCreateBody {
    pub account_id: Option<String>,
    #[serde(default)]
    pub service_account: ServiceAccountSpec,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Caller-supplied portion of a service account
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceAccountSpec {
    pub display_name: Option<String>,
    pub description: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Synthesized service account record
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceAccount {
    pub name: String,
    pub email: String,
    pub project_id: String,
    pub display_name: String,
    pub description: String,
    pub etag: String,
    pub disabled: bool,
    pub oauth2_client_id: String,
    pub unique_id: String,
}

/*
 * Resource-Manager
 */

/// Body of a "set IAM policy" request
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct SetIamPolicyBody {
    pub policy: Option<IamPolicy>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// An IAM policy: a version counter, a concurrency token, and role bindings
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct IamPolicy {
    #[serde(default)]
    pub version: u32,
    #[serde(default)]
    pub etag: String,
    #[serde(default)]
    pub bindings: Vec<Binding>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A single role binding within an IAM policy
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct Binding {
    pub role: String,
    #[serde(default)]
    pub members: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/*
 * Compute: long-running operations
 */

/// Status of a long-running operation
///
/// Transitions are monotone: `Pending` advances to `Done` and `Done` is
/// terminal.  `Running` is modeled for wire fidelity but the engine never
/// produces it.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationStatus {
    Pending,
    Running,
    Done,
}

/// A zonal long-running operation, as returned by instance creation and
/// re-returned by every subsequent poll
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    pub kind: String,
    pub id: String,
    pub name: String,
    pub zone: String,
    pub operation_type: String,
    pub target_link: String,
    pub target_id: String,
    pub status: OperationStatus,
    pub user: String,
    pub progress: u8,
    pub insert_time: DateTime<Utc>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub self_link: String,
}

/*
 * Compute: instance creation request
 */

/// Body of a "create instance" request
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceCreateBody {
    pub name: Option<String>,
    pub machine_type: Option<String>,
    pub can_ip_forward: Option<bool>,
    #[serde(default)]
    pub disks: Vec<AttachedDiskSpec>,
    #[serde(default)]
    pub tags: TagsSpec,
    #[serde(default)]
    pub metadata: MetadataSpec,
    #[serde(default)]
    pub service_accounts: Vec<ServiceAccountAttachmentSpec>,
    #[serde(default)]
    pub network_interfaces: Vec<NetworkInterfaceSpec>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Caller-supplied disk attachment
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachedDiskSpec {
    pub initialize_params: Option<DiskInitializeParams>,
    pub architecture: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Parameters for a disk created alongside the instance
///
/// `disk_size_gb` is kept as a raw JSON value because provisioning tools
/// send it as either a number or a decimal string.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiskInitializeParams {
    pub disk_size_gb: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Caller-supplied network tags
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct TagsSpec {
    pub items: Option<Vec<String>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Caller-supplied instance metadata
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct MetadataSpec {
    pub items: Option<Vec<Value>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Caller-supplied service account attachment
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct ServiceAccountAttachmentSpec {
    pub email: Option<String>,
    pub scopes: Option<Vec<String>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Caller-supplied network interface
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkInterfaceSpec {
    pub network: Option<String>,
    #[serde(default)]
    pub access_configs: Vec<AccessConfigSpec>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Caller-supplied access config on a network interface
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessConfigSpec {
    #[serde(rename = "type")]
    pub config_type: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/*
 * Compute: synthesized instance detail
 */

/// Synthesized instance record, stored at creation and re-returned verbatim
/// by every detail lookup
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceDetail {
    pub kind: String,
    pub id: String,
    pub creation_timestamp: DateTime<Utc>,
    pub name: String,
    pub tags: Tags,
    pub machine_type: String,
    pub status: String,
    pub zone: String,
    pub can_ip_forward: bool,
    pub network_interfaces: Vec<NetworkInterface>,
    pub disks: Vec<AttachedDisk>,
    pub metadata: Metadata,
    pub service_accounts: Vec<ServiceAccountAttachment>,
    pub self_link: String,
    pub scheduling: Scheduling,
    pub cpu_platform: String,
    pub label_fingerprint: String,
    pub start_restricted: bool,
    pub deletion_protection: bool,
    pub shielded_instance_config: ShieldedInstanceConfig,
    pub shielded_instance_integrity_policy: ShieldedInstanceIntegrityPolicy,
    pub fingerprint: String,
    pub last_start_timestamp: DateTime<Utc>,
}

/// Network tags attached to a synthesized instance
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Tags {
    pub items: Vec<String>,
    pub fingerprint: String,
}

/// A synthesized network interface
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkInterface {
    pub kind: String,
    pub network: String,
    pub subnetwork: String,
    #[serde(rename = "networkIP")]
    pub network_ip: String,
    pub name: String,
    pub fingerprint: String,
    pub stack_type: String,
    pub nic_type: String,
    pub access_configs: Vec<AccessConfig>,
}

/// A synthesized external-NAT access config
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessConfig {
    pub kind: String,
    #[serde(rename = "type")]
    pub config_type: String,
    pub name: String,
    #[serde(rename = "natIP")]
    pub nat_ip: String,
    pub network_tier: String,
}

/// A synthesized attached disk
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachedDisk {
    pub kind: String,
    #[serde(rename = "type")]
    pub disk_type: String,
    pub mode: String,
    pub source: String,
    pub device_name: String,
    pub index: u32,
    pub boot: bool,
    pub auto_delete: bool,
    pub licenses: Vec<String>,
    pub interface: String,
    pub guest_os_features: Vec<GuestOsFeature>,
    pub disk_size_gb: Value,
    pub architecture: Option<String>,
}

/// A guest OS feature flag on a synthesized disk
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GuestOsFeature {
    #[serde(rename = "type")]
    pub feature_type: String,
}

/// Instance metadata on a synthesized instance
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Metadata {
    pub kind: String,
    pub fingerprint: String,
    pub items: Vec<Value>,
}

/// A synthesized service account attachment
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct ServiceAccountAttachment {
    pub email: String,
    pub scopes: Vec<String>,
}

/// Scheduling block on a synthesized instance
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Scheduling {
    pub on_host_maintenance: String,
    pub automatic_restart: bool,
    pub preemptible: bool,
    pub provisioning_model: String,
}

/// Shielded-VM flags on a synthesized instance
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShieldedInstanceConfig {
    pub enable_secure_boot: bool,
    pub enable_vtpm: bool,
    pub enable_integrity_monitoring: bool,
}

/// Shielded-VM integrity policy on a synthesized instance
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShieldedInstanceIntegrityPolicy {
    pub update_auto_learn_policy: bool,
}
