// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Simulated Compute service (instances, disks, zonal operations)

use crate::operation::derive_operation_name;
use crate::parse::ComputeRequest;
use crate::request::SimResponse;
use crate::sim::to_json;
use crate::sim::ServiceSimulator;
use crate::store::ResourceKey;
use crate::store::Store;
use async_trait::async_trait;
use chrono::Utc;
use mirage_common::api::gcp::AccessConfig;
use mirage_common::api::gcp::AttachedDisk;
use mirage_common::api::gcp::GuestOsFeature;
use mirage_common::api::gcp::InstanceCreateBody;
use mirage_common::api::gcp::InstanceDetail;
use mirage_common::api::gcp::Metadata;
use mirage_common::api::gcp::NetworkInterface;
use mirage_common::api::gcp::Operation;
use mirage_common::api::gcp::OperationStatus;
use mirage_common::api::gcp::Scheduling;
use mirage_common::api::gcp::ServiceAccountAttachment;
use mirage_common::api::gcp::ShieldedInstanceConfig;
use mirage_common::api::gcp::ShieldedInstanceIntegrityPolicy;
use mirage_common::api::gcp::Tags;
use mirage_common::api::Error;
use mirage_common::api::LookupType;
use mirage_common::api::ResourceType;
use rand::Rng;
use serde_json::json;
use serde_json::Map;
use serde_json::Value;
use slog::info;
use slog::Logger;

/// Scope list applied when the attached service account requests none
const DEFAULT_SCOPES: &[&str] =
    &["https://www.googleapis.com/auth/cloud-platform"];

/// Boot disk size applied when the request does not specify one, in GiB
const DEFAULT_DISK_SIZE_GB: u64 = 10;

const BOOT_DISK_LICENSE: &str = "https://www.googleapis.com/compute/v1/\
projects/debian-cloud/global/licenses/debian-12-bookworm";

pub struct ComputeSimulator {
    log: Logger,
    /// Principal stamped on synthesized operations
    operation_user: String,
}

impl ComputeSimulator {
    pub fn new(log: Logger, operation_user: String) -> ComputeSimulator {
        ComputeSimulator { log, operation_user }
    }

    /// Handles instance creation: synthesizes and stores the full instance
    /// record, registers a `PENDING` operation, and returns the operation.
    /// The caller learns about the instance itself only by polling and then
    /// fetching the detail.
    async fn instance_create(
        &self,
        store: &Store,
        api_version: &str,
        project: &str,
        zone: &str,
        body: InstanceCreateBody,
    ) -> Result<SimResponse, Error> {
        let name =
            body.name.clone().unwrap_or_else(|| String::from("no-vm-name"));
        // The region is the zone minus its final suffix,
        // e.g. us-central1-a -> us-central1.
        let region =
            zone.split('-').take(2).collect::<Vec<_>>().join("-");
        let zone_url = format!(
            "https://www.googleapis.com/compute/{}/projects/{}/zones/{}",
            api_version, project, zone
        );
        let self_link = format!("{}/instances/{}", zone_url, name);

        let machine_type = body.machine_type.as_deref().ok_or_else(|| {
            Error::invalid_request(
                "instance create request carried no machineType",
            )
        })?;
        let machine_type_url = format!(
            "https://www.googleapis.com/compute/v1/{}",
            machine_type
        );

        // An instance with no attached service account would synthesize a
        // record no provisioning tool could have produced, so that's a
        // precondition violation rather than a field to default.
        let service_account =
            body.service_accounts.first().ok_or_else(|| {
                Error::invalid_request(
                    "instance create request carried no service account",
                )
            })?;
        let scopes = service_account
            .scopes
            .clone()
            .unwrap_or_else(|| {
                DEFAULT_SCOPES.iter().map(|s| s.to_string()).collect()
            });

        let boot_disk_spec = body.disks.first();
        let disk_size_gb = boot_disk_spec
            .and_then(|disk| disk.initialize_params.as_ref())
            .and_then(|params| params.disk_size_gb.clone())
            .unwrap_or_else(|| json!(DEFAULT_DISK_SIZE_GB));
        let architecture =
            boot_disk_spec.and_then(|disk| disk.architecture.clone());

        let network_interfaces = body
            .network_interfaces
            .iter()
            .enumerate()
            .map(|(index, spec)| {
                synthesize_network_interface(project, &region, index, spec)
            })
            .collect();

        let now = Utc::now();
        let instance = InstanceDetail {
            kind: "compute#instance".to_string(),
            id: random_wide_id().to_string(),
            creation_timestamp: now,
            name: name.clone(),
            tags: Tags {
                items: body.tags.items.clone().unwrap_or_default(),
                fingerprint: "pOiUF0UJfOw=".to_string(),
            },
            machine_type: machine_type_url,
            status: "RUNNING".to_string(),
            zone: zone_url.clone(),
            can_ip_forward: body.can_ip_forward.unwrap_or(false),
            network_interfaces,
            disks: vec![AttachedDisk {
                kind: "compute#attachedDisk".to_string(),
                disk_type: "PERSISTENT".to_string(),
                mode: "READ_WRITE".to_string(),
                source: format!("{}/disks/{}", zone_url, name),
                device_name: "persistent-disk-0".to_string(),
                index: 0,
                boot: true,
                auto_delete: true,
                licenses: vec![BOOT_DISK_LICENSE.to_string()],
                interface: "SCSI".to_string(),
                guest_os_features: guest_os_features(),
                disk_size_gb,
                architecture,
            }],
            metadata: Metadata {
                kind: "compute#metadata".to_string(),
                fingerprint: "BFuQ-sDJdpk=".to_string(),
                items: body.metadata.items.clone().unwrap_or_default(),
            },
            service_accounts: vec![ServiceAccountAttachment {
                email: service_account.email.clone().unwrap_or_default(),
                scopes,
            }],
            self_link: self_link.clone(),
            scheduling: Scheduling {
                on_host_maintenance: "MIGRATE".to_string(),
                automatic_restart: true,
                preemptible: false,
                provisioning_model: "STANDARD".to_string(),
            },
            cpu_platform: "Intel Broadwell".to_string(),
            label_fingerprint: "42WmSpB8rSM=".to_string(),
            start_restricted: false,
            deletion_protection: false,
            shielded_instance_config: ShieldedInstanceConfig {
                enable_secure_boot: true,
                enable_vtpm: true,
                enable_integrity_monitoring: true,
            },
            shielded_instance_integrity_policy:
                ShieldedInstanceIntegrityPolicy {
                    update_auto_learn_policy: true,
                },
            fingerprint: "w465_wnrOho=".to_string(),
            last_start_timestamp: now,
        };

        info!(self.log, "created instance";
            "project" => project,
            "zone" => zone,
            "instance" => &name,
        );
        store
            .insert_resource(
                ResourceKey::new(
                    ResourceType::ComputeInstance,
                    self_link.as_str(),
                ),
                to_json(&instance)?,
            )
            .await;

        let operation_name = derive_operation_name(project, zone, &name);
        let operation = Operation {
            kind: "compute#operation".to_string(),
            id: random_wide_id().to_string(),
            name: operation_name.clone(),
            zone: zone_url.clone(),
            operation_type: "insert".to_string(),
            target_link: self_link,
            target_id: random_wide_id().to_string(),
            status: OperationStatus::Pending,
            user: self.operation_user.clone(),
            progress: 0,
            insert_time: now,
            start_time: now,
            end_time: now,
            self_link: format!("{}/operations/{}", zone_url, operation_name),
        };
        store.insert_operation(operation.clone()).await;

        Ok(SimResponse::Synthesized(to_json(&operation)?))
    }

    async fn operation_get(
        &self,
        store: &Store,
        operation: &str,
    ) -> Result<SimResponse, Error> {
        let operation = store.poll_operation(operation).await?;
        Ok(SimResponse::Synthesized(to_json(&operation)?))
    }

    async fn instance_get(
        &self,
        store: &Store,
        api_version: &str,
        project: &str,
        zone: &str,
        name: &str,
    ) -> Result<SimResponse, Error> {
        // Reconstruct the same self link instance creation stored under.
        let self_link = format!(
            "https://www.googleapis.com/compute/{}/projects/{}/zones/{}/instances/{}",
            api_version, project, zone, name
        );
        let key = ResourceKey::new(
            ResourceType::ComputeInstance,
            self_link.as_str(),
        );
        match store.get_resource(&key).await {
            Some(record) => Ok(SimResponse::Synthesized(record)),
            None => Err(LookupType::ByCompositeId(self_link)
                .into_not_found(ResourceType::ComputeInstance)),
        }
    }
}

#[async_trait]
impl ServiceSimulator for ComputeSimulator {
    type Request = ComputeRequest;

    async fn simulate(
        &self,
        store: &Store,
        request: ComputeRequest,
    ) -> Result<SimResponse, Error> {
        match request {
            ComputeRequest::InstanceCreate {
                api_version,
                project,
                zone,
                body,
            } => {
                self.instance_create(
                    store,
                    &api_version,
                    &project,
                    &zone,
                    body,
                )
                .await
            }
            ComputeRequest::OperationGet { operation } => {
                self.operation_get(store, &operation).await
            }
            ComputeRequest::InstanceGet {
                api_version,
                project,
                zone,
                name,
            } => {
                self.instance_get(store, &api_version, &project, &zone, &name)
                    .await
            }
            // Disks are not modeled; the caller gets an explicitly empty
            // object rather than a pass-through.
            ComputeRequest::DiskGet { disk } => {
                info!(self.log, "disk detail not modeled"; "disk" => disk);
                Ok(SimResponse::Synthesized(Value::Object(Map::new())))
            }
        }
    }
}

fn synthesize_network_interface(
    project: &str,
    region: &str,
    index: usize,
    spec: &mirage_common::api::gcp::NetworkInterfaceSpec,
) -> NetworkInterface {
    let network = spec.network.as_deref().unwrap_or("default");
    let network_name = network.rsplit('/').next().unwrap_or(network);

    // An external NAT config is synthesized only when the request asked
    // for one; otherwise the interface has no external access at all.
    let access_configs = if spec
        .access_configs
        .iter()
        .any(|config| config.config_type.as_deref() == Some("ONE_TO_ONE_NAT"))
    {
        vec![AccessConfig {
            kind: "compute#accessConfig".to_string(),
            config_type: "ONE_TO_ONE_NAT".to_string(),
            name: "external-nat".to_string(),
            nat_ip: "1.1.1.1".to_string(),
            network_tier: "PREMIUM".to_string(),
        }]
    } else {
        Vec::new()
    };

    NetworkInterface {
        kind: "compute#networkInterface".to_string(),
        network: format!(
            "https://www.googleapis.com/compute/v1/projects/{}/global/networks/{}",
            project, network_name
        ),
        subnetwork: format!(
            "https://www.googleapis.com/compute/v1/projects/{}/regions/{}/subnetworks/{}",
            project, region, network_name
        ),
        network_ip: "10.0.0.0".to_string(),
        name: format!("nic{}", index),
        fingerprint: "o9wnSWdXEW4=".to_string(),
        stack_type: "IPV4_ONLY".to_string(),
        nic_type: "gVNIC".to_string(),
        access_configs,
    }
}

/// Draws a 19-digit identifier from the range the platform uses for
/// instance, operation, and target ids.  These only need to look
/// realistic; nothing derives meaning from them.
fn random_wide_id() -> u64 {
    rand::thread_rng()
        .gen_range(1_000_000_000_000_000_000u64..=9_999_999_999_999_999_999u64)
}

fn guest_os_features() -> Vec<GuestOsFeature> {
    ["UEFI_COMPATIBLE", "VIRTIO_SCSI_MULTIQUEUE", "GVNIC", "SEV_CAPABLE"]
        .iter()
        .map(|feature| GuestOsFeature { feature_type: feature.to_string() })
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_region_derivation() {
        // Covered indirectly by instance creation; this pins the exact
        // truncation rule.
        let zone = "us-central1-a";
        let region =
            zone.split('-').take(2).collect::<Vec<_>>().join("-");
        assert_eq!(region, "us-central1");
    }

    #[test]
    fn test_interface_with_nat_request_gets_access_config() {
        let spec: mirage_common::api::gcp::NetworkInterfaceSpec =
            serde_json::from_value(serde_json::json!({
                "network": "projects/p1/global/networks/my-net",
                "accessConfigs": [{ "type": "ONE_TO_ONE_NAT" }]
            }))
            .unwrap();
        let interface =
            synthesize_network_interface("p1", "us-central1", 0, &spec);
        assert_eq!(interface.name, "nic0");
        assert!(interface.network.ends_with("/networks/my-net"));
        assert!(interface.subnetwork.contains("/regions/us-central1/"));
        assert_eq!(interface.access_configs.len(), 1);
        assert_eq!(interface.access_configs[0].config_type, "ONE_TO_ONE_NAT");
    }

    #[test]
    fn test_interface_without_nat_request_has_no_access_config() {
        let spec: mirage_common::api::gcp::NetworkInterfaceSpec =
            serde_json::from_value(serde_json::json!({
                "network": "projects/p1/global/networks/my-net"
            }))
            .unwrap();
        let interface =
            synthesize_network_interface("p1", "us-central1", 1, &spec);
        assert_eq!(interface.name, "nic1");
        assert!(interface.access_configs.is_empty());
    }

    #[test]
    fn test_random_wide_id_width() {
        for _ in 0..32 {
            let id = random_wide_id().to_string();
            assert_eq!(id.len(), 19);
        }
    }
}
