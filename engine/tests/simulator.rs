// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! End-to-end tests driving the engine the way the intercepting proxy does:
//! decoded requests in, synthesized bodies (or pass-through) out, changeset
//! at the end.

use camino_tempfile::Utf8TempDir;
use http::Method;
use mirage_common::api::Error;
use mirage_engine::config::Config;
use mirage_engine::request::ApiRequest;
use mirage_engine::request::SimResponse;
use mirage_engine::sim::Simulator;
use serde_json::json;
use serde_json::Value;
use slog::o;
use slog::Logger;

fn test_simulator() -> Simulator {
    Simulator::new(Config::default(), Logger::root(slog::Discard, o!()))
}

fn get(host: &str, path: &str) -> ApiRequest {
    ApiRequest {
        host: host.to_string(),
        method: Method::GET,
        path: path.to_string(),
        body: None,
    }
}

fn post(host: &str, path: &str, body: Value) -> ApiRequest {
    ApiRequest {
        host: host.to_string(),
        method: Method::POST,
        path: path.to_string(),
        body: Some(body),
    }
}

/// A create-instance body with everything Terraform normally sends.
fn instance_create_body() -> Value {
    json!({
        "name": "vm1",
        "machineType": "projects/p1/zones/us-central1-a/machineTypes/e2-small",
        "canIpForward": true,
        "tags": { "items": ["web", "ssh"] },
        "disks": [{
            "initializeParams": { "diskSizeGb": "20" },
            "architecture": "X86_64"
        }],
        "metadata": { "items": [{ "key": "startup-script", "value": "true" }] },
        "serviceAccounts": [{
            "email": "sa1@p1.iam.gserviceaccount.com",
            "scopes": ["https://www.googleapis.com/auth/compute"]
        }],
        "networkInterfaces": [{
            "network": "projects/p1/global/networks/my-net",
            "accessConfigs": [{ "type": "ONE_TO_ONE_NAT" }]
        }]
    })
}

async fn create_instance(simulator: &Simulator, body: Value) -> Value {
    simulator
        .handle_request(&post(
            "compute.googleapis.com",
            "/compute/v1/projects/p1/zones/us-central1-a/instances",
            body,
        ))
        .await
        .expect("instance creation should synthesize an operation")
        .into_body()
        .expect("instance creation is never a pass-through")
}

#[tokio::test]
async fn test_instance_create_returns_pending_operation() {
    let simulator = test_simulator();
    let operation = create_instance(&simulator, instance_create_body()).await;

    assert_eq!(operation["kind"], json!("compute#operation"));
    assert_eq!(operation["status"], json!("PENDING"));
    assert_eq!(operation["progress"], json!(0));
    assert_eq!(operation["operationType"], json!("insert"));
    assert_eq!(
        operation["name"],
        json!("operation-compute-create-p1-us-central1-a-vm1")
    );
    assert_eq!(
        operation["targetLink"],
        json!("https://www.googleapis.com/compute/v1/projects/p1/zones/us-central1-a/instances/vm1")
    );
    // The operation is the response; the instance is only discoverable via
    // a separate detail fetch.
    assert!(operation.get("machineType").is_none());
}

#[tokio::test]
async fn test_operation_completes_on_poll_and_stays_done() {
    let simulator = test_simulator();
    create_instance(&simulator, instance_create_body()).await;

    let poll = get(
        "compute.googleapis.com",
        "/compute/v1/projects/p1/zones/us-central1-a/operations/operation-compute-create-p1-us-central1-a-vm1",
    );
    let first = simulator
        .handle_request(&poll)
        .await
        .unwrap()
        .into_body()
        .unwrap();
    assert_eq!(first["status"], json!("DONE"));
    assert_eq!(first["progress"], json!(100));

    // Monotone and idempotent: same record, same endTime, forever.
    let second = simulator
        .handle_request(&poll)
        .await
        .unwrap()
        .into_body()
        .unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_poll_of_unknown_operation_is_fatal() {
    let simulator = test_simulator();
    let error = simulator
        .handle_request(&get(
            "compute.googleapis.com",
            "/compute/v1/projects/p1/zones/us-central1-a/operations/operation-compute-create-p1-us-central1-a-ghost",
        ))
        .await
        .unwrap_err();
    assert!(matches!(error, Error::InternalError { .. }));
}

#[tokio::test]
async fn test_create_then_get_instance_detail() {
    let simulator = test_simulator();
    create_instance(&simulator, instance_create_body()).await;

    let detail_request = get(
        "compute.googleapis.com",
        "/compute/v1/projects/p1/zones/us-central1-a/instances/vm1",
    );
    let detail = simulator
        .handle_request(&detail_request)
        .await
        .unwrap()
        .into_body()
        .unwrap();

    assert_eq!(detail["name"], json!("vm1"));
    assert_eq!(detail["status"], json!("RUNNING"));
    assert_eq!(
        detail["zone"],
        json!("https://www.googleapis.com/compute/v1/projects/p1/zones/us-central1-a")
    );
    assert_eq!(
        detail["machineType"],
        json!("https://www.googleapis.com/compute/v1/projects/p1/zones/us-central1-a/machineTypes/e2-small")
    );
    assert_eq!(detail["canIpForward"], json!(true));
    assert_eq!(detail["tags"]["items"], json!(["web", "ssh"]));
    assert_eq!(detail["disks"][0]["diskSizeGb"], json!("20"));
    assert_eq!(
        detail["serviceAccounts"][0]["email"],
        json!("sa1@p1.iam.gserviceaccount.com")
    );
    // The requested external NAT shows up on the synthesized interface.
    assert_eq!(
        detail["networkInterfaces"][0]["accessConfigs"][0]["type"],
        json!("ONE_TO_ONE_NAT")
    );
    assert!(detail["networkInterfaces"][0]["subnetwork"]
        .as_str()
        .unwrap()
        .contains("/regions/us-central1/"));

    // Idempotent get: the stored record never changes between reads.
    let replay = simulator
        .handle_request(&detail_request)
        .await
        .unwrap()
        .into_body()
        .unwrap();
    assert_eq!(detail, replay);
}

#[tokio::test]
async fn test_get_unknown_instance_is_not_found() {
    let simulator = test_simulator();
    let error = simulator
        .handle_request(&get(
            "compute.googleapis.com",
            "/compute/v1/projects/p1/zones/us-central1-a/instances/ghost",
        ))
        .await
        .unwrap_err();
    assert!(matches!(error, Error::ObjectNotFound { .. }));
}

#[tokio::test]
async fn test_instance_create_fallback_defaults() {
    let simulator = test_simulator();
    create_instance(
        &simulator,
        json!({
            "name": "vm1",
            "machineType": "projects/p1/zones/us-central1-a/machineTypes/e2-small",
            "serviceAccounts": [{ "email": "sa1@p1.iam.gserviceaccount.com" }],
            "networkInterfaces": [{
                "network": "projects/p1/global/networks/my-net"
            }]
        }),
    )
    .await;

    let detail = simulator
        .handle_request(&get(
            "compute.googleapis.com",
            "/compute/v1/projects/p1/zones/us-central1-a/instances/vm1",
        ))
        .await
        .unwrap()
        .into_body()
        .unwrap();

    // Absent optional fields come back as fixed defaults, never as
    // missing fields.
    assert_eq!(detail["tags"]["items"], json!([]));
    assert_eq!(detail["canIpForward"], json!(false));
    assert_eq!(detail["disks"][0]["diskSizeGb"], json!(10));
    assert_eq!(detail["metadata"]["items"], json!([]));
    assert_eq!(
        detail["serviceAccounts"][0]["scopes"],
        json!(["https://www.googleapis.com/auth/cloud-platform"])
    );
    // No external IP was requested, so no access config was synthesized.
    assert_eq!(detail["networkInterfaces"][0]["accessConfigs"], json!([]));
}

#[tokio::test]
async fn test_instance_create_without_service_account_fails_loudly() {
    let simulator = test_simulator();
    let error = simulator
        .handle_request(&post(
            "compute.googleapis.com",
            "/compute/v1/projects/p1/zones/us-central1-a/instances",
            json!({
                "name": "vm1",
                "machineType": "projects/p1/zones/us-central1-a/machineTypes/e2-small"
            }),
        ))
        .await
        .unwrap_err();
    assert!(matches!(error, Error::InvalidRequest { .. }));

    // Nothing corrupt was stored: the detail lookup still reports
    // not-found.
    let error = simulator
        .handle_request(&get(
            "compute.googleapis.com",
            "/compute/v1/projects/p1/zones/us-central1-a/instances/vm1",
        ))
        .await
        .unwrap_err();
    assert!(matches!(error, Error::ObjectNotFound { .. }));
}

#[tokio::test]
async fn test_disk_get_synthesizes_empty_object() {
    let simulator = test_simulator();
    let response = simulator
        .handle_request(&get(
            "compute.googleapis.com",
            "/compute/v1/projects/p1/zones/us-central1-a/disks/vm1",
        ))
        .await
        .unwrap();
    // Explicitly an empty synthesized body, not a pass-through.
    assert_eq!(response, SimResponse::Synthesized(json!({})));
}

#[tokio::test]
async fn test_service_account_create_then_get() {
    let simulator = test_simulator();
    let created = simulator
        .handle_request(&post(
            "iam.googleapis.com",
            "/v1/projects/p1/serviceAccounts",
            json!({
                "accountId": "sa1",
                "serviceAccount": { "displayName": "test account" }
            }),
        ))
        .await
        .unwrap()
        .into_body()
        .unwrap();

    assert_eq!(created["email"], json!("sa1@p1.iam.gserviceaccount.com"));
    assert_eq!(
        created["name"],
        json!("projects/p1/serviceAccounts/sa1@p1.iam.gserviceaccount.com")
    );
    assert_eq!(created["projectId"], json!("p1"));
    assert_eq!(created["displayName"], json!("test account"));
    assert_eq!(created["disabled"], json!(false));
    assert_eq!(created["uniqueId"], created["oauth2ClientId"]);
    assert_eq!(created["uniqueId"].as_str().unwrap().len(), 21);

    let fetched = simulator
        .handle_request(&get(
            "iam.googleapis.com",
            "/v1/projects/p1/serviceAccounts/sa1@p1.iam.gserviceaccount.com",
        ))
        .await
        .unwrap()
        .into_body()
        .unwrap();
    assert_eq!(created, fetched);
}

#[tokio::test]
async fn test_get_unknown_service_account_is_not_found() {
    let simulator = test_simulator();
    let error = simulator
        .handle_request(&get(
            "iam.googleapis.com",
            "/v1/projects/p1/serviceAccounts/ghost@p1.iam.gserviceaccount.com",
        ))
        .await
        .unwrap_err();
    assert!(matches!(error, Error::ObjectNotFound { .. }));
}

#[tokio::test]
async fn test_policy_get_before_set_passes_through() {
    let simulator = test_simulator();
    let response = simulator
        .handle_request(&post(
            "cloudresourcemanager.googleapis.com",
            "/v1/projects/new-project:getIamPolicy",
            json!({}),
        ))
        .await
        .unwrap();
    // Pass-through, as distinct from an error or an empty policy object.
    assert!(response.is_pass_through());
}

#[tokio::test]
async fn test_policy_round_trip() {
    let simulator = test_simulator();
    let bindings = json!([{
        "role": "roles/compute.admin",
        "members": ["serviceAccount:sa1@p1.iam.gserviceaccount.com"]
    }]);

    let stored = simulator
        .handle_request(&post(
            "cloudresourcemanager.googleapis.com",
            "/v1/projects/p1:setIamPolicy",
            json!({ "policy": { "bindings": bindings } }),
        ))
        .await
        .unwrap()
        .into_body()
        .unwrap();
    assert_eq!(stored["bindings"], bindings);
    assert!(stored["version"].as_u64().unwrap() >= 1);
    assert!(!stored["etag"].as_str().unwrap().is_empty());

    let fetched = simulator
        .handle_request(&post(
            "cloudresourcemanager.googleapis.com",
            "/v1/projects/p1:getIamPolicy",
            json!({}),
        ))
        .await
        .unwrap()
        .into_body()
        .unwrap();
    assert_eq!(stored, fetched);
}

#[tokio::test]
async fn test_set_policy_without_policy_block_fails_loudly() {
    let simulator = test_simulator();
    let error = simulator
        .handle_request(&post(
            "cloudresourcemanager.googleapis.com",
            "/v1/projects/p1:setIamPolicy",
            json!({}),
        ))
        .await
        .unwrap_err();
    assert!(matches!(error, Error::InvalidRequest { .. }));
}

#[tokio::test]
async fn test_foreign_host_passes_through() {
    let simulator = test_simulator();
    let response = simulator
        .handle_request(&get("sqladmin.googleapis.com", "/v1/projects/p1"))
        .await
        .unwrap();
    assert!(response.is_pass_through());

    let response = simulator
        .handle_request(&get("registry.terraform.io", "/v1/providers"))
        .await
        .unwrap();
    assert!(response.is_pass_through());
}

#[tokio::test]
async fn test_changeset_covers_every_created_resource() {
    let simulator = test_simulator();
    simulator
        .handle_request(&post(
            "iam.googleapis.com",
            "/v1/projects/p1/serviceAccounts",
            json!({ "accountId": "sa1", "serviceAccount": {} }),
        ))
        .await
        .unwrap();
    simulator
        .handle_request(&post(
            "cloudresourcemanager.googleapis.com",
            "/v1/projects/p1:setIamPolicy",
            json!({ "policy": { "bindings": [] } }),
        ))
        .await
        .unwrap();
    create_instance(&simulator, instance_create_body()).await;

    let changeset = simulator.changeset().await;
    assert_eq!(changeset.assets.len(), 3);
    let types: Vec<_> = changeset
        .assets
        .iter()
        .map(|asset| asset.resource_type.as_str())
        .collect();
    assert_eq!(
        types,
        vec![
            "gcp_iam_serviceaccount",
            "gcp_cloudresourcemanager_iam_policy",
            "gcp_compute_instance",
        ]
    );
    assert!(changeset
        .assets
        .iter()
        .all(|asset| asset.action == mirage_engine::changeset::ACTION_UPSERT));
    assert_eq!(changeset.assets[1].name.as_deref(), Some("projects/p1"));

    // Operations are bookkeeping, not resources; polling must not add
    // assets.
    simulator
        .handle_request(&get(
            "compute.googleapis.com",
            "/compute/v1/projects/p1/zones/us-central1-a/operations/operation-compute-create-p1-us-central1-a-vm1",
        ))
        .await
        .unwrap();
    assert_eq!(simulator.changeset().await.assets.len(), 3);
}

#[tokio::test]
async fn test_changeset_file_round_trip() {
    let dir = Utf8TempDir::new().unwrap();
    let config = Config {
        changeset_path: dir.path().join("changeset.json"),
        ..Config::default()
    };
    let simulator =
        Simulator::new(config.clone(), Logger::root(slog::Discard, o!()));

    create_instance(&simulator, instance_create_body()).await;
    let written = simulator.write_changeset().await.unwrap();

    let contents =
        std::fs::read_to_string(config.changeset_path.as_std_path()).unwrap();
    let parsed: Value = serde_json::from_str(&contents).unwrap();
    assert_eq!(parsed["type"], json!("changeset"));
    assert_eq!(parsed["assets"].as_array().unwrap().len(), 1);
    assert_eq!(parsed["assets"][0]["type"], json!("gcp_compute_instance"));
    assert_eq!(parsed["assets"][0]["name"], json!("vm1"));
    assert_eq!(
        parsed["assets"][0]["data"],
        serde_json::to_value(&written.assets[0].data).unwrap()
    );
    assert!(parsed["date"].is_string());
}

#[tokio::test]
async fn test_sessions_are_isolated() {
    // Two simulators in one process share nothing: state is explicitly
    // owned, not module-global.
    let first = test_simulator();
    let second = test_simulator();
    create_instance(&first, instance_create_body()).await;

    assert_eq!(first.changeset().await.assets.len(), 1);
    assert_eq!(second.changeset().await.assets.len(), 0);

    let error = second
        .handle_request(&get(
            "compute.googleapis.com",
            "/compute/v1/projects/p1/zones/us-central1-a/instances/vm1",
        ))
        .await
        .unwrap_err();
    assert!(matches!(error, Error::ObjectNotFound { .. }));
}
