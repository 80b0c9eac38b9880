// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Simulated Resource-Manager service (project IAM policies)

use crate::parse::ResourceManagerRequest;
use crate::request::SimResponse;
use crate::sim::to_json;
use crate::sim::ServiceSimulator;
use crate::store::ResourceKey;
use crate::store::Store;
use async_trait::async_trait;
use mirage_common::api::gcp::SetIamPolicyBody;
use mirage_common::api::Error;
use mirage_common::api::ResourceType;
use serde_json::Value;
use slog::info;
use slog::Logger;

/// Concurrency token stamped on every stored policy.  Opaque to callers;
/// they only ever echo it back.
const POLICY_ETAG: &str = "BwYR2wZdArY=";

pub struct ResourceManagerSimulator {
    log: Logger,
}

impl ResourceManagerSimulator {
    pub fn new(log: Logger) -> ResourceManagerSimulator {
        ResourceManagerSimulator { log }
    }

    async fn policy_get(
        &self,
        store: &Store,
        project: &str,
    ) -> Result<SimResponse, Error> {
        match store.get_policy(project).await {
            Some(policy) => {
                info!(self.log, "returning stored IAM policy";
                    "project" => project);
                Ok(SimResponse::Synthesized(to_json(&policy)?))
            }
            // No policy was ever set this session.  That is not a missing
            // resource: the caller should see whatever the unintercepted
            // exchange would produce, so the engine stands aside.
            None => {
                info!(self.log, "no stored IAM policy, passing through";
                    "project" => project);
                Ok(SimResponse::PassThrough)
            }
        }
    }

    async fn policy_set(
        &self,
        store: &Store,
        project: &str,
        body: SetIamPolicyBody,
    ) -> Result<SimResponse, Error> {
        let mut policy = body.policy.ok_or_else(|| {
            Error::invalid_request(
                "setIamPolicy request carried no policy block",
            )
        })?;
        policy.version = 1;
        policy.etag = POLICY_ETAG.to_string();

        info!(self.log, "storing IAM policy";
            "project" => project,
            "bindings" => policy.bindings.len(),
        );
        store.set_policy(project, policy.clone()).await;

        // The policy also becomes a changeset resource, denormalized with
        // the project's resource name.
        let echoed = to_json(&policy)?;
        let mut record = echoed.clone();
        if let Value::Object(map) = &mut record {
            map.insert(
                "name".to_string(),
                Value::String(format!("projects/{}", project)),
            );
        }
        store
            .insert_resource(
                ResourceKey::new(ResourceType::IamPolicy, project),
                record,
            )
            .await;

        Ok(SimResponse::Synthesized(echoed))
    }
}

#[async_trait]
impl ServiceSimulator for ResourceManagerSimulator {
    type Request = ResourceManagerRequest;

    async fn simulate(
        &self,
        store: &Store,
        request: ResourceManagerRequest,
    ) -> Result<SimResponse, Error> {
        match request {
            ResourceManagerRequest::PolicyGet { project } => {
                self.policy_get(store, &project).await
            }
            ResourceManagerRequest::PolicySet { project, body } => {
                self.policy_set(store, &project, body).await
            }
        }
    }
}
