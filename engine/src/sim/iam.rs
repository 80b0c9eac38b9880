// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Simulated Identity-and-Access service

use crate::parse::IamRequest;
use crate::request::SimResponse;
use crate::sim::to_json;
use crate::sim::ServiceSimulator;
use crate::store::ResourceKey;
use crate::store::Store;
use async_trait::async_trait;
use mirage_common::api::gcp::ServiceAccount;
use mirage_common::api::gcp::ServiceAccountCreateBody;
use mirage_common::api::Error;
use mirage_common::api::ResourceType;
use rand::Rng;
use slog::info;
use slog::Logger;

/// Etag stamped on every synthesized service account.  Purely cosmetic;
/// nothing in a simulated run performs optimistic concurrency on accounts.
const SERVICE_ACCOUNT_ETAG: &str = "MDEwMjE5MjA=";

pub struct IamSimulator {
    log: Logger,
}

impl IamSimulator {
    pub fn new(log: Logger) -> IamSimulator {
        IamSimulator { log }
    }

    async fn service_account_create(
        &self,
        store: &Store,
        project: &str,
        body: ServiceAccountCreateBody,
    ) -> Result<SimResponse, Error> {
        // The account id is what makes the email deterministic-looking; a
        // request without one still synthesizes a record, just with an
        // empty local part, matching the platform's lax behavior.
        let email = match &body.account_id {
            Some(account_id) => {
                format!("{}@{}.iam.gserviceaccount.com", account_id, project)
            }
            None => String::new(),
        };
        let name = format!("projects/{}/serviceAccounts/{}", project, email);
        let unique_id = rand::thread_rng()
            .gen_range(
                100_000_000_000_000_000_000u128
                    ..=999_999_999_999_999_999_999u128,
            )
            .to_string();

        let account = ServiceAccount {
            name: name.clone(),
            email,
            project_id: project.to_string(),
            display_name: body
                .service_account
                .display_name
                .unwrap_or_default(),
            description: body.service_account.description.unwrap_or_default(),
            etag: SERVICE_ACCOUNT_ETAG.to_string(),
            disabled: false,
            oauth2_client_id: unique_id.clone(),
            unique_id,
        };

        info!(self.log, "created service account"; "name" => &name);
        let record = to_json(&account)?;
        store
            .insert_resource(
                ResourceKey::new(ResourceType::ServiceAccount, name),
                record.clone(),
            )
            .await;
        Ok(SimResponse::Synthesized(record))
    }

    async fn service_account_get(
        &self,
        store: &Store,
        project: &str,
        email: &str,
    ) -> Result<SimResponse, Error> {
        let name = format!("projects/{}/serviceAccounts/{}", project, email);
        let key =
            ResourceKey::new(ResourceType::ServiceAccount, name.as_str());
        match store.get_resource(&key).await {
            Some(record) => Ok(SimResponse::Synthesized(record)),
            None => Err(Error::not_found_by_name(
                ResourceType::ServiceAccount,
                &name,
            )),
        }
    }
}

#[async_trait]
impl ServiceSimulator for IamSimulator {
    type Request = IamRequest;

    async fn simulate(
        &self,
        store: &Store,
        request: IamRequest,
    ) -> Result<SimResponse, Error> {
        match request {
            IamRequest::ServiceAccountCreate { project, body } => {
                self.service_account_create(store, &project, body).await
            }
            IamRequest::ServiceAccountGet { project, email } => {
                self.service_account_get(store, &project, &email).await
            }
        }
    }
}
