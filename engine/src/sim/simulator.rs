// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Top-level dispatcher for one simulated session

use crate::changeset;
use crate::changeset::Changeset;
use crate::config::Config;
use crate::parse;
use crate::parse::ParsedRequest;
use crate::request::ApiRequest;
use crate::request::SimResponse;
use crate::sim::ComputeSimulator;
use crate::sim::IamSimulator;
use crate::sim::ResourceManagerSimulator;
use crate::sim::ServiceSimulator;
use crate::store::Store;
use mirage_common::api::Error;
use slog::debug;
use slog::info;
use slog::o;
use slog::Logger;

/// Simulates the provisioning control plane for one intercepted session
///
/// The `Simulator` owns all run-scoped state.  The transport collaborator
/// calls [`Simulator::handle_request`] once per intercepted call (in
/// whatever order the provisioning client issues them) and
/// [`Simulator::write_changeset`] once after the session ends.  Multiple
/// independent sessions in one process are just multiple `Simulator`s.
pub struct Simulator {
    config: Config,
    store: Store,
    iam: IamSimulator,
    resource_manager: ResourceManagerSimulator,
    compute: ComputeSimulator,
    log: Logger,
}

impl Simulator {
    pub fn new(config: Config, log: Logger) -> Simulator {
        info!(&log, "created simulated control plane";
            "changeset_path" => %config.changeset_path);
        Simulator {
            store: Store::new(log.new(o!("component" => "store"))),
            iam: IamSimulator::new(log.new(o!("component" => "iam"))),
            resource_manager: ResourceManagerSimulator::new(
                log.new(o!("component" => "resource-manager")),
            ),
            compute: ComputeSimulator::new(
                log.new(o!("component" => "compute")),
                config.operation_user.clone(),
            ),
            config,
            log,
        }
    }

    /// Simulates one decoded provisioning call.
    ///
    /// Classification happens first; each classified request is then
    /// dispatched to the one simulator that owns its service family.
    /// Unsupported requests are a routing decision, not an error: the
    /// engine stands aside and the exchange proceeds unmodified.
    pub async fn handle_request(
        &self,
        request: &ApiRequest,
    ) -> Result<SimResponse, Error> {
        match parse::classify(request)? {
            ParsedRequest::Iam(req) => {
                self.iam.simulate(&self.store, req).await
            }
            ParsedRequest::ResourceManager(req) => {
                self.resource_manager.simulate(&self.store, req).await
            }
            ParsedRequest::Compute(req) => {
                self.compute.simulate(&self.store, req).await
            }
            ParsedRequest::Unsupported => {
                debug!(self.log, "unsupported request, passing through";
                    "host" => &request.host,
                    "method" => %request.method,
                    "path" => &request.path,
                );
                Ok(SimResponse::PassThrough)
            }
        }
    }

    /// Derives the changeset from everything this session synthesized.
    pub async fn changeset(&self) -> Changeset {
        changeset::generate(&self.store).await
    }

    /// Derives the changeset and persists it to the configured path.
    /// Called exactly once, after the intercepted session ends.
    pub async fn write_changeset(&self) -> Result<Changeset, Error> {
        let changeset = self.changeset().await;
        changeset.write(&self.config.changeset_path)?;
        info!(self.log, "wrote changeset";
            "path" => %self.config.changeset_path,
            "assets" => changeset.assets.len(),
        );
        Ok(changeset)
    }
}
