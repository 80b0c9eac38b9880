// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Classification of decoded requests into simulated operations
//!
//! Classification is pure: it reads the request and produces a
//! [`ParsedRequest`], never touching the store.  Unrecognized hosts and
//! path shapes degrade to [`ParsedRequest::Unsupported`] (which the
//! dispatcher turns into a pass-through), while a body that cannot be
//! decoded for a recognized create operation is a hard error, since
//! synthesizing a record from a half-read body would poison later lookups.

use crate::request::ApiRequest;
use http::Method;
use mirage_common::api::gcp::InstanceCreateBody;
use mirage_common::api::gcp::ServiceAccountCreateBody;
use mirage_common::api::gcp::SetIamPolicyBody;
use mirage_common::api::Error;
use serde::de::DeserializeOwned;

/// A classified request, grouped by owning service family
#[derive(Clone, Debug)]
pub enum ParsedRequest {
    Iam(IamRequest),
    ResourceManager(ResourceManagerRequest),
    Compute(ComputeRequest),
    /// Not a call this engine simulates; the exchange passes through.
    Unsupported,
}

/// Identity-and-Access operations
#[derive(Clone, Debug)]
pub enum IamRequest {
    ServiceAccountCreate { project: String, body: ServiceAccountCreateBody },
    ServiceAccountGet { project: String, email: String },
}

/// Resource-Manager operations
#[derive(Clone, Debug)]
pub enum ResourceManagerRequest {
    PolicyGet { project: String },
    PolicySet { project: String, body: SetIamPolicyBody },
}

/// Compute operations
#[derive(Clone, Debug)]
pub enum ComputeRequest {
    InstanceCreate {
        api_version: String,
        project: String,
        zone: String,
        body: InstanceCreateBody,
    },
    OperationGet {
        operation: String,
    },
    InstanceGet {
        api_version: String,
        project: String,
        zone: String,
        name: String,
    },
    DiskGet {
        disk: String,
    },
}

/// Classifies a decoded request into the operation it represents.
pub fn classify(request: &ApiRequest) -> Result<ParsedRequest, Error> {
    // Service families are distinguished by the host's subdomain.
    let Some(subdomain) = request.host.strip_suffix(".googleapis.com") else {
        return Ok(ParsedRequest::Unsupported);
    };

    let path = request.path.split('?').next().unwrap_or("");
    let segments: Vec<&str> =
        path.split('/').filter(|s| !s.is_empty()).collect();

    match subdomain {
        "iam" => classify_iam(request, &segments),
        "cloudresourcemanager" => {
            classify_resource_manager(request, &segments)
        }
        "compute" => classify_compute(request, &segments),
        _ => Ok(ParsedRequest::Unsupported),
    }
}

fn classify_iam(
    request: &ApiRequest,
    segments: &[&str],
) -> Result<ParsedRequest, Error> {
    match segments {
        ["v1", "projects", project, "serviceAccounts"]
            if request.method == Method::POST =>
        {
            Ok(ParsedRequest::Iam(IamRequest::ServiceAccountCreate {
                project: (*project).to_string(),
                body: parse_body(request)?,
            }))
        }
        ["v1", "projects", project, "serviceAccounts", email]
            if request.method == Method::GET
                && email.contains("iam.gserviceaccount.com") =>
        {
            Ok(ParsedRequest::Iam(IamRequest::ServiceAccountGet {
                project: (*project).to_string(),
                email: (*email).to_string(),
            }))
        }
        _ => Ok(ParsedRequest::Unsupported),
    }
}

fn classify_resource_manager(
    request: &ApiRequest,
    segments: &[&str],
) -> Result<ParsedRequest, Error> {
    // Both policy operations are POSTs whose final segment is
    // `{project}:getIamPolicy` or `{project}:setIamPolicy`.
    let ["v1", "projects", target] = segments else {
        return Ok(ParsedRequest::Unsupported);
    };
    if request.method != Method::POST {
        return Ok(ParsedRequest::Unsupported);
    }
    let Some((project, verb)) = target.split_once(':') else {
        return Ok(ParsedRequest::Unsupported);
    };
    match verb {
        "getIamPolicy" => Ok(ParsedRequest::ResourceManager(
            ResourceManagerRequest::PolicyGet { project: project.to_string() },
        )),
        "setIamPolicy" => Ok(ParsedRequest::ResourceManager(
            ResourceManagerRequest::PolicySet {
                project: project.to_string(),
                body: parse_body(request)?,
            },
        )),
        _ => Ok(ParsedRequest::Unsupported),
    }
}

fn classify_compute(
    request: &ApiRequest,
    segments: &[&str],
) -> Result<ParsedRequest, Error> {
    match segments {
        ["compute", api_version, "projects", project, "zones", zone, "instances"]
            if request.method == Method::POST =>
        {
            Ok(ParsedRequest::Compute(ComputeRequest::InstanceCreate {
                api_version: (*api_version).to_string(),
                project: (*project).to_string(),
                zone: (*zone).to_string(),
                body: parse_body(request)?,
            }))
        }
        ["compute", _, "projects", _, "zones", _, "operations", operation]
            if request.method == Method::GET =>
        {
            Ok(ParsedRequest::Compute(ComputeRequest::OperationGet {
                operation: (*operation).to_string(),
            }))
        }
        ["compute", api_version, "projects", project, "zones", zone, "instances", name]
            if request.method == Method::GET =>
        {
            Ok(ParsedRequest::Compute(ComputeRequest::InstanceGet {
                api_version: (*api_version).to_string(),
                project: (*project).to_string(),
                zone: (*zone).to_string(),
                name: (*name).to_string(),
            }))
        }
        ["compute", _, "projects", _, "zones", _, "disks", disk]
            if request.method == Method::GET =>
        {
            Ok(ParsedRequest::Compute(ComputeRequest::DiskGet {
                disk: (*disk).to_string(),
            }))
        }
        _ => Ok(ParsedRequest::Unsupported),
    }
}

fn parse_body<T: DeserializeOwned>(request: &ApiRequest) -> Result<T, Error> {
    let body = request.body.as_ref().ok_or_else(|| {
        Error::invalid_request("request requires a JSON body")
    })?;
    serde_json::from_value(body.clone()).map_err(|e| {
        Error::invalid_request(&format!("undecodable request body: {}", e))
    })
}
