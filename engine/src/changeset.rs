// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Derivation of the end-of-run changeset
//!
//! The changeset is not accumulated incrementally; it is a snapshot of the
//! resource table taken exactly once, after the intercepted session ends,
//! in the order resources were first created.

use crate::store::Store;
use camino::Utf8Path;
use chrono::DateTime;
use chrono::Utc;
use mirage_common::api::Error;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

/// Action tag stamped on every asset.  The engine only ever creates or
/// replaces resources within a run, so this is currently the sole action.
pub const ACTION_UPSERT: &str = "UPSERT";

/// One synthesized resource, as recorded in the changeset
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Asset {
    /// Denormalized resource name, lifted out of the payload
    pub name: Option<String>,
    /// Resource-type tag, i.e. the store key's prefix
    #[serde(rename = "type")]
    pub resource_type: String,
    pub action: String,
    pub update_time: DateTime<Utc>,
    /// Full attribute payload as stored
    pub data: Value,
}

/// The ordered log of everything one simulated session fabricated
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Changeset {
    #[serde(rename = "type")]
    pub record_type: String,
    pub date: DateTime<Utc>,
    pub assets: Vec<Asset>,
}

/// Snapshots the store into a changeset.  The store is read, never
/// mutated.
pub async fn generate(store: &Store) -> Changeset {
    let now = Utc::now();
    let assets = store
        .snapshot_resources()
        .await
        .into_iter()
        .map(|(key, data)| Asset {
            name: data
                .get("name")
                .and_then(Value::as_str)
                .map(str::to_string),
            resource_type: key.type_tag().to_string(),
            action: ACTION_UPSERT.to_string(),
            update_time: now,
            data,
        })
        .collect();
    Changeset { record_type: "changeset".to_string(), date: now, assets }
}

impl Changeset {
    /// Persists the changeset as UTF-8 JSON at `path`.
    pub fn write(&self, path: &Utf8Path) -> Result<(), Error> {
        let contents = serde_json::to_vec_pretty(self).map_err(|e| {
            Error::internal_error(&format!(
                "serializing changeset: {}",
                e
            ))
        })?;
        std::fs::write(path, contents).map_err(|e| {
            Error::internal_error(&format!(
                "writing changeset to {:?}: {}",
                path, e
            ))
        })
    }
}
