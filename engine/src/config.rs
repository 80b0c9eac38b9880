// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Interfaces for working with simulation engine configuration

use camino::Utf8PathBuf;
use serde::Deserialize;
use serde::Serialize;

/// Configuration for a simulated session
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Config {
    /// Path the changeset is persisted to at the end of the run
    pub changeset_path: Utf8PathBuf,
    /// Principal stamped on synthesized long-running operations
    pub operation_user: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            changeset_path: Utf8PathBuf::from("changeset.json"),
            operation_user: String::from("mirage@simulated.local"),
        }
    }
}
