// This file is part of the terraform-provider-forwardnetworks project
//
// Copyright (C) ANEO, 2024-2024. All rights reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License")
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Collectors of the organization, assigned to networks by their user.

use serde::{Deserialize, Serialize};

use crate::client::{ForwardClient, Result};

mod resource;

pub use resource::CollectorResource;

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Collector {
    pub id: String,
    pub org_id: String,
    pub user_id: String,
    pub username: String,
    pub collector_name: String,
    #[serde(rename = "fwCollectorPoolAccount")]
    pub pool_account: bool,
    pub status: CollectorStatus,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CollectorStatus {
    pub busy_status: String,
    pub outdated: bool,
    pub supports_remote_upgrade: bool,
}

#[derive(Debug, Serialize)]
struct CollectorUser<'a> {
    username: &'a str,
}

impl ForwardClient {
    pub async fn collectors(&self) -> Result<Vec<Collector>> {
        self.get("/api/orgs/current/collectors").send_json().await
    }

    pub async fn collector_by_name(&self, name: &str) -> Result<Option<Collector>> {
        Ok(self
            .collectors()
            .await?
            .into_iter()
            .find(|collector| collector.collector_name == name))
    }

    /// Make the network collected by the collector logged in as `username`
    pub async fn assign_collector(&self, network_id: &str, username: &str) -> Result<()> {
        self.put(&format!("/api/networks/{network_id}/collector/user"))
            .json(&CollectorUser { username })
            .send_empty()
            .await
    }
}
