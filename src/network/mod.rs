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

use serde::{Deserialize, Serialize};

use crate::client::{ForwardClient, Result};

mod resource;
mod state;

pub use resource::NetworkResource;

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Network {
    pub id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub parent_id: String,
    pub name: String,
    pub org_id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub creator: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub creator_id: String,
    pub created_at: i64,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub note: String,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct NetworkUpdate {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub note: String,
}

impl ForwardClient {
    pub async fn networks(&self) -> Result<Vec<Network>> {
        self.get("/api/networks").send_json().await
    }

    /// Look a network up in the list of networks of the organization
    pub async fn network(&self, network_id: &str) -> Result<Option<Network>> {
        Ok(self
            .networks()
            .await?
            .into_iter()
            .find(|network| network.id == network_id))
    }

    pub async fn create_network(&self, name: &str) -> Result<Network> {
        self.post("/api/networks")
            .query("name", name)
            .send_json()
            .await
    }

    pub async fn update_network(&self, network_id: &str, update: &NetworkUpdate) -> Result<Network> {
        self.patch(&format!("/api/networks/{network_id}"))
            .json(update)
            .send_json()
            .await
    }

    pub async fn delete_network(&self, network_id: &str) -> Result<()> {
        self.delete(&format!("/api/networks/{network_id}"))
            .send_empty()
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn network_payload() {
        let network: Network = serde_json::from_str(
            r#"{"id":"net-1","name":"lab","orgId":"org-1","creator":"alice","createdAt":1700000000000}"#,
        )
        .unwrap();
        assert_eq!(network.id, "net-1");
        assert_eq!(network.org_id, "org-1");
        assert_eq!(network.note, "");
    }

    #[test]
    fn empty_update_fields_are_omitted() {
        let update = NetworkUpdate {
            name: "lab".into(),
            note: String::new(),
        };
        assert_eq!(serde_json::to_string(&update).unwrap(), r#"{"name":"lab"}"#);
    }
}
