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

//! NQE and predefined checks of a snapshot.

use serde::{Deserialize, Serialize};

use crate::client::{ForwardClient, Result};

mod data_source;
mod resource;
mod state;

pub use data_source::ChecksDataSource;
pub use resource::CheckResource;

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Check {
    pub id: String,
    pub definition: CheckDefinition,
    pub enabled: bool,
    pub priority: String,
    pub name: String,
    pub creation_date_millis: i64,
    pub creator_id: String,
    pub definition_date_millis: i64,
    pub description: String,
    pub status: String,
    pub execution_date_millis: i64,
    pub execution_duration_millis: i64,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CheckDefinition {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub predefined_check_type: String,
    pub check_type: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub query_id: String,
}

/// Body of a check activation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewCheck {
    pub definition: CheckDefinition,
    pub enabled: bool,
}

/// Filters of a check listing, empty ones being ignored
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CheckFilter {
    pub check_type: Option<String>,
    pub priority: Option<String>,
    pub status: Option<String>,
}

impl ForwardClient {
    pub async fn checks(&self, snapshot_id: &str, filter: &CheckFilter) -> Result<Vec<Check>> {
        let mut request = self.get(&format!("/api/snapshots/{snapshot_id}/checks"));
        for (key, value) in [
            ("type", &filter.check_type),
            ("priority", &filter.priority),
            ("status", &filter.status),
        ] {
            if let Some(value) = value {
                request = request.query(key, value.as_str());
            }
        }
        request.send_json().await
    }

    pub async fn check(&self, snapshot_id: &str, check_id: &str) -> Result<Check> {
        self.get(&format!("/api/snapshots/{snapshot_id}/checks/{check_id}"))
            .send_json()
            .await
    }

    pub async fn activate_check(&self, snapshot_id: &str, check: &NewCheck) -> Result<Check> {
        self.post(&format!("/api/snapshots/{snapshot_id}/checks"))
            .json(check)
            .send_json()
            .await
    }

    pub async fn deactivate_check(&self, snapshot_id: &str, check_id: &str) -> Result<()> {
        self.delete(&format!("/api/snapshots/{snapshot_id}/checks/{check_id}"))
            .send_empty()
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn activation_body() {
        let check = NewCheck {
            definition: CheckDefinition {
                check_type: "NQE".into(),
                query_id: "Q_1234".into(),
                ..Default::default()
            },
            enabled: true,
        };
        assert_eq!(
            serde_json::to_string(&check).unwrap(),
            r#"{"definition":{"checkType":"NQE","queryId":"Q_1234"},"enabled":true}"#
        );
    }

    #[test]
    fn check_payload() {
        let check: Check = serde_json::from_str(
            r#"{
                "id": "C-1",
                "definition": {"checkType": "Predefined", "predefinedCheckType": "BGP_NEIGHBOR_ADJACENCY"},
                "enabled": true,
                "priority": "HIGH",
                "status": "FAIL",
                "executionDurationMillis": 120
            }"#,
        )
        .unwrap();
        assert_eq!(check.definition.predefined_check_type, "BGP_NEIGHBOR_ADJACENCY");
        assert_eq!(check.definition.query_id, "");
        assert_eq!(check.execution_duration_millis, 120);
    }
}
