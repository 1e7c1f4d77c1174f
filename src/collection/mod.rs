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

mod data_source;
mod resource;
mod schedule;
mod state;

pub use data_source::CollectionDataSource;
pub use resource::CollectionResource;
pub use schedule::CollectionScheduleResource;

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionSchedule {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub time_zone: String,
    #[serde(default)]
    pub days_of_the_week: Vec<i64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub times: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period_in_seconds: Option<i64>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub start_at: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub end_at: String,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
pub struct CollectionSchedules {
    #[serde(default)]
    pub schedules: Vec<CollectionSchedule>,
}

impl ForwardClient {
    /// Ask the platform to collect the devices of a network.
    ///
    /// The resulting snapshot is processed asynchronously, see
    /// [`crate::poll::wait_for_processed_snapshot`].
    pub async fn start_collection(&self, network_id: &str) -> Result<()> {
        tracing::info!(network_id, "starting collection");
        self.post(&format!("/api/networks/{network_id}/startcollection"))
            .send_empty()
            .await
    }

    pub async fn collection_schedules(&self, network_id: &str) -> Result<CollectionSchedules> {
        self.get(&format!("/api/networks/{network_id}/collection-schedules"))
            .send_json()
            .await
    }

    pub async fn collection_schedule(
        &self,
        network_id: &str,
        schedule_id: &str,
    ) -> Result<CollectionSchedule> {
        self.get(&format!(
            "/api/networks/{network_id}/collection-schedules/{schedule_id}"
        ))
        .send_json()
        .await
    }

    pub async fn create_collection_schedule(
        &self,
        network_id: &str,
        schedule: &CollectionSchedule,
    ) -> Result<CollectionSchedule> {
        self.post(&format!("/api/networks/{network_id}/collection-schedules"))
            .json(schedule)
            .send_json()
            .await
    }

    pub async fn update_collection_schedule(
        &self,
        network_id: &str,
        schedule_id: &str,
        schedule: &CollectionSchedule,
    ) -> Result<CollectionSchedule> {
        self.put(&format!(
            "/api/networks/{network_id}/collections/schedules/{schedule_id}"
        ))
        .json(schedule)
        .send_json()
        .await
    }

    pub async fn delete_collection_schedule(&self, network_id: &str, schedule_id: &str) -> Result<()> {
        self.delete(&format!(
            "/api/networks/{network_id}/collection-schedules/{schedule_id}"
        ))
        .send_empty()
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schedule_payload() {
        let schedules: CollectionSchedules = serde_json::from_str(
            r#"{"schedules":[{"id":"7","enabled":true,"timeZone":"Europe/Paris","daysOfTheWeek":[1,3],"times":["02:00"]}]}"#,
        )
        .unwrap();
        let schedule = &schedules.schedules[0];
        assert_eq!(schedule.id, "7");
        assert_eq!(schedule.days_of_the_week, vec![1, 3]);
        assert_eq!(schedule.period_in_seconds, None);

        let body = serde_json::to_value(CollectionSchedule {
            id: String::new(),
            ..schedule.clone()
        })
        .unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "enabled": true,
                "timeZone": "Europe/Paris",
                "daysOfTheWeek": [1, 3],
                "times": ["02:00"],
            })
        );
    }
}
