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

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use futures::{stream, StreamExt, TryStreamExt};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::client::{Error, ForwardClient, Result};
use crate::poll::SnapshotSource;

mod data_source;
mod state;

pub use data_source::{SnapshotExportDataSource, SnapshotsDataSource};

pub const NO_SNAPSHOTS: &str = "The network has no Snapshots.";
pub const NOT_PROCESSED: &str =
    "None of the Snapshots in the network are processed. Processing of the latest Snapshot has begun.";

const METRICS_CONCURRENCY: usize = 4;

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Snapshot {
    pub id: String,
    pub processing_trigger: String,
    pub total_devices: i64,
    pub creation_date_millis: i64,
    pub processed_at_millis: i64,
    pub oldest_collection_millis: i64,
    pub latest_collection_millis: i64,
    pub is_draft: bool,
    pub state: String,
}

/// Collection and processing statistics of a snapshot
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SnapshotMetrics {
    pub collection_concurrency: i64,
    pub collection_duration: i64,
    pub collection_failures: HashMap<String, i64>,
    pub creation_date_millis: i64,
    pub host_computation_status: String,
    pub ip_location_indexing_status: String,
    pub jump_server_collection_concurrency: i64,
    pub l2_indexing_status: String,
    pub needs_reprocessing: bool,
    pub num_collection_failure_devices: i64,
    pub num_parsing_failure_devices: i64,
    pub num_successful_devices: i64,
    pub parsing_failures: HashMap<String, i64>,
    pub path_search_indexing_status: String,
    pub processing_duration: i64,
    pub search_indexing_status: String,
    pub snapshot_id: String,
}

impl SnapshotMetrics {
    /// Metrics as a flat string map, failure maps being JSON encoded
    pub fn flatten(&self) -> BTreeMap<&'static str, String> {
        let failures = |map: &HashMap<String, i64>| {
            let sorted: BTreeMap<_, _> = map.iter().collect();
            serde_json::to_string(&sorted).unwrap_or_default()
        };

        BTreeMap::from([
            ("collection_concurrency", self.collection_concurrency.to_string()),
            ("collection_duration", self.collection_duration.to_string()),
            ("collection_failures", failures(&self.collection_failures)),
            ("creation_date_millis", self.creation_date_millis.to_string()),
            ("host_computation_status", self.host_computation_status.clone()),
            (
                "ip_location_indexing_status",
                self.ip_location_indexing_status.clone(),
            ),
            (
                "jump_server_collection_concurrency",
                self.jump_server_collection_concurrency.to_string(),
            ),
            ("l2_indexing_status", self.l2_indexing_status.clone()),
            ("needs_reprocessing", self.needs_reprocessing.to_string()),
            (
                "num_collection_failure_devices",
                self.num_collection_failure_devices.to_string(),
            ),
            (
                "num_parsing_failure_devices",
                self.num_parsing_failure_devices.to_string(),
            ),
            (
                "num_successful_devices",
                self.num_successful_devices.to_string(),
            ),
            ("parsing_failures", failures(&self.parsing_failures)),
            (
                "path_search_indexing_status",
                self.path_search_indexing_status.clone(),
            ),
            ("processing_duration", self.processing_duration.to_string()),
            ("search_indexing_status", self.search_indexing_status.clone()),
            ("snapshot_id", self.snapshot_id.clone()),
        ])
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SnapshotWithMetrics {
    pub snapshot: Snapshot,
    pub metrics: Option<SnapshotMetrics>,
}

/// Body of a snapshot export request
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportParams {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub include_devices: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude_devices: Vec<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub obfuscation_key: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub obfuscate_names: bool,
}

#[derive(Debug, Default, Deserialize)]
struct SnapshotList {
    #[serde(default)]
    snapshots: Vec<Snapshot>,
}

impl ForwardClient {
    pub async fn list_snapshots(&self, network_id: &str) -> Result<Vec<Snapshot>> {
        let list: SnapshotList = self
            .get(&format!("/api/networks/{network_id}/snapshots"))
            .send_json()
            .await?;
        Ok(list.snapshots)
    }

    /// Latest processed snapshot of a network.
    ///
    /// A network without snapshot (404) or without processed snapshot (409)
    /// is reported as a structured [`crate::client::ApiError`].
    pub async fn latest_processed_snapshot(&self, network_id: &str) -> Result<Snapshot> {
        self.get(&format!(
            "/api/networks/{network_id}/snapshots/latestProcessed"
        ))
        .condition(StatusCode::NOT_FOUND, NO_SNAPSHOTS)
        .condition(StatusCode::CONFLICT, NOT_PROCESSED)
        .send_json()
        .await
    }

    pub async fn snapshot_metrics(&self, snapshot_id: &str) -> Result<SnapshotMetrics> {
        self.get(&format!("/api/snapshots/{snapshot_id}/metrics"))
            .send_json()
            .await
    }

    /// Snapshots of a network, optionally only the latest processed one,
    /// optionally decorated with their metrics
    pub async fn snapshots(
        &self,
        network_id: &str,
        latest_processed: bool,
        with_metrics: bool,
    ) -> Result<Vec<SnapshotWithMetrics>> {
        let snapshots = if latest_processed {
            vec![self.latest_processed_snapshot(network_id).await?]
        } else {
            self.list_snapshots(network_id).await?
        };

        if !with_metrics {
            return Ok(snapshots
                .into_iter()
                .map(|snapshot| SnapshotWithMetrics {
                    snapshot,
                    metrics: None,
                })
                .collect());
        }

        stream::iter(snapshots)
            .map(|snapshot| async move {
                let metrics = self.snapshot_metrics(&snapshot.id).await?;
                Ok::<_, Error>(SnapshotWithMetrics {
                    snapshot,
                    metrics: Some(metrics),
                })
            })
            .buffered(METRICS_CONCURRENCY)
            .try_collect()
            .await
    }

    /// Raw content of the exported snapshot archive
    pub async fn export_snapshot(&self, snapshot_id: &str, params: &ExportParams) -> Result<Vec<u8>> {
        self.post(&format!("/api/snapshots/{snapshot_id}"))
            .json(params)
            .send()
            .await
    }
}

#[async_trait]
impl SnapshotSource for ForwardClient {
    async fn latest_processed_snapshot(&self, network_id: &str) -> Result<Snapshot> {
        ForwardClient::latest_processed_snapshot(self, network_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_payload() {
        let snapshot: Snapshot = serde_json::from_str(
            r#"{
                "id": "snap-42",
                "processingTrigger": "COLLECTION",
                "totalDevices": 12,
                "creationDateMillis": 1700000000000,
                "processedAtMillis": 1700000100000,
                "isDraft": false,
                "state": "PROCESSED",
                "unexpected": "ignored"
            }"#,
        )
        .unwrap();

        assert_eq!(snapshot.id, "snap-42");
        assert_eq!(snapshot.processing_trigger, "COLLECTION");
        assert_eq!(snapshot.total_devices, 12);
        assert_eq!(snapshot.oldest_collection_millis, 0);
        assert_eq!(snapshot.state, "PROCESSED");
    }

    #[test]
    fn metrics_are_flattened() {
        let metrics: SnapshotMetrics = serde_json::from_str(
            r#"{
                "collectionConcurrency": 8,
                "collectionFailures": {"TIMEOUT": 2, "AUTH": 1},
                "needsReprocessing": true,
                "numSuccessfulDevices": 40,
                "snapshotId": "snap-42"
            }"#,
        )
        .unwrap();

        let flat = metrics.flatten();
        assert_eq!(flat["collection_concurrency"], "8");
        assert_eq!(flat["collection_failures"], r#"{"AUTH":1,"TIMEOUT":2}"#);
        assert_eq!(flat["parsing_failures"], "{}");
        assert_eq!(flat["needs_reprocessing"], "true");
        assert_eq!(flat["num_successful_devices"], "40");
        assert_eq!(flat["snapshot_id"], "snap-42");
        assert_eq!(flat.len(), 17);
    }

    #[test]
    fn export_params_skip_defaults() {
        assert_eq!(
            serde_json::to_string(&ExportParams::default()).unwrap(),
            "{}"
        );
        let params = ExportParams {
            include_devices: vec!["r1".into(), "r2".into()],
            obfuscate_names: true,
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_string(&params).unwrap(),
            r#"{"includeDevices":["r1","r2"],"obfuscateNames":true}"#
        );
    }
}
