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

use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use tf_provider::schema::{AttributeConstraint, AttributeType, Block, Description};
use tf_provider::value::{Value, ValueBool, ValueList, ValueMap, ValueNumber, ValueString};
use tf_provider::{map, schema::Schema};

use crate::utils::{attribute, list_of, map_of, parse_bool, split_csv, string_value, WithSchema};

use super::{ExportParams, SnapshotWithMetrics};

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotEntry<'a> {
    #[serde(borrow = "'a")]
    pub id: ValueString<'a>,
    #[serde(borrow = "'a")]
    pub processing_trigger: ValueString<'a>,
    pub total_devices: ValueNumber,
    pub creation_date_millis: ValueNumber,
    pub processed_at_millis: ValueNumber,
    pub oldest_collection_millis: ValueNumber,
    pub latest_collection_millis: ValueNumber,
    pub is_draft: ValueBool,
    #[serde(borrow = "'a")]
    pub state: ValueString<'a>,
    #[serde(borrow = "'a")]
    pub metrics: ValueMap<'a, ValueString<'a>>,
}

impl<'a> From<SnapshotWithMetrics> for SnapshotEntry<'a> {
    fn from(value: SnapshotWithMetrics) -> Self {
        let SnapshotWithMetrics { snapshot, metrics } = value;
        Self {
            id: string_value(snapshot.id),
            processing_trigger: string_value(snapshot.processing_trigger),
            total_devices: Value::Value(snapshot.total_devices),
            creation_date_millis: Value::Value(snapshot.creation_date_millis),
            processed_at_millis: Value::Value(snapshot.processed_at_millis),
            oldest_collection_millis: Value::Value(snapshot.oldest_collection_millis),
            latest_collection_millis: Value::Value(snapshot.latest_collection_millis),
            is_draft: Value::Value(snapshot.is_draft),
            state: string_value(snapshot.state),
            metrics: match metrics {
                Some(metrics) => Value::Value(
                    metrics
                        .flatten()
                        .into_iter()
                        .map(|(key, value)| (Cow::Borrowed(key), string_value(value)))
                        .collect(),
                ),
                None => Value::Null,
            },
        }
    }
}

fn snapshot_entry_type() -> AttributeType {
    AttributeType::Object(map! {
        "id" => AttributeType::String,
        "processing_trigger" => AttributeType::String,
        "total_devices" => AttributeType::Number,
        "creation_date_millis" => AttributeType::Number,
        "processed_at_millis" => AttributeType::Number,
        "oldest_collection_millis" => AttributeType::Number,
        "latest_collection_millis" => AttributeType::Number,
        "is_draft" => AttributeType::Bool,
        "state" => AttributeType::String,
        "metrics" => map_of(AttributeType::String),
    })
}

/// `forwardnetworks_snapshots`
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotsState<'a> {
    #[serde(borrow = "'a")]
    pub network_id: ValueString<'a>,
    pub latest_processed: ValueBool,
    pub metrics: ValueBool,
    #[serde(borrow = "'a")]
    pub snapshots: ValueList<Value<SnapshotEntry<'a>>>,
}

impl<'a> WithSchema for SnapshotsState<'a> {
    fn schema() -> Schema {
        Schema {
            version: 1,
            block: Block {
                description: Description::plain("Snapshots of a network"),
                attributes: map! {
                    "network_id" => attribute(
                        AttributeType::String,
                        AttributeConstraint::Required,
                        "The ID of the network.",
                    ),
                    "latest_processed" => attribute(
                        AttributeType::Bool,
                        AttributeConstraint::Optional,
                        "Whether to return only the latest processed snapshot. Defaults to false.",
                    ),
                    "metrics" => attribute(
                        AttributeType::Bool,
                        AttributeConstraint::Optional,
                        "Whether to include metrics for each snapshot. Defaults to false.",
                    ),
                    "snapshots" => attribute(
                        list_of(snapshot_entry_type()),
                        AttributeConstraint::Computed,
                        "The list of snapshots.",
                    ),
                },
                ..Default::default()
            },
        }
    }
}

impl<'a> SnapshotsState<'a> {
    pub fn set_snapshots(&mut self, snapshots: Vec<SnapshotWithMetrics>) {
        self.snapshots = Value::Value(
            snapshots
                .into_iter()
                .map(|snapshot| Value::Value(snapshot.into()))
                .collect(),
        );
    }
}

/// `forwardnetworks_snapshot_export`
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotExportState<'a> {
    #[serde(borrow = "'a")]
    pub snapshot_id: ValueString<'a>,
    #[serde(borrow = "'a")]
    pub params: ValueMap<'a, ValueString<'a>>,
    #[serde(borrow = "'a")]
    pub exported_snapshot: ValueString<'a>,
}

impl<'a> WithSchema for SnapshotExportState<'a> {
    fn schema() -> Schema {
        Schema {
            version: 1,
            block: Block {
                description: Description::plain("Export of a snapshot as a zip archive"),
                attributes: map! {
                    "snapshot_id" => attribute(
                        AttributeType::String,
                        AttributeConstraint::Required,
                        "The ID of the snapshot to export.",
                    ),
                    "params" => attribute(
                        map_of(AttributeType::String),
                        AttributeConstraint::Optional,
                        "Export parameters: `includeDevices` and `excludeDevices` (comma separated device names), `obfuscationKey` and `obfuscateNames`.",
                    ),
                    "exported_snapshot" => attribute(
                        AttributeType::String,
                        AttributeConstraint::Computed,
                        "The base64-encoded content of the exported snapshot zip file.",
                    ),
                },
                ..Default::default()
            },
        }
    }
}

impl<'a> SnapshotExportState<'a> {
    pub const PARAMS: [&'static str; 4] = [
        "includeDevices",
        "excludeDevices",
        "obfuscationKey",
        "obfuscateNames",
    ];

    pub fn export_params(&self) -> ExportParams {
        let param = |name: &str| {
            self.params
                .as_ref_option()
                .and_then(|params| params.get(name))
                .map_or("", |value| value.as_str())
        };

        ExportParams {
            include_devices: split_csv(param("includeDevices")),
            exclude_devices: split_csv(param("excludeDevices")),
            obfuscation_key: param("obfuscationKey").to_owned(),
            obfuscate_names: parse_bool(param("obfuscateNames")),
        }
    }

    /// Parameters with no meaning for the export
    pub fn unknown_params(&self) -> Vec<&str> {
        self.params
            .iter()
            .flatten()
            .map(|(name, _)| name.as_ref())
            .filter(|name| !Self::PARAMS.iter().any(|param| param == name))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::super::{Snapshot, SnapshotMetrics};
    use super::*;

    #[test]
    fn snapshot_entry_without_metrics() {
        let entry = SnapshotEntry::from(SnapshotWithMetrics {
            snapshot: Snapshot {
                id: "snap-42".into(),
                processing_trigger: "REPROCESS".into(),
                total_devices: 3,
                is_draft: true,
                state: "PROCESSED".into(),
                ..Default::default()
            },
            metrics: None,
        });

        assert_eq!(entry.id.as_str(), "snap-42");
        assert_eq!(entry.processing_trigger.as_str(), "REPROCESS");
        assert_eq!(entry.total_devices, Value::Value(3));
        assert_eq!(entry.is_draft, Value::Value(true));
        assert!(entry.metrics.is_null());
    }

    #[test]
    fn snapshot_entry_with_metrics() {
        let entry = SnapshotEntry::from(SnapshotWithMetrics {
            snapshot: Snapshot {
                id: "snap-1".into(),
                ..Default::default()
            },
            metrics: Some(SnapshotMetrics {
                num_successful_devices: 7,
                snapshot_id: "snap-1".into(),
                ..Default::default()
            }),
        });

        let metrics = entry.metrics.as_ref_option().unwrap();
        assert_eq!(metrics["num_successful_devices"].as_str(), "7");
        assert_eq!(metrics["snapshot_id"].as_str(), "snap-1");
    }

    fn export_state(params: &[(&'static str, &'static str)]) -> SnapshotExportState<'static> {
        SnapshotExportState {
            snapshot_id: Value::Value(Cow::Borrowed("snap-1")),
            params: Value::Value(
                params
                    .iter()
                    .map(|(k, v)| (Cow::Borrowed(*k), Value::Value(Cow::Borrowed(*v))))
                    .collect::<BTreeMap<_, _>>(),
            ),
            exported_snapshot: Value::Null,
        }
    }

    #[test]
    fn export_params_are_decoded() {
        let state = export_state(&[
            ("includeDevices", "r1,r2"),
            ("excludeDevices", ""),
            ("obfuscationKey", "k3y"),
            ("obfuscateNames", "TRUE"),
        ]);

        assert_eq!(
            state.export_params(),
            ExportParams {
                include_devices: vec!["r1".into(), "r2".into()],
                exclude_devices: vec![],
                obfuscation_key: "k3y".into(),
                obfuscate_names: true,
            }
        );
        assert!(state.unknown_params().is_empty());
    }

    #[test]
    fn missing_export_params_are_defaults() {
        let state = SnapshotExportState::default();
        assert_eq!(state.export_params(), ExportParams::default());

        let state = export_state(&[("obfuscate", "true")]);
        assert_eq!(state.unknown_params(), vec!["obfuscate"]);
        assert!(!state.export_params().obfuscate_names);
    }
}
