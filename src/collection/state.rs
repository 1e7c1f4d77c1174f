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
use tf_provider::schema::{AttributeConstraint, AttributeType, Block, Description};
use tf_provider::value::{Value, ValueBool, ValueList, ValueNumber, ValueString};
use tf_provider::{map, Diagnostics, schema::Schema};

use crate::utils::{
    answered_list, answered_string, attribute, list_of, list_of_numbers, list_of_strings,
    non_empty, option_of, string_value, value_or_null, WithNormalize, WithSchema,
};

use crate::snapshot::Snapshot;

use super::CollectionSchedule;

/// `forwardnetworks_collection`
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionState<'a> {
    #[serde(borrow = "'a")]
    pub id: ValueString<'a>,
    #[serde(borrow = "'a")]
    pub network_id: ValueString<'a>,
    pub force_refresh: ValueBool,
}

impl<'a> WithSchema for CollectionState<'a> {
    fn schema() -> Schema {
        Schema {
            version: 1,
            block: Block {
                description: Description::plain(
                    "Collection of a network, identified by the latest processed snapshot it produced.",
                ),
                attributes: map! {
                    "id" => attribute(
                        AttributeType::String,
                        AttributeConstraint::Computed,
                        "ID of the latest processed snapshot of the network.",
                    ),
                    "network_id" => attribute(
                        AttributeType::String,
                        AttributeConstraint::Required,
                        "The ID of the network to collect.",
                    ),
                    "force_refresh" => attribute(
                        AttributeType::Bool,
                        AttributeConstraint::OptionalComputed,
                        "Start a new collection even when the network already has a processed snapshot. Defaults to false.",
                    ),
                },
                ..Default::default()
            },
        }
    }
}

impl<'a> WithNormalize for CollectionState<'a> {
    fn normalize(&mut self, _diags: &mut Diagnostics) {
        if self.force_refresh.is_null() {
            self.force_refresh = Value::Value(false);
        }
    }
}

impl<'a> CollectionState<'a> {
    pub fn force_refresh(&self) -> bool {
        self.force_refresh.unwrap_or(false)
    }

    /// State after a read, `None` once the network has no processed snapshot
    pub fn refreshed(mut self, latest: Option<Snapshot>) -> Option<Self> {
        let snapshot = latest?;
        // The collection keeps the snapshot it produced, newer ones belong to other collections
        if self.id.as_ref_option().map_or(true, |id| id.is_empty()) {
            self.id = string_value(snapshot.id);
        }
        Some(self)
    }
}

/// `forwardnetworks_collection` data source
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionDataSourceState<'a> {
    #[serde(borrow = "'a")]
    pub network_id: ValueString<'a>,
}

impl<'a> WithSchema for CollectionDataSourceState<'a> {
    fn schema() -> Schema {
        Schema {
            version: 1,
            block: Block {
                description: Description::plain(
                    "Start a collection of a network every time the data source is read.",
                ),
                attributes: map! {
                    "network_id" => attribute(
                        AttributeType::String,
                        AttributeConstraint::Required,
                        "The ID of the network to collect.",
                    ),
                },
                ..Default::default()
            },
        }
    }
}

/// `forwardnetworks_collection_schedule`
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionScheduleState<'a> {
    #[serde(borrow = "'a")]
    pub id: ValueString<'a>,
    #[serde(borrow = "'a")]
    pub network_id: ValueString<'a>,
    pub enabled: ValueBool,
    #[serde(borrow = "'a")]
    pub time_zone: ValueString<'a>,
    pub days_of_the_week: ValueList<ValueNumber>,
    #[serde(borrow = "'a")]
    pub times: ValueList<ValueString<'a>>,
    pub period_in_seconds: ValueNumber,
    #[serde(borrow = "'a")]
    pub start_at: ValueString<'a>,
    #[serde(borrow = "'a")]
    pub end_at: ValueString<'a>,
}

impl<'a> WithSchema for CollectionScheduleState<'a> {
    fn schema() -> Schema {
        let optional = |attr_type, description| {
            attribute(attr_type, AttributeConstraint::Optional, description)
        };
        let required = |attr_type, description| {
            attribute(attr_type, AttributeConstraint::Required, description)
        };

        Schema {
            version: 1,
            block: Block {
                description: Description::plain("Manages a collection schedule of a network."),
                attributes: map! {
                    "id" => attribute(
                        AttributeType::String,
                        AttributeConstraint::Computed,
                        "The ID of the collection schedule.",
                    ),
                    "network_id" => required(
                        AttributeType::String,
                        "The ID of the network to which the collection schedule belongs.",
                    ),
                    "enabled" => required(AttributeType::Bool, "The status of the collection schedule."),
                    "time_zone" => required(
                        AttributeType::String,
                        "The time zone of the collection schedule.",
                    ),
                    "days_of_the_week" => required(
                        list_of(AttributeType::Number),
                        "The days of the week for the collection schedule, 0 being Sunday.",
                    ),
                    "times" => optional(
                        list_of(AttributeType::String),
                        "The times of the day for the collection schedule.",
                    ),
                    "period_in_seconds" => optional(
                        AttributeType::Number,
                        "The period in seconds for the collection schedule.",
                    ),
                    "start_at" => optional(
                        AttributeType::String,
                        "The start time of the collection schedule.",
                    ),
                    "end_at" => optional(
                        AttributeType::String,
                        "The end time of the collection schedule.",
                    ),
                },
                ..Default::default()
            },
        }
    }
}

impl<'a> CollectionScheduleState<'a> {
    pub fn to_request(&self) -> CollectionSchedule {
        CollectionSchedule {
            id: non_empty(&self.id).unwrap_or_default(),
            enabled: self.enabled.unwrap_or(false),
            time_zone: self.time_zone.as_str().to_owned(),
            days_of_the_week: list_of_numbers(&self.days_of_the_week),
            times: list_of_strings(&self.times),
            period_in_seconds: option_of(&self.period_in_seconds),
            start_at: non_empty(&self.start_at).unwrap_or_default(),
            end_at: non_empty(&self.end_at).unwrap_or_default(),
        }
    }

    pub fn apply(&mut self, schedule: CollectionSchedule) {
        if !schedule.id.is_empty() {
            self.id = string_value(schedule.id);
        }
        self.enabled = Value::Value(schedule.enabled);
        self.time_zone = string_value(schedule.time_zone);
        self.days_of_the_week = Value::Value(
            schedule
                .days_of_the_week
                .into_iter()
                .map(Value::Value)
                .collect(),
        );
        self.times = answered_list(&self.times, schedule.times);
        self.period_in_seconds = value_or_null(schedule.period_in_seconds);
        self.start_at = answered_string(&self.start_at, schedule.start_at);
        self.end_at = answered_string(&self.end_at, schedule.end_at);
    }
}

#[cfg(test)]
mod tests {
    use std::borrow::Cow;

    use super::*;
    use crate::utils::string_list;

    fn planned() -> CollectionScheduleState<'static> {
        CollectionScheduleState {
            id: Value::Unknown,
            network_id: Value::Value(Cow::Borrowed("net-1")),
            enabled: Value::Value(true),
            time_zone: Value::Value(Cow::Borrowed("America/Los_Angeles")),
            days_of_the_week: Value::Value(vec![Value::Value(1), Value::Value(5)]),
            times: string_list(["01:00", "13:30"]),
            period_in_seconds: Value::Null,
            start_at: Value::Value(Cow::Borrowed("2024-01-01T00:00:00Z")),
            end_at: Value::Null,
        }
    }

    #[test]
    fn state_to_request_to_state() {
        let planned = planned();
        let request = planned.to_request();

        assert_eq!(request.id, "");
        assert_eq!(request.days_of_the_week, vec![1, 5]);
        assert_eq!(request.period_in_seconds, None);
        assert_eq!(request.end_at, "");

        // The API answers with the stored schedule, identified
        let answer: CollectionSchedule = serde_json::from_value(serde_json::json!({
            "id": "sched-3",
            "enabled": request.enabled,
            "timeZone": request.time_zone,
            "daysOfTheWeek": request.days_of_the_week,
            "times": request.times,
            "startAt": request.start_at,
        }))
        .unwrap();

        let mut state = planned.clone();
        state.apply(answer);

        assert_eq!(state.id.as_str(), "sched-3");
        assert_eq!(
            CollectionScheduleState {
                id: Value::Unknown,
                ..state
            },
            planned
        );
    }

    #[test]
    fn period_only_schedule() {
        let planned = CollectionScheduleState {
            times: Value::Null,
            period_in_seconds: Value::Value(3600),
            start_at: Value::Null,
            ..planned()
        };
        let request = planned.to_request();
        assert!(request.times.is_empty());
        assert_eq!(request.period_in_seconds, Some(3600));

        let mut state = planned.clone();
        state.apply(CollectionSchedule {
            id: "sched-4".into(),
            ..request
        });
        assert!(state.times.is_null());
        assert_eq!(state.period_in_seconds, Value::Value(3600));
        assert!(state.start_at.is_null());
    }

    fn collection(id: Option<&'static str>) -> CollectionState<'static> {
        CollectionState {
            id: id.map_or(Value::Null, |id| Value::Value(Cow::Borrowed(id))),
            network_id: Value::Value(Cow::Borrowed("net-1")),
            force_refresh: Value::Value(false),
        }
    }

    fn processed(id: &str) -> Snapshot {
        Snapshot {
            id: id.into(),
            state: "PROCESSED".into(),
            ..Default::default()
        }
    }

    #[test]
    fn collection_keeps_its_snapshot() {
        let state = collection(Some("snap-1"))
            .refreshed(Some(processed("snap-2")))
            .unwrap();
        assert_eq!(state.id.as_str(), "snap-1");
    }

    #[test]
    fn imported_collection_takes_the_latest_snapshot() {
        let state = collection(None).refreshed(Some(processed("snap-2"))).unwrap();
        assert_eq!(state.id.as_str(), "snap-2");
        assert_eq!(state.network_id.as_str(), "net-1");
    }

    #[test]
    fn collection_without_processed_snapshot_is_gone() {
        assert!(collection(Some("snap-1")).refreshed(None).is_none());
        assert!(collection(None).refreshed(None).is_none());
    }

    #[test]
    fn force_refresh_defaults_to_false() {
        let mut state = CollectionState::default();
        state.normalize(&mut Diagnostics::default());
        assert_eq!(state.force_refresh, Value::Value(false));
        assert!(!state.force_refresh());
    }
}
