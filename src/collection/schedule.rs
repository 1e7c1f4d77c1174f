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

use async_trait::async_trait;

use tf_provider::value::{Value, ValueEmpty};
use tf_provider::{schema::Schema, AttributePath, Diagnostics, Resource};

use crate::provider::ClientHandle;
use crate::utils::{string_value, ReportError, WithSchema};

use super::state::CollectionScheduleState;

#[derive(Debug, Default, Clone)]
pub struct CollectionScheduleResource {
    client: ClientHandle,
}

impl CollectionScheduleResource {
    pub fn new(client: ClientHandle) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Resource for CollectionScheduleResource {
    type State<'a> = CollectionScheduleState<'a>;
    type PrivateState<'a> = ValueEmpty;
    type ProviderMetaState<'a> = ValueEmpty;

    fn schema(&self, _diags: &mut Diagnostics) -> Option<Schema> {
        Some(CollectionScheduleState::schema())
    }

    async fn validate<'a>(&self, diags: &mut Diagnostics, config: Self::State<'a>) -> Option<()> {
        for (i, day) in config.days_of_the_week.iter().flatten().enumerate() {
            if let Value::Value(day) = day {
                if !(0..=6).contains(day) {
                    diags.error(
                        "Invalid day of the week",
                        format!("Days of the week range from 0 (Sunday) to 6 (Saturday), got {day}."),
                        AttributePath::new("days_of_the_week").index(i as i64),
                    );
                }
            }
        }
        if config.period_in_seconds.as_ref_option().is_some_and(|period| *period <= 0) {
            diags.error(
                "Invalid collection period",
                "The period of a collection schedule must be positive.",
                AttributePath::new("period_in_seconds"),
            );
        }

        if diags.errors.is_empty() {
            Some(())
        } else {
            None
        }
    }

    async fn read<'a>(
        &self,
        diags: &mut Diagnostics,
        state: Self::State<'a>,
        private_state: Self::PrivateState<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
        let client = self.client.get(diags)?;

        let schedule = client
            .collection_schedule(state.network_id.as_str(), state.id.as_str())
            .await
            .or_report(diags, "Failed to read collection schedule")?;

        let mut state = state;
        state.apply(schedule);
        Some((state, private_state))
    }

    async fn plan_create<'a>(
        &self,
        _diags: &mut Diagnostics,
        proposed_state: Self::State<'a>,
        _config_state: Self::State<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
        let mut state = proposed_state;
        state.id = Value::Unknown;
        Some((state, Default::default()))
    }

    async fn plan_update<'a>(
        &self,
        _diags: &mut Diagnostics,
        prior_state: Self::State<'a>,
        proposed_state: Self::State<'a>,
        _config_state: Self::State<'a>,
        prior_private_state: Self::PrivateState<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>, Vec<AttributePath>)> {
        let mut trigger_replace = Vec::new();
        if proposed_state.network_id != prior_state.network_id {
            trigger_replace.push(AttributePath::new("network_id"));
        }
        Some((proposed_state, prior_private_state, trigger_replace))
    }

    async fn plan_destroy<'a>(
        &self,
        _diags: &mut Diagnostics,
        _prior_state: Self::State<'a>,
        prior_private_state: Self::PrivateState<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<Self::PrivateState<'a>> {
        Some(prior_private_state)
    }

    async fn create<'a>(
        &self,
        diags: &mut Diagnostics,
        planned_state: Self::State<'a>,
        _config_state: Self::State<'a>,
        private_state: Self::PrivateState<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
        let client = self.client.get(diags)?;
        let mut state = planned_state;

        let schedule = client
            .create_collection_schedule(state.network_id.as_str(), &state.to_request())
            .await
            .or_report(diags, "Failed to create collection schedule")?;
        if schedule.id.is_empty() {
            diags.root_error(
                "Failed to create collection schedule",
                "The API did not return the ID of the new collection schedule.",
            );
            return None;
        }

        state.apply(schedule);
        Some((state, private_state))
    }

    async fn update<'a>(
        &self,
        diags: &mut Diagnostics,
        prior_state: Self::State<'a>,
        planned_state: Self::State<'a>,
        _config_state: Self::State<'a>,
        private_state: Self::PrivateState<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
        let client = self.client.get(diags)?;
        let mut state = planned_state;
        state.id = prior_state.id.clone();

        let schedule = client
            .update_collection_schedule(
                state.network_id.as_str(),
                state.id.as_str(),
                &state.to_request(),
            )
            .await
            .or_report(diags, "Failed to update collection schedule")?;

        state.apply(schedule);
        Some((state, private_state))
    }

    async fn destroy<'a>(
        &self,
        diags: &mut Diagnostics,
        state: Self::State<'a>,
        _planned_private_state: Self::PrivateState<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<()> {
        let client = self.client.get(diags)?;

        client
            .delete_collection_schedule(state.network_id.as_str(), state.id.as_str())
            .await
            .or_report(diags, "Failed to delete collection schedule")
    }

    async fn import<'a>(
        &self,
        diags: &mut Diagnostics,
        id: String,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
        let Some((network_id, schedule_id)) = id.split_once('/') else {
            diags.root_error(
                "Invalid import ID",
                format!("Expected `<network_id>/<schedule_id>`, got `{id}`."),
            );
            return None;
        };

        let state = CollectionScheduleState {
            id: string_value(schedule_id),
            network_id: string_value(network_id),
            ..Default::default()
        };
        Some((state, Default::default()))
    }
}
