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
use reqwest::StatusCode;

use tf_provider::value::{Value, ValueEmpty};
use tf_provider::{schema::Schema, AttributePath, Diagnostics, Resource};

use crate::provider::ClientHandle;
use crate::utils::{string_value, ReportError, WithNormalize, WithSchema};

use super::state::CheckState;

#[derive(Debug, Default, Clone)]
pub struct CheckResource {
    client: ClientHandle,
}

impl CheckResource {
    pub fn new(client: ClientHandle) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Resource for CheckResource {
    type State<'a> = CheckState<'a>;
    type PrivateState<'a> = ValueEmpty;
    type ProviderMetaState<'a> = ValueEmpty;

    fn schema(&self, _diags: &mut Diagnostics) -> Option<Schema> {
        Some(CheckState::schema())
    }

    async fn validate<'a>(&self, _diags: &mut Diagnostics, _config: Self::State<'a>) -> Option<()> {
        Some(())
    }

    async fn read<'a>(
        &self,
        diags: &mut Diagnostics,
        state: Self::State<'a>,
        private_state: Self::PrivateState<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
        let mut state = state;
        state.normalize(diags);
        if !state.enabled() && state.id.is_null() {
            return Some((state, private_state));
        }
        let client = self.client.get(diags)?;

        match client
            .check(state.snapshot_id.as_str(), state.id.as_str())
            .await
        {
            Ok(check) => state.apply(check),
            // Deactivated checks are gone from the snapshot
            Err(err) if !state.enabled() && err.status() == Some(StatusCode::NOT_FOUND) => (),
            Err(err) => {
                diags.root_error("Failed to read check", err.to_string());
                return None;
            }
        }

        Some((state, private_state))
    }

    async fn plan_create<'a>(
        &self,
        diags: &mut Diagnostics,
        proposed_state: Self::State<'a>,
        _config_state: Self::State<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
        let mut state = proposed_state;
        state.normalize(diags);
        if state.enabled() {
            state.id = Value::Unknown;
            state.check_id = Value::Unknown;
        } else {
            state.set_inactive();
        }
        Some((state, Default::default()))
    }

    async fn plan_update<'a>(
        &self,
        diags: &mut Diagnostics,
        prior_state: Self::State<'a>,
        proposed_state: Self::State<'a>,
        _config_state: Self::State<'a>,
        prior_private_state: Self::PrivateState<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>, Vec<AttributePath>)> {
        let mut state = proposed_state;
        state.normalize(diags);

        let mut trigger_replace = Vec::new();
        for (name, proposed, prior) in [
            ("snapshot_id", &state.snapshot_id, &prior_state.snapshot_id),
            ("check_type", &state.check_type, &prior_state.check_type),
            ("query_id", &state.query_id, &prior_state.query_id),
        ] {
            if proposed != prior {
                trigger_replace.push(AttributePath::new(name));
            }
        }
        // Re-activation creates a new check
        if state.enabled() && !prior_state.enabled() {
            state.id = Value::Unknown;
            state.check_id = Value::Unknown;
        }

        Some((state, prior_private_state, trigger_replace))
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
        let mut state = planned_state;
        let Some(request) = state.activation() else {
            state.set_inactive();
            return Some((state, private_state));
        };
        let client = self.client.get(diags)?;

        let check = client
            .activate_check(state.snapshot_id.as_str(), &request)
            .await
            .or_report(diags, "Failed to activate check")?;

        state.apply(check);
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
        let snapshot_id = state.snapshot_id.as_str().to_owned();

        match (prior_state.enabled(), state.enabled()) {
            (true, false) => {
                client
                    .deactivate_check(&snapshot_id, prior_state.id.as_str())
                    .await
                    .or_report(diags, "Failed to deactivate check")?;
                state.id = prior_state.id.clone();
                state.check_id = prior_state.check_id.clone();
            }
            (false, true) => {
                let check = client
                    .activate_check(&snapshot_id, &state.to_request())
                    .await
                    .or_report(diags, "Failed to activate check")?;
                state.apply(check);
            }
            _ => {
                state.id = prior_state.id.clone();
                state.check_id = prior_state.check_id.clone();
            }
        }

        Some((state, private_state))
    }

    async fn destroy<'a>(
        &self,
        diags: &mut Diagnostics,
        state: Self::State<'a>,
        _planned_private_state: Self::PrivateState<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<()> {
        let Some(check_id) = state.active_check() else {
            return Some(());
        };
        let client = self.client.get(diags)?;

        client
            .deactivate_check(state.snapshot_id.as_str(), &check_id)
            .await
            .or_report(diags, "Failed to deactivate check")
    }

    async fn import<'a>(
        &self,
        diags: &mut Diagnostics,
        id: String,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
        let Some((snapshot_id, check_id)) = id.split_once('/') else {
            diags.root_error(
                "Invalid import ID",
                format!("Expected `<snapshot_id>/<check_id>`, got `{id}`."),
            );
            return None;
        };

        let state = CheckState {
            id: string_value(check_id),
            check_id: string_value(check_id),
            snapshot_id: string_value(snapshot_id),
            enabled: Value::Value(true),
            ..Default::default()
        };
        Some((state, Default::default()))
    }
}
