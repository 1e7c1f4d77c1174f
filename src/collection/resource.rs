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

use crate::client::ForwardClient;
use crate::poll::{latest_processed, wait_for_processed_snapshot};
use crate::provider::ClientHandle;
use crate::utils::{string_value, ReportError, WithNormalize, WithSchema};

use super::state::CollectionState;

/// Null once the network lost its processed snapshots
type CollectionValue<'a> = Value<CollectionState<'a>>;

fn collection_of(value: CollectionValue<'_>) -> CollectionState<'_> {
    match value {
        Value::Value(state) => state,
        _ => Default::default(),
    }
}

#[derive(Debug, Default, Clone)]
pub struct CollectionResource {
    client: ClientHandle,
}

impl CollectionResource {
    pub fn new(client: ClientHandle) -> Self {
        Self { client }
    }
}

/// Optionally start a collection, then wait for a processed snapshot
async fn collect(
    diags: &mut Diagnostics,
    client: &ForwardClient,
    network_id: &str,
    previous_id: Option<&str>,
    start: bool,
) -> Option<String> {
    if start {
        client
            .start_collection(network_id)
            .await
            .or_report_at(
                diags,
                "Failed to start collection",
                AttributePath::new("network_id"),
            )?;
    }

    let snapshot = wait_for_processed_snapshot(client, network_id, previous_id, client.poll_policy())
        .await
        .or_report(diags, "Failed to get a processed snapshot")?;
    Some(snapshot.id)
}

#[async_trait]
impl Resource for CollectionResource {
    type State<'a> = CollectionValue<'a>;
    type PrivateState<'a> = ValueEmpty;
    type ProviderMetaState<'a> = ValueEmpty;

    fn schema(&self, _diags: &mut Diagnostics) -> Option<Schema> {
        Some(CollectionState::schema())
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
        let mut state = match state {
            Value::Value(state) => state,
            other => return Some((other, private_state)),
        };
        let client = self.client.get(diags)?;
        state.normalize(diags);
        let network_id = state.network_id.as_str().to_owned();

        let latest = latest_processed(client.as_ref(), &network_id)
            .await
            .or_report(diags, "Failed to read the latest processed snapshot")?;

        match state.refreshed(latest) {
            Some(state) => Some((Value::Value(state), private_state)),
            None => {
                tracing::warn!(
                    network_id = %network_id,
                    "no processed snapshot left, collection removed from state"
                );
                Some((Value::Null, private_state))
            }
        }
    }

    async fn plan_create<'a>(
        &self,
        diags: &mut Diagnostics,
        proposed_state: Self::State<'a>,
        _config_state: Self::State<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
        let mut state = collection_of(proposed_state);
        state.normalize(diags);
        state.id = Value::Unknown;
        Some((Value::Value(state), Default::default()))
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
        let prior_state = collection_of(prior_state);
        let mut state = collection_of(proposed_state);
        state.normalize(diags);

        let mut trigger_replace = Vec::new();
        if state.force_refresh != prior_state.force_refresh {
            trigger_replace.push(AttributePath::new("force_refresh"));
        }
        if state.network_id != prior_state.network_id {
            state.id = Value::Unknown;
        }

        Some((Value::Value(state), prior_private_state, trigger_replace))
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
        let mut state = collection_of(planned_state);
        state.normalize(diags);
        let network_id = state.network_id.as_str().to_owned();

        let before = latest_processed(client.as_ref(), &network_id)
            .await
            .or_report(diags, "Failed to read the latest processed snapshot")?
            .map(|snapshot| snapshot.id);

        // A network that already has a processed snapshot is only collected on demand
        let start = before.is_none() || state.force_refresh();
        let snapshot_id = collect(
            diags,
            client.as_ref(),
            &network_id,
            before.as_deref(),
            start,
        )
        .await?;

        state.id = string_value(snapshot_id);
        Some((Value::Value(state), private_state))
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
        let prior_state = collection_of(prior_state);
        let mut state = collection_of(planned_state);
        state.normalize(diags);
        let network_id = state.network_id.as_str().to_owned();

        let snapshot_id = collect(
            diags,
            client.as_ref(),
            &network_id,
            prior_state.id.as_ref_option().map(|id| id.as_ref()),
            state.force_refresh(),
        )
        .await?;

        state.id = string_value(snapshot_id);
        Some((Value::Value(state), private_state))
    }

    async fn destroy<'a>(
        &self,
        _diags: &mut Diagnostics,
        state: Self::State<'a>,
        _planned_private_state: Self::PrivateState<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<()> {
        tracing::debug!(
            network_id = %state.as_ref_option().map_or("", |state| state.network_id.as_str()),
            "collection removed from state, snapshots are kept"
        );
        Some(())
    }

    async fn import<'a>(
        &self,
        _diags: &mut Diagnostics,
        id: String,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
        // Imported by network, the snapshot is filled by the next read
        let state = CollectionState {
            network_id: string_value(id),
            force_refresh: Value::Value(false),
            ..Default::default()
        };
        Some((Value::Value(state), Default::default()))
    }
}
