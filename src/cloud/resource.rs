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
use crate::provider::ClientHandle;
use crate::utils::{now_millis, string_value, ReportError, WithNormalize, WithSchema};

use super::state::CloudAccountState;
use super::{CloudAccount, CloudType};

#[derive(Debug, Default, Clone)]
pub struct CloudAccountResource {
    client: ClientHandle,
}

impl CloudAccountResource {
    pub fn new(client: ClientHandle) -> Self {
        Self { client }
    }
}

fn request(diags: &mut Diagnostics, state: &CloudAccountState<'_>) -> Option<CloudAccount> {
    let account = state.to_request(now_millis());
    if account.is_none() {
        diags.error(
            "Invalid account type",
            format!("Invalid account type: {}", state.account_type.as_str()),
            AttributePath::new("type"),
        );
    }
    account
}

/// Fetch the account as stored by the API into the state
async fn refresh(
    diags: &mut Diagnostics,
    client: &ForwardClient,
    state: &mut CloudAccountState<'_>,
) -> Option<()> {
    let name = state.name.as_str().to_owned();
    let account = client
        .cloud_account(state.network_id.as_str(), &name)
        .await
        .or_report(diags, "Failed to read cloud account")?;

    let Some(account) = account else {
        diags.error(
            "Cloud account not found",
            format!("Unable to find a cloud account with name {name}"),
            AttributePath::new("name"),
        );
        return None;
    };
    state.apply(account);
    Some(())
}

#[async_trait]
impl Resource for CloudAccountResource {
    type State<'a> = CloudAccountState<'a>;
    type PrivateState<'a> = ValueEmpty;
    type ProviderMetaState<'a> = ValueEmpty;

    fn schema(&self, _diags: &mut Diagnostics) -> Option<Schema> {
        Some(CloudAccountState::schema())
    }

    async fn validate<'a>(&self, diags: &mut Diagnostics, config: Self::State<'a>) -> Option<()> {
        config.check(diags);
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
        let mut state = state;
        refresh(diags, &client, &mut state).await?;
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
        state.id = state.name.clone();
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
        if state.network_id != prior_state.network_id {
            trigger_replace.push(AttributePath::new("network_id"));
        }
        if state.name != prior_state.name {
            trigger_replace.push(AttributePath::new("name"));
        }
        if state.account_type != prior_state.account_type {
            trigger_replace.push(AttributePath::new("type"));
        }
        state.id = state.name.clone();

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
        let client = self.client.get(diags)?;
        let mut state = planned_state;
        let account = request(diags, &state)?;

        client
            .create_cloud_account(state.network_id.as_str(), &account)
            .await
            .or_report(diags, "Failed to create cloud account")?;
        tracing::info!(
            network_id = %state.network_id.as_str(),
            name = %account.name,
            "cloud account created"
        );

        refresh(diags, &client, &mut state).await?;
        Some((state, private_state))
    }

    async fn update<'a>(
        &self,
        diags: &mut Diagnostics,
        _prior_state: Self::State<'a>,
        planned_state: Self::State<'a>,
        _config_state: Self::State<'a>,
        private_state: Self::PrivateState<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
        let client = self.client.get(diags)?;
        let mut state = planned_state;
        let account = request(diags, &state)?;
        let network_id = state.network_id.as_str().to_owned();
        let name = state.name.as_str().to_owned();

        match state.cloud_type() {
            Some(CloudType::Aws) => client
                .update_cloud_account(&network_id, &name, &account)
                .await
                .or_report(diags, "Failed to update cloud account")?,
            // Azure and GCP credentials cannot be patched
            _ => {
                client
                    .delete_cloud_account(&network_id, &name)
                    .await
                    .or_report(diags, "Failed to replace cloud account")?;
                client
                    .create_cloud_account(&network_id, &account)
                    .await
                    .or_report(diags, "Failed to replace cloud account")?;
            }
        }

        refresh(diags, &client, &mut state).await?;
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
            .delete_cloud_account(state.network_id.as_str(), state.name.as_str())
            .await
            .or_report(diags, "Failed to delete cloud account")
    }

    async fn import<'a>(
        &self,
        diags: &mut Diagnostics,
        id: String,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
        let Some((network_id, name)) = id.split_once('/') else {
            diags.root_error(
                "Invalid import ID",
                format!("Expected `<network_id>/<account_name>`, got `{id}`."),
            );
            return None;
        };

        let state = CloudAccountState {
            id: string_value(name),
            network_id: string_value(network_id),
            name: string_value(name),
            account_type: Value::Null,
            ..Default::default()
        };
        Some((state, Default::default()))
    }
}
