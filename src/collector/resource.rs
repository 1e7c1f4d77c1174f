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
use serde::{Deserialize, Serialize};

use tf_provider::schema::{AttributeConstraint, AttributeType, Block, Description};
use tf_provider::value::{Value, ValueEmpty, ValueString};
use tf_provider::{map, schema::Schema, AttributePath, Diagnostics, Resource};

use crate::client::ForwardClient;
use crate::provider::ClientHandle;
use crate::utils::{attribute, string_value, ReportError, WithSchema};

use super::Collector;

/// `forwardnetworks_collector`
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectorState<'a> {
    #[serde(borrow = "'a")]
    pub id: ValueString<'a>,
    #[serde(borrow = "'a")]
    pub network_id: ValueString<'a>,
    #[serde(borrow = "'a")]
    pub collector_name: ValueString<'a>,
    #[serde(borrow = "'a")]
    pub collector_username: ValueString<'a>,
}

impl<'a> WithSchema for CollectorState<'a> {
    fn schema() -> Schema {
        Schema {
            version: 1,
            block: Block {
                description: Description::plain("Assigns a collector to a network."),
                attributes: map! {
                    "id" => attribute(
                        AttributeType::String,
                        AttributeConstraint::Computed,
                        "Identifier of the assignment, the collector name.",
                    ),
                    "network_id" => attribute(
                        AttributeType::String,
                        AttributeConstraint::Required,
                        "The ID of the network to which the collector belongs.",
                    ),
                    "collector_name" => attribute(
                        AttributeType::String,
                        AttributeConstraint::Required,
                        "The name of the collector.",
                    ),
                    "collector_username" => attribute(
                        AttributeType::String,
                        AttributeConstraint::Computed,
                        "The username associated with the collector.",
                    ),
                },
                ..Default::default()
            },
        }
    }
}

impl<'a> CollectorState<'a> {
    fn apply(&mut self, collector: Collector) {
        self.id = string_value(collector.collector_name.clone());
        self.collector_name = string_value(collector.collector_name);
        self.collector_username = string_value(collector.username);
    }
}

#[derive(Debug, Default, Clone)]
pub struct CollectorResource {
    client: ClientHandle,
}

impl CollectorResource {
    pub fn new(client: ClientHandle) -> Self {
        Self { client }
    }
}

async fn find(diags: &mut Diagnostics, client: &ForwardClient, name: &str) -> Option<Collector> {
    let collector = client
        .collector_by_name(name)
        .await
        .or_report(diags, "Failed to read collectors")?;

    if collector.is_none() {
        diags.error(
            "Collector not found",
            format!("collector with name {name:?} not found"),
            AttributePath::new("collector_name"),
        );
    }
    collector
}

/// Look the collector up and assign its user to the network
async fn assign<'a>(
    diags: &mut Diagnostics,
    client: &ForwardClient,
    planned_state: CollectorState<'a>,
) -> Option<CollectorState<'a>> {
    let mut state = planned_state;
    let collector = find(diags, client, state.collector_name.as_str()).await?;

    client
        .assign_collector(state.network_id.as_str(), &collector.username)
        .await
        .or_report(diags, "Failed to assign collector")?;
    tracing::info!(
        network_id = %state.network_id.as_str(),
        collector = %collector.collector_name,
        "collector assigned"
    );

    state.apply(collector);
    Some(state)
}

#[async_trait]
impl Resource for CollectorResource {
    type State<'a> = CollectorState<'a>;
    type PrivateState<'a> = ValueEmpty;
    type ProviderMetaState<'a> = ValueEmpty;

    fn schema(&self, _diags: &mut Diagnostics) -> Option<Schema> {
        Some(CollectorState::schema())
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
        let client = self.client.get(diags)?;
        let collector = find(diags, &client, state.collector_name.as_str()).await?;

        let mut state = state;
        state.apply(collector);
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
        state.id = state.collector_name.clone();
        state.collector_username = Value::Unknown;
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
        let mut state = proposed_state;
        let mut trigger_replace = Vec::new();
        if state.network_id != prior_state.network_id {
            trigger_replace.push(AttributePath::new("network_id"));
        }
        if state.collector_name != prior_state.collector_name {
            state.id = state.collector_name.clone();
            state.collector_username = Value::Unknown;
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
        let client = self.client.get(diags)?;
        let state = assign(diags, &client, planned_state).await?;
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
        let state = assign(diags, &client, planned_state).await?;
        Some((state, private_state))
    }

    async fn destroy<'a>(
        &self,
        diags: &mut Diagnostics,
        state: Self::State<'a>,
        _planned_private_state: Self::PrivateState<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<()> {
        tracing::warn!(
            network_id = %state.network_id.as_str(),
            collector = %state.collector_name.as_str(),
            "collectors cannot be unassigned"
        );
        diags.root_warning(
            "Collector not unassigned",
            "The Forward Networks API cannot unassign a collector: it is only removed from the Terraform state.",
        );
        Some(())
    }

    async fn import<'a>(
        &self,
        diags: &mut Diagnostics,
        id: String,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
        let Some((network_id, name)) = id.split_once('/') else {
            diags.root_error(
                "Invalid import ID",
                format!("Expected `<network_id>/<collector_name>`, got `{id}`."),
            );
            return None;
        };

        let state = CollectorState {
            id: string_value(name),
            network_id: string_value(network_id),
            collector_name: string_value(name),
            collector_username: Value::Null,
        };
        Some((state, Default::default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collector_fills_the_state() {
        let mut state = CollectorState {
            network_id: string_value("net-1"),
            collector_name: string_value("dc1"),
            collector_username: Value::Unknown,
            ..Default::default()
        };
        state.apply(Collector {
            collector_name: "dc1".into(),
            username: "collector-dc1".into(),
            ..Default::default()
        });

        assert_eq!(state.id.as_str(), "dc1");
        assert_eq!(state.collector_username.as_str(), "collector-dc1");
        assert_eq!(state.network_id.as_str(), "net-1");
    }
}
