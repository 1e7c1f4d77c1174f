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

use tf_provider::{AttributePath, DataSource, Diagnostics, schema::Schema, value::ValueEmpty};

use crate::provider::ClientHandle;
use crate::utils::{string_value, ReportError, WithSchema};

use super::state::{AwsPolicyState, CloudAccountsState, ExternalIdState};

#[derive(Debug, Default, Clone)]
pub struct CloudAccountsDataSource {
    client: ClientHandle,
}

impl CloudAccountsDataSource {
    pub fn new(client: ClientHandle) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DataSource for CloudAccountsDataSource {
    type State<'a> = CloudAccountsState<'a>;
    type ProviderMetaState<'a> = ValueEmpty;

    fn schema(&self, _diags: &mut Diagnostics) -> Option<Schema> {
        Some(CloudAccountsState::schema())
    }

    async fn validate<'a>(&self, _diags: &mut Diagnostics, _config: Self::State<'a>) -> Option<()> {
        Some(())
    }

    async fn read<'a>(
        &self,
        diags: &mut Diagnostics,
        config: Self::State<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<Self::State<'a>> {
        let client = self.client.get(diags)?;
        let mut state = config;

        let accounts = client
            .cloud_account_summaries(state.network_id.as_str())
            .await
            .or_report_at(
                diags,
                "Failed to read cloud accounts",
                AttributePath::new("network_id"),
            )?;

        state.set_accounts(accounts);
        Some(state)
    }
}

#[derive(Debug, Default, Clone)]
pub struct ExternalIdDataSource {
    client: ClientHandle,
}

impl ExternalIdDataSource {
    pub fn new(client: ClientHandle) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DataSource for ExternalIdDataSource {
    type State<'a> = ExternalIdState<'a>;
    type ProviderMetaState<'a> = ValueEmpty;

    fn schema(&self, _diags: &mut Diagnostics) -> Option<Schema> {
        Some(ExternalIdState::schema())
    }

    async fn validate<'a>(&self, _diags: &mut Diagnostics, _config: Self::State<'a>) -> Option<()> {
        Some(())
    }

    async fn read<'a>(
        &self,
        diags: &mut Diagnostics,
        config: Self::State<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<Self::State<'a>> {
        let client = self.client.get(diags)?;
        let mut state = config;

        let external_id = client
            .aws_external_id(state.network_id.as_str())
            .await
            .or_report_at(
                diags,
                "Failed to read the AWS external ID",
                AttributePath::new("network_id"),
            )?;

        state.external_id = string_value(external_id);
        Some(state)
    }
}

#[derive(Debug, Default, Clone)]
pub struct AwsPolicyDataSource {
    client: ClientHandle,
}

impl AwsPolicyDataSource {
    pub fn new(client: ClientHandle) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DataSource for AwsPolicyDataSource {
    type State<'a> = AwsPolicyState<'a>;
    type ProviderMetaState<'a> = ValueEmpty;

    fn schema(&self, _diags: &mut Diagnostics) -> Option<Schema> {
        Some(AwsPolicyState::schema())
    }

    async fn validate<'a>(&self, _diags: &mut Diagnostics, _config: Self::State<'a>) -> Option<()> {
        Some(())
    }

    async fn read<'a>(
        &self,
        diags: &mut Diagnostics,
        config: Self::State<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<Self::State<'a>> {
        let client = self.client.get(diags)?;
        let mut state = config;

        let policy = client
            .aws_policy()
            .await
            .or_report(diags, "Failed to read the AWS policy")?;
        let policy = serde_json::to_string(&policy)
            .or_report(diags, "Failed to encode the AWS policy")?;

        state.aws_policy = string_value(policy);
        Some(state)
    }
}
