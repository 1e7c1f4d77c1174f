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
use crate::utils::{non_empty, string_value, ReportError, WithSchema};

use super::state::{NqeExecutionState, NqeQueriesState};
use super::NqeTarget;

#[derive(Debug, Default, Clone)]
pub struct NqeQueriesDataSource {
    client: ClientHandle,
}

impl NqeQueriesDataSource {
    pub fn new(client: ClientHandle) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DataSource for NqeQueriesDataSource {
    type State<'a> = NqeQueriesState<'a>;
    type ProviderMetaState<'a> = ValueEmpty;

    fn schema(&self, _diags: &mut Diagnostics) -> Option<Schema> {
        Some(NqeQueriesState::schema())
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

        let queries = client
            .nqe_queries(non_empty(&state.path).as_deref())
            .await
            .or_report(diags, "Failed to read NQE queries")?;

        state.set_queries(queries);
        Some(state)
    }
}

#[derive(Debug, Default, Clone)]
pub struct NqeQueryExecutionDataSource {
    client: ClientHandle,
}

impl NqeQueryExecutionDataSource {
    pub fn new(client: ClientHandle) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DataSource for NqeQueryExecutionDataSource {
    type State<'a> = NqeExecutionState<'a>;
    type ProviderMetaState<'a> = ValueEmpty;

    fn schema(&self, _diags: &mut Diagnostics) -> Option<Schema> {
        Some(NqeExecutionState::schema())
    }

    async fn validate<'a>(&self, diags: &mut Diagnostics, config: Self::State<'a>) -> Option<()> {
        if config.query.is_null() && config.query_id.is_null() {
            diags.root_error(
                "Missing NQE query",
                "Either `query` or `query_id` must be set.",
            );
            return None;
        }
        if config.parameters.is_unknown() {
            return Some(());
        }
        config
            .to_request()
            .or_report_at(
                diags,
                "Invalid NQE parameters",
                AttributePath::new("parameters"),
            )
            .map(|_| ())
    }

    async fn read<'a>(
        &self,
        diags: &mut Diagnostics,
        config: Self::State<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<Self::State<'a>> {
        let client = self.client.get(diags)?;
        let mut state = config;

        let network_id = non_empty(&state.network_id);
        let snapshot_id = non_empty(&state.snapshot_id);
        let target = NqeTarget::new(network_id.as_deref(), snapshot_id.as_deref())
            .or_report(diags, "Invalid NQE target")?;
        let request = state.to_request().or_report_at(
            diags,
            "Invalid NQE parameters",
            AttributePath::new("parameters"),
        )?;

        let result = client
            .execute_nqe(target, &request)
            .await
            .or_report(diags, "Failed to execute NQE query")?;

        state.result = string_value(String::from_utf8_lossy(&result));
        Some(state)
    }
}
