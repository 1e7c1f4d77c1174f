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
use crate::utils::{ReportError, WithSchema};

use super::state::ChecksState;

#[derive(Debug, Default, Clone)]
pub struct ChecksDataSource {
    client: ClientHandle,
}

impl ChecksDataSource {
    pub fn new(client: ClientHandle) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DataSource for ChecksDataSource {
    type State<'a> = ChecksState<'a>;
    type ProviderMetaState<'a> = ValueEmpty;

    fn schema(&self, _diags: &mut Diagnostics) -> Option<Schema> {
        Some(ChecksState::schema())
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

        let checks = client
            .checks(state.snapshot_id.as_str(), &state.filter())
            .await
            .or_report_at(
                diags,
                "Failed to read checks",
                AttributePath::new("snapshot_id"),
            )?;

        if let Err(check_id) = state.set_checks(checks) {
            diags.error(
                "Check not found",
                format!("No check found with ID: {check_id}"),
                AttributePath::new("check_id"),
            );
            return None;
        }
        Some(state)
    }
}
