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

use tf_provider::{DataSource, Diagnostics, schema::Schema, value::ValueEmpty};

use crate::provider::ClientHandle;
use crate::utils::{string_value, ReportError, WithSchema};

use super::{OrgState, VersionState};

#[derive(Debug, Default, Clone)]
pub struct OrgDataSource {
    client: ClientHandle,
}

impl OrgDataSource {
    pub fn new(client: ClientHandle) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DataSource for OrgDataSource {
    type State<'a> = OrgState<'a>;
    type ProviderMetaState<'a> = ValueEmpty;

    fn schema(&self, _diags: &mut Diagnostics) -> Option<Schema> {
        Some(OrgState::schema())
    }

    async fn validate<'a>(&self, _diags: &mut Diagnostics, _config: Self::State<'a>) -> Option<()> {
        Some(())
    }

    async fn read<'a>(
        &self,
        diags: &mut Diagnostics,
        _config: Self::State<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<Self::State<'a>> {
        let client = self.client.get(diags)?;

        let org = client
            .current_org()
            .await
            .or_report(diags, "Failed to read the organization")?;

        Some(OrgState {
            org_id: string_value(org.id),
            org_name: string_value(org.name),
        })
    }
}

#[derive(Debug, Default, Clone)]
pub struct VersionDataSource {
    client: ClientHandle,
}

impl VersionDataSource {
    pub fn new(client: ClientHandle) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DataSource for VersionDataSource {
    type State<'a> = VersionState<'a>;
    type ProviderMetaState<'a> = ValueEmpty;

    fn schema(&self, _diags: &mut Diagnostics) -> Option<Schema> {
        Some(VersionState::schema())
    }

    async fn validate<'a>(&self, _diags: &mut Diagnostics, _config: Self::State<'a>) -> Option<()> {
        Some(())
    }

    async fn read<'a>(
        &self,
        diags: &mut Diagnostics,
        _config: Self::State<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<Self::State<'a>> {
        let client = self.client.get(diags)?;

        let version = client
            .version()
            .await
            .or_report(diags, "Failed to read the version")?;

        Some(VersionState {
            version: string_value(version),
        })
    }
}
