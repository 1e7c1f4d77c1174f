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
use base64::{engine::general_purpose::STANDARD, Engine as _};

use tf_provider::{AttributePath, DataSource, Diagnostics, schema::Schema, value::Value, value::ValueEmpty};

use crate::provider::ClientHandle;
use crate::utils::{ReportError, WithSchema};

use super::state::{SnapshotExportState, SnapshotsState};

#[derive(Debug, Default, Clone)]
pub struct SnapshotsDataSource {
    client: ClientHandle,
}

impl SnapshotsDataSource {
    pub fn new(client: ClientHandle) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DataSource for SnapshotsDataSource {
    type State<'a> = SnapshotsState<'a>;
    type ProviderMetaState<'a> = ValueEmpty;

    fn schema(&self, _diags: &mut Diagnostics) -> Option<Schema> {
        Some(SnapshotsState::schema())
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

        let snapshots = client
            .snapshots(
                state.network_id.as_str(),
                state.latest_processed.unwrap_or(false),
                state.metrics.unwrap_or(false),
            )
            .await
            .or_report_at(
                diags,
                "Failed to read snapshots",
                AttributePath::new("network_id"),
            )?;

        state.set_snapshots(snapshots);
        Some(state)
    }
}

#[derive(Debug, Default, Clone)]
pub struct SnapshotExportDataSource {
    client: ClientHandle,
}

impl SnapshotExportDataSource {
    pub fn new(client: ClientHandle) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DataSource for SnapshotExportDataSource {
    type State<'a> = SnapshotExportState<'a>;
    type ProviderMetaState<'a> = ValueEmpty;

    fn schema(&self, _diags: &mut Diagnostics) -> Option<Schema> {
        Some(SnapshotExportState::schema())
    }

    async fn validate<'a>(&self, diags: &mut Diagnostics, config: Self::State<'a>) -> Option<()> {
        for name in config.unknown_params() {
            diags.warning(
                "Unsupported export parameter",
                format!(
                    "`{name}` is not an export parameter and is ignored. Supported parameters are: {}.",
                    SnapshotExportState::PARAMS.join(", ")
                ),
                AttributePath::new("params").key(name.to_owned()),
            );
        }
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

        let data = client
            .export_snapshot(state.snapshot_id.as_str(), &state.export_params())
            .await
            .or_report_at(
                diags,
                "Failed to export snapshot",
                AttributePath::new("snapshot_id"),
            )?;

        tracing::debug!(snapshot_id = %state.snapshot_id.as_str(), bytes = data.len(), "snapshot exported");
        state.exported_snapshot = Value::Value(STANDARD.encode(data).into());
        Some(state)
    }
}
