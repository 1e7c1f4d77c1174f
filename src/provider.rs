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

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;

use tf_provider::DynamicDataSource;
use tf_provider::DynamicResource;
use tf_provider::{map, AttributePath, Diagnostics, Provider, schema::Schema, value::ValueEmpty};

use crate::check::{CheckResource, ChecksDataSource};
use crate::client::ForwardClient;
use crate::cloud::{
    AwsPolicyDataSource, CloudAccountResource, CloudAccountsDataSource, ExternalIdDataSource,
};
use crate::collection::{CollectionDataSource, CollectionResource, CollectionScheduleResource};
use crate::collector::CollectorResource;
use crate::config::{ClientSettings, ProviderConfig};
use crate::network::NetworkResource;
use crate::nqe::{NqeQueriesDataSource, NqeQueryExecutionDataSource};
use crate::org::{OrgDataSource, VersionDataSource};
use crate::proxy::{ProxyDataSource, ProxyResource};
use crate::snapshot::{SnapshotExportDataSource, SnapshotsDataSource};
use crate::utils::WithSchema;

/// API client shared by the provider and every resource and data source.
///
/// Resources are handed out before the provider is configured: they all
/// hold the same slot, filled once by `configure`.
#[derive(Debug, Default, Clone)]
pub struct ClientHandle(Arc<RwLock<Option<Arc<ForwardClient>>>>);

impl ClientHandle {
    pub fn set(&self, client: ForwardClient) {
        let mut slot = self.0.write().unwrap_or_else(PoisonError::into_inner);
        *slot = Some(Arc::new(client));
    }

    /// The configured client, or an error diagnostic
    pub fn get(&self, diags: &mut Diagnostics) -> Option<Arc<ForwardClient>> {
        let client = self
            .0
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        if client.is_none() {
            diags.root_error(
                "Unconfigured provider",
                "The Forward Networks API client is not configured yet.",
            );
        }
        client
    }
}

#[derive(Debug, Default, Clone)]
pub struct ForwardNetworksProvider {
    client: ClientHandle,
}

#[async_trait]
impl Provider for ForwardNetworksProvider {
    type Config<'a> = ProviderConfig<'a>;
    type MetaState<'a> = ValueEmpty;

    fn schema(&self, _diags: &mut Diagnostics) -> Option<Schema> {
        Some(ProviderConfig::schema())
    }

    async fn validate<'a>(&self, _diags: &mut Diagnostics, _config: Self::Config<'a>) -> Option<()> {
        Some(())
    }

    async fn configure<'a>(
        &self,
        diags: &mut Diagnostics,
        terraform_version: String,
        config: Self::Config<'a>,
    ) -> Option<()> {
        let settings = match ClientSettings::resolve(&config, |var| std::env::var(var).ok()) {
            Ok(settings) => settings,
            Err(errors) => {
                for error in errors {
                    diags.error(error.summary, error.detail, AttributePath::new(error.attribute));
                }
                return None;
            }
        };

        let client = match ForwardClient::new(&settings) {
            Ok(client) => client,
            Err(err) => {
                diags.root_error(
                    "Unable to Create Forward Networks API Client",
                    format!(
                        "An unexpected error occurred when creating the Forward Networks API client: {err}"
                    ),
                );
                return None;
            }
        };

        tracing::info!(
            host = %settings.host,
            username = %settings.username,
            insecure = settings.insecure,
            %terraform_version,
            "Forward Networks API client configured"
        );
        self.client.set(client);
        Some(())
    }

    fn get_resources(
        &self,
        _diags: &mut Diagnostics,
    ) -> Option<HashMap<String, Box<dyn DynamicResource>>> {
        let client = &self.client;
        Some(map! {
            "network" => NetworkResource::new(client.clone()),
            "collection" => CollectionResource::new(client.clone()),
            "collection_schedule" => CollectionScheduleResource::new(client.clone()),
            "cloud_account" => CloudAccountResource::new(client.clone()),
            "proxy" => ProxyResource::new(client.clone()),
            "collector" => CollectorResource::new(client.clone()),
            "check" => CheckResource::new(client.clone()),
        })
    }

    fn get_data_sources(
        &self,
        _diags: &mut Diagnostics,
    ) -> Option<HashMap<String, Box<dyn DynamicDataSource>>> {
        let client = &self.client;
        Some(map! {
            "version" => VersionDataSource::new(client.clone()),
            "org_id" => OrgDataSource::new(client.clone()),
            "external_id" => ExternalIdDataSource::new(client.clone()),
            "aws_policy" => AwsPolicyDataSource::new(client.clone()),
            "snapshots" => SnapshotsDataSource::new(client.clone()),
            "snapshot_export" => SnapshotExportDataSource::new(client.clone()),
            "checks" => ChecksDataSource::new(client.clone()),
            "cloud_accounts" => CloudAccountsDataSource::new(client.clone()),
            "nqe_queries" => NqeQueriesDataSource::new(client.clone()),
            "nqe_query_execution" => NqeQueryExecutionDataSource::new(client.clone()),
            "proxy" => ProxyDataSource::new(client.clone()),
            "collection" => CollectionDataSource::new(client.clone()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unconfigured_client_is_an_error() {
        let handle = ClientHandle::default();
        let mut diags = Diagnostics::default();
        assert!(handle.get(&mut diags).is_none());
        assert_eq!(diags.errors.len(), 1);
    }

    #[test]
    fn clones_share_the_configured_client() {
        let provider = ForwardNetworksProvider::default();
        let resource_handle = provider.client.clone();

        let settings = ClientSettings::resolve(
            &ProviderConfig::default(),
            |var| match var {
                crate::config::USERNAME_ENV => Some("alice".to_owned()),
                crate::config::PASSWORD_ENV => Some("secret".to_owned()),
                _ => None,
            },
        )
        .unwrap();
        provider.client.set(ForwardClient::new(&settings).unwrap());

        let mut diags = Diagnostics::default();
        let client = resource_handle.get(&mut diags).unwrap();
        assert_eq!(client.base_url(), crate::config::DEFAULT_HOST);
        assert!(diags.errors.is_empty());
    }

    #[test]
    fn every_resource_and_data_source_is_registered() {
        let provider = ForwardNetworksProvider::default();
        let mut diags = Diagnostics::default();

        let mut resources: Vec<_> = provider
            .get_resources(&mut diags)
            .unwrap()
            .into_keys()
            .collect();
        resources.sort();
        assert_eq!(
            resources,
            [
                "check",
                "cloud_account",
                "collection",
                "collection_schedule",
                "collector",
                "network",
                "proxy"
            ]
        );

        let data_sources = provider.get_data_sources(&mut diags).unwrap();
        assert_eq!(data_sources.len(), 12);
        assert!(data_sources.contains_key("snapshots"));
    }
}
