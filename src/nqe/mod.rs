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

//! Network Query Engine: query library and query execution.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::client::{Error, ForwardClient, Result};

mod data_source;
mod state;

pub use data_source::{NqeQueriesDataSource, NqeQueryExecutionDataSource};

/// A query of the NQE library
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NqeQuery {
    pub query_id: String,
    pub path: String,
    pub intent: String,
    pub repository: String,
}

/// What a query runs against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NqeTarget<'a> {
    /// Latest processed snapshot of the network
    Network(&'a str),
    Snapshot(&'a str),
}

impl<'a> NqeTarget<'a> {
    /// Exactly one of the network and the snapshot must be given
    pub fn new(network_id: Option<&'a str>, snapshot_id: Option<&'a str>) -> Result<Self> {
        match (network_id, snapshot_id) {
            (Some(network_id), None) => Ok(NqeTarget::Network(network_id)),
            (None, Some(snapshot_id)) => Ok(NqeTarget::Snapshot(snapshot_id)),
            (Some(_), Some(_)) => Err(Error::InvalidArgument(
                "only one of networkId and snapshotId should be supplied".to_owned(),
            )),
            (None, None) => Err(Error::InvalidArgument(
                "either networkId or snapshotId must be supplied".to_owned(),
            )),
        }
    }

    fn query(self) -> (&'static str, &'a str) {
        match self {
            NqeTarget::Network(id) => ("networkId", id),
            NqeTarget::Snapshot(id) => ("snapshotId", id),
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NqeRequest {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub query: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub query_id: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub parameters: BTreeMap<String, serde_json::Value>,
    #[serde(skip_serializing_if = "QueryOptions::is_empty")]
    pub query_options: QueryOptions,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<SortBy>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub column_filters: Vec<ColumnFilter>,
}

impl QueryOptions {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SortBy {
    pub column_name: String,
    pub order: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnFilter {
    pub column_name: String,
    pub value: String,
}

impl ForwardClient {
    /// Queries of the library, optionally only those under `dir`
    pub async fn nqe_queries(&self, dir: Option<&str>) -> Result<Vec<NqeQuery>> {
        let mut request = self.get("/api/nqe/queries");
        if let Some(dir) = dir {
            request = request.query("dir", dir);
        }
        request.send_json().await
    }

    /// Run a query and return the raw JSON answer
    pub async fn execute_nqe(&self, target: NqeTarget<'_>, request: &NqeRequest) -> Result<Vec<u8>> {
        let (key, id) = target.query();
        self.post("/api/nqe")
            .query(key, id)
            .json(request)
            .send()
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_needs_exactly_one_id() {
        assert_eq!(
            NqeTarget::new(Some("net-1"), None).unwrap(),
            NqeTarget::Network("net-1")
        );
        assert_eq!(
            NqeTarget::new(None, Some("snap-1")).unwrap().query(),
            ("snapshotId", "snap-1")
        );
        assert!(matches!(
            NqeTarget::new(Some("net-1"), Some("snap-1")),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            NqeTarget::new(None, None),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn request_omits_empty_options() {
        let request = NqeRequest {
            query_id: "FQ_1".into(),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_string(&request).unwrap(),
            r#"{"queryId":"FQ_1"}"#
        );

        let request = NqeRequest {
            query: "foreach d in network.devices select {name: d.name}".into(),
            query_options: QueryOptions {
                limit: Some(10),
                sort_by: Some(SortBy {
                    column_name: "name".into(),
                    order: "ASC".into(),
                }),
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            serde_json::json!({
                "query": "foreach d in network.devices select {name: d.name}",
                "queryOptions": {"limit": 10, "sortBy": {"columnName": "name", "order": "ASC"}}
            })
        );
    }
}
