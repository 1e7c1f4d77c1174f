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

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tf_provider::schema::{AttributeConstraint, AttributeType, Block, Description};
use tf_provider::value::{Value, ValueList, ValueNumber, ValueString};
use tf_provider::{map, schema::Schema};

use crate::utils::{attribute, list_of, non_empty, option_of, string_value, WithSchema};

use super::{ColumnFilter, NqeQuery, NqeRequest, QueryOptions, SortBy};

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NqeQueryEntry<'a> {
    #[serde(borrow = "'a")]
    pub query_id: ValueString<'a>,
    #[serde(borrow = "'a")]
    pub path: ValueString<'a>,
    #[serde(borrow = "'a")]
    pub intent: ValueString<'a>,
    #[serde(borrow = "'a")]
    pub repository: ValueString<'a>,
}

impl<'a> From<NqeQuery> for NqeQueryEntry<'a> {
    fn from(query: NqeQuery) -> Self {
        Self {
            query_id: string_value(query.query_id),
            path: string_value(query.path),
            intent: string_value(query.intent),
            repository: string_value(query.repository),
        }
    }
}

/// `forwardnetworks_nqe_queries`
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NqeQueriesState<'a> {
    #[serde(borrow = "'a")]
    pub path: ValueString<'a>,
    #[serde(borrow = "'a")]
    pub query_id: ValueString<'a>,
    #[serde(borrow = "'a")]
    pub entries: ValueList<Value<NqeQueryEntry<'a>>>,
}

impl<'a> WithSchema for NqeQueriesState<'a> {
    fn schema() -> Schema {
        Schema {
            version: 1,
            block: Block {
                description: Description::plain("Queries of the NQE library"),
                attributes: map! {
                    "path" => attribute(
                        AttributeType::String,
                        AttributeConstraint::Optional,
                        "Only list the queries under this directory.",
                    ),
                    "query_id" => attribute(
                        AttributeType::String,
                        AttributeConstraint::Optional,
                        "Only return the query with this ID.",
                    ),
                    "entries" => attribute(
                        list_of(AttributeType::Object(map! {
                            "query_id" => AttributeType::String,
                            "path" => AttributeType::String,
                            "intent" => AttributeType::String,
                            "repository" => AttributeType::String,
                        })),
                        AttributeConstraint::Computed,
                        "The queries.",
                    ),
                },
                ..Default::default()
            },
        }
    }
}

impl<'a> NqeQueriesState<'a> {
    pub fn set_queries(&mut self, queries: Vec<NqeQuery>) {
        let query_id = non_empty(&self.query_id);
        self.entries = Value::Value(
            queries
                .into_iter()
                .filter(|query| query_id.as_ref().map_or(true, |id| *id == query.query_id))
                .map(|query| Value::Value(query.into()))
                .collect(),
        );
    }
}

/// `forwardnetworks_nqe_query_execution`
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NqeExecutionState<'a> {
    #[serde(borrow = "'a")]
    pub network_id: ValueString<'a>,
    #[serde(borrow = "'a")]
    pub snapshot_id: ValueString<'a>,
    #[serde(borrow = "'a")]
    pub query_id: ValueString<'a>,
    #[serde(borrow = "'a")]
    pub query: ValueString<'a>,
    pub offset: ValueNumber,
    pub limit: ValueNumber,
    #[serde(borrow = "'a")]
    pub sort_column_name: ValueString<'a>,
    #[serde(borrow = "'a")]
    pub sort_order: ValueString<'a>,
    #[serde(borrow = "'a")]
    pub filter_column_name: ValueString<'a>,
    #[serde(borrow = "'a")]
    pub filter_value: ValueString<'a>,
    #[serde(borrow = "'a")]
    pub parameters: ValueString<'a>,
    #[serde(borrow = "'a")]
    pub result: ValueString<'a>,
}

impl<'a> WithSchema for NqeExecutionState<'a> {
    fn schema() -> Schema {
        let optional = |attr_type, description| {
            attribute(attr_type, AttributeConstraint::Optional, description)
        };

        Schema {
            version: 1,
            block: Block {
                description: Description::plain("Result of an NQE query"),
                attributes: map! {
                    "network_id" => optional(
                        AttributeType::String,
                        "Run the query on the latest processed snapshot of this network.",
                    ),
                    "snapshot_id" => optional(
                        AttributeType::String,
                        "Run the query on this snapshot, instead of a network.",
                    ),
                    "query_id" => optional(AttributeType::String, "ID of a query of the library."),
                    "query" => optional(AttributeType::String, "Source of the query to run."),
                    "offset" => optional(AttributeType::Number, "Number of rows to skip."),
                    "limit" => optional(AttributeType::Number, "Maximum number of rows to return."),
                    "sort_column_name" => optional(AttributeType::String, "Column to sort the rows by."),
                    "sort_order" => optional(AttributeType::String, "Sort order: `ASC` or `DESC`."),
                    "filter_column_name" => optional(AttributeType::String, "Column to filter the rows on."),
                    "filter_value" => optional(AttributeType::String, "Value the filtered column must match."),
                    "parameters" => optional(
                        AttributeType::String,
                        "Parameters of the query, as a JSON object.",
                    ),
                    "result" => attribute(
                        AttributeType::String,
                        AttributeConstraint::Computed,
                        "The answer of the query, as JSON.",
                    ),
                },
                ..Default::default()
            },
        }
    }
}

impl<'a> NqeExecutionState<'a> {
    /// Build the execution request, failing on malformed parameters
    pub fn to_request(&self) -> serde_json::Result<NqeRequest> {
        let parameters = match non_empty(&self.parameters) {
            Some(parameters) => serde_json::from_str::<BTreeMap<String, serde_json::Value>>(&parameters)?,
            None => BTreeMap::new(),
        };

        // Sorting and filtering need both halves
        let sort_by = non_empty(&self.sort_column_name)
            .zip(non_empty(&self.sort_order))
            .map(|(column_name, order)| SortBy { column_name, order });
        let column_filters = non_empty(&self.filter_column_name)
            .zip(non_empty(&self.filter_value))
            .map(|(column_name, value)| ColumnFilter { column_name, value })
            .into_iter()
            .collect();

        Ok(NqeRequest {
            query: non_empty(&self.query).unwrap_or_default(),
            query_id: non_empty(&self.query_id).unwrap_or_default(),
            parameters,
            query_options: QueryOptions {
                offset: option_of(&self.offset).filter(|offset| *offset > 0),
                limit: option_of(&self.limit).filter(|limit| *limit > 0),
                sort_by,
                column_filters,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use std::borrow::Cow;

    use super::*;

    fn string(s: &'static str) -> ValueString<'static> {
        Value::Value(Cow::Borrowed(s))
    }

    #[test]
    fn execution_request() {
        let state = NqeExecutionState {
            network_id: string("net-1"),
            query_id: string("FQ_1"),
            offset: Value::Value(0),
            limit: Value::Value(50),
            sort_column_name: string("name"),
            sort_order: Value::Null,
            filter_column_name: string("vendor"),
            filter_value: string("CISCO"),
            parameters: string(r#"{"site": "paris", "max": 3}"#),
            ..Default::default()
        };

        let request = state.to_request().unwrap();
        assert_eq!(request.query_id, "FQ_1");
        assert_eq!(request.query_options.offset, None);
        assert_eq!(request.query_options.limit, Some(50));
        assert_eq!(request.query_options.sort_by, None);
        assert_eq!(
            request.query_options.column_filters,
            vec![ColumnFilter {
                column_name: "vendor".into(),
                value: "CISCO".into()
            }]
        );
        assert_eq!(request.parameters["max"], serde_json::json!(3));
    }

    #[test]
    fn malformed_parameters_are_rejected() {
        let state = NqeExecutionState {
            parameters: string("site=paris"),
            ..Default::default()
        };
        assert!(state.to_request().is_err());
    }

    #[test]
    fn queries_are_filtered_by_id() {
        let queries = vec![
            NqeQuery {
                query_id: "FQ_1".into(),
                path: "/L3/mtu".into(),
                ..Default::default()
            },
            NqeQuery {
                query_id: "FQ_2".into(),
                path: "/L3/bgp".into(),
                ..Default::default()
            },
        ];

        let mut state = NqeQueriesState {
            query_id: string("FQ_2"),
            ..Default::default()
        };
        state.set_queries(queries.clone());
        let entries = state.entries.as_ref_option().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].as_ref_option().unwrap().path.as_str(), "/L3/bgp");

        state.query_id = Value::Null;
        state.set_queries(queries);
        assert_eq!(state.entries.as_ref_option().map(Vec::len), Some(2));
    }
}
