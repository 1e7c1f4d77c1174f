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

//! Organization of the API user and version of the platform.

use serde::{Deserialize, Serialize};
use tf_provider::schema::{AttributeConstraint, AttributeType, Block, Description};
use tf_provider::value::ValueString;
use tf_provider::{map, schema::Schema};

use crate::client::{ForwardClient, Result};
use crate::utils::{attribute, WithSchema};

mod data_source;

pub use data_source::{OrgDataSource, VersionDataSource};

#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Organization {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Version {
    version: String,
}

impl ForwardClient {
    pub async fn current_org(&self) -> Result<Organization> {
        self.get("/api/orgs/current").send_json().await
    }

    pub async fn version(&self) -> Result<String> {
        let version: Version = self.get("/api/version").send_json().await?;
        Ok(version.version)
    }
}

/// `forwardnetworks_org_id`
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrgState<'a> {
    #[serde(borrow = "'a")]
    pub org_id: ValueString<'a>,
    #[serde(borrow = "'a")]
    pub org_name: ValueString<'a>,
}

impl<'a> WithSchema for OrgState<'a> {
    fn schema() -> Schema {
        Schema {
            version: 1,
            block: Block {
                description: Description::plain("Organization of the API user"),
                attributes: map! {
                    "org_id" => attribute(
                        AttributeType::String,
                        AttributeConstraint::Computed,
                        "The ID of the organization.",
                    ),
                    "org_name" => attribute(
                        AttributeType::String,
                        AttributeConstraint::Computed,
                        "The name of the organization.",
                    ),
                },
                ..Default::default()
            },
        }
    }
}

/// `forwardnetworks_version`
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionState<'a> {
    #[serde(borrow = "'a")]
    pub version: ValueString<'a>,
}

impl<'a> WithSchema for VersionState<'a> {
    fn schema() -> Schema {
        Schema {
            version: 1,
            block: Block {
                description: Description::plain("Version of the Forward Networks platform"),
                attributes: map! {
                    "version" => attribute(
                        AttributeType::String,
                        AttributeConstraint::Computed,
                        "The version.",
                    ),
                },
                ..Default::default()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payloads() {
        let org: Organization =
            serde_json::from_str(r#"{"id":"org-1","name":"Acme","plan":"ENTERPRISE"}"#).unwrap();
        assert_eq!(
            org,
            Organization {
                id: "org-1".into(),
                name: "Acme".into()
            }
        );

        let version: Version = serde_json::from_str(r#"{"version":"24.3.1-01"}"#).unwrap();
        assert_eq!(version.version, "24.3.1-01");
    }
}
