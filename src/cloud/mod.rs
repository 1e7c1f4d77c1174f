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

//! Cloud accounts collected by a network, and the AWS onboarding helpers.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::client::{ForwardClient, Result};

mod data_source;
mod resource;
mod state;

pub use data_source::{AwsPolicyDataSource, CloudAccountsDataSource, ExternalIdDataSource};
pub use resource::CloudAccountResource;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloudType {
    Aws,
    Azure,
    Gcp,
}

impl CloudType {
    pub const ALL: [CloudType; 3] = [CloudType::Aws, CloudType::Azure, CloudType::Gcp];

    pub fn as_str(self) -> &'static str {
        match self {
            CloudType::Aws => "AWS",
            CloudType::Azure => "AZURE",
            CloudType::Gcp => "GCP",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == name)
    }
}

impl std::fmt::Display for CloudType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A cloud account of a network, as sent to and received from the API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudAccount {
    pub name: String,
    #[serde(default)]
    pub collect: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub proxy_server_id: String,
    #[serde(flatten)]
    pub credentials: Credentials,
}

/// Provider specific part of a cloud account, keyed on `type`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Credentials {
    #[serde(rename = "AWS", rename_all = "camelCase")]
    Aws {
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        assume_role_infos: Vec<AssumeRoleInfo>,
        #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
        regions: BTreeMap<String, RegionTest>,
        /// IAM user, when the account does not assume roles
        #[serde(default, skip_serializing_if = "String::is_empty")]
        username: String,
        #[serde(default, rename = "password", skip_serializing_if = "String::is_empty")]
        secret: String,
    },
    #[serde(rename = "AZURE")]
    Azure {
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        subscriptions: Vec<Subscription>,
    },
    #[serde(rename = "GCP", rename_all = "camelCase")]
    Gcp {
        #[serde(default, skip_serializing_if = "String::is_empty")]
        client_id: String,
        #[serde(default, skip_serializing_if = "String::is_empty")]
        client_email: String,
        #[serde(default, skip_serializing_if = "String::is_empty")]
        private_key_id: String,
        #[serde(default, skip_serializing_if = "String::is_empty")]
        private_key: String,
        #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
        regions: BTreeMap<String, RegionTest>,
    },
    /// Account types this provider does not manage
    #[serde(other)]
    Unsupported,
}

impl Credentials {
    pub fn cloud_type(&self) -> Option<CloudType> {
        match self {
            Credentials::Aws { .. } => Some(CloudType::Aws),
            Credentials::Azure { .. } => Some(CloudType::Azure),
            Credentials::Gcp { .. } => Some(CloudType::Gcp),
            Credentials::Unsupported => None,
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssumeRoleInfo {
    #[serde(default)]
    pub account_id: String,
    #[serde(default)]
    pub account_name: String,
    #[serde(default)]
    pub role_arn: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub external_id: String,
    #[serde(default)]
    pub enabled: bool,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    #[serde(default)]
    pub subscription_id: String,
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub tenant: String,
    #[serde(default)]
    pub secret: String,
    #[serde(default)]
    pub environment: String,
    #[serde(default)]
    pub test_instant: i64,
    #[serde(default)]
    pub enabled: bool,
}

/// Last connectivity test of a region.
///
/// Requests carry the instant directly, answers wrap it in an object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RegionTest {
    Instant(i64),
    Tested {
        #[serde(rename = "testInstant", default)]
        test_instant: i64,
    },
    Other(serde_json::Value),
}

impl RegionTest {
    pub fn instant(&self) -> Option<i64> {
        match self {
            RegionTest::Instant(instant) => Some(*instant),
            RegionTest::Tested { test_instant } => Some(*test_instant),
            RegionTest::Other(_) => None,
        }
    }
}

/// Subscription credentials of an Azure account
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
pub struct CloudCredential {
    #[serde(default)]
    pub subscriptions: Vec<Subscription>,
}

/// Loosely typed view of a cloud account, for listings
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudAccountSummary {
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "type")]
    pub account_type: String,
    #[serde(default)]
    pub collect: bool,
    #[serde(default)]
    pub num_virtualized_devices: Option<i64>,
    #[serde(default)]
    pub regions: Option<serde_json::Value>,
    #[serde(default)]
    pub assume_role_infos: Option<serde_json::Value>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AwsPolicy {
    #[serde(rename = "Version", default)]
    pub version: String,
    #[serde(rename = "Statement", default)]
    pub statement: Vec<PolicyStatement>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyStatement {
    #[serde(rename = "Effect", default)]
    pub effect: String,
    #[serde(rename = "Action", default)]
    pub action: Vec<String>,
    #[serde(rename = "Resource", default)]
    pub resource: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExternalId {
    #[serde(default)]
    external_id: String,
}

/// Complete subscriptions with the client ID and tenant of their credential
fn fill_subscriptions(subscriptions: &mut [Subscription], credentials: &[Subscription]) {
    for subscription in subscriptions {
        if let Some(credential) = credentials
            .iter()
            .find(|credential| credential.subscription_id == subscription.subscription_id)
        {
            subscription.client_id.clone_from(&credential.client_id);
            subscription.tenant.clone_from(&credential.tenant);
        }
    }
}

impl ForwardClient {
    pub async fn cloud_accounts(&self, network_id: &str) -> Result<Vec<CloudAccount>> {
        self.get(&format!("/api/networks/{network_id}/cloudAccounts"))
            .send_json()
            .await
    }

    pub async fn cloud_account_summaries(&self, network_id: &str) -> Result<Vec<CloudAccountSummary>> {
        self.get(&format!("/api/networks/{network_id}/cloudAccounts"))
            .send_json()
            .await
    }

    /// Find an account by name, Azure accounts being completed with their
    /// credential
    pub async fn cloud_account(&self, network_id: &str, name: &str) -> Result<Option<CloudAccount>> {
        let Some(mut account) = self
            .cloud_accounts(network_id)
            .await?
            .into_iter()
            .find(|account| account.name == name)
        else {
            return Ok(None);
        };

        if let Credentials::Azure { subscriptions } = &mut account.credentials {
            let credential = self.cloud_account_credential(network_id, name).await?;
            fill_subscriptions(subscriptions, &credential.subscriptions);
        }

        Ok(Some(account))
    }

    pub async fn cloud_account_credential(
        &self,
        network_id: &str,
        name: &str,
    ) -> Result<CloudCredential> {
        self.get(&format!(
            "/api/networks/{network_id}/cloudAccounts/{name}/credential"
        ))
        .send_json()
        .await
    }

    pub async fn create_cloud_account(&self, network_id: &str, account: &CloudAccount) -> Result<()> {
        self.post(&format!("/api/networks/{network_id}/cloudAccounts"))
            .json(account)
            .send_empty()
            .await
    }

    pub async fn update_cloud_account(
        &self,
        network_id: &str,
        name: &str,
        account: &CloudAccount,
    ) -> Result<()> {
        self.patch(&format!("/api/networks/{network_id}/cloudAccounts/{name}"))
            .json(account)
            .send_empty()
            .await
    }

    pub async fn delete_cloud_account(&self, network_id: &str, name: &str) -> Result<()> {
        self.delete(&format!("/api/networks/{network_id}/cloudAccounts/{name}"))
            .send_empty()
            .await
    }

    /// External ID to put in the trust policy of the AWS roles to assume
    pub async fn aws_external_id(&self, network_id: &str) -> Result<String> {
        let external_id: ExternalId = self
            .get(&format!(
                "/api/networks/{network_id}/cloudAccounts/aws/assumeRole/externalId"
            ))
            .send_json()
            .await?;
        Ok(external_id.external_id)
    }

    /// Permissions the AWS roles need for the collection
    pub async fn aws_policy(&self) -> Result<AwsPolicy> {
        self.get("/api/cloud/aws-policy").send_json().await
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn accounts_are_tagged_by_type() {
        let accounts: Vec<CloudAccount> = serde_json::from_value(json!([
            {
                "name": "aws-prod",
                "type": "AWS",
                "collect": true,
                "assumeRoleInfos": [{"accountId": "123", "accountName": "prod", "roleArn": "arn:aws:iam::123:role/fwd", "enabled": true}],
                "regions": {"us-east-1": {"testInstant": 1700000000000i64}}
            },
            {
                "name": "azure-lab",
                "type": "AZURE",
                "subscriptions": [{"subscriptionId": "sub-1", "environment": "AZURE", "enabled": true}]
            },
            {"name": "gcp", "type": "GCP", "clientEmail": "fwd@project.iam.gserviceaccount.com"},
            {"name": "vsphere", "type": "VCENTER", "host": "vc.example.com"}
        ]))
        .unwrap();

        let types: Vec<_> = accounts.iter().map(|a| a.credentials.cloud_type()).collect();
        assert_eq!(
            types,
            [
                Some(CloudType::Aws),
                Some(CloudType::Azure),
                Some(CloudType::Gcp),
                None
            ]
        );

        match &accounts[0].credentials {
            Credentials::Aws { regions, .. } => {
                assert_eq!(regions["us-east-1"].instant(), Some(1700000000000));
            }
            other => panic!("unexpected credentials {other:?}"),
        }
        assert!(!accounts[1].collect);
    }

    #[test]
    fn requests_carry_the_type_and_raw_instants() {
        let account = CloudAccount {
            name: "aws-prod".into(),
            collect: true,
            proxy_server_id: String::new(),
            credentials: Credentials::Aws {
                assume_role_infos: vec![],
                regions: BTreeMap::from([("eu-west-3".to_owned(), RegionTest::Instant(42))]),
                username: "fwd".into(),
                secret: "s3cr3t".into(),
            },
        };

        assert_eq!(
            serde_json::to_value(&account).unwrap(),
            json!({
                "name": "aws-prod",
                "collect": true,
                "type": "AWS",
                "regions": {"eu-west-3": 42},
                "username": "fwd",
                "password": "s3cr3t",
            })
        );
    }

    #[test]
    fn subscriptions_are_completed_by_id() {
        let mut subscriptions = vec![
            Subscription {
                subscription_id: "sub-2".into(),
                ..Default::default()
            },
            Subscription {
                subscription_id: "sub-1".into(),
                ..Default::default()
            },
        ];
        let credentials = [Subscription {
            subscription_id: "sub-1".into(),
            client_id: "client".into(),
            tenant: "tenant".into(),
            ..Default::default()
        }];

        fill_subscriptions(&mut subscriptions, &credentials);

        assert_eq!(subscriptions[0].client_id, "");
        assert_eq!(subscriptions[1].client_id, "client");
        assert_eq!(subscriptions[1].tenant, "tenant");
    }

    #[test]
    fn aws_policy_document() {
        let policy: AwsPolicy = serde_json::from_str(
            r#"{"Version":"2012-10-17","Statement":[{"Effect":"Allow","Action":["ec2:Describe*"],"Resource":"*"}]}"#,
        )
        .unwrap();
        assert_eq!(policy.statement[0].action, vec!["ec2:Describe*".to_owned()]);
        assert_eq!(
            serde_json::to_string(&policy).unwrap(),
            r#"{"Version":"2012-10-17","Statement":[{"Effect":"Allow","Action":["ec2:Describe*"],"Resource":"*"}]}"#
        );
    }
}
