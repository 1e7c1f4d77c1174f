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

use serde::{Deserialize, Serialize};

use crate::client::{ForwardClient, Result};

mod data_source;
mod resource;
mod state;

pub use data_source::ProxyDataSource;
pub use resource::ProxyResource;

/// Proxy a network uses to reach its devices and cloud providers
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Proxy {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub host: String,
    pub port: i64,
    pub username: String,
    pub password: String,
    pub protocol: String,
    pub disable_cert_checking: bool,
}

impl ForwardClient {
    pub async fn proxy(&self, network_id: &str) -> Result<Proxy> {
        self.get(&format!("/api/networks/{network_id}/proxy"))
            .send_json()
            .await
    }

    /// Create or replace the proxy of a network
    pub async fn put_proxy(&self, network_id: &str, proxy: &Proxy) -> Result<()> {
        self.put(&format!("/api/networks/{network_id}/proxy"))
            .json(proxy)
            .send_empty()
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn proxy_payload() {
        let proxy: Proxy = serde_json::from_str(
            r#"{"id":"proxy-1","host":"proxy.example.com","port":8080,"protocol":"HTTPS","disableCertChecking":true}"#,
        )
        .unwrap();
        assert_eq!(proxy.port, 8080);
        assert!(proxy.disable_cert_checking);
        assert!(proxy.password.is_empty());

        let request = Proxy {
            id: String::new(),
            ..proxy
        };
        let body = serde_json::to_value(&request).unwrap();
        assert!(body.get("id").is_none());
        assert_eq!(body["disableCertChecking"], true);
    }
}
