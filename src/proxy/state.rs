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
use tf_provider::schema::{AttributeConstraint, AttributeType, Block, Description};
use tf_provider::value::{Value, ValueBool, ValueNumber, ValueString};
use tf_provider::{map, schema::Schema};

use crate::utils::{answered_string, attribute, non_empty, sensitive, string_value, WithSchema};

use super::Proxy;

/// `forwardnetworks_proxy`
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyState<'a> {
    #[serde(borrow = "'a")]
    pub id: ValueString<'a>,
    #[serde(borrow = "'a")]
    pub network_id: ValueString<'a>,
    #[serde(borrow = "'a")]
    pub protocol: ValueString<'a>,
    #[serde(borrow = "'a")]
    pub host: ValueString<'a>,
    pub port: ValueNumber,
    #[serde(borrow = "'a")]
    pub username: ValueString<'a>,
    #[serde(borrow = "'a")]
    pub password: ValueString<'a>,
    pub disable_cert_checking: ValueBool,
}

impl<'a> WithSchema for ProxyState<'a> {
    fn schema() -> Schema {
        let required = |attr_type, description| {
            attribute(attr_type, AttributeConstraint::Required, description)
        };
        let optional = |attr_type, description| {
            attribute(attr_type, AttributeConstraint::Optional, description)
        };

        Schema {
            version: 1,
            block: Block {
                description: Description::plain("Manages the proxy of a network."),
                attributes: map! {
                    "id" => attribute(
                        AttributeType::String,
                        AttributeConstraint::Computed,
                        "The ID of the proxy.",
                    ),
                    "network_id" => required(AttributeType::String, "The network ID used to manage the proxy."),
                    "protocol" => required(AttributeType::String, "The protocol used by the proxy."),
                    "host" => required(AttributeType::String, "The host of the proxy."),
                    "port" => required(AttributeType::Number, "The port of the proxy."),
                    "username" => optional(AttributeType::String, "The username for the proxy."),
                    "password" => sensitive(optional(
                        AttributeType::String,
                        "The password for the proxy.",
                    )),
                    "disable_cert_checking" => optional(
                        AttributeType::Bool,
                        "Whether certificate checking is disabled for the proxy.",
                    ),
                },
                ..Default::default()
            },
        }
    }
}

impl<'a> ProxyState<'a> {
    pub fn to_request(&self) -> Proxy {
        Proxy {
            id: String::new(),
            host: self.host.as_str().to_owned(),
            port: self.port.unwrap_or(0),
            username: non_empty(&self.username).unwrap_or_default(),
            password: non_empty(&self.password).unwrap_or_default(),
            protocol: self.protocol.as_str().to_owned(),
            disable_cert_checking: self.disable_cert_checking.unwrap_or(false),
        }
    }

    /// The password is write-only and stays as configured
    pub fn apply(&mut self, proxy: Proxy) {
        self.id = if proxy.id.is_empty() {
            self.network_id.clone()
        } else {
            string_value(proxy.id)
        };
        self.protocol = string_value(proxy.protocol);
        self.host = string_value(proxy.host);
        self.port = Value::Value(proxy.port);
        self.username = answered_string(&self.username, proxy.username);
        self.disable_cert_checking = match self.disable_cert_checking {
            Value::Null if !proxy.disable_cert_checking => Value::Null,
            _ => Value::Value(proxy.disable_cert_checking),
        };
    }
}

/// `forwardnetworks_proxy` data source
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyDataSourceState<'a> {
    #[serde(borrow = "'a")]
    pub network_id: ValueString<'a>,
    #[serde(borrow = "'a")]
    pub id: ValueString<'a>,
    #[serde(borrow = "'a")]
    pub host: ValueString<'a>,
    pub port: ValueNumber,
    #[serde(borrow = "'a")]
    pub username: ValueString<'a>,
    #[serde(borrow = "'a")]
    pub protocol: ValueString<'a>,
    pub disable_cert_checking: ValueBool,
}

impl<'a> WithSchema for ProxyDataSourceState<'a> {
    fn schema() -> Schema {
        let computed = |attr_type, description| {
            attribute(attr_type, AttributeConstraint::Computed, description)
        };

        Schema {
            version: 1,
            block: Block {
                description: Description::plain("Proxy of a network"),
                attributes: map! {
                    "network_id" => attribute(
                        AttributeType::String,
                        AttributeConstraint::Required,
                        "The network ID used to fetch the proxy information.",
                    ),
                    "id" => computed(AttributeType::String, "The ID of the proxy."),
                    "host" => computed(AttributeType::String, "The host of the proxy."),
                    "port" => computed(AttributeType::Number, "The port of the proxy."),
                    "username" => computed(AttributeType::String, "The username for the proxy."),
                    "protocol" => computed(AttributeType::String, "The protocol used by the proxy."),
                    "disable_cert_checking" => computed(
                        AttributeType::Bool,
                        "Whether certificate checking is disabled for the proxy.",
                    ),
                },
                ..Default::default()
            },
        }
    }
}

impl<'a> ProxyDataSourceState<'a> {
    pub fn apply(&mut self, proxy: Proxy) {
        self.id = string_value(proxy.id);
        self.host = string_value(proxy.host);
        self.port = Value::Value(proxy.port);
        self.username = string_value(proxy.username);
        self.protocol = string_value(proxy.protocol);
        self.disable_cert_checking = Value::Value(proxy.disable_cert_checking);
    }
}

#[cfg(test)]
mod tests {
    use std::borrow::Cow;

    use super::*;

    #[test]
    fn password_is_sent_but_never_read_back() {
        let planned = ProxyState {
            id: Value::Unknown,
            network_id: Value::Value(Cow::Borrowed("net-1")),
            protocol: Value::Value(Cow::Borrowed("HTTPS")),
            host: Value::Value(Cow::Borrowed("proxy.example.com")),
            port: Value::Value(3128),
            username: Value::Value(Cow::Borrowed("fwd")),
            password: Value::Value(Cow::Borrowed("hunter2")),
            disable_cert_checking: Value::Null,
        };

        let request = planned.to_request();
        assert_eq!(request.password, "hunter2");
        assert!(!request.disable_cert_checking);

        let mut state = planned.clone();
        state.apply(Proxy {
            id: "proxy-7".into(),
            password: String::new(),
            ..request
        });
        assert_eq!(state.id.as_str(), "proxy-7");
        assert_eq!(state.password.as_str(), "hunter2");
        assert_eq!(ProxyState { id: Value::Unknown, ..state }, planned);
    }

    #[test]
    fn data_source_has_no_password() {
        let mut state = ProxyDataSourceState::default();
        state.apply(Proxy {
            id: "proxy-7".into(),
            host: "proxy.example.com".into(),
            port: 8080,
            password: "hunter2".into(),
            ..Default::default()
        });
        assert_eq!(state.port, Value::Value(8080));
        assert!(!serde_json::to_string(&state).unwrap().contains("hunter2"));
    }
}
