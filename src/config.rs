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

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tf_provider::schema::{Attribute, AttributeConstraint, AttributeType, Block, Description};
use tf_provider::value::{Value, ValueBool, ValueNumber, ValueString};
use tf_provider::{map, schema::Schema};

use crate::poll::PollPolicy;
use crate::utils::WithSchema;

pub const HOST_ENV: &str = "FORWARDNETWORKS_HOST";
pub const USERNAME_ENV: &str = "FORWARDNETWORKS_USERNAME";
pub const PASSWORD_ENV: &str = "FORWARDNETWORKS_PASSWORD";
pub const DEFAULT_HOST: &str = "https://fwd.app";

/// Content of the `provider "forwardnetworks"` block
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig<'a> {
    #[serde(borrow = "'a")]
    pub host: ValueString<'a>,
    #[serde(borrow = "'a")]
    pub username: ValueString<'a>,
    #[serde(borrow = "'a")]
    pub password: ValueString<'a>,
    pub insecure: ValueBool,
    pub poll_max_attempts: ValueNumber,
    pub poll_interval_seconds: ValueNumber,
}

impl<'a> WithSchema for ProviderConfig<'a> {
    fn schema() -> Schema {
        Schema {
            version: 1,
            block: Block {
                description: Description::plain("Interact with the Forward Networks API."),
                attributes: map! {
                    "host" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain(format!(
                            "URI of the Forward Networks API. May also be provided via the {HOST_ENV} environment variable. Defaults to {DEFAULT_HOST}"
                        )),
                        constraint: AttributeConstraint::Optional,
                        ..Default::default()
                    },
                    "username" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain(format!(
                            "Username for the Forward Networks API. May also be provided via the {USERNAME_ENV} environment variable."
                        )),
                        constraint: AttributeConstraint::Optional,
                        ..Default::default()
                    },
                    "password" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain(format!(
                            "Password for the Forward Networks API. May also be provided via the {PASSWORD_ENV} environment variable."
                        )),
                        constraint: AttributeConstraint::Optional,
                        sensitive: true,
                        ..Default::default()
                    },
                    "insecure" => Attribute {
                        attr_type: AttributeType::Bool,
                        description: Description::plain(
                            "Allow connections to on-premises Forward Networks instances without TLS certificate verification. Defaults to false."
                        ),
                        constraint: AttributeConstraint::Optional,
                        ..Default::default()
                    },
                    "poll_max_attempts" => Attribute {
                        attr_type: AttributeType::Number,
                        description: Description::plain(format!(
                            "Number of times the latest processed snapshot is queried after a collection is started. Defaults to {}.",
                            PollPolicy::DEFAULT_MAX_ATTEMPTS
                        )),
                        constraint: AttributeConstraint::Optional,
                        ..Default::default()
                    },
                    "poll_interval_seconds" => Attribute {
                        attr_type: AttributeType::Number,
                        description: Description::plain(format!(
                            "Delay between two snapshot queries, in seconds. Defaults to {}.",
                            PollPolicy::DEFAULT_INTERVAL.as_secs()
                        )),
                        constraint: AttributeConstraint::Optional,
                        ..Default::default()
                    },
                },
                ..Default::default()
            },
        }
    }
}

/// Resolved, immutable client configuration
#[derive(Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub host: String,
    pub username: String,
    pub password: String,
    pub insecure: bool,
    pub poll: PollPolicy,
}

impl std::fmt::Debug for ClientSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientSettings")
            .field("host", &self.host)
            .field("username", &self.username)
            .field("password", &"***")
            .field("insecure", &self.insecure)
            .field("poll", &self.poll)
            .finish()
    }
}

/// A provider block problem, attached to the offending attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsError {
    pub attribute: &'static str,
    pub summary: String,
    pub detail: String,
}

impl ClientSettings {
    /// Merge the provider block with the environment.
    ///
    /// An explicit attribute wins over its environment variable, which wins
    /// over the default. Every problem is reported, not only the first one.
    pub fn resolve<F>(config: &ProviderConfig<'_>, env: F) -> Result<Self, Vec<SettingsError>>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut errors = Vec::new();

        for (attribute, label, var, value) in [
            ("host", "Host", HOST_ENV, &config.host),
            ("username", "Username", USERNAME_ENV, &config.username),
            ("password", "Password", PASSWORD_ENV, &config.password),
        ] {
            if value.is_unknown() {
                errors.push(SettingsError {
                    attribute,
                    summary: format!("Unknown Forward Networks API {label}"),
                    detail: format!(
                        "The provider cannot create the Forward Networks API client as there is an unknown configuration value for the Forward Networks API {attribute}. Either target apply the source of the value first, set the value statically in the configuration, or use the {var} environment variable."
                    ),
                });
            }
        }
        if !errors.is_empty() {
            return Err(errors);
        }

        let pick = |value: &ValueString<'_>, var: &str| match value {
            Value::Value(value) => value.to_string(),
            _ => env(var).unwrap_or_default(),
        };

        let mut host = pick(&config.host, HOST_ENV);
        if host.is_empty() {
            host = DEFAULT_HOST.to_owned();
        }
        let username = pick(&config.username, USERNAME_ENV);
        let password = pick(&config.password, PASSWORD_ENV);

        for (attribute, label, var, value) in [
            ("username", "Username", USERNAME_ENV, &username),
            ("password", "Password", PASSWORD_ENV, &password),
        ] {
            if value.is_empty() {
                errors.push(SettingsError {
                    attribute,
                    summary: format!("Missing Forward Networks API {label}"),
                    detail: format!(
                        "The provider cannot create the Forward Networks API client as there is a missing or empty value for the Forward Networks API {attribute}. Set the {attribute} value in the configuration or use the {var} environment variable. If either is already set, ensure the value is not empty."
                    ),
                });
            }
        }

        let max_attempts = match config.poll_max_attempts {
            Value::Value(n) if n >= 1 => u32::try_from(n).unwrap_or(u32::MAX),
            Value::Value(n) => {
                errors.push(SettingsError {
                    attribute: "poll_max_attempts",
                    summary: "Invalid snapshot poll attempts".to_owned(),
                    detail: format!("`poll_max_attempts` must be at least 1, got {n}."),
                });
                PollPolicy::DEFAULT_MAX_ATTEMPTS
            }
            _ => PollPolicy::DEFAULT_MAX_ATTEMPTS,
        };
        let interval = match config.poll_interval_seconds {
            Value::Value(n) if n >= 0 => Duration::from_secs(n as u64),
            Value::Value(n) => {
                errors.push(SettingsError {
                    attribute: "poll_interval_seconds",
                    summary: "Invalid snapshot poll interval".to_owned(),
                    detail: format!("`poll_interval_seconds` cannot be negative, got {n}."),
                });
                PollPolicy::DEFAULT_INTERVAL
            }
            _ => PollPolicy::DEFAULT_INTERVAL,
        };

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(Self {
            host,
            username,
            password,
            insecure: config.insecure.unwrap_or(false),
            poll: PollPolicy {
                max_attempts,
                interval,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use std::borrow::Cow;
    use std::collections::HashMap;

    use super::*;

    fn env_of(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    fn string(s: &str) -> ValueString<'_> {
        Value::Value(Cow::Borrowed(s))
    }

    #[test]
    fn explicit_config_wins() {
        let config = ProviderConfig {
            host: string("https://fwd.example.com/"),
            username: string("alice"),
            password: string("secret"),
            insecure: Value::Value(true),
            ..Default::default()
        };
        let settings = ClientSettings::resolve(
            &config,
            env_of(&[(USERNAME_ENV, "bob"), (HOST_ENV, "https://other")]),
        )
        .unwrap();

        assert_eq!(settings.host, "https://fwd.example.com/");
        assert_eq!(settings.username, "alice");
        assert_eq!(settings.password, "secret");
        assert!(settings.insecure);
        assert_eq!(settings.poll, PollPolicy::default());
    }

    #[test]
    fn environment_then_default() {
        let settings = ClientSettings::resolve(
            &ProviderConfig::default(),
            env_of(&[(USERNAME_ENV, "bob"), (PASSWORD_ENV, "hunter2")]),
        )
        .unwrap();

        assert_eq!(settings.host, DEFAULT_HOST);
        assert_eq!(settings.username, "bob");
        assert_eq!(settings.password, "hunter2");
        assert!(!settings.insecure);
    }

    #[test]
    fn missing_credentials_are_reported_per_attribute() {
        let errors = ClientSettings::resolve(&ProviderConfig::default(), env_of(&[])).unwrap_err();
        let attributes: Vec<_> = errors.iter().map(|e| e.attribute).collect();
        assert_eq!(attributes, ["username", "password"]);
        assert_eq!(errors[0].summary, "Missing Forward Networks API Username");
    }

    #[test]
    fn unknown_values_are_rejected() {
        let config = ProviderConfig {
            host: Value::Unknown,
            username: string("alice"),
            password: Value::Unknown,
            ..Default::default()
        };
        let errors = ClientSettings::resolve(&config, env_of(&[])).unwrap_err();
        let attributes: Vec<_> = errors.iter().map(|e| e.attribute).collect();
        assert_eq!(attributes, ["host", "password"]);
    }

    #[test]
    fn poll_policy_is_configurable() {
        let config = ProviderConfig {
            username: string("alice"),
            password: string("secret"),
            poll_max_attempts: Value::Value(3),
            poll_interval_seconds: Value::Value(1),
            ..Default::default()
        };
        let settings = ClientSettings::resolve(&config, env_of(&[])).unwrap();
        assert_eq!(
            settings.poll,
            PollPolicy {
                max_attempts: 3,
                interval: Duration::from_secs(1)
            }
        );

        let config = ProviderConfig {
            poll_max_attempts: Value::Value(0),
            ..config
        };
        let errors = ClientSettings::resolve(&config, env_of(&[])).unwrap_err();
        assert_eq!(errors[0].attribute, "poll_max_attempts");
    }
}
