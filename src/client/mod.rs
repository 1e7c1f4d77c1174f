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

use reqwest::{Method, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::config::ClientSettings;
use crate::poll::PollPolicy;
use crate::utils::DisplayJoinable;

mod error;

pub use error::{ApiError, Error, Result};

/// Authenticated client for the Forward Networks REST API.
///
/// Every request carries basic-auth credentials. The client never retries:
/// a failure is classified once and handed back to the caller.
#[derive(Clone)]
pub struct ForwardClient {
    http: reqwest::Client,
    base_url: String,
    username: String,
    password: String,
    poll: PollPolicy,
}

impl std::fmt::Debug for ForwardClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ForwardClient")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("password", &"***")
            .field("poll", &self.poll)
            .finish()
    }
}

impl ForwardClient {
    pub fn new(settings: &ClientSettings) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!(
                "terraform-provider-forwardnetworks/",
                env!("CARGO_PKG_VERSION")
            ))
            .danger_accept_invalid_certs(settings.insecure)
            .build()
            .map_err(Error::Builder)?;

        Ok(Self {
            http,
            base_url: settings.host.trim_end_matches('/').to_owned(),
            username: settings.username.clone(),
            password: settings.password.clone(),
            poll: settings.poll,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Policy used when waiting for a snapshot to be processed
    pub fn poll_policy(&self) -> PollPolicy {
        self.poll
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub(crate) fn request(&self, method: Method, path: &str) -> ApiRequest<'_> {
        ApiRequest {
            client: self,
            url: self.url(path),
            method,
            query: Vec::new(),
            body: None,
            conditions: Vec::new(),
        }
    }

    pub(crate) fn get(&self, path: &str) -> ApiRequest<'_> {
        self.request(Method::GET, path)
    }

    pub(crate) fn post(&self, path: &str) -> ApiRequest<'_> {
        self.request(Method::POST, path)
    }

    pub(crate) fn put(&self, path: &str) -> ApiRequest<'_> {
        self.request(Method::PUT, path)
    }

    pub(crate) fn patch(&self, path: &str) -> ApiRequest<'_> {
        self.request(Method::PATCH, path)
    }

    pub(crate) fn delete(&self, path: &str) -> ApiRequest<'_> {
        self.request(Method::DELETE, path)
    }
}

/// A single call to the API, built by [`ForwardClient`].
pub(crate) struct ApiRequest<'c> {
    client: &'c ForwardClient,
    method: Method,
    url: String,
    query: Vec<(&'static str, String)>,
    body: Option<serde_json::Result<serde_json::Value>>,
    conditions: Vec<(StatusCode, &'static str)>,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    errors: Vec<ErrorEntry>,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorEntry {
    #[serde(default)]
    message: String,
}

impl<'c> ApiRequest<'c> {
    pub fn query(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.query.push((key, value.into()));
        self
    }

    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Self {
        self.body = Some(serde_json::to_value(body));
        self
    }

    /// Report `status` as a structured [`ApiError`] carrying `message`
    pub fn condition(mut self, status: StatusCode, message: &'static str) -> Self {
        self.conditions.push((status, message));
        self
    }

    /// Send the request and return the raw body of a successful response
    pub async fn send(self) -> Result<Vec<u8>> {
        let client = self.client;
        let mut request = client
            .http
            .request(self.method.clone(), &self.url)
            .basic_auth(&client.username, Some(&client.password));

        if !self.query.is_empty() {
            request = request.query(&self.query);
        }
        match self.body {
            Some(Ok(ref body)) => request = request.json(body),
            Some(Err(source)) => {
                return Err(Error::Encode {
                    url: self.url,
                    source,
                })
            }
            None => (),
        }

        tracing::debug!(method = %self.method, url = %self.url, "sending API request");

        let transport = |source| Error::Transport {
            method: self.method.clone(),
            url: self.url.clone(),
            source,
        };
        let response = request.send().await.map_err(transport)?;
        let status = response.status();
        let body = response.bytes().await.map_err(transport)?;

        if status.is_success() {
            tracing::debug!(method = %self.method, url = %self.url, %status, "API request succeeded");
            Ok(body.to_vec())
        } else {
            let err = self.classify(status, &body);
            tracing::debug!(method = %self.method, url = %self.url, %status, "API request failed: {err}");
            Err(err)
        }
    }

    /// Send the request and decode the JSON body of a successful response
    pub async fn send_json<T: DeserializeOwned>(self) -> Result<T> {
        let url = self.url.clone();
        let body = self.send().await?;
        serde_json::from_slice(&body).map_err(|source| Error::Decode { url, source })
    }

    /// Send the request, ignoring the body of a successful response
    pub async fn send_empty(self) -> Result<()> {
        self.send().await.map(|_| ())
    }

    fn classify(&self, status: StatusCode, body: &[u8]) -> Error {
        let reason = format!("Status code: {}", status.as_u16());

        if let Some((_, message)) = self.conditions.iter().find(|(s, _)| *s == status) {
            return ApiError {
                api_url: self.url.clone(),
                http_method: self.method.to_string(),
                message: message.to_string(),
                reason,
                status: status.as_u16(),
            }
            .into();
        }

        if status == StatusCode::CONFLICT {
            let mut err = serde_json::from_slice::<ApiError>(body).unwrap_or_default();
            if err.api_url.is_empty() {
                err.api_url = self.url.clone();
            }
            if err.http_method.is_empty() {
                err.http_method = self.method.to_string();
            }
            if err.message.is_empty() {
                err.message = "The request conflicts with the current state of the resource."
                    .to_owned();
            }
            if err.reason.is_empty() {
                err.reason = reason;
            }
            err.status = status.as_u16();
            return err.into();
        }

        let message = serde_json::from_slice::<ErrorBody>(body)
            .ok()
            .and_then(|body| {
                let errors = body
                    .errors
                    .iter()
                    .map(|e| e.message.as_str())
                    .filter(|m| !m.is_empty())
                    .collect::<Vec<_>>();
                if !errors.is_empty() {
                    Some(errors.into_iter().join_with("; ").to_string())
                } else if !body.message.is_empty() {
                    Some(body.message)
                } else {
                    None
                }
            });

        Error::Status {
            method: self.method.clone(),
            url: self.url.clone(),
            status,
            message,
        }
    }
}
