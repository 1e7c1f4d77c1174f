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
use serde::{Deserialize, Serialize};

/// Business condition reported by the Forward Networks API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("API error: {message} ({http_method} {api_url}) - reason: {reason}")]
pub struct ApiError {
    #[serde(rename = "apiUrl", default)]
    pub api_url: String,
    #[serde(rename = "httpMethod", default)]
    pub http_method: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub reason: String,
    /// HTTP status that carried the error, not part of the payload
    #[serde(skip)]
    pub status: u16,
}

impl ApiError {
    pub fn status(&self) -> Option<StatusCode> {
        StatusCode::from_u16(self.status).ok()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to build the HTTP client: {0}")]
    Builder(#[source] reqwest::Error),
    #[error("failed to send {method} request to {url}: {source}")]
    Transport {
        method: Method,
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(
        "API request failed with status code {} for URL: {url}{}",
        .status.as_u16(),
        .message.as_deref().map(|m| format!(": {m}")).unwrap_or_default()
    )]
    Status {
        method: Method,
        url: String,
        status: StatusCode,
        message: Option<String>,
    },
    #[error("failed to encode the request body for {url}: {source}")]
    Encode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to decode the response of {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("no processed snapshot for network {network_id} after {attempts} attempts")]
    Timeout { network_id: String, attempts: u32 },
    #[error("{0}")]
    InvalidArgument(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
    /// Structured payload, when the API reported a business condition
    pub fn api(&self) -> Option<&ApiError> {
        match self {
            Error::Api(err) => Some(err),
            _ => None,
        }
    }

    /// HTTP status of the failed call, if the server answered at all
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::Api(err) => err.status(),
            Error::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Timeout { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_display() {
        let err = ApiError {
            api_url: "https://fwd.app/api/networks/1/snapshots/latestProcessed".into(),
            http_method: "GET".into(),
            message: "The network has no Snapshots.".into(),
            reason: "Status code: 404".into(),
            status: 404,
        };
        assert_eq!(
            err.to_string(),
            "API error: The network has no Snapshots. (GET https://fwd.app/api/networks/1/snapshots/latestProcessed) - reason: Status code: 404"
        );
        assert_eq!(Error::from(err).status(), Some(StatusCode::NOT_FOUND));
    }

    #[test]
    fn status_error_display() {
        let err = Error::Status {
            method: Method::GET,
            url: "https://fwd.app/api/version".into(),
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: None,
        };
        assert_eq!(
            err.to_string(),
            "API request failed with status code 500 for URL: https://fwd.app/api/version"
        );
        assert!(err.api().is_none());

        let err = Error::Status {
            method: Method::POST,
            url: "https://fwd.app/api/nqe".into(),
            status: StatusCode::BAD_REQUEST,
            message: Some("syntax error".into()),
        };
        assert!(err.to_string().ends_with(": syntax error"));
    }

    #[test]
    fn api_error_payload_ignores_status() {
        let err: ApiError = serde_json::from_str(
            r#"{"apiUrl":"/api/snapshots/1/checks","httpMethod":"GET","message":"Snapshot is being processed","reason":"CONFLICT"}"#,
        )
        .unwrap();
        assert_eq!(err.message, "Snapshot is being processed");
        assert_eq!(err.status, 0);
        assert!(err.status().is_none());
    }
}
