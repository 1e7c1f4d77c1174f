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

//! HTTP behavior of the Forward Networks client against a mocked API

use std::time::Duration;

use reqwest::StatusCode;
use serde_json::json;
use wiremock::matchers::{basic_auth, body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use terraform_provider_forwardnetworks::client::{Error, ForwardClient};
use terraform_provider_forwardnetworks::cloud::Credentials;
use terraform_provider_forwardnetworks::config::ClientSettings;
use terraform_provider_forwardnetworks::poll::{wait_for_processed_snapshot, PollPolicy};
use terraform_provider_forwardnetworks::snapshot::{ExportParams, NO_SNAPSHOTS};

fn client(server: &MockServer, poll: PollPolicy) -> ForwardClient {
    ForwardClient::new(&ClientSettings {
        host: format!("{}/", server.uri()),
        username: "alice".into(),
        password: "secret".into(),
        insecure: false,
        poll,
    })
    .unwrap()
}

fn fast_poll(max_attempts: u32) -> PollPolicy {
    PollPolicy {
        max_attempts,
        interval: Duration::from_millis(5),
    }
}

#[tokio::test]
async fn requests_carry_basic_auth() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/version"))
        .and(basic_auth("alice", "secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"version": "24.3.1"})))
        .expect(1)
        .mount(&server)
        .await;

    let version = client(&server, PollPolicy::default()).version().await.unwrap();
    assert_eq!(version, "24.3.1");
}

#[tokio::test]
async fn conflict_body_is_a_structured_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/networks/net-1/startcollection"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "apiUrl": "/api/networks/net-1/startcollection",
            "httpMethod": "POST",
            "message": "A collection is already in progress",
            "reason": "Conflict"
        })))
        .mount(&server)
        .await;

    let err = client(&server, PollPolicy::default())
        .start_collection("net-1")
        .await
        .unwrap_err();

    let api = err.api().expect("structured error");
    assert_eq!(api.message, "A collection is already in progress");
    assert_eq!(api.api_url, "/api/networks/net-1/startcollection");
    assert_eq!(err.status(), Some(StatusCode::CONFLICT));
}

#[tokio::test]
async fn conflict_without_payload_is_still_structured() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/networks/net-1/startcollection"))
        .respond_with(ResponseTemplate::new(409).set_body_string("<html>Conflict</html>"))
        .mount(&server)
        .await;

    let err = client(&server, PollPolicy::default())
        .start_collection("net-1")
        .await
        .unwrap_err();

    let api = err.api().expect("structured error");
    assert_eq!(
        api.message,
        "The request conflicts with the current state of the resource."
    );
    assert_eq!(
        api.api_url,
        format!("{}/api/networks/net-1/startcollection", server.uri())
    );
    assert_eq!(api.http_method, "POST");
    assert_eq!(api.reason, "Status code: 409");
    assert_eq!(err.status(), Some(StatusCode::CONFLICT));
}

#[tokio::test]
async fn other_statuses_carry_the_url() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/networks"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = client(&server, PollPolicy::default())
        .networks()
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Status { .. }), "unexpected error: {err:?}");
    assert_eq!(err.status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
    assert!(err
        .to_string()
        .contains(&format!("{}/api/networks", server.uri())));
}

#[tokio::test]
async fn missing_snapshots_are_reported_with_the_api_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/networks/net-1/snapshots/latestProcessed"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = client(&server, PollPolicy::default())
        .latest_processed_snapshot("net-1")
        .await
        .unwrap_err();

    assert_eq!(err.api().map(|api| api.message.as_str()), Some(NO_SNAPSHOTS));
    assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
}

#[tokio::test]
async fn polling_waits_for_processing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/networks/net-1/snapshots/latestProcessed"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "message": "None of the Snapshots in the network are processed."
        })))
        .up_to_n_times(2)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/networks/net-1/snapshots/latestProcessed"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"id": "snap-42", "state": "PROCESSED"})),
        )
        .mount(&server)
        .await;

    let client = client(&server, fast_poll(5));
    let snapshot = wait_for_processed_snapshot(&client, "net-1", None, client.poll_policy())
        .await
        .unwrap();

    assert_eq!(snapshot.id, "snap-42");
    assert_eq!(server.received_requests().await.unwrap().len(), 3);
}

#[tokio::test]
async fn polling_gives_up_after_the_budget() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/networks/net-1/snapshots/latestProcessed"))
        .respond_with(ResponseTemplate::new(404))
        .expect(3)
        .mount(&server)
        .await;

    let client = client(&server, fast_poll(3));
    let err = wait_for_processed_snapshot(&client, "net-1", Some("snap-1"), client.poll_policy())
        .await
        .unwrap_err();

    assert!(err.is_timeout(), "unexpected error: {err:?}");
    assert!(err.to_string().contains("net-1"));
}

#[tokio::test]
async fn network_name_is_a_query_parameter() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/networks"))
        .and(query_param("name", "lab network"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "net-9",
            "name": "lab network",
            "orgId": "org-1",
            "createdAt": 1700000000000i64
        })))
        .expect(1)
        .mount(&server)
        .await;

    let network = client(&server, PollPolicy::default())
        .create_network("lab network")
        .await
        .unwrap();

    assert_eq!(network.id, "net-9");
    assert_eq!(network.org_id, "org-1");
}

#[tokio::test]
async fn snapshot_export_returns_raw_bytes() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/snapshots/snap-1"))
        .and(body_json(json!({"excludeDevices": ["r3"]})))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"PK\x03\x04zip".to_vec()))
        .mount(&server)
        .await;

    let params = ExportParams {
        exclude_devices: vec!["r3".into()],
        ..Default::default()
    };
    let data = client(&server, PollPolicy::default())
        .export_snapshot("snap-1", &params)
        .await
        .unwrap();

    assert_eq!(data, b"PK\x03\x04zip");
}

#[tokio::test]
async fn azure_accounts_are_completed_with_their_credential() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/networks/net-1/cloudAccounts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"name": "aws", "type": "AWS", "collect": true},
            {
                "name": "azure",
                "type": "AZURE",
                "collect": true,
                "subscriptions": [{"subscriptionId": "sub-1", "environment": "AZURE", "enabled": true}]
            }
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/networks/net-1/cloudAccounts/azure/credential"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "subscriptions": [{"subscriptionId": "sub-1", "clientId": "app", "tenant": "contoso"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server, PollPolicy::default());
    let account = client.cloud_account("net-1", "azure").await.unwrap().unwrap();

    let Credentials::Azure { subscriptions } = account.credentials else {
        panic!("expected Azure credentials");
    };
    assert_eq!(subscriptions[0].client_id, "app");
    assert_eq!(subscriptions[0].tenant, "contoso");
    assert!(client.cloud_account("net-1", "gcp").await.unwrap().is_none());
}
