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

//! Waiting for a collection to produce a processed snapshot.
//!
//! Starting a collection is asynchronous on the Forward Networks side: the
//! API acknowledges the request and processes the snapshot later. The
//! helpers here query the latest processed snapshot of a network until one
//! is available, with a bounded number of attempts.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;

use crate::client::{Error, Result};
use crate::snapshot::Snapshot;

/// Anything able to report the latest processed snapshot of a network
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    async fn latest_processed_snapshot(&self, network_id: &str) -> Result<Snapshot>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub max_attempts: u32,
    pub interval: Duration,
}

impl PollPolicy {
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 10;
    pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(5);
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            max_attempts: Self::DEFAULT_MAX_ATTEMPTS,
            interval: Self::DEFAULT_INTERVAL,
        }
    }
}

/// The network has no snapshot yet, or none of them is processed
pub fn is_not_ready(err: &Error) -> bool {
    err.api().is_some_and(|api| {
        matches!(
            api.status(),
            Some(StatusCode::NOT_FOUND | StatusCode::CONFLICT)
        )
    })
}

/// Latest processed snapshot of the network, `None` while there is none
pub async fn latest_processed<S>(source: &S, network_id: &str) -> Result<Option<Snapshot>>
where
    S: SnapshotSource + ?Sized,
{
    match source.latest_processed_snapshot(network_id).await {
        Ok(snapshot) if snapshot.id.is_empty() => Ok(None),
        Ok(snapshot) => Ok(Some(snapshot)),
        Err(err) if is_not_ready(&err) => {
            tracing::debug!(network_id, "no processed snapshot yet: {err}");
            Ok(None)
        }
        Err(err) => Err(err),
    }
}

/// Query the latest processed snapshot until there is one.
///
/// `previous_id` is the snapshot observed before the collection was
/// started. It is only used for logging: any processed snapshot ends the
/// wait, including the one that existed before the collection.
pub async fn wait_for_processed_snapshot<S>(
    source: &S,
    network_id: &str,
    previous_id: Option<&str>,
    policy: PollPolicy,
) -> Result<Snapshot>
where
    S: SnapshotSource + ?Sized,
{
    let attempts = policy.max_attempts.max(1);

    for attempt in 1..=attempts {
        if let Some(snapshot) = latest_processed(source, network_id).await? {
            if previous_id == Some(snapshot.id.as_str()) {
                tracing::warn!(
                    network_id,
                    snapshot_id = %snapshot.id,
                    "latest processed snapshot did not change since the collection was started"
                );
            }
            tracing::info!(network_id, snapshot_id = %snapshot.id, attempt, "processed snapshot available");
            return Ok(snapshot);
        }

        tracing::debug!(
            network_id,
            attempt,
            attempts,
            "no processed snapshot, waiting {:?}",
            policy.interval
        );
        tokio::time::sleep(policy.interval).await;
    }

    Err(Error::Timeout {
        network_id: network_id.to_owned(),
        attempts,
    })
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use reqwest::Method;
    use tokio::time::Instant;

    use super::*;
    use crate::client::ApiError;

    #[derive(Default)]
    struct ScriptedSource {
        answers: Mutex<VecDeque<Result<Snapshot>>>,
        calls: Mutex<u32>,
    }

    impl ScriptedSource {
        fn new(answers: impl IntoIterator<Item = Result<Snapshot>>) -> Self {
            Self {
                answers: Mutex::new(answers.into_iter().collect()),
                calls: Mutex::new(0),
            }
        }

        fn calls(&self) -> u32 {
            *self.calls.lock().unwrap()
        }
    }

    #[async_trait]
    impl SnapshotSource for ScriptedSource {
        async fn latest_processed_snapshot(&self, _network_id: &str) -> Result<Snapshot> {
            *self.calls.lock().unwrap() += 1;
            self.answers
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(no_snapshots()))
        }
    }

    fn api_error(status: StatusCode, message: &str) -> Error {
        ApiError {
            api_url: "https://fwd.app/api/networks/net-1/snapshots/latestProcessed".into(),
            http_method: "GET".into(),
            message: message.into(),
            reason: format!("Status code: {}", status.as_u16()),
            status: status.as_u16(),
        }
        .into()
    }

    fn no_snapshots() -> Error {
        api_error(StatusCode::NOT_FOUND, "The network has no Snapshots.")
    }

    fn processing() -> Error {
        api_error(
            StatusCode::CONFLICT,
            "None of the Snapshots in the network are processed. Processing of the latest Snapshot has begun.",
        )
    }

    fn snapshot(id: &str) -> Snapshot {
        Snapshot {
            id: id.into(),
            state: "PROCESSED".into(),
            ..Default::default()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn ready_on_first_query_does_not_wait() {
        let source = ScriptedSource::new([Ok(snapshot("snap-1"))]);
        let start = Instant::now();

        let found =
            wait_for_processed_snapshot(&source, "net-1", Some("snap-0"), PollPolicy::default())
                .await
                .unwrap();

        assert_eq!(found.id, "snap-1");
        assert_eq!(start.elapsed(), Duration::ZERO);
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn no_snapshots_keeps_polling() {
        let source = ScriptedSource::new([
            Err(no_snapshots()),
            Err(no_snapshots()),
            Err(no_snapshots()),
            Ok(snapshot("snap-42")),
        ]);
        let start = Instant::now();

        let found = wait_for_processed_snapshot(&source, "net-1", None, PollPolicy::default())
            .await
            .unwrap();

        assert_eq!(found.id, "snap-42");
        assert_eq!(start.elapsed(), Duration::from_secs(15));
        assert_eq!(source.calls(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn processing_keeps_polling() {
        let source = ScriptedSource::new([Err(processing()), Ok(snapshot("snap-2"))]);

        let found = wait_for_processed_snapshot(&source, "net-1", None, PollPolicy::default())
            .await
            .unwrap();

        assert_eq!(found.id, "snap-2");
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn empty_id_is_not_ready() {
        let source = ScriptedSource::new([Ok(snapshot("")), Ok(snapshot("snap-3"))]);

        let found = wait_for_processed_snapshot(&source, "net-1", None, PollPolicy::default())
            .await
            .unwrap();

        assert_eq!(found.id, "snap-3");
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn exhausted_budget_is_a_timeout() {
        let source = ScriptedSource::new([]);
        let start = Instant::now();

        let err = wait_for_processed_snapshot(&source, "net-1", None, PollPolicy::default())
            .await
            .unwrap_err();

        assert!(err.is_timeout(), "unexpected error: {err}");
        assert!(err.api().is_none());
        assert_eq!(source.calls(), 10);
        assert_eq!(start.elapsed(), Duration::from_secs(50));
    }

    #[tokio::test(start_paused = true)]
    async fn other_errors_abort_immediately() {
        let source = ScriptedSource::new([
            Err(no_snapshots()),
            Err(Error::Status {
                method: Method::GET,
                url: "https://fwd.app/api/networks/net-1/snapshots/latestProcessed".into(),
                status: StatusCode::INTERNAL_SERVER_ERROR,
                message: None,
            }),
            Ok(snapshot("never")),
        ]);

        let err = wait_for_processed_snapshot(&source, "net-1", None, PollPolicy::default())
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
        assert!(!err.is_timeout());
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn structured_errors_other_than_not_ready_abort() {
        let source = ScriptedSource::new([Err(api_error(StatusCode::FORBIDDEN, "Forbidden"))]);

        let err = wait_for_processed_snapshot(&source, "net-1", None, PollPolicy::default())
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(StatusCode::FORBIDDEN));
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn unchanged_snapshot_is_still_returned() {
        let source = ScriptedSource::new([Ok(snapshot("snap-0"))]);

        let found =
            wait_for_processed_snapshot(&source, "net-1", Some("snap-0"), PollPolicy::default())
                .await
                .unwrap();

        assert_eq!(found.id, "snap-0");
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn custom_policy_bounds_attempts() {
        let source = ScriptedSource::new([]);
        let policy = PollPolicy {
            max_attempts: 3,
            interval: Duration::from_millis(100),
        };
        let start = Instant::now();

        let err = wait_for_processed_snapshot(&source, "net-1", None, policy)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Timeout { attempts: 3, .. }));
        assert_eq!(source.calls(), 3);
        assert_eq!(start.elapsed(), Duration::from_millis(300));
    }
}
