use crate::models::DailySnapshot;
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::{collections::BTreeSet, time::Duration};
use thiserror::Error;
use tracing::{debug, info, warn};

/// What the remote store reports about a user's progress.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoteData {
    pub streak: u64,
    pub history: BTreeSet<String>,
}

/// Result of a best-effort publish. Callers treat both variants the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishOutcome {
    Ok,
    Unknown,
}

#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Returns `None` whenever the remote is unreachable or answers with anything
    /// other than a success payload.
    async fn fetch(&self) -> Option<RemoteData>;

    async fn publish(&self, snapshot: &DailySnapshot) -> PublishOutcome;
}

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("remote answered with status {0:?}")]
    Rejected(Option<String>),
}

#[derive(Debug, Deserialize)]
struct FetchPayload {
    status: Option<String>,
    #[serde(default)]
    history: Vec<String>,
    #[serde(default)]
    streak: Option<WireStreak>,
}

/// The spreadsheet backend hands the streak back either as a number or as text.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WireStreak {
    Whole(u64),
    Fractional(f64),
    Text(String),
}

impl WireStreak {
    fn value(&self) -> u64 {
        match self {
            WireStreak::Whole(value) => *value,
            WireStreak::Fractional(value) if value.is_finite() && *value > 0.0 => *value as u64,
            WireStreak::Fractional(_) => 0,
            WireStreak::Text(text) => leading_digits(text).parse().unwrap_or(0),
        }
    }
}

fn leading_digits(text: &str) -> &str {
    let trimmed = text.trim_start();
    let end = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(trimmed.len());
    &trimmed[..end]
}

fn decode_fetch(payload: FetchPayload) -> Result<RemoteData, RemoteError> {
    if payload.status.as_deref() != Some("success") {
        return Err(RemoteError::Rejected(payload.status));
    }

    let history = payload
        .history
        .into_iter()
        .filter(|day| {
            let valid = NaiveDate::parse_from_str(day, "%Y-%m-%d").is_ok();
            if !valid {
                debug!(%day, "skipping malformed remote history entry");
            }
            valid
        })
        .collect();

    Ok(RemoteData {
        streak: payload.streak.as_ref().map(WireStreak::value).unwrap_or(0),
        history,
    })
}

#[derive(Debug, Serialize)]
struct SaveDayRequest<'a> {
    action: &'static str,
    #[serde(flatten)]
    snapshot: &'a DailySnapshot,
}

/// Talks to the spreadsheet-backed endpoint over a single URL.
pub struct HttpRemote {
    client: Client,
    url: String,
}

impl HttpRemote {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, RemoteError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    async fn try_fetch(&self) -> Result<RemoteData, RemoteError> {
        let payload: FetchPayload = self
            .client
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        decode_fetch(payload)
    }
}

#[async_trait]
impl RemoteStore for HttpRemote {
    async fn fetch(&self) -> Option<RemoteData> {
        match self.try_fetch().await {
            Ok(data) => {
                info!(
                    streak = data.streak,
                    days = data.history.len(),
                    "loaded remote progress"
                );
                Some(data)
            }
            Err(err) => {
                warn!("failed to fetch remote progress: {err}");
                None
            }
        }
    }

    async fn publish(&self, snapshot: &DailySnapshot) -> PublishOutcome {
        let body = SaveDayRequest {
            action: "SAVE_DAY",
            snapshot,
        };

        // The response body is never inspected; getting one back is all we can know.
        match self.client.post(&self.url).json(&body).send().await {
            Ok(_) => {
                debug!(date = %snapshot.date, "snapshot sent");
                PublishOutcome::Ok
            }
            Err(err) => {
                warn!(date = %snapshot.date, "failed to send snapshot: {err}");
                PublishOutcome::Unknown
            }
        }
    }
}

/// Used when no endpoint is configured.
pub struct OfflineRemote;

#[async_trait]
impl RemoteStore for OfflineRemote {
    async fn fetch(&self) -> Option<RemoteData> {
        None
    }

    async fn publish(&self, snapshot: &DailySnapshot) -> PublishOutcome {
        debug!(date = %snapshot.date, "remote sync disabled, snapshot kept local");
        PublishOutcome::Unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ClockStatus, DailySnapshot, Mood, TransientDailyFields};
    use serde_json::json;

    fn decode(value: serde_json::Value) -> Result<RemoteData, RemoteError> {
        decode_fetch(serde_json::from_value(value).unwrap())
    }

    #[test]
    fn accepts_numeric_and_textual_streaks() {
        let data = decode(json!({
            "status": "success",
            "history": ["2026-01-02", "2026-01-01", "2026-01-02"],
            "streak": "7"
        }))
        .unwrap();
        assert_eq!(data.streak, 7);
        assert_eq!(data.history.len(), 2);

        let data = decode(json!({ "status": "success", "history": [], "streak": 3 })).unwrap();
        assert_eq!(data.streak, 3);

        let data = decode(json!({ "status": "success", "history": [], "streak": "12 days" })).unwrap();
        assert_eq!(data.streak, 12);

        let data = decode(json!({ "status": "success", "history": [], "streak": "n/a" })).unwrap();
        assert_eq!(data.streak, 0);
    }

    #[test]
    fn malformed_history_rows_are_dropped() {
        let data = decode(json!({
            "status": "success",
            "history": ["2026-01-01", "yesterday", "2026-13-01", "", "2026-02-30", "2026-01-03"],
            "streak": 2
        }))
        .unwrap();
        assert_eq!(
            data.history.into_iter().collect::<Vec<_>>(),
            vec!["2026-01-01".to_string(), "2026-01-03".to_string()]
        );
    }

    #[tokio::test]
    async fn error_status_is_no_data_even_with_success_body() {
        use axum::{Json, Router, http::StatusCode, routing::get};

        let app = Router::new().route(
            "/exec",
            get(|| async {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "status": "success", "history": ["2026-01-01"], "streak": 4 })),
                )
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let remote = HttpRemote::new(format!("http://{addr}/exec"), Duration::from_secs(2)).unwrap();
        assert_eq!(remote.fetch().await, None);
        server.abort();
    }

    #[test]
    fn anything_but_success_is_no_data() {
        assert!(decode(json!({ "status": "error", "history": ["2026-01-01"], "streak": 9 })).is_err());
        assert!(decode(json!({ "history": [], "streak": 9 })).is_err());
    }

    #[test]
    fn save_request_flattens_snapshot() {
        let snapshot = DailySnapshot::build(
            "2026-03-04".to_string(),
            5,
            ClockStatus::FULL,
            TransientDailyFields {
                water: 3,
                vitamins: true,
                mood: Some(Mood::Meh),
                journal: "ok".into(),
                routine: vec!["Reading".into()],
            },
        );
        let body = serde_json::to_value(SaveDayRequest {
            action: "SAVE_DAY",
            snapshot: &snapshot,
        })
        .unwrap();

        assert_eq!(body["action"], "SAVE_DAY");
        assert_eq!(body["date"], "2026-03-04");
        assert_eq!(body["streak"], 5);
        assert_eq!(body["data"]["hp"], 100);
        assert_eq!(body["data"]["mood"], "meh");
        assert_eq!(body["data"]["eveningRoutine"][0], "Reading");
        assert_eq!(body["data"]["status"], "safe");
    }

    #[tokio::test]
    async fn unreachable_endpoint_degrades_quietly() {
        let remote = HttpRemote::new("http://127.0.0.1:9/exec", Duration::from_millis(200)).unwrap();
        assert_eq!(remote.fetch().await, None);

        let snapshot = DailySnapshot::build(
            "2026-03-04".to_string(),
            1,
            ClockStatus::FULL,
            TransientDailyFields::default(),
        );
        assert_eq!(remote.publish(&snapshot).await, PublishOutcome::Unknown);
    }
}
