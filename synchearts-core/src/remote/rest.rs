//! HTTP remote store for a PostgREST-style table (e.g. Supabase).
//!
//! Expected table:
//!
//! ```sql
//! create table couple_schedules (
//!     couple_key text primary key,
//!     data jsonb not null,
//!     updated_at timestamptz not null default now()
//! );
//! ```
//!
//! The change feed polls the row and delivers the document whenever it
//! differs from the last one seen.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};
use url::Url;

use crate::error::{SyncError, SyncResult};
use crate::remote::{ChangeCallback, RemoteConfig, RemoteStore, Subscription};
use crate::schedule::ScheduleDocument;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq, Deserialize)]
struct Row {
    data: ScheduleDocument,
    #[serde(default)]
    updated_at: Option<String>,
}

#[derive(Serialize)]
struct RowUpsert<'a> {
    couple_key: &'a str,
    data: &'a ScheduleDocument,
    updated_at: String,
}

#[derive(Clone)]
pub struct RestRemote {
    client: reqwest::Client,
    endpoint: Url,
    poll_interval: Duration,
}

impl RestRemote {
    pub fn new(config: &RemoteConfig, poll_interval: Duration) -> SyncResult<Self> {
        let endpoint = table_endpoint(config)?;

        let mut headers = HeaderMap::new();
        let key = HeaderValue::from_str(&config.key)
            .map_err(|_| SyncError::Config("Remote key contains invalid characters".into()))?;
        let bearer = HeaderValue::from_str(&format!("Bearer {}", config.key))
            .map_err(|_| SyncError::Config("Remote key contains invalid characters".into()))?;
        headers.insert("apikey", key);
        headers.insert(AUTHORIZATION, bearer);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(RestRemote {
            client,
            endpoint,
            poll_interval,
        })
    }

    fn row_url(&self, couple_key: &str) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("couple_key", &format!("eq.{}", couple_key))
            .append_pair("select", "data,updated_at");
        url
    }

    fn upsert_url(&self) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut().append_pair("on_conflict", "couple_key");
        url
    }

    async fn fetch_row(&self, couple_key: &str) -> SyncResult<Option<Row>> {
        let response = self.client.get(self.row_url(couple_key)).send().await?;
        let response = check_status(response).await?;
        let rows: Vec<Row> = response.json().await?;
        Ok(rows.into_iter().next())
    }
}

#[async_trait]
impl RemoteStore for RestRemote {
    async fn fetch(&self, couple_key: &str) -> SyncResult<Option<ScheduleDocument>> {
        Ok(self.fetch_row(couple_key).await?.map(|row| row.data))
    }

    async fn upsert(&self, couple_key: &str, doc: &ScheduleDocument) -> SyncResult<()> {
        let body = [RowUpsert {
            couple_key,
            data: doc,
            updated_at: Utc::now().to_rfc3339(),
        }];

        let response = self
            .client
            .post(self.upsert_url())
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(&body)
            .send()
            .await?;
        check_status(response).await?;

        debug!(days = doc.len(), "upserted remote schedule");
        Ok(())
    }

    async fn subscribe(
        &self,
        couple_key: &str,
        on_change: ChangeCallback,
    ) -> SyncResult<Subscription> {
        // Baseline: only changes after subscribing are delivered
        let mut last_seen = self.fetch_row(couple_key).await?;

        let (subscription, sink) = Subscription::new(on_change);
        let remote = self.clone();
        let couple_key = couple_key.to_string();

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(remote.poll_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker.tick().await;

            loop {
                ticker.tick().await;
                if sink.is_closed() {
                    break;
                }

                match remote.fetch_row(&couple_key).await {
                    Ok(Some(row)) if last_seen.as_ref() != Some(&row) => {
                        last_seen = Some(row.clone());
                        if !sink.deliver(row.data) {
                            break;
                        }
                    }
                    Ok(_) => {}
                    Err(e) => warn!(error = %e, "remote change poll failed"),
                }
            }
        });
        subscription.attach(task);

        Ok(subscription)
    }
}

/// `<url>/rest/v1/<table>`
fn table_endpoint(config: &RemoteConfig) -> SyncResult<Url> {
    let mut url = Url::parse(&config.url)
        .map_err(|e| SyncError::Config(format!("Invalid remote URL '{}': {}", config.url, e)))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(SyncError::Config(format!(
            "Remote URL must be http(s), got '{}'",
            config.url
        )));
    }
    if config.table.is_empty() {
        return Err(SyncError::Config("Remote table name is empty".into()));
    }

    url.path_segments_mut()
        .map_err(|_| SyncError::Config(format!("Invalid remote URL '{}'", config.url)))?
        .pop_if_empty()
        .extend(["rest", "v1", config.table.as_str()]);
    url.set_query(None);

    Ok(url)
}

async fn check_status(response: reqwest::Response) -> SyncResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(SyncError::RemoteStatus {
        status: status.as_u16(),
        body,
    })
}
