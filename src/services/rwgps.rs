// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Ride with GPS API client for fetching trips.
//!
//! Handles:
//! - Auth token exchange from email/password
//! - Paged trip listing with `meta.pagination` discovery
//! - Incremental fetch of rides newer than the cache
//! - Retry with exponential backoff on 429/5xx and transport errors

use indicatif::{ProgressBar, ProgressStyle};
use serde_json::Value;
use std::collections::HashSet;
use std::time::Duration;

use crate::error::{AppError, Result};
use crate::models::ride::Ride;

/// Trips requested per page.
pub const PER_PAGE: u32 = 50;
/// Upper bound on pages fetched by [`RwgpsClient::get_all_trips`].
pub const MAX_PAGES: u32 = 500;
/// Pages scanned when looking for rides newer than the cache.
pub const MAX_MISSING_PAGES: u32 = 10;

const MAX_RETRIES: u32 = 3;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Pause between page requests to stay under the rate limit.
const PAGE_DELAY: Duration = Duration::from_secs(1);
const API_KEY_HEADER: &str = "x-rwgps-api-key";
const AUTH_TOKEN_HEADER: &str = "x-rwgps-auth-token";

/// RWGPS API client.
#[derive(Clone)]
pub struct RwgpsClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    auth_token: Option<String>,
    show_progress: bool,
}

impl RwgpsClient {
    /// Create a client without an auth token.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();

        Self {
            http,
            base_url: base_url.into(),
            api_key: api_key.into(),
            auth_token: None,
            show_progress: true,
        }
    }

    /// Use an existing auth token for trip requests.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    /// Show progress bars on stderr while fetching.
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Exchange email and password for an auth token.
    ///
    /// POST {base}/auth_tokens.json
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<String> {
        let url = format!("{}/auth_tokens.json", self.base_url);
        let body = serde_json::json!({
            "user": { "email": email, "password": password }
        });

        tracing::info!(email, "Requesting RWGPS auth token");
        let request = self
            .http
            .post(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&body);
        let response = self.send_with_retry(request).await?;

        if response.status().as_u16() == 401 {
            tracing::warn!("RWGPS rejected email or password");
            return Err(AppError::Unauthorized);
        }

        let data: Value = check_response_json(response).await?;
        extract_auth_token(&data).ok_or_else(|| {
            AppError::RwgpsApi(format!(
                "Unexpected auth response format: keys {:?}",
                object_keys(&data)
            ))
        })
    }

    /// Most recent trip, if the account has any.
    pub async fn get_latest_trip(&self) -> Result<Option<Ride>> {
        let body = self.fetch_trips_body(1, 1).await?;
        Ok(extract_trips(body).into_iter().next())
    }

    /// One page of trips, newest first.
    pub async fn get_trips_page(&self, page: u32) -> Result<Vec<Ride>> {
        tokio::time::sleep(PAGE_DELAY).await;
        let body = self.fetch_trips_body(page, PER_PAGE).await?;
        Ok(extract_trips(body))
    }

    /// Every trip on the account.
    ///
    /// Pages that fail after retries are logged and skipped; an empty page
    /// ends the listing early.
    pub async fn get_all_trips(&self) -> Result<Vec<Ride>> {
        let body = self.fetch_trips_body(1, PER_PAGE).await?;
        let pagination = Pagination::from_body(&body);
        let mut all_trips = extract_trips(body);

        let total_rides = pagination.record_count.unwrap_or(all_trips.len() as u64);
        let total_pages = pagination.total_pages(all_trips.len());
        tracing::info!(total_rides, total_pages, "Fetching rides");
        log_available_fields(&all_trips);

        let progress = self.progress_bar(Some(total_rides), "Retrieving rides");
        progress.inc(all_trips.len() as u64);

        for page in 2..=total_pages.min(MAX_PAGES - 1) {
            match self.get_trips_page(page).await {
                Ok(trips) if trips.is_empty() => {
                    tracing::warn!(page, "No trips returned, stopping early");
                    break;
                }
                Ok(trips) => {
                    progress.inc(trips.len() as u64);
                    all_trips.extend(trips);
                }
                Err(e) if e.is_rwgps_token_error() => return Err(e),
                Err(e) if e.is_rate_limited() => {
                    tracing::warn!(page, "Still rate limited after retries, stopping early");
                    break;
                }
                Err(e) => {
                    tracing::error!(page, error = %e, "Failed to fetch page");
                    continue;
                }
            }
        }
        progress.finish_and_clear();

        if total_rides > 0 && (all_trips.len() as u64) < total_rides {
            tracing::warn!(
                expected = total_rides,
                retrieved = all_trips.len(),
                "Fewer rides retrieved than reported"
            );
        }
        tracing::info!(count = all_trips.len(), "Retrieved rides");
        Ok(all_trips)
    }

    /// Trips newer than anything in `cached`, newest first.
    ///
    /// Scans at most [`MAX_MISSING_PAGES`] pages and stops at the first page
    /// that reaches an already-cached ride.
    pub async fn get_missing_trips(&self, cached: &[Ride], latest: &Ride) -> Result<Vec<Ride>> {
        let Some(newest_cached) = cached.iter().filter_map(|r| r.id).max() else {
            return self.get_all_trips().await;
        };
        if latest.id.is_none_or(|id| id <= newest_cached) {
            return Ok(Vec::new());
        }

        let cached_ids: HashSet<u64> = cached.iter().filter_map(|r| r.id).collect();
        let progress = self.progress_bar(None, "Fetching new rides");
        let mut missing = Vec::new();

        for page in 1..=MAX_MISSING_PAGES {
            let trips = match self.get_trips_page(page).await {
                Ok(trips) => trips,
                Err(e) if e.is_rwgps_token_error() => return Err(e),
                Err(e) => {
                    tracing::error!(page, error = %e, "Error fetching new rides");
                    break;
                }
            };
            if trips.is_empty() {
                break;
            }

            let reached_cache = trips
                .iter()
                .any(|t| t.id.is_some_and(|id| id <= newest_cached));
            let new: Vec<Ride> = trips
                .into_iter()
                .filter(|t| t.id.is_none_or(|id| !cached_ids.contains(&id)))
                .collect();
            progress.inc(new.len() as u64);
            missing.extend(new);

            if reached_cache {
                break;
            }
        }
        progress.finish_and_clear();

        tracing::info!(count = missing.len(), "Fetched new rides");
        Ok(missing)
    }

    async fn fetch_trips_body(&self, page: u32, per_page: u32) -> Result<Value> {
        let token = self.auth_token.as_deref().ok_or(AppError::Unauthorized)?;
        let url = format!("{}/trips.json", self.base_url);

        let request = self
            .http
            .get(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .header(AUTH_TOKEN_HEADER, token)
            .query(&[
                ("page", page.to_string()),
                ("version", "2".to_string()),
                ("per_page", per_page.to_string()),
                ("sub_format", "detail".to_string()),
            ]);

        let response = self.send_with_retry(request).await?;
        check_response_json(response).await
    }

    /// Send a request, retrying transient failures with backoff (1s, 2s, 4s).
    ///
    /// The final response is returned even if its status is an error, so the
    /// caller can map it.
    async fn send_with_retry(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response> {
        let mut attempt = 0;
        loop {
            let this_try = request
                .try_clone()
                .ok_or_else(|| AppError::RwgpsApi("Request body cannot be retried".to_string()))?;

            match this_try.send().await {
                Ok(response) if is_retryable(response.status()) && attempt < MAX_RETRIES => {
                    tracing::warn!(
                        status = response.status().as_u16(),
                        attempt = attempt + 1,
                        "Retrying RWGPS request"
                    );
                }
                Ok(response) => return Ok(response),
                Err(e) if attempt < MAX_RETRIES => {
                    tracing::warn!(error = %e, attempt = attempt + 1, "Retrying RWGPS request");
                }
                Err(e) => return Err(AppError::RwgpsApi(e.to_string())),
            }

            tokio::time::sleep(backoff(attempt)).await;
            attempt += 1;
        }
    }

    fn progress_bar(&self, total: Option<u64>, message: &'static str) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }
        let pb = match total {
            Some(total) => {
                let pb = ProgressBar::new(total);
                pb.set_style(
                    ProgressStyle::default_bar()
                        .template("{msg} [{bar:40.cyan/blue}] {pos}/{len} rides")
                        .unwrap_or_else(|_| ProgressStyle::default_bar()),
                );
                pb
            }
            None => {
                let pb = ProgressBar::new_spinner();
                pb.set_style(
                    ProgressStyle::default_spinner()
                        .template("{spinner:.cyan} {msg}: {pos} rides")
                        .unwrap_or_else(|_| ProgressStyle::default_spinner()),
                );
                pb
            }
        };
        pb.set_message(message);
        pb
    }
}

/// Check response status and parse the JSON body.
async fn check_response_json(response: reqwest::Response) -> Result<Value> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();

        if status.as_u16() == 429 {
            tracing::warn!("RWGPS rate limit hit (429)");
            return Err(AppError::RwgpsApi(AppError::RWGPS_RATE_LIMIT.to_string()));
        }
        if status.as_u16() == 401 {
            return Err(AppError::RwgpsApi(AppError::RWGPS_TOKEN_ERROR.to_string()));
        }
        return Err(AppError::RwgpsApi(format!("HTTP {}: {}", status, body)));
    }

    response
        .json()
        .await
        .map_err(|e| AppError::RwgpsApi(format!("JSON parse error: {}", e)))
}

fn is_retryable(status: reqwest::StatusCode) -> bool {
    status.as_u16() == 429 || status.is_server_error()
}

/// Delay before retry number `attempt + 1`.
fn backoff(attempt: u32) -> Duration {
    Duration::from_secs(1u64 << attempt.min(6))
}

/// Pagination metadata from the first page of `trips.json`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Pagination {
    pub record_count: Option<u64>,
    pub page_count: Option<u32>,
}

impl Pagination {
    pub fn from_body(body: &Value) -> Self {
        let pagination = body.pointer("/meta/pagination");
        Self {
            record_count: pagination
                .and_then(|p| p.get("record_count"))
                .and_then(Value::as_u64),
            page_count: pagination
                .and_then(|p| p.get("page_count"))
                .and_then(Value::as_u64)
                .map(|n| n as u32),
        }
    }

    /// Pages to request: the larger of what `record_count` implies at
    /// [`PER_PAGE`] and the reported `page_count`, at least 1.
    pub fn total_pages(&self, first_page_len: usize) -> u32 {
        let records = self.record_count.unwrap_or(first_page_len as u64);
        let by_records = if records > 0 {
            records.div_ceil(u64::from(PER_PAGE)) as u32
        } else {
            1
        };
        by_records.max(self.page_count.unwrap_or(1)).max(1)
    }
}

/// Trips from a `trips.json` body: `{trips: [...]}`, `{results: [...]}` or a
/// bare list. Entries that do not look like trips are skipped.
pub fn extract_trips(body: Value) -> Vec<Ride> {
    let items = match body {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("trips").or_else(|| map.remove("results")) {
            Some(Value::Array(items)) => items,
            _ => {
                tracing::warn!(keys = ?map.keys().collect::<Vec<_>>(), "No trips in response");
                Vec::new()
            }
        },
        _ => Vec::new(),
    };

    items
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<Ride>(item) {
            Ok(ride) => Some(ride),
            Err(e) => {
                tracing::warn!(error = %e, "Skipping malformed trip");
                None
            }
        })
        .collect()
}

/// Auth token from `{auth_token: {auth_token: "..."}}` or `{auth_token: "..."}`.
pub fn extract_auth_token(body: &Value) -> Option<String> {
    match body.get("auth_token")? {
        Value::String(token) => Some(token.clone()),
        Value::Object(inner) => inner
            .get("auth_token")
            .and_then(Value::as_str)
            .map(str::to_string),
        _ => None,
    }
}

fn object_keys(value: &Value) -> Vec<String> {
    value
        .as_object()
        .map(|m| m.keys().cloned().collect())
        .unwrap_or_default()
}

fn log_available_fields(trips: &[Ride]) {
    let mut fields: Vec<&str> = trips
        .iter()
        .take(3)
        .flat_map(|t| t.extra.keys().map(String::as_str))
        .collect();
    fields.sort_unstable();
    fields.dedup();
    tracing::debug!(?fields, "Extra trip fields");
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_trips_shapes() {
        let trips = json!([{"id": 1}, {"id": 2}]);
        assert_eq!(extract_trips(trips).len(), 2);

        let wrapped = json!({"trips": [{"id": 1, "distance": 1000.0}], "meta": {}});
        let rides = extract_trips(wrapped);
        assert_eq!(rides[0].id, Some(1));

        let results = json!({"results": [{"id": 3}]});
        assert_eq!(extract_trips(results)[0].id, Some(3));

        assert!(extract_trips(json!({"error": "nope"})).is_empty());
        assert!(extract_trips(json!("unexpected")).is_empty());
    }

    #[test]
    fn test_extract_trips_skips_malformed_entries() {
        let body = json!({"trips": [{"id": 1}, "not a trip", {"id": 2, "name": 5}]});
        let rides = extract_trips(body);
        assert_eq!(rides.len(), 1);
        assert_eq!(rides[0].id, Some(1));
    }

    #[test]
    fn test_extract_auth_token() {
        assert_eq!(
            extract_auth_token(&json!({"auth_token": {"auth_token": "abc"}})),
            Some("abc".to_string())
        );
        assert_eq!(
            extract_auth_token(&json!({"auth_token": "xyz"})),
            Some("xyz".to_string())
        );
        assert_eq!(extract_auth_token(&json!({"user": {}})), None);
        assert_eq!(extract_auth_token(&json!({"auth_token": 42})), None);
    }

    #[test]
    fn test_pagination_prefers_larger_page_count() {
        let body = json!({"meta": {"pagination": {"record_count": 120, "page_count": 2}}});
        let pagination = Pagination::from_body(&body);
        assert_eq!(pagination.record_count, Some(120));
        // 120 rides at 50 per page is 3 pages even if the API says 2.
        assert_eq!(pagination.total_pages(50), 3);

        let body = json!({"meta": {"pagination": {"record_count": 10, "page_count": 4}}});
        assert_eq!(Pagination::from_body(&body).total_pages(10), 4);
    }

    #[test]
    fn test_pagination_without_meta() {
        let pagination = Pagination::from_body(&json!({"trips": []}));
        assert_eq!(pagination, Pagination::default());
        assert_eq!(pagination.total_pages(0), 1);
        assert_eq!(pagination.total_pages(50), 1);
    }

    #[test]
    fn test_backoff_doubles() {
        assert_eq!(backoff(0), Duration::from_secs(1));
        assert_eq!(backoff(1), Duration::from_secs(2));
        assert_eq!(backoff(2), Duration::from_secs(4));
    }

    #[test]
    fn test_retryable_statuses() {
        assert!(is_retryable(reqwest::StatusCode::TOO_MANY_REQUESTS));
        assert!(is_retryable(reqwest::StatusCode::BAD_GATEWAY));
        assert!(!is_retryable(reqwest::StatusCode::UNAUTHORIZED));
        assert!(!is_retryable(reqwest::StatusCode::OK));
    }

    #[tokio::test]
    async fn test_trip_requests_require_token() {
        let client = RwgpsClient::new("http://127.0.0.1:9", "key").with_progress(false);
        assert!(matches!(
            client.get_latest_trip().await,
            Err(AppError::Unauthorized)
        ));
    }
}
