//! `HttpTransport`: dials the routes of §6 over `reqwest`, with a
//! mandatory per-call timeout (§5 design default: 100ms) so a node lock
//! held across an outgoing RPC can never block indefinitely.

use async_trait::async_trait;
use corelib::error::{Error, Result};
use corelib::ring::RingId;
use corelib::transport::{Chain, ContentBatch, Transport};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;

/// Default per-RPC timeout (§5).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(100);

pub struct HttpTransport {
    client: Client,
    timeout: Duration,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self { client: Client::new(), timeout }
    }

    fn url(&self, host: &str, path: &str) -> String {
        format!("http://{host}{path}")
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, host: &str, path: &str) -> Result<T> {
        let resp = self
            .client
            .get(self.url(host, path))
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| Error::Unreachable(format!("{host}{path}: {e}")))?;
        self.decode_ok(host, path, resp).await
    }

    async fn get_status_only(&self, host: &str, path: &str) -> Result<StatusCode> {
        let resp = self
            .client
            .get(self.url(host, path))
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| Error::Unreachable(format!("{host}{path}: {e}")))?;
        Ok(resp.status())
    }

    async fn decode_ok<T: serde::de::DeserializeOwned>(
        &self,
        host: &str,
        path: &str,
        resp: reqwest::Response,
    ) -> Result<T> {
        let status = resp.status();
        if status.is_success() {
            resp.json::<T>()
                .await
                .map_err(|e| Error::Unreachable(format!("{host}{path}: bad response body: {e}")))
        } else {
            Err(status_to_error(status, path))
        }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

/// Maps a non-2xx HTTP status (§7) back onto the domain error it
/// represents, so a forwarded replicated operation's fallthrough logic
/// sees the same `Error` variant whether the owner was local or remote.
fn status_to_error(status: StatusCode, path: &str) -> Error {
    match status {
        StatusCode::NOT_FOUND => Error::NotFound(path.to_string()),
        StatusCode::CONFLICT => Error::Duplicate(path.to_string()),
        StatusCode::BAD_REQUEST => Error::InvalidRequest(path.to_string()),
        _ => Error::Unreachable(format!("{path}: http {status}")),
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn probe(&self, host: &str) -> Result<()> {
        let status = self.get_status_only(host, "/").await?;
        if status.is_success() {
            Ok(())
        } else {
            Err(Error::Unreachable(format!("{host}: http {status}")))
        }
    }

    async fn lookup(&self, host: &str, key: RingId) -> Result<Chain> {
        self.get_json(host, &format!("/lookup/{}", key.0)).await
    }

    async fn predecessor(&self, host: &str) -> Result<String> {
        self.get_json(host, "/predecessor").await
    }

    async fn update_predecessor(&self, host: &str, new_predecessor: &str) -> Result<()> {
        self.get_status_only(host, &format!("/update_predecessor/{new_predecessor}"))
            .await
            .and_then(|status| {
                if status.is_success() {
                    Ok(())
                } else {
                    Err(status_to_error(status, "/update_predecessor"))
                }
            })
    }

    async fn content(&self, host: &str, a: RingId, b: RingId) -> Result<ContentBatch> {
        self.get_json(host, &format!("/content/{}/{}", a.0, b.0)).await
    }

    async fn delete(&self, host: &str, a: RingId, b: RingId) -> Result<()> {
        let status = self.get_status_only(host, &format!("/delete/{}/{}", a.0, b.0)).await?;
        if status.is_success() {
            Ok(())
        } else {
            Err(status_to_error(status, "/delete"))
        }
    }

    async fn network(&self, host: &str) -> Result<Vec<(RingId, String)>> {
        let peers: std::collections::BTreeMap<String, String> = self.get_json(host, "/network").await?;
        Ok(peers
            .into_iter()
            .filter_map(|(id, host)| id.parse::<u64>().ok().map(|id| (RingId(id), host)))
            .collect())
    }

    async fn exists(&self, host: &str, path: &str, n: u32) -> Result<bool> {
        self.get_json(host, &format!("/exists{path}/{n}")).await
    }

    async fn get(&self, host: &str, path: &str, n: u32) -> Result<Value> {
        self.get_json(host, &format!("/get{path}/{n}")).await
    }

    async fn put(&self, host: &str, path: &str, value: Value, n: u32) -> Result<()> {
        let status = self
            .client
            .post(self.url(host, &format!("/put{path}/{n}")))
            .timeout(self.timeout)
            .json(&value)
            .send()
            .await
            .map_err(|e| Error::Unreachable(format!("{host}/put{path}: {e}")))?
            .status();
        if status.is_success() {
            Ok(())
        } else {
            Err(status_to_error(status, path))
        }
    }

    async fn remove(&self, host: &str, path: &str, n: u32) -> Result<Value> {
        self.get_json(host, &format!("/remove{path}/{n}")).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping_matches_error_table() {
        assert!(matches!(status_to_error(StatusCode::NOT_FOUND, "/p"), Error::NotFound(_)));
        assert!(matches!(status_to_error(StatusCode::CONFLICT, "/p"), Error::Duplicate(_)));
        assert!(matches!(status_to_error(StatusCode::BAD_REQUEST, "/p"), Error::InvalidRequest(_)));
        assert!(matches!(
            status_to_error(StatusCode::INTERNAL_SERVER_ERROR, "/p"),
            Error::Unreachable(_)
        ));
    }

    #[tokio::test]
    async fn default_timeout_matches_design_default() {
        let t = HttpTransport::new();
        assert_eq!(t.timeout, DEFAULT_TIMEOUT);
    }
}
