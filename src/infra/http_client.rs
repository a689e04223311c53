use crate::config::HttpConfig;
use crate::error::{PrepError, Result};
use std::time::Duration;
use tracing::{debug, warn};

const MAX_BACKOFF: Duration = Duration::from_secs(60);

/// Blocking-in-sequence GET helper shared by the remote readers.
///
/// Transport errors and 5xx responses are retried up to `max_retries` times with
/// exponential backoff; other non-success statuses fail immediately.
#[derive(Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    max_retries: u32,
    backoff: Duration,
}

impl HttpFetcher {
    pub fn new(config: &HttpConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self {
            client,
            max_retries: config.max_retries,
            backoff: Duration::from_millis(config.backoff_ms),
        })
    }

    pub async fn get_text(
        &self,
        source_name: &str,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<String> {
        let mut attempt = 0u32;
        loop {
            match self.try_get(url, query).await {
                Ok(body) => {
                    debug!(source = source_name, bytes = body.len(), "fetched {}", url);
                    return Ok(body);
                }
                Err(Attempt::Fatal(reason)) => {
                    return Err(PrepError::source_unavailable(source_name, reason));
                }
                Err(Attempt::Retryable(reason)) if attempt < self.max_retries => {
                    let delay = backoff_delay(self.backoff, attempt);
                    warn!(
                        source = source_name,
                        attempt = attempt + 1,
                        "request failed ({}), retrying in {:?}",
                        reason,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(Attempt::Retryable(reason)) => {
                    return Err(PrepError::source_unavailable(
                        source_name,
                        format!("{} (after {} retries)", reason, attempt),
                    ));
                }
            }
        }
    }

    async fn try_get(&self, url: &str, query: &[(&str, String)]) -> std::result::Result<String, Attempt> {
        let resp = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| Attempt::Retryable(e.to_string()))?;
        let status = resp.status();
        if status.is_server_error() {
            return Err(Attempt::Retryable(format!("HTTP {}", status.as_u16())));
        }
        if !status.is_success() {
            return Err(Attempt::Fatal(format!("HTTP {}", status.as_u16())));
        }
        resp.text().await.map_err(|e| Attempt::Retryable(e.to_string()))
    }
}

/// Exponential delay for the given retry, capped at `MAX_BACKOFF`.
fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    base.saturating_mul(2u32.saturating_pow(attempt)).min(MAX_BACKOFF)
}

enum Attempt {
    Retryable(String),
    Fatal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_doubles_then_caps() {
        let base = Duration::from_millis(500);
        assert_eq!(backoff_delay(base, 0), Duration::from_millis(500));
        assert_eq!(backoff_delay(base, 2), Duration::from_secs(2));
        assert_eq!(backoff_delay(base, 40), MAX_BACKOFF);
        assert_eq!(backoff_delay(Duration::MAX, u32::MAX), MAX_BACKOFF);
    }
}
