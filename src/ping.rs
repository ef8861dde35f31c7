//! Best-effort discovery ping for new pages.
//!
//! When the authority site gains a page, a ping service is told about it.
//! The ping is fire-and-forget: it uses a short timeout and its failure never
//! affects the page that was just written.

use std::time::Duration;
use thiserror::Error;

const PING_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Error, Debug)]
pub enum PingError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("ping service returned {0}")]
    Status(reqwest::StatusCode),
}

/// Something that can be told a page exists.
pub trait DiscoveryPing {
    fn ping(&self, title: &str, url: &str) -> Result<(), PingError>;
}

/// Ping-o-Matic style GET endpoint.
pub struct HttpPinger {
    http: reqwest::blocking::Client,
    endpoint: String,
}

impl HttpPinger {
    pub fn new(endpoint: impl Into<String>) -> Result<Self, PingError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(PING_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            endpoint: endpoint.into(),
        })
    }
}

impl DiscoveryPing for HttpPinger {
    fn ping(&self, title: &str, url: &str) -> Result<(), PingError> {
        let response = self
            .http
            .get(&self.endpoint)
            .query(&[
                ("title", title),
                ("blogurl", url),
                ("chk_weblogscom", "on"),
                ("chk_blogs", "on"),
                ("chk_google", "on"),
            ])
            .send()?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(PingError::Status(status))
        }
    }
}

/// Stand-in used when pinging is disabled in config.
pub struct NoPing;

impl DiscoveryPing for NoPing {
    fn ping(&self, _title: &str, _url: &str) -> Result<(), PingError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_ping_always_succeeds() {
        assert!(NoPing.ping("Up", "https://a.test/movies/up-2009.html").is_ok());
    }

    #[test]
    fn http_pinger_builds_with_timeout() {
        let pinger = HttpPinger::new("http://ping.test/ping/").unwrap();
        assert_eq!(pinger.endpoint, "http://ping.test/ping/");
    }
}
