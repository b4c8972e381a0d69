//! Reachability probe for http(s) repository URLs
//!
//! A dead server makes `svn` hang on its own timeouts and then trips the
//! rename-and-reclone fallback for nothing. Probing first lets the run skip
//! the entry and keep the existing working copy untouched.

use std::time::Duration;

use log::debug;
use url::Url;

use crate::error::{Error, Result};

/// Checks that a URL answers before any VCS command touches it.
pub trait Reachability: Send + Sync {
    fn check(&self, url: &str) -> Result<()>;
}

/// Sends a `HEAD` request with a short timeout.
///
/// Any HTTP answer counts as reachable, including 401 and 404: svn servers
/// routinely reject anonymous requests, and the checkout itself will report
/// real problems. Only transport failures (DNS, refused, timeout) fail.
/// Non-http URLs are not probed.
#[derive(Debug, Clone)]
pub struct HttpProbe {
    timeout: Duration,
}

impl HttpProbe {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Reachability for HttpProbe {
    fn check(&self, url: &str) -> Result<()> {
        let parsed = match Url::parse(url) {
            Ok(parsed) => parsed,
            Err(_) => return Ok(()),
        };
        if !matches!(parsed.scheme(), "http" | "https") {
            return Ok(());
        }

        debug!("probing {}", url);
        let result = ureq::builder()
            .timeout(self.timeout)
            .build()
            .head(url)
            .set("User-Agent", "gism")
            .call();

        match result {
            Ok(_) | Err(ureq::Error::Status(_, _)) => Ok(()),
            Err(ureq::Error::Transport(e)) => Err(Error::Unreachable {
                url: url.to_string(),
                message: e.to_string(),
            }),
        }
    }
}

/// Skips probing entirely (`--no-probe`).
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProbe;

impl Reachability for NoProbe {
    fn check(&self, _url: &str) -> Result<()> {
        Ok(())
    }
}
