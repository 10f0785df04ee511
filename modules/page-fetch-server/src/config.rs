use std::env;
use std::time::Duration;

use anyhow::{Context, Result};
use page_fetcher::{DomainMappings, TransportOptions, DEFAULT_USER_AGENT, DOMAIN_MAPPINGS_ENV};

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // Web server
    pub web_host: String,
    pub web_port: u16,

    // Fetching
    pub domain_mappings: DomainMappings,
    pub user_agent: String,
    pub fetch_timeout: Option<Duration>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key -> value source. Every variable is optional.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let web_port = match lookup("WEB_PORT") {
            Some(port) => port.parse::<u16>().context("WEB_PORT must be a number")?,
            None => 3000,
        };
        let fetch_timeout = match lookup("FETCH_TIMEOUT_SECS") {
            Some(secs) => Some(Duration::from_secs(
                secs.parse::<u64>().context("FETCH_TIMEOUT_SECS must be a number")?,
            )),
            None => None,
        };

        Ok(Self {
            web_host: lookup("WEB_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            web_port,
            domain_mappings: lookup(DOMAIN_MAPPINGS_ENV)
                .map(|value| DomainMappings::parse(&value))
                .unwrap_or_default(),
            user_agent: lookup("FETCH_USER_AGENT")
                .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
            fetch_timeout,
        })
    }

    pub fn transport_options(&self) -> TransportOptions {
        TransportOptions {
            user_agent: self.user_agent.clone(),
            timeout: self.fetch_timeout,
            ..TransportOptions::default()
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.web_host, self.web_port)
    }
}
