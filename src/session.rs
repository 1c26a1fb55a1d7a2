// src/session.rs
use crate::types::{Config, SifError};
use reqwest::{redirect, Client};
use std::time::Duration;

/// Upper bound for downloading a whole wordlist. Lists can be tens of
/// megabytes, so the probe timeout does not apply to them.
const LIST_TIMEOUT: Duration = Duration::from_secs(300);

/// Shared HTTP state for one scan. Cheap to clone.
#[derive(Clone)]
pub struct Session {
    /// Probe client: redirects are never followed so 3xx stays observable.
    pub client: Client,
    /// Follows redirects like a browser would. Used for wordlists and for
    /// pages whose body matters more than their status.
    list_client: Client,
    timeout: Duration,
}

impl Session {
    pub fn new(config: &Config) -> Result<Self, SifError> {
        let client = Self::builder(config)?
            .timeout(config.timeout)
            .redirect(redirect::Policy::none())
            .build()
            .map_err(|e| SifError::Config(format!("Failed to build HTTP client: {}", e)))?;

        let list_client = Self::builder(config)?
            .timeout(LIST_TIMEOUT.max(config.timeout))
            .build()
            .map_err(|e| SifError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Session {
            client,
            list_client,
            timeout: config.timeout,
        })
    }

    fn builder(config: &Config) -> Result<reqwest::ClientBuilder, SifError> {
        let mut client_builder = Client::builder()
            .connect_timeout(config.timeout)
            .user_agent(&config.user_agent)
            .gzip(true)
            .deflate(true)
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(config.threads.max(1));

        // Only an explicitly configured proxy is used, never HTTP_PROXY & co.
        client_builder = match &config.proxy {
            Some(proxy_url) => {
                let proxy = reqwest::Proxy::all(proxy_url)
                    .map_err(|e| SifError::Config(format!("Invalid proxy URL: {}", e)))?;
                client_builder.proxy(proxy)
            }
            None => client_builder.no_proxy(),
        };

        for (host, addr) in &config.resolve {
            client_builder = client_builder.resolve(host, *addr);
        }

        Ok(client_builder)
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Single GET with an explicit deadline. Never follows redirects.
    pub async fn get(&self, url: &str, timeout: Duration) -> Result<reqwest::Response, SifError> {
        self.send(url, timeout)
            .await
            .map_err(|e| SifError::Network(e.to_string()))
    }

    /// Like [`Session::get`] but keeps the transport error for inspection.
    pub async fn send(
        &self,
        url: &str,
        timeout: Duration,
    ) -> Result<reqwest::Response, reqwest::Error> {
        self.client.get(url).timeout(timeout).send().await
    }

    /// GET with an explicit deadline that follows redirects to the final page.
    pub async fn follow(
        &self,
        url: &str,
        timeout: Duration,
    ) -> Result<reqwest::Response, reqwest::Error> {
        self.list_client.get(url).timeout(timeout).send().await
    }

    /// Downloads a text document (wordlists). Non-2xx statuses are errors.
    pub async fn fetch_text(&self, url: &str) -> Result<String, SifError> {
        let response = self
            .list_client
            .get(url)
            .send()
            .await
            .map_err(|e| SifError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(SifError::Network(format!(
                "HTTP error: {}",
                response.status()
            )));
        }

        response
            .text()
            .await
            .map_err(|e| SifError::Network(e.to_string()))
    }
}
