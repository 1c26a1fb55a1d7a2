// src/types.rs
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use url::{Host, Url};

pub const RUNTIME_BASE: &str = "https://raw.githubusercontent.com/dropalldatabases/sif-runtime/main";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub threads: usize,
    pub timeout: Duration,
    pub log_dir: Option<PathBuf>,
    pub user_agent: String,
    pub proxy: Option<String>,
    /// Candidates per second shared by every lane; `None` disables throttling.
    pub rate_limit: Option<u32>,
    pub wordlists: WordlistConfig,
    /// Static host overrides, e.g. `www.example.test -> 127.0.0.1:8080`.
    pub resolve: HashMap<String, SocketAddr>,
    /// Empty means the system resolver configuration.
    pub nameservers: Vec<String>,
    /// Base of virtual-hosted bucket URLs for the cloud storage check.
    pub s3_endpoint: String,
    pub show_progress: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            threads: 10,
            timeout: Duration::from_secs(10),
            log_dir: None,
            user_agent: format!("{}/{}", crate::NAME, crate::VERSION),
            proxy: None,
            rate_limit: None,
            wordlists: WordlistConfig::default(),
            resolve: HashMap::new(),
            nameservers: Vec::new(),
            s3_endpoint: crate::probes::DEFAULT_S3_ENDPOINT.to_string(),
            show_progress: true,
        }
    }
}

/// Where each module pulls its candidate list from. A value is either an
/// `http(s)://` prefix or a local directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WordlistConfig {
    pub dirlist: String,
    pub dnslist: String,
    pub ports: String,
    pub git: String,
}

impl Default for WordlistConfig {
    fn default() -> Self {
        Self {
            dirlist: format!("{}/dirlist/", RUNTIME_BASE),
            dnslist: format!("{}/dnslist/", RUNTIME_BASE),
            ports: format!("{}/ports/", RUNTIME_BASE),
            git: format!("{}/git/", RUNTIME_BASE),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ListSize {
    Small,
    Medium,
    Large,
}

impl ListSize {
    pub fn dirlist_file(self) -> &'static str {
        match self {
            ListSize::Small => "directory-list-2.3-small.txt",
            ListSize::Medium => "directory-list-2.3-medium.txt",
            ListSize::Large => "directory-list-2.3-big.txt",
        }
    }

    pub fn dnslist_file(self) -> &'static str {
        match self {
            ListSize::Small => "subdomains-100.txt",
            ListSize::Medium => "subdomains-1000.txt",
            ListSize::Large => "subdomains-10000.txt",
        }
    }
}

impl fmt::Display for ListSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ListSize::Small => "small",
            ListSize::Medium => "medium",
            ListSize::Large => "large",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PortScope {
    Common,
    Full,
}

impl fmt::Display for PortScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortScope::Common => f.write_str("common"),
            PortScope::Full => f.write_str("full"),
        }
    }
}

/// A validated scan target. Always carries an explicit scheme and a host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    raw: String,
    url: Url,
    host: String,
}

impl Target {
    pub fn parse(input: &str) -> Result<Self, SifError> {
        let trimmed = input.trim();
        if !trimmed.contains("://") {
            return Err(SifError::InvalidTarget(format!(
                "URL {} must include leading protocol",
                trimmed
            )));
        }

        let url = Url::parse(trimmed)
            .map_err(|e| SifError::InvalidTarget(format!("{}: {}", trimmed, e)))?;

        let host = match url.host() {
            Some(Host::Domain(domain)) => domain.to_string(),
            Some(Host::Ipv4(addr)) => addr.to_string(),
            Some(Host::Ipv6(addr)) => addr.to_string(),
            None => {
                return Err(SifError::InvalidTarget(format!("{}: missing host", trimmed)));
            }
        };

        Ok(Self {
            raw: trimmed.trim_end_matches('/').to_string(),
            url,
            host,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Bare host, suitable for dialing (IPv6 without brackets).
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Port given explicitly in the target URL, if any.
    pub fn port(&self) -> Option<u16> {
        self.url.port()
    }

    /// Host plus explicit port, as it appears in a URL.
    pub fn authority(&self) -> String {
        let host = self.url.host_str().unwrap_or(&self.host);
        match self.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        }
    }

    /// Target with the scheme stripped.
    pub fn sanitized(&self) -> &str {
        self.raw
            .split_once("://")
            .map(|(_, rest)| rest)
            .unwrap_or(&self.raw)
    }

    /// Appends a candidate path to the target base.
    pub fn join(&self, candidate: &str) -> String {
        format!("{}/{}", self.raw, candidate.trim_start_matches('/'))
    }

    pub fn log_file_name(&self) -> String {
        let name: String = self
            .sanitized()
            .chars()
            .map(|c| match c {
                '/' | '\\' | ':' | '?' | '*' | '"' | '<' | '>' | '|' => '_',
                c => c,
            })
            .collect();
        format!("{}.log", name)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Classification {
    Status { code: u16 },
    Reachable { scheme: String, code: u16 },
    PortOpen,
    PortClosed,
    Takeover { service: String },
    NotVulnerable,
    NoResponse,
}

/// Result of probing one candidate against one target.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Outcome {
    pub candidate: String,
    pub matched: bool,
    pub classification: Classification,
    /// Final URL or `host:port` the probe talked to.
    pub resolved: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<String>,
}

impl Outcome {
    pub fn hit(
        candidate: &str,
        classification: Classification,
        resolved: impl Into<String>,
    ) -> Self {
        Self {
            candidate: candidate.to_string(),
            matched: true,
            classification,
            resolved: resolved.into(),
            error: None,
        }
    }

    pub fn miss(
        candidate: &str,
        classification: Classification,
        resolved: impl Into<String>,
    ) -> Self {
        Self {
            candidate: candidate.to_string(),
            matched: false,
            classification,
            resolved: resolved.into(),
            error: None,
        }
    }

    pub fn failed(candidate: &str, resolved: impl Into<String>, error: impl fmt::Display) -> Self {
        Self {
            candidate: candidate.to_string(),
            matched: false,
            classification: Classification::NoResponse,
            resolved: resolved.into(),
            error: Some(error.to_string()),
        }
    }
}

/// Matched outcomes of one probe run against one target.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResultSet {
    pub probe: String,
    pub target: String,
    pub outcomes: Vec<Outcome>,
    /// Outcomes observed across all lanes, matched or not.
    pub probed: usize,
    /// Outcomes that carried a transport error.
    pub failed: usize,
}

impl ResultSet {
    pub fn new(probe: &str, target: &Target) -> Self {
        Self {
            probe: probe.to_string(),
            target: target.to_string(),
            ..Default::default()
        }
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn candidates(&self) -> HashSet<&str> {
        self.outcomes.iter().map(|o| o.candidate.as_str()).collect()
    }

    pub fn resolved(&self) -> Vec<String> {
        self.outcomes.iter().map(|o| o.resolved.clone()).collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleResult {
    pub id: String,
    pub data: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    pub url: String,
    pub results: Vec<ModuleResult>,
}

#[derive(Debug, Error)]
pub enum SifError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid target: {0}")]
    InvalidTarget(String),

    #[error("Failed to load {source_name} list: {message}")]
    Load {
        source_name: String,
        message: String,
    },

    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Resolution error: {0}")]
    Resolution(String),

    #[error("Output error: {0}")]
    Output(String),

    #[error("Unknown error: {0}")]
    Unknown(#[from] anyhow::Error),
}
