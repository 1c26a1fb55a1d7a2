use crate::scanner::ScanPlan;
use crate::types::{Config, ListSize, PortScope};
use crate::utils::duration_arg;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "sif",
    version,
    about = "A blazing-fast pentesting (recon/exploitation) suite",
    long_about = "sif runs concurrent enumeration modules against each target: robots.txt \
                  discovery, directory and subdomain brute force, port scanning, exposed .git \
                  discovery and subdomain takeover checks."
)]
pub struct Args {
    /// List of URLs to check (comma-separated)
    #[arg(short = 'u', long = "urls", value_name = "URL", value_delimiter = ',')]
    pub urls: Vec<String>,

    /// File that includes URLs to check
    #[arg(short = 'f', long = "file", value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Directory fuzzing scan size
    #[arg(long = "dirlist", value_enum)]
    pub dirlist: Option<ListSize>,

    /// DNS fuzzing scan size
    #[arg(long = "dnslist", value_enum)]
    pub dnslist: Option<ListSize>,

    /// Port scanning scope
    #[arg(long = "ports", value_enum)]
    pub ports: Option<PortScope>,

    /// Enable git repository scanning
    #[arg(long = "git")]
    pub git: bool,

    /// Enable C3 (cloud storage misconfiguration) scan
    #[arg(long = "c3")]
    pub cloudstorage: bool,

    /// Enable subdomain takeover check (requires --dnslist)
    #[arg(long = "st")]
    pub takeover: bool,

    /// Do not perform base URL (robots.txt, etc) scanning
    #[arg(long = "noscan")]
    pub noscan: bool,

    /// Enable debug logging
    #[arg(short = 'd', long = "debug")]
    pub debug: bool,

    /// HTTP request timeout (e.g. 10s, 500ms)
    #[arg(short = 't', long = "timeout", value_parser = duration_arg)]
    pub timeout: Option<Duration>,

    /// Directory to store logs in
    #[arg(short = 'l', long = "log", value_name = "DIR")]
    pub log_dir: Option<PathBuf>,

    /// Number of threads to run scans on
    #[arg(long = "threads")]
    pub threads: Option<usize>,

    /// Maximum candidates probed per second across all threads
    #[arg(long = "rate-limit")]
    pub rate_limit: Option<u32>,

    /// Hide progress bars
    #[arg(long = "no-progress")]
    pub no_progress: bool,

    /// Enable API mode: JSON results on stdout, errors only on stderr
    #[arg(long = "api")]
    pub api: bool,

    /// Configuration file path
    #[arg(short = 'c', long = "config")]
    pub config_path: Option<String>,
}

impl Args {
    /// Check if we should read targets from stdin
    pub fn use_stdin(&self) -> bool {
        self.urls.is_empty() && self.file.is_none() && !atty::is(atty::Stream::Stdin)
    }

    /// Applies flags that were given on the command line.
    pub fn apply(&self, config: &mut Config) {
        if let Some(threads) = self.threads {
            config.threads = threads;
        }
        if let Some(timeout) = self.timeout {
            config.timeout = timeout;
        }
        if let Some(dir) = &self.log_dir {
            config.log_dir = Some(dir.clone());
        }
        if let Some(rate) = self.rate_limit {
            config.rate_limit = Some(rate).filter(|r| *r > 0);
        }
        if self.no_progress || self.api {
            config.show_progress = false;
        }
    }

    pub fn plan(&self) -> ScanPlan {
        ScanPlan {
            base_scan: !self.noscan,
            dirlist: self.dirlist,
            dnslist: self.dnslist,
            ports: self.ports,
            git: self.git,
            cloudstorage: self.cloudstorage,
            takeover: self.takeover,
        }
    }
}
