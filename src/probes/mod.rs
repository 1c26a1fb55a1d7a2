// src/probes/mod.rs
use crate::types::{Classification, Outcome, Target};
use async_trait::async_trait;
use std::time::Duration;

mod cloud;
mod directory;
mod git;
mod ports;
mod subdomain;
mod takeover;

pub use cloud::{CloudStorageProbe, DEFAULT_S3_ENDPOINT};
pub use directory::DirectoryProbe;
pub use git::GitProbe;
pub use ports::PortProbe;
pub use subdomain::SubdomainProbe;
pub use takeover::{TakeoverProbe, FINGERPRINTS};

/// Tests one candidate against a target and classifies what came back.
///
/// Implementations must return within `timeout` and must never treat a
/// transport failure as fatal: it becomes an unmatched outcome with `error`
/// set. Most probes yield one outcome per candidate; the subdomain probe
/// yields one per scheme.
#[async_trait]
pub trait Probe: Send + Sync {
    /// Display name used in console and file logs.
    fn name(&self) -> &str;

    async fn probe(&self, target: &Target, candidate: &str, timeout: Duration) -> Vec<Outcome>;

    /// One-line description of a matched outcome.
    fn render(&self, outcome: &Outcome) -> String {
        match &outcome.classification {
            Classification::Status { code } => format!("{} [{}]", code, outcome.candidate),
            Classification::Reachable { scheme, .. } => {
                format!("[{}] {}", scheme, outcome.resolved)
            }
            Classification::PortOpen | Classification::PortClosed => {
                format!("[tcp] {}", outcome.resolved)
            }
            Classification::Takeover { service } => {
                format!("Potential subdomain takeover: {} ({})", outcome.candidate, service)
            }
            Classification::NotVulnerable | Classification::NoResponse => {
                outcome.candidate.clone()
            }
        }
    }
}
