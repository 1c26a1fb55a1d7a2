// src/probes/subdomain.rs
use crate::probes::Probe;
use crate::session::Session;
use crate::types::{Classification, Outcome, Target};
use async_trait::async_trait;
use futures::future::join_all;
use std::time::Duration;

const SCHEMES: [&str; 2] = ["http", "https"];

/// Requests `candidate.host` over both schemes. Any completed HTTP exchange
/// counts as a hit; name resolution or connect failure is the negative signal.
#[derive(Clone)]
pub struct SubdomainProbe {
    session: Session,
}

impl SubdomainProbe {
    pub fn new(session: Session) -> Self {
        Self { session }
    }

    pub fn hostname(target: &Target, candidate: &str) -> String {
        format!("{}.{}", candidate, target.authority())
    }
}

#[async_trait]
impl Probe for SubdomainProbe {
    fn name(&self) -> &str {
        "Dnslist"
    }

    async fn probe(&self, target: &Target, candidate: &str, timeout: Duration) -> Vec<Outcome> {
        let host = Self::hostname(target, candidate);

        // Both schemes run together so the probe stays within one timeout
        let attempts = SCHEMES.iter().map(|scheme| {
            let url = format!("{}://{}", scheme, host);
            async move {
                match self.session.get(&url, timeout).await {
                    Ok(response) => Outcome::hit(
                        candidate,
                        Classification::Reachable {
                            scheme: scheme.to_string(),
                            code: response.status().as_u16(),
                        },
                        response.url().to_string(),
                    ),
                    Err(e) => Outcome::failed(candidate, url, e),
                }
            }
        });

        join_all(attempts).await
    }

    fn render(&self, outcome: &Outcome) -> String {
        match &outcome.classification {
            Classification::Reachable { scheme, .. } => {
                let host = outcome
                    .resolved
                    .split_once("://")
                    .map(|(_, rest)| rest.trim_end_matches('/'))
                    .unwrap_or(&outcome.resolved);
                format!("[{}] {}", scheme, host)
            }
            _ => outcome.candidate.clone(),
        }
    }
}
