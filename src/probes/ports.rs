// src/probes/ports.rs
use crate::probes::Probe;
use crate::types::{Classification, Outcome, Target};
use async_trait::async_trait;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout as with_timeout;

/// TCP connect scan. The socket is dropped as soon as the handshake completes.
#[derive(Debug, Clone, Default)]
pub struct PortProbe;

impl PortProbe {
    pub fn new() -> Self {
        Self
    }
}

fn endpoint(host: &str, port: u16) -> String {
    if host.contains(':') {
        format!("[{}]:{}", host, port)
    } else {
        format!("{}:{}", host, port)
    }
}

fn closed(candidate: &str, resolved: String, error: impl std::fmt::Display) -> Outcome {
    Outcome {
        classification: Classification::PortClosed,
        ..Outcome::failed(candidate, resolved, error)
    }
}

#[async_trait]
impl Probe for PortProbe {
    fn name(&self) -> &str {
        "Ports"
    }

    async fn probe(&self, target: &Target, candidate: &str, timeout: Duration) -> Vec<Outcome> {
        let Ok(port) = candidate.parse::<u16>() else {
            return vec![Outcome::failed(
                candidate,
                candidate,
                format!("invalid port: {}", candidate),
            )];
        };

        let resolved = endpoint(target.host(), port);

        let outcome = match with_timeout(timeout, TcpStream::connect((target.host(), port))).await {
            Ok(Ok(stream)) => {
                drop(stream);
                Outcome::hit(candidate, Classification::PortOpen, resolved)
            }
            Ok(Err(e)) => closed(candidate, resolved, e),
            Err(_) => closed(candidate, resolved, "connect timed out"),
        };

        vec![outcome]
    }

    fn render(&self, outcome: &Outcome) -> String {
        format!("[tcp] {}", outcome.resolved)
    }
}
