// src/probes/directory.rs
use crate::probes::Probe;
use crate::session::Session;
use crate::types::{Classification, Outcome, Target};
use async_trait::async_trait;
use std::time::Duration;

/// GET `target/candidate` and keep anything whose status is not in the
/// probe's "not found" set.
///
/// Directory brute force treats both 403 and 404 as not found. Paths taken
/// from robots.txt only drop 404, since a forbidden disallowed path is worth
/// reporting.
#[derive(Clone)]
pub struct DirectoryProbe {
    session: Session,
    name: &'static str,
    not_found: &'static [u16],
    origin: Option<&'static str>,
}

impl DirectoryProbe {
    pub fn dirlist(session: Session) -> Self {
        Self {
            session,
            name: "Dirlist",
            not_found: &[403, 404],
            origin: None,
        }
    }

    pub fn robots(session: Session) -> Self {
        Self {
            session,
            name: "Scan",
            not_found: &[404],
            origin: Some("robots"),
        }
    }

    pub fn is_interesting(&self, status: u16) -> bool {
        !self.not_found.contains(&status)
    }
}

#[async_trait]
impl Probe for DirectoryProbe {
    fn name(&self) -> &str {
        self.name
    }

    async fn probe(&self, target: &Target, candidate: &str, timeout: Duration) -> Vec<Outcome> {
        let url = target.join(candidate);

        let outcome = match self.session.get(&url, timeout).await {
            Ok(response) => {
                let code = response.status().as_u16();
                let resolved = response.url().to_string();
                let classification = Classification::Status { code };
                if self.is_interesting(code) {
                    Outcome::hit(candidate, classification, resolved)
                } else {
                    Outcome::miss(candidate, classification, resolved)
                }
            }
            Err(e) => Outcome::failed(candidate, url, e),
        };

        vec![outcome]
    }

    fn render(&self, outcome: &Outcome) -> String {
        let code = match &outcome.classification {
            Classification::Status { code } => code.to_string(),
            _ => "-".to_string(),
        };
        match self.origin {
            Some(origin) => format!("{} from {}: [{}]", code, origin, outcome.candidate),
            None => format!("{} [{}]", code, outcome.candidate),
        }
    }
}
