// src/probes/git.rs
use crate::probes::Probe;
use crate::session::Session;
use crate::types::{Classification, Outcome, Target};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use std::time::Duration;

/// Looks for exposed `.git` files. A hit needs a 200 that is not HTML, which
/// rules out SPA catch-all pages.
#[derive(Clone)]
pub struct GitProbe {
    session: Session,
}

impl GitProbe {
    pub fn new(session: Session) -> Self {
        Self { session }
    }
}

pub(crate) fn is_exposed(status: u16, content_type: Option<&str>) -> bool {
    status == 200 && !content_type.unwrap_or_default().starts_with("text/html")
}

#[async_trait]
impl Probe for GitProbe {
    fn name(&self) -> &str {
        "Git"
    }

    async fn probe(&self, target: &Target, candidate: &str, timeout: Duration) -> Vec<Outcome> {
        let url = target.join(candidate);

        let outcome = match self.session.get(&url, timeout).await {
            Ok(response) => {
                let code = response.status().as_u16();
                let content_type = response
                    .headers()
                    .get(CONTENT_TYPE)
                    .and_then(|v| v.to_str().ok());
                let exposed = is_exposed(code, content_type);
                let resolved = response.url().to_string();
                let classification = Classification::Status { code };
                if exposed {
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
        format!("200 git found at [{}]", outcome.candidate)
    }
}
