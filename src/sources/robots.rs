// src/sources/robots.rs
use crate::session::Session;
use crate::sources::CandidateSource;
use crate::types::{SifError, Target};
use async_trait::async_trait;
use log::{debug, info};
use reqwest::header::LOCATION;
use reqwest::StatusCode;
use url::Url;

const MAX_REDIRECTS: usize = 5;

/// Entries from the target's `robots.txt`.
#[derive(Clone)]
pub struct RobotsSource {
    target: Target,
    session: Session,
}

impl RobotsSource {
    pub fn new(target: Target, session: Session) -> Self {
        Self { target, session }
    }

    /// Fetches robots.txt, following permanent redirects by hand. `None` when
    /// a redirect carries no location or the hop limit is hit.
    async fn fetch(&self) -> Result<Option<reqwest::Response>, SifError> {
        let mut url = self.target.join("robots.txt");

        for _ in 0..=MAX_REDIRECTS {
            let response = self
                .session
                .get(&url, self.session.timeout())
                .await
                .map_err(|e| self.load_error(e))?;

            if response.status() != StatusCode::MOVED_PERMANENTLY {
                return Ok(Some(response));
            }

            let location = response
                .headers()
                .get(LOCATION)
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default();
            if location.is_empty() {
                debug!("Redirect location is empty for {}", url);
                return Ok(None);
            }

            url = match Url::parse(&url).and_then(|base| base.join(location)) {
                Ok(next) => next.to_string(),
                Err(_) => location.to_string(),
            };
        }

        debug!("Too many redirects fetching robots.txt for {}", self.target);
        Ok(None)
    }

    fn load_error(&self, e: impl std::fmt::Display) -> SifError {
        SifError::Load {
            source_name: "robots".to_string(),
            message: e.to_string(),
        }
    }
}

#[async_trait]
impl CandidateSource for RobotsSource {
    fn name(&self) -> &str {
        "robots"
    }

    async fn load(&self) -> Result<Vec<String>, SifError> {
        let Some(response) = self.fetch().await? else {
            return Ok(Vec::new());
        };

        if matches!(response.status().as_u16(), 404 | 301 | 302 | 307) {
            return Ok(Vec::new());
        }

        info!("[Scan] {} file [robots.txt] found", self.target);
        let body = response.text().await.map_err(|e| self.load_error(e))?;
        Ok(parse_robots(&body))
    }
}

/// Extracts the path of every directive except `User-agent` and `Sitemap`.
pub fn parse_robots(body: &str) -> Vec<String> {
    body.lines()
        .filter(|line| {
            !(line.is_empty()
                || line.starts_with('#')
                || line.starts_with("User-agent: ")
                || line.starts_with("Sitemap: "))
        })
        .filter_map(|line| line.split_once(": ").map(|(_, path)| path.trim()))
        .filter(|path| !path.is_empty())
        .map(str::to_string)
        .collect()
}
