// src/probes/cloud.rs
use crate::probes::Probe;
use crate::session::Session;
use crate::types::{Classification, Outcome, SifError, Target};
use async_trait::async_trait;
use std::time::Duration;
use url::Url;

pub const DEFAULT_S3_ENDPOINT: &str = "https://s3.amazonaws.com";

/// Requests the virtual-hosted URL of a bucket. A 200 means the bucket
/// listing is readable without credentials.
#[derive(Clone)]
pub struct CloudStorageProbe {
    session: Session,
    scheme: String,
    authority: String,
}

impl CloudStorageProbe {
    pub fn new(session: Session, endpoint: &str) -> Result<Self, SifError> {
        let url = Url::parse(endpoint)
            .map_err(|e| SifError::Config(format!("Invalid S3 endpoint {}: {}", endpoint, e)))?;
        let host = url
            .host_str()
            .ok_or_else(|| SifError::Config(format!("S3 endpoint {} has no host", endpoint)))?;

        let authority = match url.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        };

        Ok(Self {
            session,
            scheme: url.scheme().to_string(),
            authority,
        })
    }

    pub fn bucket_url(&self, bucket: &str) -> String {
        format!("{}://{}.{}", self.scheme, bucket, self.authority)
    }
}

#[async_trait]
impl Probe for CloudStorageProbe {
    fn name(&self) -> &str {
        "C3"
    }

    async fn probe(&self, _target: &Target, candidate: &str, timeout: Duration) -> Vec<Outcome> {
        let url = self.bucket_url(candidate);

        let outcome = match self.session.get(&url, timeout).await {
            Ok(response) => {
                let code = response.status().as_u16();
                let classification = Classification::Status { code };
                if code == 200 {
                    Outcome::hit(candidate, classification, url)
                } else {
                    Outcome::miss(candidate, classification, url)
                }
            }
            Err(e) => Outcome::failed(candidate, url, e),
        };

        vec![outcome]
    }

    fn render(&self, outcome: &Outcome) -> String {
        format!("Public S3 bucket found: {}", outcome.candidate)
    }
}
