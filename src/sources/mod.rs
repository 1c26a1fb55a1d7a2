// src/sources/mod.rs
use crate::types::SifError;
use async_trait::async_trait;

mod buckets;
mod ports;
mod robots;
mod wordlist;

pub use buckets::{bucket_names, BucketSource};
pub use ports::PortSource;
pub use robots::{parse_robots, RobotsSource};
pub use wordlist::WordlistSource;

/// Produces the ordered, finite candidate list for one engine run.
#[async_trait]
pub trait CandidateSource: Send + Sync {
    fn name(&self) -> &str;
    async fn load(&self) -> Result<Vec<String>, SifError>;
}

/// Candidates already held in memory.
#[derive(Debug, Clone)]
pub struct StaticSource {
    name: String,
    items: Vec<String>,
}

impl StaticSource {
    pub fn new(name: &str, items: Vec<String>) -> Self {
        Self {
            name: name.to_string(),
            items,
        }
    }
}

#[async_trait]
impl CandidateSource for StaticSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn load(&self) -> Result<Vec<String>, SifError> {
        Ok(self.items.clone())
    }
}
