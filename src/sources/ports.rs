// src/sources/ports.rs
use crate::session::Session;
use crate::sources::wordlist::{locate, WordlistSource};
use crate::sources::CandidateSource;
use crate::types::{PortScope, SifError, WordlistConfig};
use async_trait::async_trait;

const COMMON_PORTS_FILE: &str = "top-ports.txt";

/// Port numbers, either the downloaded top-ports list or the full range.
#[derive(Clone)]
pub enum PortSource {
    Common(WordlistSource),
    Full,
}

impl PortSource {
    pub fn for_scope(scope: PortScope, lists: &WordlistConfig, session: Session) -> Self {
        match scope {
            PortScope::Common => PortSource::Common(WordlistSource::new(
                "ports",
                locate(&lists.ports, COMMON_PORTS_FILE),
                session,
            )),
            PortScope::Full => PortSource::Full,
        }
    }
}

#[async_trait]
impl CandidateSource for PortSource {
    fn name(&self) -> &str {
        "ports"
    }

    async fn load(&self) -> Result<Vec<String>, SifError> {
        match self {
            PortSource::Common(list) => Ok(list
                .load()
                .await?
                .into_iter()
                .filter_map(|line| line.parse::<u16>().ok())
                .map(|port| port.to_string())
                .collect()),
            PortSource::Full => Ok((0..=u16::MAX).map(|port| port.to_string()).collect()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Config;
    use std::io::Write;

    #[tokio::test]
    async fn test_full_range_is_generated() {
        let ports = PortSource::Full.load().await.unwrap();
        assert_eq!(ports.len(), 65536);
        assert_eq!(ports.first().map(String::as_str), Some("0"));
        assert_eq!(ports.last().map(String::as_str), Some("65535"));
    }

    #[tokio::test]
    async fn test_common_list_drops_invalid_lines() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = std::fs::File::create(dir.path().join(COMMON_PORTS_FILE)).unwrap();
        writeln!(file, "22\nhttp\n80\n70000\n443").unwrap();

        let lists = WordlistConfig {
            ports: dir.path().to_string_lossy().into_owned(),
            ..WordlistConfig::default()
        };
        let session = Session::new(&Config::default()).unwrap();
        let ports = PortSource::for_scope(PortScope::Common, &lists, session)
            .load()
            .await
            .unwrap();

        assert_eq!(ports, vec!["22", "80", "443"]);
    }
}
