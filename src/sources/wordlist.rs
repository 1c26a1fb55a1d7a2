// src/sources/wordlist.rs
use crate::session::Session;
use crate::sources::CandidateSource;
use crate::types::{ListSize, SifError, WordlistConfig};
use crate::utils::{body_lines, read_lines};
use async_trait::async_trait;
use log::debug;
use std::path::Path;

/// A newline separated list, either downloaded or read from disk.
#[derive(Clone)]
pub struct WordlistSource {
    name: String,
    location: String,
    session: Session,
}

impl WordlistSource {
    pub fn new(name: &str, location: impl Into<String>, session: Session) -> Self {
        Self {
            name: name.to_string(),
            location: location.into(),
            session,
        }
    }

    pub fn dirlist(lists: &WordlistConfig, size: ListSize, session: Session) -> Self {
        Self::new("dirlist", locate(&lists.dirlist, size.dirlist_file()), session)
    }

    pub fn dnslist(lists: &WordlistConfig, size: ListSize, session: Session) -> Self {
        Self::new("dnslist", locate(&lists.dnslist, size.dnslist_file()), session)
    }

    pub fn git(lists: &WordlistConfig, session: Session) -> Self {
        Self::new("git", locate(&lists.git, "git.txt"), session)
    }

    fn is_remote(&self) -> bool {
        self.location.starts_with("http://") || self.location.starts_with("https://")
    }

    async fn raw_lines(&self) -> Result<Vec<String>, SifError> {
        if self.is_remote() {
            let body = self.session.fetch_text(&self.location).await?;
            Ok(body_lines(&body))
        } else {
            read_lines(Path::new(&self.location)).map_err(SifError::from)
        }
    }
}

/// Joins a list base (URL prefix or directory) with a file name.
pub(crate) fn locate(base: &str, file: &str) -> String {
    if base.starts_with("http://") || base.starts_with("https://") {
        if base.ends_with('/') {
            format!("{}{}", base, file)
        } else {
            format!("{}/{}", base, file)
        }
    } else {
        Path::new(base).join(file).to_string_lossy().into_owned()
    }
}

#[async_trait]
impl CandidateSource for WordlistSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn load(&self) -> Result<Vec<String>, SifError> {
        debug!("{}: loading list from {}", self.name, self.location);

        let lines = self.raw_lines().await.map_err(|e| SifError::Load {
            source_name: self.name.clone(),
            message: format!("{}: {}", self.location, e),
        })?;

        // Blank lines and comment headers are not candidates
        Ok(lines
            .into_iter()
            .map(|line| line.trim().to_string())
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .collect())
    }
}
