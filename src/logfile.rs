// src/logfile.rs
use crate::types::{SifError, Target};
use std::path::{Path, PathBuf};
use tokio::fs::{self, File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

const BANNER: &str = "       _____________\n__________(_)__  __/\n__  ___/_  /__  /_  \n_(__  )_  / _  __/  \n/____/ /_/  /_/    \n";

/// Append-only, human readable log for one target. The file is opened once
/// and every write goes through the same handle under a lock, so lanes can
/// append concurrently.
#[derive(Debug)]
pub struct LogWriter {
    path: PathBuf,
    file: Mutex<File>,
}

impl LogWriter {
    /// Creates `dir` if needed and opens `<dir>/<sanitized target>.log` for
    /// appending. The banner header is written only when the file is new.
    pub async fn create(dir: &Path, target: &Target) -> Result<Self, SifError> {
        fs::create_dir_all(dir).await?;

        let path = dir.join(target.log_file_name());
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;

        if file.metadata().await?.len() == 0 {
            let header = format!(
                "{}\nsif log file for {}\nhttps://sif.sh\nstarted {}\n\n",
                BANNER,
                target,
                chrono::Utc::now().to_rfc3339()
            );
            file.write_all(header.as_bytes()).await?;
        }

        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Divider written when a module starts.
    pub async fn section(&self, title: &str) -> Result<(), SifError> {
        self.write(&format!(
            "\n\n--------------\nStarting {}\n--------------\n",
            title
        ))
        .await
    }

    pub async fn append(&self, line: &str) -> Result<(), SifError> {
        if line.ends_with('\n') {
            self.write(line).await
        } else {
            self.write(&format!("{}\n", line)).await
        }
    }

    async fn write(&self, text: &str) -> Result<(), SifError> {
        let mut file = self.file.lock().await;
        file.write_all(text.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_header_written_once() {
        let dir = tempfile::tempdir().unwrap();
        let target = Target::parse("https://example.com").unwrap();

        let writer = LogWriter::create(dir.path(), &target).await.unwrap();
        writer.section("git directory fuzzing").await.unwrap();
        writer.append("200 git found at [.git/HEAD]").await.unwrap();
        drop(writer);

        let writer = LogWriter::create(dir.path(), &target).await.unwrap();
        writer.append("second run").await.unwrap();

        let contents = std::fs::read_to_string(writer.path()).unwrap();
        assert_eq!(contents.matches("sif log file for https://example.com").count(), 1);
        assert!(contents
            .contains("--------------\nStarting git directory fuzzing\n--------------\n"));
        assert!(contents.contains("200 git found at [.git/HEAD]\n"));
        assert!(contents.ends_with("second run\n"));
        assert_eq!(writer.path(), dir.path().join("example.com.log"));
    }

    #[tokio::test]
    async fn test_concurrent_appends_do_not_interleave() {
        let dir = tempfile::tempdir().unwrap();
        let target = Target::parse("http://127.0.0.1:8080").unwrap();
        let writer = Arc::new(LogWriter::create(dir.path(), &target).await.unwrap());

        let mut handles = Vec::new();
        for lane in 0..8 {
            let writer = Arc::clone(&writer);
            handles.push(tokio::spawn(async move {
                for i in 0..50 {
                    writer.append(&format!("lane-{}-entry-{}", lane, i)).await.unwrap();
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let contents = std::fs::read_to_string(writer.path()).unwrap();
        let entries: Vec<&str> = contents.lines().filter(|l| l.starts_with("lane-")).collect();
        assert_eq!(entries.len(), 400);
        assert!(entries.iter().all(|l| l.contains("-entry-")));
    }
}
