// src/sink.rs
use crate::logfile::LogWriter;
use crate::probes::Probe;
use crate::types::{Outcome, ResultSet, Target};
use log::{debug, info, warn};
use std::sync::Arc;

/// Collects the outcomes of one engine run.
///
/// Matched outcomes are kept, logged to the console tagged with the probe
/// and target, and appended to the target's log file when one is open.
/// Nothing is deduplicated.
pub struct ResultSink {
    probe: Arc<dyn Probe>,
    target: Target,
    log: Option<Arc<LogWriter>>,
    results: ResultSet,
}

impl ResultSink {
    pub fn new(probe: Arc<dyn Probe>, target: &Target, log: Option<Arc<LogWriter>>) -> Self {
        let results = ResultSet::new(probe.name(), target);
        Self {
            probe,
            target: target.clone(),
            log,
            results,
        }
    }

    pub async fn accept(&mut self, outcome: Outcome) {
        self.results.probed += 1;

        if let Some(error) = &outcome.error {
            self.results.failed += 1;
            debug!(
                "[{}] {} error {}: {}",
                self.probe.name(),
                self.target,
                outcome.candidate,
                error
            );
        }

        if !outcome.matched {
            return;
        }

        let line = self.probe.render(&outcome);
        info!("[{}] {} {}", self.probe.name(), self.target, line);

        if let Some(log) = &self.log {
            if let Err(e) = log.append(&line).await {
                warn!("Failed to write to {}: {}", log.path().display(), e);
            }
        }

        self.results.outcomes.push(outcome);
    }

    pub fn observed(&self) -> usize {
        self.results.probed
    }

    pub fn finish(self) -> ResultSet {
        self.results
    }
}
