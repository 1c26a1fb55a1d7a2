use crate::logfile::LogWriter;
use crate::partition::Partitioner;
use crate::probes::Probe;
use crate::sink::ResultSink;
use crate::sources::CandidateSource;
use crate::types::{Config, Outcome, ResultSet, SifError, Target};
use futures::future::join_all;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, error, info};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Slack on top of the per-request timeout before the engine gives up on a
/// probe call itself.
const GUARD_GRACE: Duration = Duration::from_secs(1);

/// The candidate list of one run, shared read-only by every lane.
pub type CandidateList = Arc<[String]>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Idle,
    Loading,
    Probing,
    Draining,
    Done,
    Failed,
}

/// Bounded-concurrency enumeration: load candidates, fan them out over
/// `threads` lanes, fan the outcomes back in through a [`ResultSink`].
pub struct Engine {
    partitioner: Partitioner,
    timeout: Duration,
    rate_limiter: Option<Arc<DefaultDirectRateLimiter>>,
    cancel: CancellationToken,
    log: Option<Arc<LogWriter>>,
    show_progress: bool,
}

impl Engine {
    pub fn new(config: &Config) -> Result<Self, SifError> {
        let partitioner = Partitioner::new(config.threads)?;
        if config.timeout.is_zero() {
            return Err(SifError::Config("Timeout must be greater than 0".to_string()));
        }

        let rate_limiter = config
            .rate_limit
            .and_then(NonZeroU32::new)
            .map(|limit| Arc::new(RateLimiter::direct(Quota::per_second(limit))));

        Ok(Self {
            partitioner,
            timeout: config.timeout,
            rate_limiter,
            cancel: CancellationToken::new(),
            log: None,
            show_progress: config.show_progress,
        })
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Mirrors matched outcomes of every following run into `log`.
    pub fn with_log(mut self, log: Option<Arc<LogWriter>>) -> Self {
        self.log = log;
        self
    }

    pub fn threads(&self) -> usize {
        self.partitioner.threads()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn transition(&self, probe: &str, target: &Target, state: EngineState) {
        debug!("[{}] {} -> {:?}", probe, target, state);
    }

    /// Runs `probe` over every candidate `source` yields for `target`.
    ///
    /// Only a load failure is an error; transport failures of single
    /// candidates are counted in the returned set and otherwise ignored.
    pub async fn run<S, P>(
        &self,
        target: &Target,
        source: &S,
        probe: Arc<P>,
    ) -> Result<ResultSet, SifError>
    where
        S: CandidateSource + ?Sized,
        P: Probe + 'static,
    {
        let probe_name = probe.name().to_string();
        self.transition(&probe_name, target, EngineState::Idle);
        self.transition(&probe_name, target, EngineState::Loading);

        let candidates: CandidateList = match source.load().await {
            Ok(list) => list.into(),
            Err(e) => {
                error!("[{}] {} {}", probe_name, target, e);
                self.transition(&probe_name, target, EngineState::Failed);
                return Err(e);
            }
        };

        let probe: Arc<dyn Probe> = probe;
        let mut sink = ResultSink::new(Arc::clone(&probe), target, self.log.clone());

        if candidates.is_empty() {
            info!("[{}] {} nothing to probe", probe_name, target);
            self.transition(&probe_name, target, EngineState::Done);
            return Ok(sink.finish());
        }

        info!(
            "[{}] {} probing {} candidates on {} lanes",
            probe_name,
            target,
            candidates.len(),
            self.threads()
        );
        self.transition(&probe_name, target, EngineState::Probing);

        let started = Instant::now();
        let progress = self.progress_bar(&probe_name, candidates.len());
        let (tx, mut rx) = mpsc::unbounded_channel::<Outcome>();

        let lanes: Vec<_> = self
            .partitioner
            .lanes(candidates.len())
            .map(|indices| {
                let candidates = Arc::clone(&candidates);
                let probe = Arc::clone(&probe);
                let target = target.clone();
                let tx = tx.clone();
                let cancel = self.cancel.clone();
                let limiter = self.rate_limiter.clone();
                let progress = progress.clone();
                let timeout = self.timeout;

                tokio::spawn(async move {
                    for i in indices {
                        if cancel.is_cancelled() {
                            break;
                        }

                        let candidate = &candidates[i];
                        // The guard only starts once the limiter lets the candidate through
                        let attempt = async {
                            if let Some(limiter) = &limiter {
                                limiter.until_ready().await;
                            }
                            match tokio::time::timeout(
                                timeout + GUARD_GRACE,
                                probe.probe(&target, candidate, timeout),
                            )
                            .await
                            {
                                Ok(outcomes) => outcomes,
                                Err(_) => vec![Outcome::failed(
                                    candidate,
                                    target.join(candidate),
                                    "probe timed out",
                                )],
                            }
                        };

                        let outcomes = tokio::select! {
                            biased;
                            _ = cancel.cancelled() => break,
                            outcomes = attempt => outcomes,
                        };

                        for outcome in outcomes {
                            if tx.send(outcome).is_err() {
                                return;
                            }
                        }
                        progress.inc(1);
                    }
                })
            })
            .collect();

        // Lanes hold the remaining senders; the channel closes when they finish
        drop(tx);

        while let Some(outcome) = rx.recv().await {
            sink.accept(outcome).await;
        }

        self.transition(&probe_name, target, EngineState::Draining);
        for joined in join_all(lanes).await {
            if let Err(e) = joined {
                error!("[{}] {} lane aborted: {}", probe_name, target, e);
            }
        }
        progress.finish_and_clear();

        let results = sink.finish();
        if self.cancel.is_cancelled() {
            info!("[{}] {} cancelled", probe_name, target);
        }
        info!(
            "[{}] {} finished: {} matched out of {} outcomes ({} errors) in {:.2}s",
            probe_name,
            target,
            results.len(),
            results.probed,
            results.failed,
            started.elapsed().as_secs_f64()
        );
        self.transition(&probe_name, target, EngineState::Done);

        Ok(results)
    }

    fn progress_bar(&self, probe_name: &str, len: usize) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }

        let progress = ProgressBar::new(len as u64);
        progress.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        progress.set_message(probe_name.to_string());
        progress
    }
}
