// src/scanner.rs
use crate::engine::Engine;
use crate::logfile::LogWriter;
use crate::output::OutputManager;
use crate::probes::{
    CloudStorageProbe, DirectoryProbe, GitProbe, PortProbe, SubdomainProbe, TakeoverProbe,
};
use crate::resolver::Resolver;
use crate::session::Session;
use crate::sources::{BucketSource, PortSource, RobotsSource, StaticSource, WordlistSource};
use crate::types::{
    Config, ListSize, ModuleResult, PortScope, ResultSet, ScanReport, SifError, Target,
};
use crate::utils::deduplicate;
use log::{error, info, warn};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

/// Which modules run against every target.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanPlan {
    pub base_scan: bool,
    pub dirlist: Option<ListSize>,
    pub dnslist: Option<ListSize>,
    pub ports: Option<PortScope>,
    pub git: bool,
    pub cloudstorage: bool,
    pub takeover: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ScanSummary {
    pub reports: Vec<ScanReport>,
    pub modules_run: Vec<String>,
    pub log_files: Vec<PathBuf>,
    pub duration: Duration,
}

pub struct Scanner {
    config: Config,
    plan: ScanPlan,
    session: Session,
    output: OutputManager,
    cancel: CancellationToken,
}

impl Scanner {
    pub fn new(config: Config, plan: ScanPlan, output: OutputManager) -> Result<Self, SifError> {
        crate::config::validate_config(&config)?;
        let session = Session::new(&config)?;

        Ok(Self {
            config,
            plan,
            session,
            output,
            cancel: CancellationToken::new(),
        })
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn plan(&self) -> &ScanPlan {
        &self.plan
    }

    /// Scans every target in turn. All targets are validated before the
    /// first request goes out.
    pub async fn run(&self, targets: &[String]) -> Result<ScanSummary, SifError> {
        let targets = targets
            .iter()
            .map(|t| Target::parse(t))
            .collect::<Result<Vec<_>, _>>()?;

        let started = Instant::now();
        let mut summary = ScanSummary::default();

        for target in &targets {
            if self.cancel.is_cancelled() {
                warn!("Scan cancelled, skipping remaining targets");
                break;
            }

            let (report, modules_run, log_file) = self.scan_target(target).await?;
            self.output.write_report(&report)?;

            for module in modules_run {
                if !summary.modules_run.contains(&module) {
                    summary.modules_run.push(module);
                }
            }
            summary.log_files.extend(log_file);
            summary.reports.push(report);
        }

        summary.duration = started.elapsed();
        Ok(summary)
    }

    async fn scan_target(
        &self,
        target: &Target,
    ) -> Result<(ScanReport, Vec<String>, Option<PathBuf>), SifError> {
        info!("Starting scan on {}...", target);

        let log = match &self.config.log_dir {
            Some(dir) => Some(Arc::new(LogWriter::create(dir, target).await?)),
            None => None,
        };
        let engine = Engine::new(&self.config)?
            .with_cancellation(self.cancel.clone())
            .with_log(log.clone());

        let mut results = Vec::new();
        let mut modules_run = Vec::new();
        let session = &self.session;

        if self.plan.base_scan && !self.cancel.is_cancelled() {
            section(&log, "URL scanning").await;
            let source = RobotsSource::new(target.clone(), session.clone());
            let probe = Arc::new(DirectoryProbe::robots(session.clone()));
            if let Ok(set) = engine.run(target, &source, probe).await {
                results.push(module_result("scan", &set)?);
                modules_run.push("Basic Scan".to_string());
            }
        }

        if let Some(size) = self.plan.dirlist.filter(|_| !self.cancel.is_cancelled()) {
            section(&log, &format!("{} directory fuzzing", size)).await;
            let source = WordlistSource::dirlist(&self.config.wordlists, size, session.clone());
            let probe = Arc::new(DirectoryProbe::dirlist(session.clone()));
            if let Ok(set) = engine.run(target, &source, probe).await {
                results.push(module_result("dirlist", &set)?);
                modules_run.push("Directory Listing".to_string());
            }
        }

        if let Some(size) = self.plan.dnslist.filter(|_| !self.cancel.is_cancelled()) {
            section(&log, &format!("{} subdomain fuzzing", size)).await;
            let source = WordlistSource::dnslist(&self.config.wordlists, size, session.clone());
            let probe = Arc::new(SubdomainProbe::new(session.clone()));
            if let Ok(set) = engine.run(target, &source, probe).await {
                results.push(module_result("dnslist", &set)?);
                modules_run.push("DNS Scan".to_string());

                if self.plan.takeover && !self.cancel.is_cancelled() {
                    let hosts = deduplicate(
                        set.outcomes
                            .iter()
                            .map(|o| SubdomainProbe::hostname(target, &o.candidate))
                            .collect(),
                    );
                    section(&log, "Subdomain Takeover Vulnerability Check").await;
                    if let Some(set) = self.takeover(&engine, target, hosts).await {
                        results.push(module_result("subdomain_takeover", &set)?);
                        modules_run.push("Subdomain Takeover".to_string());
                    }
                }
            }
        } else if self.plan.takeover && self.plan.dnslist.is_none() {
            warn!("Subdomain Takeover check is enabled but DNS scan is disabled. Skipping Subdomain Takeover check.");
        }

        if let Some(scope) = self.plan.ports.filter(|_| !self.cancel.is_cancelled()) {
            section(&log, &format!("{} port scanning", scope)).await;
            let source = PortSource::for_scope(scope, &self.config.wordlists, session.clone());
            if let Ok(set) = engine.run(target, &source, Arc::new(PortProbe::new())).await {
                if set.is_empty() {
                    warn!("[Ports] {} Found no open ports", target);
                } else {
                    let open: Vec<&str> =
                        set.outcomes.iter().map(|o| o.candidate.as_str()).collect();
                    info!(
                        "[Ports] {} Found {} open ports: {}",
                        target,
                        open.len(),
                        open.join(", ")
                    );
                }
                results.push(module_result("portscan", &set)?);
                modules_run.push("Port Scan".to_string());
            }
        }

        if self.plan.git && !self.cancel.is_cancelled() {
            section(&log, "git directory fuzzing").await;
            let source = WordlistSource::git(&self.config.wordlists, session.clone());
            let probe = Arc::new(GitProbe::new(session.clone()));
            if let Ok(set) = engine.run(target, &source, probe).await {
                results.push(module_result("git", &set)?);
                modules_run.push("Git".to_string());
            }
        }

        if self.plan.cloudstorage && !self.cancel.is_cancelled() {
            section(&log, "Cloud Storage Misconfiguration Scan").await;
            if let Some(set) = self.cloud_storage(&engine, target).await {
                results.push(module_result("cloudstorage", &set)?);
                modules_run.push("Cloud Storage".to_string());
            }
        }

        let report = ScanReport {
            url: target.to_string(),
            results,
        };
        let log_file = log.map(|l| l.path().to_path_buf());

        Ok((report, modules_run, log_file))
    }

    async fn takeover(
        &self,
        engine: &Engine,
        target: &Target,
        hosts: Vec<String>,
    ) -> Option<ResultSet> {
        let resolver = match Resolver::new(&self.config) {
            Ok(resolver) => resolver,
            Err(e) => {
                error!("Error while running Subdomain Takeover Vulnerability Check: {}", e);
                return None;
            }
        };

        let source = StaticSource::new("takeover", hosts);
        let probe = Arc::new(TakeoverProbe::new(self.session.clone(), resolver));
        let set = engine.run(target, &source, probe).await.ok()?;

        for outcome in &set.outcomes {
            warn!("[Subdomain Takeover] {} potential takeover of {}", target, outcome.candidate);
        }
        Some(set)
    }

    async fn cloud_storage(&self, engine: &Engine, target: &Target) -> Option<ResultSet> {
        let probe = match CloudStorageProbe::new(self.session.clone(), &self.config.s3_endpoint) {
            Ok(probe) => Arc::new(probe),
            Err(e) => {
                error!("Error while running C3 Scan: {}", e);
                return None;
            }
        };

        let source = BucketSource::new(target.clone());
        let set = engine.run(target, &source, probe).await.ok()?;

        for outcome in &set.outcomes {
            warn!("[C3] {} public S3 bucket {}", target, outcome.resolved);
        }
        Some(set)
    }
}

async fn section(log: &Option<Arc<LogWriter>>, title: &str) {
    if let Some(log) = log {
        if let Err(e) = log.section(title).await {
            warn!("Failed to write to {}: {}", log.path().display(), e);
        }
    }
}

fn module_result(id: &str, set: &ResultSet) -> Result<ModuleResult, SifError> {
    let data = serde_json::to_value(&set.outcomes)
        .map_err(|e| SifError::Output(format!("Failed to serialize {} results: {}", id, e)))?;
    Ok(ModuleResult {
        id: id.to_string(),
        data,
    })
}
