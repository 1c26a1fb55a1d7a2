use anyhow::Result;
use clap::Parser;
use log::{error, info, warn};
use sif::config::{apply_env_overrides, load_config, validate_config};
use sif::error::ErrorContext;
use sif::output::OutputManager;
use sif::utils::{read_lines, split_csv};
use sif::{Args, Config, Scanner};
use std::io::{self, BufRead};
use std::process;
use tokio_util::sync::CancellationToken;

const BANNER: &str = r#"
       _____________
__________(_)__  __/
__  ___/_  /__  /_
_(__  )_  / _  __/
/____/ /_/  /_/

        https://sif.sh
      man's best friend
"#;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();

    let level = if args.api {
        log::LevelFilter::Error
    } else if args.debug {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_env("RUST_LOG")
        .init();

    if !args.api {
        println!("{}", BANNER);
    }

    let mut config = if let Some(path) = args.config_path.as_deref() {
        load_config(path)?
    } else {
        let mut config = Config::default();
        apply_env_overrides(&mut config)?;
        config
    };
    args.apply(&mut config);
    validate_config(&config)?;

    let targets = get_targets_from_args(&args)?;
    if targets.is_empty() {
        error!("Target(s) must be supplied with -u, -f or on stdin. See 'sif -h' for more information");
        process::exit(1);
    }

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, finishing in-flight requests...");
            on_interrupt.cancel();
        }
    });

    let output = OutputManager::new(args.api);
    let scanner = Scanner::new(config, args.plan(), output.clone())?.with_cancellation(cancel);

    let summary = scanner
        .run(&targets)
        .await
        .map_err(|e| anyhow::anyhow!("Scan failed: {}", e))?;

    output.write_summary(&summary)?;
    info!(
        "Scanned {} targets in {:.2}s",
        summary.reports.len(),
        summary.duration.as_secs_f64()
    );

    Ok(())
}

fn get_targets_from_args(args: &Args) -> sif::error::Result<Vec<String>> {
    let mut targets = split_csv(&args.urls);

    if targets.is_empty() {
        if let Some(file_path) = &args.file {
            info!("Reading file {}", file_path.display());
            let lines = read_lines(file_path)
                .with_context(|| format!("Failed to read targets from {}", file_path.display()))?;
            targets.extend(split_csv(&lines));
        } else if args.use_stdin() {
            let stdin = io::stdin();
            for line in stdin.lock().lines().map_while(|l| l.ok()) {
                let line = line.trim();
                if !line.is_empty() {
                    targets.push(line.to_string());
                }
            }
        }
    }

    Ok(targets)
}
