// src/lib.rs
pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod logfile;
pub mod output;
pub mod partition;
pub mod probes;
pub mod resolver;
pub mod scanner;
pub mod session;
pub mod sink;
pub mod sources;
pub mod types;
pub mod utils;

pub use cli::Args;
pub use engine::{CandidateList, Engine, EngineState};
pub use partition::Partitioner;
pub use probes::Probe;
pub use scanner::{ScanPlan, ScanSummary, Scanner};
pub use sources::CandidateSource;
pub use types::{Config, Outcome, ResultSet, SifError, Target};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
