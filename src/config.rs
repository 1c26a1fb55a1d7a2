use crate::types::{Config, SifError};
use crate::utils::parse_duration;
use std::env;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub fn load_config(config_path_str: &str) -> Result<Config, SifError> {
    let mut config = Config::default();

    if Path::new(config_path_str).exists() {
        let contents = fs::read_to_string(config_path_str)
            .map_err(|e| SifError::Config(format!("Failed to read config file: {}", e)))?;
        apply_toml(&mut config, &contents)?;
    }

    apply_env_overrides(&mut config)?;

    Ok(config)
}

/// Overlays the keys present in a TOML document onto `config`.
pub fn apply_toml(config: &mut Config, contents: &str) -> Result<(), SifError> {
    let value: toml::Value = toml::from_str(contents)
        .map_err(|e| SifError::Config(format!("Failed to parse config file: {}", e)))?;

    let Some(table) = value.as_table() else {
        return Ok(());
    };

    if let Some(threads) = table.get("threads").and_then(|v| v.as_integer()) {
        config.threads = usize::try_from(threads)
            .map_err(|_| SifError::Config(format!("Invalid thread count: {}", threads)))?;
    }

    match table.get("timeout") {
        Some(toml::Value::Integer(secs)) => {
            let secs = u64::try_from(*secs)
                .map_err(|_| SifError::Config(format!("Invalid timeout: {}", secs)))?;
            config.timeout = Duration::from_secs(secs);
        }
        Some(toml::Value::String(s)) => config.timeout = parse_duration(s)?,
        _ => {}
    }

    if let Some(dir) = table.get("log_dir").and_then(|v| v.as_str()) {
        config.log_dir = Some(PathBuf::from(dir));
    }
    if let Some(ua) = table.get("user_agent").and_then(|v| v.as_str()) {
        config.user_agent = ua.to_string();
    }
    if let Some(proxy) = table.get("proxy").and_then(|v| v.as_str()) {
        config.proxy = Some(proxy.to_string());
    }
    if let Some(endpoint) = table.get("s3_endpoint").and_then(|v| v.as_str()) {
        config.s3_endpoint = endpoint.to_string();
    }
    if let Some(rate) = table.get("rate_limit").and_then(|v| v.as_integer()) {
        config.rate_limit = u32::try_from(rate).ok().filter(|r| *r > 0);
    }

    if let Some(lists) = table.get("wordlists").and_then(|v| v.as_table()) {
        let wordlists = &mut config.wordlists;
        for (key, slot) in [
            ("dirlist", &mut wordlists.dirlist),
            ("dnslist", &mut wordlists.dnslist),
            ("ports", &mut wordlists.ports),
            ("git", &mut wordlists.git),
        ] {
            if let Some(value) = lists.get(key).and_then(|v| v.as_str()) {
                *slot = value.to_string();
            }
        }
    }

    if let Some(resolve) = table.get("resolve").and_then(|v| v.as_table()) {
        for (host, addr) in resolve {
            let Some(addr) = addr.as_str() else { continue };
            let socket_addr: SocketAddr = addr.parse().map_err(|e| {
                SifError::Config(format!("Invalid resolve address for {}: {}", host, e))
            })?;
            config.resolve.insert(host.to_lowercase(), socket_addr);
        }
    }

    if let Some(servers) = table.get("nameservers").and_then(|v| v.as_array()) {
        config.nameservers = servers
            .iter()
            .filter_map(|v| v.as_str().map(|s| s.to_string()))
            .collect();
    }

    Ok(())
}

pub fn apply_env_overrides(config: &mut Config) -> Result<(), SifError> {
    if let Ok(threads) = env::var("SIF_THREADS") {
        config.threads = threads
            .trim()
            .parse()
            .map_err(|e| SifError::Config(format!("Invalid SIF_THREADS: {}", e)))?;
    }
    if let Ok(timeout) = env::var("SIF_TIMEOUT") {
        config.timeout = parse_duration(&timeout)?;
    }
    if let Ok(dir) = env::var("SIF_LOG_DIR") {
        config.log_dir = Some(PathBuf::from(dir));
    }
    if let Ok(proxy) = env::var("SIF_PROXY") {
        config.proxy = Some(proxy);
    }
    if let Ok(ua) = env::var("SIF_USER_AGENT") {
        config.user_agent = ua;
    }
    Ok(())
}

pub fn validate_config(config: &Config) -> Result<(), SifError> {
    if config.threads == 0 {
        return Err(SifError::Config("Thread count must be at least 1".to_string()));
    }
    if config.timeout.is_zero() {
        return Err(SifError::Config("Timeout must be greater than 0".to_string()));
    }
    Ok(())
}
