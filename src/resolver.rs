// src/resolver.rs
use crate::types::{Config, SifError};
use std::net::SocketAddr;
use std::str::FromStr;
use trust_dns_resolver::config::{
    NameServerConfig, Protocol, ResolverConfig as DnsResolverConfig, ResolverOpts,
};
use trust_dns_resolver::proto::rr::{RData, RecordType};
use trust_dns_resolver::TokioAsyncResolver;

/// DNS lookups that the HTTP client does not expose, such as CNAME records.
#[derive(Clone)]
pub struct Resolver {
    resolver: TokioAsyncResolver,
}

impl Resolver {
    pub fn new(config: &Config) -> Result<Self, SifError> {
        let resolver = if config.nameservers.is_empty() {
            TokioAsyncResolver::tokio_from_system_conf().map_err(|e| {
                SifError::Resolution(format!("Failed to create system resolver: {}", e))
            })?
        } else {
            let mut resolver_config = DnsResolverConfig::new();

            for ns in &config.nameservers {
                let socket_addr = SocketAddr::from_str(ns).map_err(|e| {
                    SifError::Config(format!("Invalid nameserver address {}: {}", ns, e))
                })?;
                resolver_config.add_name_server(NameServerConfig {
                    socket_addr,
                    protocol: Protocol::Udp,
                    tls_dns_name: None,
                    trust_negative_responses: false,
                    bind_addr: None,
                });
            }

            let mut opts = ResolverOpts::default();
            opts.timeout = config.timeout;
            opts.attempts = 2;

            TokioAsyncResolver::tokio(resolver_config, opts)
        };

        Ok(Self { resolver })
    }

    /// First CNAME target for `hostname`, if the record exists.
    pub async fn lookup_cname(&self, hostname: &str) -> Option<String> {
        let lookup = self.resolver.lookup(hostname, RecordType::CNAME).await.ok()?;

        lookup.iter().find_map(|rdata| match rdata {
            RData::CNAME(cname) => Some(cname.to_string().trim_end_matches('.').to_string()),
            _ => None,
        })
    }
}
