//! DNS resolution infrastructure.
//!
//! Provides a trait-based abstraction over name resolution so handlers can be
//! exercised against a stub and the real resolver is injected at startup.

use async_trait::async_trait;
use hickory_resolver::{
    config::{ResolverConfig, ResolverOpts},
    error::{ResolveError, ResolveErrorKind},
    system_conf, TokioAsyncResolver,
};
use std::{
    future::Future,
    net::{IpAddr, Ipv4Addr},
    time::{Duration, Instant},
};
use thiserror::Error;

/// Failure of the resolution subsystem.
#[derive(Error, Debug)]
pub enum ResolutionError {
    #[error("No records found for {0}")]
    NotFound(String),

    #[error("No IPv4 address for {0}")]
    NoAddress(String),

    #[error("DNS lookup for {0} timed out")]
    Timeout(String),

    #[error("DNS lookup failed: {0}")]
    Lookup(String),
}

/// Trait for DNS resolution.
#[async_trait]
pub trait Resolver: Send + Sync {
    /// Returns the fully qualified form of `domain` as reported by DNS, or
    /// `domain` unchanged when no canonical name is available.
    async fn resolve_canonical_name(&self, domain: &str) -> Result<String, ResolutionError>;

    /// Resolves `hostname` to one IPv4 address: the first one the resolver
    /// returns. Callers get at most one representative address.
    async fn resolve_address(&self, hostname: &str) -> Result<Ipv4Addr, ResolutionError>;
}

/// Resolver implementation using hickory-resolver.
///
/// Configured for a single attempt per query with caching disabled; every
/// operation is additionally bounded by `timeout`.
pub struct HickoryResolver {
    resolver: TokioAsyncResolver,
    timeout: Duration,
}

impl HickoryResolver {
    /// Builds a resolver from the host's resolver configuration, falling back
    /// to the library defaults when it cannot be read.
    pub fn from_system_conf(timeout: Duration) -> Self {
        let (config, opts) = match system_conf::read_system_conf() {
            Ok(conf) => conf,
            Err(e) => {
                tracing::warn!(error = %e, "Could not read system resolver config, using defaults");
                (ResolverConfig::default(), ResolverOpts::default())
            }
        };
        Self::new(config, opts, timeout)
    }

    pub fn new(config: ResolverConfig, mut opts: ResolverOpts, timeout: Duration) -> Self {
        opts.timeout = timeout;
        opts.attempts = 1;
        opts.cache_size = 0;

        Self {
            resolver: TokioAsyncResolver::tokio(config, opts),
            timeout,
        }
    }

    async fn bounded<T, F>(&self, name: &str, fut: F) -> Result<T, ResolutionError>
    where
        F: Future<Output = Result<T, ResolveError>>,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(map_resolve_error(name, e)),
            Err(_) => Err(ResolutionError::Timeout(name.to_string())),
        }
    }

    async fn first_address(&self, name: &str) -> Result<IpAddr, ResolutionError> {
        let response = self.bounded(name, self.resolver.lookup_ip(name)).await?;
        response
            .iter()
            .next()
            .ok_or_else(|| ResolutionError::NotFound(name.to_string()))
    }
}

fn map_resolve_error(name: &str, e: ResolveError) -> ResolutionError {
    match e.kind() {
        ResolveErrorKind::NoRecordsFound { .. } => ResolutionError::NotFound(name.to_string()),
        ResolveErrorKind::Timeout => ResolutionError::Timeout(name.to_string()),
        _ => ResolutionError::Lookup(e.to_string()),
    }
}

#[async_trait]
impl Resolver for HickoryResolver {
    async fn resolve_canonical_name(&self, domain: &str) -> Result<String, ResolutionError> {
        if domain.is_empty() {
            return Ok(String::new());
        }
        let start = Instant::now();

        // Forward, then reverse the first address; the first PTR name with a
        // dot in it is the canonical form.
        let ip = match self.first_address(domain).await {
            Ok(ip) => ip,
            Err(ResolutionError::Timeout(name)) => return Err(ResolutionError::Timeout(name)),
            Err(_) => return Ok(domain.to_string()),
        };

        let names = match self.bounded(domain, self.resolver.reverse_lookup(ip)).await {
            Ok(lookup) => lookup
                .iter()
                .map(|ptr| ptr.to_string().trim_end_matches('.').to_string())
                .collect::<Vec<_>>(),
            Err(ResolutionError::Timeout(name)) => return Err(ResolutionError::Timeout(name)),
            Err(_) => Vec::new(),
        };

        let canonical = names
            .into_iter()
            .find(|name| name.contains('.'))
            .unwrap_or_else(|| domain.to_string());

        tracing::debug!(
            domain,
            canonical = %canonical,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Canonicalized name"
        );
        Ok(canonical)
    }

    async fn resolve_address(&self, hostname: &str) -> Result<Ipv4Addr, ResolutionError> {
        let start = Instant::now();
        let response = self.bounded(hostname, self.resolver.lookup_ip(hostname)).await?;

        let address = response
            .iter()
            .find_map(|ip| match ip {
                IpAddr::V4(v4) => Some(v4),
                IpAddr::V6(_) => None,
            })
            .ok_or_else(|| ResolutionError::NoAddress(hostname.to_string()))?;

        tracing::debug!(
            hostname,
            %address,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Resolved address"
        );
        Ok(address)
    }
}
