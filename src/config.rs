use std::{env, fs, path::PathBuf, time::Duration};

/// Environment variable whose presence marks a Kubernetes deployment.
pub const KUBERNETES_MARKER: &str = "KUBERNETES_SERVICE_HOST";

pub struct Config {
    pub port: u16,
    pub database_url: Option<String>,
    pub pool_size: usize,
    pub dns_timeout: Duration,
    pub version_file: PathBuf,
    pub kubernetes: bool,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            port: parse_var("PORT").unwrap_or(3000),
            database_url: env::var("DATABASE_URL").ok().filter(|u| !u.is_empty()),
            pool_size: parse_var("DATABASE_POOL_SIZE").unwrap_or(8),
            dns_timeout: Duration::from_millis(parse_var("DNS_TIMEOUT_MS").unwrap_or(5000)),
            version_file: env::var("VERSION_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("VERSION")),
            kubernetes: env::var_os(KUBERNETES_MARKER).is_some(),
        }
    }

    /// Reads the build version once. Falls back to the package version when
    /// the file is missing or empty.
    pub fn load_version(&self) -> String {
        match fs::read_to_string(&self.version_file) {
            Ok(contents) if !contents.trim().is_empty() => contents.trim().to_string(),
            Ok(_) => {
                tracing::warn!(path = %self.version_file.display(), "Version file is empty");
                env!("CARGO_PKG_VERSION").to_string()
            }
            Err(e) => {
                tracing::warn!(
                    path = %self.version_file.display(),
                    error = %e,
                    "Could not read version file"
                );
                env!("CARGO_PKG_VERSION").to_string()
            }
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}
