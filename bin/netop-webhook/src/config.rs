use anyhow::{anyhow, Result};
use std::net::SocketAddr;
use std::path::PathBuf;

pub const DEFAULT_ADDR: &str = "0.0.0.0:9443";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Webhook settings read from `NETOP_*` environment variables
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WebhookConfig {
    pub addr: SocketAddr,
    pub tls_cert: Option<PathBuf>,
    pub tls_key: Option<PathBuf>,
    pub log_format: LogFormat,
}

impl WebhookConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let addr = lookup("NETOP_WEBHOOK_ADDR").unwrap_or_else(|| DEFAULT_ADDR.to_string());
        let addr = addr
            .parse()
            .map_err(|e| anyhow!("Invalid NETOP_WEBHOOK_ADDR {}: {}", addr, e))?;

        let log_format = match lookup("NETOP_LOG_FORMAT").as_deref() {
            None | Some("") | Some("text") => LogFormat::Text,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(anyhow!(
                    "Invalid NETOP_LOG_FORMAT {}. Must be text or json",
                    other
                ))
            }
        };

        Ok(Self {
            addr,
            tls_cert: lookup("NETOP_TLS_CERT").map(PathBuf::from),
            tls_key: lookup("NETOP_TLS_KEY").map(PathBuf::from),
            log_format,
        })
    }

    /// Both halves of the TLS key pair, when configured
    pub fn tls_paths(&self) -> Option<(&PathBuf, &PathBuf)> {
        self.tls_cert.as_ref().zip(self.tls_key.as_ref())
    }
}
