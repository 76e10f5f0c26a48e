//! TLS termination for the webhook listener

use anyhow::{anyhow, Context, Result};
use rustls::pki_types::PrivateKeyDer;
use rustls::ServerConfig;
use rustls_pemfile::{certs, read_all, Item};
use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;
use tokio_rustls::TlsAcceptor;
use tracing::{debug, info};

/// Build a rustls server configuration from PEM-encoded certificate chain
/// and private key
pub fn server_config_from_pem(cert_pem: &[u8], key_pem: &[u8]) -> Result<ServerConfig> {
    let mut cert_reader = BufReader::new(cert_pem);
    let chain = certs(&mut cert_reader)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| anyhow!("Failed to parse certificates: {}", e))?;

    if chain.is_empty() {
        return Err(anyhow!("No certificates found in PEM data"));
    }
    debug!("Loaded {} certificate(s)", chain.len());

    let mut key_reader = BufReader::new(key_pem);
    let items: Vec<Item> = read_all(&mut key_reader)
        .collect::<Result<_, _>>()
        .map_err(|e| anyhow!("Failed to parse private key: {}", e))?;

    let private_key = items
        .into_iter()
        .find_map(|item| match item {
            Item::Pkcs8Key(k) => Some(PrivateKeyDer::Pkcs8(k)),
            Item::Pkcs1Key(k) => Some(PrivateKeyDer::Pkcs1(k)),
            Item::Sec1Key(k) => Some(PrivateKeyDer::Sec1(k)),
            _ => None,
        })
        .ok_or_else(|| anyhow!("No private key found in PEM data"))?;

    let provider = Arc::new(rustls::crypto::ring::default_provider());
    ServerConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()
        .map_err(|e| anyhow!("Failed to select TLS protocol versions: {}", e))?
        .with_no_client_auth()
        .with_single_cert(chain, private_key)
        .map_err(|e| anyhow!("Failed to create TLS config: {}", e))
}

/// Read the key pair from disk and build an acceptor for the listener
pub fn load_acceptor(cert_path: &Path, key_path: &Path) -> Result<TlsAcceptor> {
    let cert = std::fs::read(cert_path)
        .with_context(|| format!("Failed to read TLS certificate from {}", cert_path.display()))?;
    let key = std::fs::read(key_path)
        .with_context(|| format!("Failed to read TLS key from {}", key_path.display()))?;

    let config = server_config_from_pem(&cert, &key)?;
    info!(
        "TLS configuration loaded from {} and {}",
        cert_path.display(),
        key_path.display()
    );
    Ok(TlsAcceptor::from(Arc::new(config)))
}
