use anyhow::Result;
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::{
    body::{Body, Bytes, Incoming},
    header::{HeaderValue, CONTENT_TYPE},
    server::conn::http1,
    service::service_fn,
    Method, Request, Response, StatusCode,
};
use hyper_util::rt::tokio::TokioIo;
use kube::core::admission::AdmissionReview;
use kube::core::DynamicObject;
use netop_api::{v1alpha1, Scheme};
use std::convert::Infallible;
use tokio::net::TcpListener;
use tracing::{debug, info, warn};
use tracing_subscriber::{filter::EnvFilter, filter::LevelFilter, fmt, prelude::*, registry};

mod admission;
mod config;
mod tls;

use config::{LogFormat, WebhookConfig};

/// Largest AdmissionReview accepted, matching the API server's request cap
const MAX_BODY_BYTES: usize = 3 * 1024 * 1024;

#[tokio::main]
async fn main() -> Result<()> {
    let config = WebhookConfig::from_env()?;
    init_tracing(config.log_format);

    info!("Starting netop-webhook...");

    v1alpha1::register()?;
    info!(
        "Registered {} kind(s) for {}/{}",
        Scheme::global().known_types(v1alpha1::API_GROUP, v1alpha1::API_VERSION).len(),
        v1alpha1::API_GROUP,
        v1alpha1::API_VERSION
    );

    let tls_acceptor = match config.tls_paths() {
        Some((cert, key)) => Some(tls::load_acceptor(cert, key)?),
        None => {
            warn!("TLS not configured - serving plain HTTP");
            warn!("Set NETOP_TLS_CERT and NETOP_TLS_KEY environment variables to enable HTTPS");
            None
        }
    };

    let listener = TcpListener::bind(config.addr).await?;
    info!(
        "Webhook listening on {} ({})",
        config.addr,
        if tls_acceptor.is_some() { "https" } else { "http" }
    );

    loop {
        let (stream, peer_addr) = match listener.accept().await {
            Ok(conn) => conn,
            Err(e) => {
                warn!("Error accepting connection: {}", e);
                continue;
            }
        };

        let tls_acceptor = tls_acceptor.clone();
        tokio::task::spawn(async move {
            let result = match tls_acceptor {
                Some(acceptor) => match acceptor.accept(stream).await {
                    Ok(tls_stream) => serve(TokioIo::new(tls_stream)).await,
                    Err(e) => {
                        debug!("TLS error from {}: {}", peer_addr, e);
                        return;
                    }
                },
                None => serve(TokioIo::new(stream)).await,
            };
            if let Err(e) = result {
                debug!("Error serving connection from {}: {}", peer_addr, e);
            }
        });
    }
}

fn init_tracing(format: LogFormat) {
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();

    match format {
        LogFormat::Json => registry().with(fmt::layer().json()).with(env_filter).init(),
        LogFormat::Text => registry().with(fmt::layer()).with(env_filter).init(),
    }
}

async fn serve<I>(io: TokioIo<I>) -> Result<(), hyper::Error>
where
    I: tokio::io::AsyncRead + tokio::io::AsyncWrite + Unpin + Send + 'static,
{
    http1::Builder::new()
        .serve_connection(io, service_fn(handle_request))
        .await
}

async fn handle_request(req: Request<Incoming>) -> Result<Response<Full<Bytes>>, Infallible> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    debug!("{} {}", method, path);

    match read_body(req.into_body(), MAX_BODY_BYTES).await {
        Ok(body) => Ok(route(Scheme::global(), &method, &path, &body)),
        Err(response) => Ok(response),
    }
}

/// Collect at most `limit` bytes of a request body
async fn read_body<B>(body: B, limit: usize) -> Result<Bytes, Response<Full<Bytes>>>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    match Limited::new(body, limit).collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(e) if e.is::<LengthLimitError>() => {
            warn!("Request body exceeds {} bytes", limit);
            Err(text(StatusCode::PAYLOAD_TOO_LARGE, "Payload Too Large\n"))
        }
        Err(e) => {
            debug!("Error reading request body: {}", e);
            Err(text(StatusCode::BAD_REQUEST, "Bad Request\n"))
        }
    }
}

fn route(scheme: &Scheme, method: &Method, path: &str, body: &[u8]) -> Response<Full<Bytes>> {
    match (method, path) {
        (&Method::GET, "/healthz") => text(StatusCode::OK, "OK\n"),
        (&Method::POST, "/validate") => {
            let body: AdmissionReview<DynamicObject> = match serde_json::from_slice(body) {
                Ok(body) => body,
                Err(e) => {
                    warn!("Malformed AdmissionReview: {}", e);
                    return text(StatusCode::BAD_REQUEST, &format!("Malformed AdmissionReview: {}\n", e));
                }
            };
            match serde_json::to_vec(&admission::review(scheme, body)) {
                Ok(json) => {
                    let mut response = Response::new(Full::new(Bytes::from(json)));
                    response
                        .headers_mut()
                        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
                    response
                }
                Err(e) => text(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    &format!("Failed to encode AdmissionReview: {}\n", e),
                ),
            }
        }
        (_, "/healthz") | (_, "/validate") => text(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed\n"),
        _ => text(StatusCode::NOT_FOUND, "Not Found\n"),
    }
}

fn text(status: StatusCode, body: &str) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::from(body.to_string())));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("text/plain"));
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn scheme() -> Scheme {
        let scheme = Scheme::new();
        v1alpha1::add_to_scheme(&scheme).unwrap();
        scheme
    }

    async fn body_json(response: Response<Full<Bytes>>) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_healthz() {
        let response = route(&scheme(), &Method::GET, "/healthz", b"");
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&bytes[..], b"OK\n");
    }

    #[tokio::test]
    async fn test_validate_round_trip() {
        let review = json!({
            "apiVersion": "admission.k8s.io/v1",
            "kind": "AdmissionReview",
            "request": {
                "uid": "c1a5f3d2-0000-4000-8000-000000000001",
                "kind": {"group": "netoperator.vmware.com", "version": "v1alpha1", "kind": "VSphereDistributedNetwork"},
                "resource": {"group": "netoperator.vmware.com", "version": "v1alpha1", "resource": "vspheredistributednetworks"},
                "name": "net-a",
                "operation": "CREATE",
                "userInfo": {},
                "object": {
                    "apiVersion": "netoperator.vmware.com/v1alpha1",
                    "kind": "VSphereDistributedNetwork",
                    "metadata": {"name": "net-a"},
                    "spec": {
                        "portGroupID": "dvpg-100",
                        "ipAssignmentMode": "none",
                        "ipPools": [],
                        "gateway": "",
                        "subnetMask": ""
                    }
                },
                "dryRun": false
            }
        });
        let body = serde_json::to_vec(&review).unwrap();

        let response = route(&scheme(), &Method::POST, "/validate", &body);
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["response"]["uid"], "c1a5f3d2-0000-4000-8000-000000000001");
        assert_eq!(json["response"]["allowed"], true);
    }

    #[tokio::test]
    async fn test_body_size_limit() {
        let Ok(body) = read_body(Full::new(Bytes::from_static(b"{}")), 16).await else {
            panic!("small body must be read");
        };
        assert_eq!(&body[..], b"{}");

        let oversized = Full::new(Bytes::from(vec![b'x'; 17]));
        let Err(response) = read_body(oversized, 16).await else {
            panic!("oversized body must be rejected");
        };
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[test]
    fn test_malformed_review() {
        let response = route(&scheme(), &Method::POST, "/validate", b"{not json");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_unknown_routes() {
        assert_eq!(
            route(&scheme(), &Method::GET, "/validate", b"").status(),
            StatusCode::METHOD_NOT_ALLOWED
        );
        assert_eq!(
            route(&scheme(), &Method::GET, "/metrics", b"").status(),
            StatusCode::NOT_FOUND
        );
    }
}
