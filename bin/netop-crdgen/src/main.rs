//! Prints the CustomResourceDefinitions of the netoperator API group

use anyhow::Result;
use k8s_openapi::apiextensions_apiserver::pkg::apis::apiextensions::v1::CustomResourceDefinition;
use netop_api::{v1alpha1, Scheme};
use tracing::info;
use tracing_subscriber::{filter::EnvFilter, filter::LevelFilter};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .init();

    v1alpha1::register()?;
    for known in Scheme::global().known_types(v1alpha1::API_GROUP, v1alpha1::API_VERSION) {
        info!("Known kind {} in {}", known.gvk.kind, known.api_version());
    }

    print!("{}", render(&v1alpha1::crds())?);
    Ok(())
}

/// Multi-document YAML stream of `crds`
fn render(crds: &[CustomResourceDefinition]) -> Result<String> {
    let mut out = String::new();
    for crd in crds {
        out.push_str("---\n");
        out.push_str(&serde_yaml::to_string(crd)?);
    }
    Ok(out)
}
