use std::net::SocketAddr;
use std::sync::Arc;

use chrono::NaiveDate;
use serde::Deserialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use cladarium::catalog::{Generation, MemoryCatalog};
use cladarium::engine::EngineSettings;
use cladarium::error::{CladariumError, Result};
use cladarium::server;

#[derive(Debug, Deserialize)]
struct Settings {
    #[serde(default = "default_listen")]
    listen: String,
    /// Path to a JSON records file to seed the catalog from.
    records: Option<String>,
    #[serde(default)]
    generations: GenerationSettings,
}

#[derive(Debug, Deserialize)]
struct GenerationSettings {
    #[serde(default = "default_enabled")]
    enabled: bool,
    #[serde(default)]
    epochs: Vec<EpochSettings>,
}
impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            epochs: Vec::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct EpochSettings {
    name: String,
    starts: NaiveDate,
}

fn default_listen() -> String {
    "127.0.0.1:8080".to_string()
}
fn default_enabled() -> bool {
    true
}

fn load_settings() -> Result<Settings> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("cladarium").required(false))
        .add_source(config::Environment::with_prefix("CLADARIUM"))
        .build()?
        .try_deserialize()?;
    Ok(settings)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    let settings = load_settings()?;
    let mut catalog = match &settings.records {
        Some(path) => MemoryCatalog::load(path)?,
        None => MemoryCatalog::new(),
    };
    for epoch in settings.generations.epochs {
        catalog.add_generation(Generation::new(epoch.name, epoch.starts));
    }
    info!(records = catalog.len(), "catalog ready");
    let engine_settings = EngineSettings {
        generations: settings.generations.enabled,
    };
    let app = server::router(Arc::new(catalog), engine_settings);
    let addr: SocketAddr = settings
        .listen
        .parse()
        .map_err(|e| CladariumError::Config(format!("bad listen address: {e}")))?;
    info!(%addr, "listening");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| CladariumError::Config(e.to_string()))?;
    axum::serve(listener, app)
        .await
        .map_err(|e| CladariumError::Config(e.to_string()))?;
    Ok(())
}
