mod config;
mod error;
mod export;

use anyhow::Result;
use clap::Parser;
use log::{debug, error, info, warn};
use ride_map::{
    CredentialGate, DestinationSink, HttpCredentialSource, MapOptions, RecordRenderer, RecordSet,
    RenderMode, SceneEngine, VisualStyle, load_map,
};
use std::{cell::RefCell, io::Write, path::PathBuf, rc::Rc};
use strum::IntoEnumIterator;

use crate::error::LoaderError;

/// Render a location dataset onto a map after fetching its access token.
#[derive(Parser, Debug)]
#[command(name = "map_loader", version, about)]
struct Cli {
    /// JSON array of location records
    #[arg(long)]
    data: PathBuf,

    /// Business-map attribute; a truthy value draws markers, otherwise rides
    #[arg(long)]
    business_map: Option<String>,

    /// TOML file with a [map] table (center, zoom, prefer_canvas, base_layer)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Click the N-th marker (0-based) after rendering; repeatable
    #[arg(long = "click")]
    clicks: Vec<usize>,
}

/// Destination input that reports what was written to it.
#[derive(Debug, Default)]
struct LoggedDestination {
    value: RefCell<Option<String>>,
}

impl DestinationSink for LoggedDestination {
    fn write(&self, address: &str) {
        info!("Destination set to: {address}");
        *self.value.borrow_mut() = Some(address.to_string());
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Initialize logger - defaults to RUST_LOG if set, otherwise INFO
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            error!("Error: {e}");
            for cause in e.chain().skip(1) {
                error!("  caused by: {cause}");
            }
            let _ = std::io::stderr().flush();
            std::process::exit(1);
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = config::Config::from_env()?;
    let options = match &cli.config {
        Some(path) => config::load_map_options(path)?,
        None => MapOptions::default(),
    };

    let mode = RenderMode::from_flag(cli.business_map.as_deref());
    info!("Map loader starting in {mode} mode");

    let text = std::fs::read_to_string(&cli.data).map_err(|e| LoaderError::ReadDataset {
        path: cli.data.clone(),
        source: e,
    })?;
    let parsed = RecordSet::from_json(&text, mode).map_err(LoaderError::from)?;
    if !parsed.rejected.is_empty() {
        warn!(
            "{} of {} records were malformed and skipped",
            parsed.rejected.len(),
            parsed.rejected.len() + parsed.records.len()
        );
    }

    let destination = Rc::new(LoggedDestination::default());
    let renderer =
        RecordRenderer::new(destination.clone()).with_base_layer(options.base_layer.clone());

    let source = HttpCredentialSource::new(&config.credential_url, &config.token_key);
    debug!("Credential endpoint: {}", source.url());
    let mut gate = CredentialGate::new(source);
    if let Some(timeout) = config.timeout {
        gate = gate.with_timeout(timeout);
    }
    debug!("Credential timeout: {:?}", gate.timeout());

    let (scene, summary) = load_map(gate, SceneEngine, &options, &parsed.records, &renderer)
        .await
        .map_err(LoaderError::from)?;
    let view = scene.options();
    info!(
        "Map ready at ({}, {}), zoom {}",
        view.center.latitude, view.center.longitude, view.zoom
    );

    if mode.is_business_map() {
        for style in VisualStyle::iter() {
            let count = summary.by_style.get(&style).copied().unwrap_or(0);
            info!("{style} markers: {count}");
        }
    } else {
        info!("Rides drawn: {}", summary.circles / 2);
    }

    let markers: Vec<_> = scene.markers().map(|(id, _)| id).collect();
    for index in cli.clicks {
        match markers.get(index) {
            Some(&id) => {
                scene.click(id);
            }
            None => warn!("No marker at index {index}; {} markers drawn", markers.len()),
        }
    }
    if let Some(address) = destination.value.borrow().as_deref() {
        info!("Final destination: {address}");
    }

    let path = export::export_scene_to_csv_with_path(&scene, &config.output_dir)?;
    info!("Scene saved to: {}", path.display());

    Ok(())
}
