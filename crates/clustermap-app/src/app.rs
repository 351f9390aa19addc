//! Headless session driver.

use clustermap_core::config::{ConfigError, SessionConfig};
use clustermap_core::events::{EventHub, MapEvent};
use clustermap_core::seed::Seeder;
use clustermap_core::session::{MapSession, SessionStats};
use clustermap_render::{MapCamera, SceneOverlay};
use kurbo::Size;
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that end a run.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse event script: {0}")]
    Events(#[source] serde_json::Error),
    #[error("Failed to write report: {0}")]
    Report(#[source] serde_json::Error),
}

/// Command line arguments.
#[derive(clap::Parser, Debug, Clone)]
#[command(name = "clustermap", version, about = "Replay map events against a clustering session")]
pub struct Args {
    /// Session configuration (JSON)
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Zoom level at which clustering turns off
    #[arg(short, long)]
    pub threshold: Option<u8>,

    /// Seeding iterations (each adds a point and a polygon)
    #[arg(long)]
    pub seed_count: Option<usize>,

    /// Seeding iterations per chunk; events are pumped between chunks
    #[arg(long)]
    pub chunk_size: Option<usize>,

    /// Event script: a JSON array of map events
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub events: Option<PathBuf>,

    /// Viewport width in pixels
    #[arg(long, default_value_t = 1280.0)]
    pub width: f64,

    /// Viewport height in pixels
    #[arg(long, default_value_t = 800.0)]
    pub height: f64,
}

impl Default for Args {
    fn default() -> Self {
        Self {
            config: None,
            threshold: None,
            seed_count: None,
            chunk_size: None,
            events: None,
            width: 1280.0,
            height: 800.0,
        }
    }
}

/// Draw items in the final frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FrameSummary {
    pub badges: usize,
    pub pins: usize,
    pub outlines: usize,
}

/// Summary printed at the end of a run.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub session: String,
    pub readout: String,
    pub stats: SessionStats,
    pub events_applied: usize,
    pub redraw_requests: u64,
    pub frame: FrameSummary,
}

impl Report {
    pub fn to_json(&self) -> Result<String, AppError> {
        serde_json::to_string_pretty(self).map_err(AppError::Report)
    }
}

/// Main application struct.
pub struct App {
    args: Args,
}

impl App {
    pub fn new(args: Args) -> Self {
        Self { args }
    }

    /// Load the configuration file (if any) and apply command line overrides.
    pub fn config(&self) -> Result<SessionConfig, AppError> {
        let mut config = match &self.args.config {
            Some(path) => SessionConfig::load(path)?,
            None => SessionConfig::default(),
        };
        if let Some(threshold) = self.args.threshold {
            config.clustering_threshold = threshold;
        }
        if let Some(count) = self.args.seed_count {
            config.seed.count = count;
        }
        if let Some(chunk_size) = self.args.chunk_size {
            config.seed.chunk_size = Some(chunk_size);
        }
        config.validate()?;
        Ok(config)
    }

    pub fn run(&self) -> Result<Report, AppError> {
        let config = self.config()?;
        let script = match &self.args.events {
            Some(path) => load_events(path)?,
            None => Vec::new(),
        };

        let mut camera = MapCamera::new(
            config.initial_center,
            config.initial_zoom,
            Size::new(self.args.width, self.args.height),
        );
        camera.min_zoom = f64::from(config.min_zoom);
        camera.max_zoom = f64::from(config.max_zoom);

        let mut seeder = Seeder::new(config.seed.clone());
        let mut session = MapSession::new(config, SceneOverlay::new())?;
        let mut hub = EventHub::new();
        session.attach(&mut hub);

        hub.publish(MapEvent::BoundsChanged {
            bounds: camera.visible_bounds(),
        });
        let mut applied = session.pump(&mut hub);

        // One scripted event between seeding chunks, the rest afterwards.
        let mut script = script.into_iter();
        while !seeder.is_done() {
            seeder.step(&mut session);
            if let Some(event) = script.next() {
                publish(&mut hub, &mut camera, event);
            }
            applied += session.pump(&mut hub);
        }
        for event in script {
            publish(&mut hub, &mut camera, event);
            applied += session.pump(&mut hub);
        }
        session.detach(&mut hub);

        let frame = session.overlay().build_frame(&camera);
        let report = Report {
            session: session.id().to_string(),
            readout: session.policy().state().readout(),
            stats: session.stats(),
            events_applied: applied,
            redraw_requests: session.overlay().redraw_requests(),
            frame: FrameSummary {
                badges: frame.badge_count(),
                pins: frame.pin_count(),
                outlines: frame.outline_count(),
            },
        };
        log::info!(
            "Run complete: {} features, {} events applied",
            report.stats.features,
            report.events_applied
        );
        Ok(report)
    }
}

/// Publish an event the way the map surface would: a zoom change moves the
/// camera and is followed by the new visible bounds.
fn publish(hub: &mut EventHub, camera: &mut MapCamera, event: MapEvent) {
    let zoomed = match &event {
        MapEvent::ZoomChanged { zoom } => {
            camera.set_zoom(*zoom);
            true
        }
        MapEvent::BoundsChanged { bounds } => {
            camera.center = bounds.center();
            false
        }
        _ => false,
    };
    hub.publish(event);
    if zoomed {
        hub.publish(MapEvent::BoundsChanged {
            bounds: camera.visible_bounds(),
        });
    }
}

fn load_events(path: &Path) -> Result<Vec<MapEvent>, AppError> {
    let json = std::fs::read_to_string(path).map_err(|source| AppError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let events: Vec<MapEvent> = serde_json::from_str(&json).map_err(AppError::Events)?;
    log::debug!("Loaded {} scripted events from {:?}", events.len(), path);
    Ok(events)
}
