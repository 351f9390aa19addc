//! Synthetic feature seeding at session start.
//!
//! Seeding runs on the caller's thread. With a chunk size set, each
//! [`Seeder::step`] adds one chunk so the caller can pump events between
//! chunks instead of blocking for the whole set.

use crate::config::SeedConfig;
use crate::geometry::{Geometry, LatLng};
use crate::overlay::OverlayRenderer;
use crate::session::MapSession;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Generates seeded points and square polygons.
#[derive(Debug, Clone)]
pub struct Seeder {
    config: SeedConfig,
    rng: StdRng,
    produced: usize,
}

impl Seeder {
    pub fn new(config: SeedConfig) -> Self {
        Self {
            rng: StdRng::seed_from_u64(config.rng_seed),
            config,
            produced: 0,
        }
    }

    pub fn is_done(&self) -> bool {
        self.produced >= self.config.count
    }

    /// Iterations left to run.
    pub fn remaining(&self) -> usize {
        self.config.count.saturating_sub(self.produced)
    }

    /// Iterations already run.
    pub fn produced(&self) -> usize {
        self.produced
    }

    /// Geometries for the next `iterations` iterations: a point and a
    /// square polygon sharing the same random corner.
    fn next_geometries(&mut self, iterations: usize) -> Vec<Geometry> {
        let iterations = iterations.min(self.remaining());
        let size = self.config.polygon_size;
        let mut geometries = Vec::with_capacity(iterations * 2);
        for _ in 0..iterations {
            let lat = self.config.origin.lat + self.rng.random::<f64>() * self.config.spread;
            let lng = self.config.origin.lng + self.rng.random::<f64>() * self.config.spread;
            geometries.push(Geometry::point(LatLng::new(lat, lng)));
            geometries.push(Geometry::Polygon {
                ring: vec![
                    LatLng::new(lat, lng),
                    LatLng::new(lat + size, lng),
                    LatLng::new(lat + size, lng + size),
                    LatLng::new(lat, lng + size),
                ],
            });
        }
        self.produced += iterations;
        geometries
    }

    /// Seed one chunk (or everything, without a chunk size).
    /// A chunk size of 0 is treated as 1. Returns the number of features added.
    pub fn step<O: OverlayRenderer>(&mut self, session: &mut MapSession<O>) -> usize {
        let iterations = self
            .config
            .chunk_size
            .map_or(self.config.count, |size| size.max(1));
        let geometries = self.next_geometries(iterations);
        let added = session.ingest_batch(geometries);
        log::debug!(
            "Seeded {} features ({} of {} iterations)",
            added,
            self.produced,
            self.config.count
        );
        added
    }

    /// Seed everything that is left. Returns the number of features added.
    pub fn run<O: OverlayRenderer>(&mut self, session: &mut MapSession<O>) -> usize {
        let mut added = 0;
        while !self.is_done() {
            added += self.step(session);
        }
        log::info!("Seeding complete: {} features", added);
        added
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SessionConfig;
    use crate::geometry::GeometryKind;
    use crate::overlay::RecordingOverlay;

    fn session() -> MapSession<RecordingOverlay> {
        MapSession::new(SessionConfig::default(), RecordingOverlay::new()).unwrap()
    }

    fn seed_config(count: usize, chunk_size: Option<usize>) -> SeedConfig {
        SeedConfig {
            count,
            chunk_size,
            rng_seed: 7,
            ..SeedConfig::default()
        }
    }

    #[test]
    fn test_each_iteration_adds_point_and_polygon() {
        let mut session = session();
        let mut seeder = Seeder::new(seed_config(25, None));
        assert_eq!(seeder.run(&mut session), 50);
        assert_eq!(session.store().point_count(), 25);
        assert_eq!(session.store().polygon_count(), 25);

        let kinds: Vec<GeometryKind> = session.store().all_features().take(2).map(|f| f.kind()).collect();
        assert_eq!(kinds, vec![GeometryKind::Point, GeometryKind::Polygon]);
    }

    #[test]
    fn test_point_and_polygon_share_anchor() {
        let mut session = session();
        Seeder::new(seed_config(1, None)).run(&mut session);
        let markers: Vec<LatLng> = session.store().markers().map(|m| m.position()).collect();
        assert_eq!(markers[0], markers[1]);
    }

    #[test]
    fn test_chunked_seeding_steps() {
        let mut session = session();
        let mut seeder = Seeder::new(seed_config(10, Some(4)));

        assert_eq!(seeder.step(&mut session), 8);
        assert_eq!(seeder.remaining(), 6);
        assert_eq!(seeder.step(&mut session), 8);
        assert_eq!(seeder.step(&mut session), 4);
        assert!(seeder.is_done());
        assert_eq!(seeder.step(&mut session), 0);
        assert_eq!(session.store().len(), 20);
    }

    #[test]
    fn test_zero_chunk_size_still_progresses() {
        let mut session = session();
        let mut seeder = Seeder::new(seed_config(3, Some(0)));
        assert_eq!(seeder.step(&mut session), 2);
        assert_eq!(seeder.run(&mut session), 4);
        assert!(seeder.is_done());
        assert_eq!(session.store().len(), 6);
    }

    #[test]
    fn test_same_seed_same_features() {
        let mut a = session();
        let mut b = session();
        Seeder::new(seed_config(5, None)).run(&mut a);
        Seeder::new(seed_config(5, Some(2))).run(&mut b);

        let positions = |s: &MapSession<RecordingOverlay>| -> Vec<LatLng> {
            s.store().markers().map(|m| m.position()).collect()
        };
        assert_eq!(positions(&a), positions(&b));
    }

    #[test]
    fn test_seeded_labels_continue_into_drawn_features() {
        let mut session = session();
        Seeder::new(seed_config(3, None)).run(&mut session);
        let id = session.ingest_point(LatLng::new(0.0, 0.0)).unwrap();
        assert_eq!(session.store().get(id).map(|f| f.marker().label()), Some("T7"));
    }
}
