//! World population: keep the obstacle count topped up
//!
//! Object types come from an ordered catalog. As the roller grows, the window
//! of spawnable types slides toward larger entries. Spawn positions are
//! rejection-sampled across the wrap band, keeping clear of live bodies.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::state::{SpriteId, World, WrapBand};

/// A spawnable kind of obstacle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectType {
    pub sprite: String,
    pub base_radius: f32,
}

impl ObjectType {
    pub fn new(sprite: impl Into<String>, base_radius: f32) -> Self {
        Self {
            sprite: sprite.into(),
            base_radius,
        }
    }
}

/// Index range of catalog types available to a roller of `roller_radius`
///
/// The upper end covers every type whose base radius is within
/// `unlock_ratio` × roller radius (at least one type); the window keeps the
/// top `window_len` of those.
pub fn catalog_window(
    catalog: &[ObjectType],
    roller_radius: f32,
    unlock_ratio: f32,
    window_len: usize,
) -> std::ops::Range<usize> {
    let reach = roller_radius * unlock_ratio;
    let hi = catalog
        .iter()
        .take_while(|t| t.base_radius <= reach)
        .count()
        .max(1)
        .min(catalog.len());
    let lo = hi.saturating_sub(window_len.max(1));
    lo..hi
}

/// Where a spawn ended up
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub x: f32,
    /// Samples drawn, including the accepted one
    pub attempts: u32,
    /// False when every attempt overlapped and the last sample was used anyway
    pub clear: bool,
}

/// Rejection-sample a horizontal spawn position
///
/// `occupied` lists (x, radius) of live bodies. A candidate is rejected when
/// it lies within `clearance` × combined radii of any of them. After
/// `max_attempts` rejections the last candidate is accepted.
pub fn find_spawn_x<R: Rng>(
    rng: &mut R,
    band: WrapBand,
    radius: f32,
    occupied: &[(f32, f32)],
    clearance: f32,
    max_attempts: u32,
) -> Placement {
    let max_attempts = max_attempts.max(1);
    let mut x = band.center;
    for attempt in 1..=max_attempts {
        x = rng.random_range(band.lo()..band.hi());
        let blocked = occupied
            .iter()
            .any(|&(ox, or)| (x - ox).abs() < clearance * (radius + or));
        if !blocked {
            return Placement {
                x,
                attempts: attempt,
                clear: true,
            };
        }
    }
    Placement {
        x,
        attempts: max_attempts,
        clear: false,
    }
}

/// Spawn one obstacle chosen from the current catalog window
///
/// Returns the new body's ID.
pub fn spawn_obstacle(world: &mut World) -> u32 {
    let roller_radius = world.roller().radius;
    let window = catalog_window(
        &world.tuning.catalog,
        roller_radius,
        world.tuning.unlock_ratio,
        world.tuning.window_len,
    );
    let pick = world.rng.random_range(window);
    let kind = world.tuning.catalog[pick].clone();

    let jitter = world.tuning.spawn_jitter;
    let radius = kind.base_radius * (1.0 + world.rng.random_range(-jitter..=jitter));

    let occupied: Vec<(f32, f32)> = world
        .bodies
        .iter()
        .filter(|b| b.alive)
        .map(|b| (b.pos.x, b.radius))
        .collect();
    let band = world.wrap_band();
    let placement = find_spawn_x(
        &mut world.rng,
        band,
        radius,
        &occupied,
        world.tuning.spawn_clearance,
        world.tuning.spawn_attempts,
    );
    if !placement.clear {
        log::warn!(
            "No clear spot for {} (r={:.2}) after {} attempts; spawning at x={:.1} anyway",
            kind.sprite,
            radius,
            placement.attempts,
            placement.x
        );
    }

    let id = world.insert_obstacle(placement.x, radius, SpriteId::new(kind.sprite.clone()));
    log::debug!(
        "Spawned #{} {} r={:.2} at x={:.1}",
        id,
        kind.sprite,
        radius,
        placement.x
    );
    id
}

/// Spawn until the live obstacle count reaches the target
pub fn populate(world: &mut World) -> Vec<u32> {
    let missing = world
        .tuning
        .obstacle_target
        .saturating_sub(world.live_obstacles());
    (0..missing).map(|_| spawn_obstacle(world)).collect()
}

/// Drop dead bodies and spawn one replacement for each
///
/// Returns the IDs of the replacements.
pub fn replenish(world: &mut World) -> Vec<u32> {
    let before = world.bodies.len();
    world.bodies.retain(|b| b.alive || b.is_roller());
    let removed = before - world.bodies.len();
    (0..removed).map(|_| spawn_obstacle(world)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuning::{Tuning, default_catalog};
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_window_small_roller_sees_small_types() {
        let catalog = default_catalog();
        // reach 15: pebble..shoe unlocked (6), window keeps the top 4
        let window = catalog_window(&catalog, 10.0, 1.5, 4);
        assert_eq!(window, 2..6);
        assert!(catalog[window].iter().all(|t| t.base_radius <= 15.0));
    }

    #[test]
    fn test_window_slides_with_growth() {
        let catalog = default_catalog();
        let small = catalog_window(&catalog, 10.0, 1.5, 4);
        let big = catalog_window(&catalog, 50.0, 1.5, 4);
        assert!(big.start > small.start);
        assert!(big.end > small.end);
        let huge = catalog_window(&catalog, 10_000.0, 1.5, 4);
        assert_eq!(huge, catalog.len() - 4..catalog.len());
    }

    #[test]
    fn test_window_never_empty() {
        let catalog = default_catalog();
        let tiny = catalog_window(&catalog, 0.1, 1.5, 4);
        assert_eq!(tiny, 0..1);
    }

    #[test]
    fn test_spawn_rejects_overlap_then_gives_up() {
        let mut rng = Pcg32::seed_from_u64(3);
        let band = WrapBand {
            center: 0.0,
            world_width: 10.0,
        };
        // One huge body blocks the whole band
        let occupied = [(0.0, 100.0)];
        let placement = find_spawn_x(&mut rng, band, 2.0, &occupied, 2.0, 20);
        assert!(!placement.clear);
        assert_eq!(placement.attempts, 20);
        assert!(placement.x >= band.lo() && placement.x < band.hi());
    }

    #[test]
    fn test_spawn_finds_clear_spot() {
        let mut rng = Pcg32::seed_from_u64(3);
        let band = WrapBand {
            center: 0.0,
            world_width: 1000.0,
        };
        let occupied = [(0.0, 10.0)];
        let placement = find_spawn_x(&mut rng, band, 5.0, &occupied, 2.0, 20);
        assert!(placement.clear);
        assert!(placement.x.abs() >= 30.0);
    }

    #[test]
    fn test_populate_reaches_target() {
        let mut world = World::new(Tuning::default(), 11);
        let spawned = populate(&mut world);
        assert_eq!(spawned.len(), 10);
        assert_eq!(world.live_obstacles(), 10);
        // Already full
        assert!(populate(&mut world).is_empty());
    }

    #[test]
    fn test_spawn_radius_jitter_bounds() {
        let mut world = World::new(Tuning::default(), 5);
        for _ in 0..50 {
            spawn_obstacle(&mut world);
        }
        let catalog = default_catalog();
        for body in world.obstacles() {
            let base = catalog
                .iter()
                .find(|t| t.sprite == body.sprite.as_str())
                .map(|t| t.base_radius)
                .unwrap();
            assert!(body.radius >= base * 0.75 - 1e-4);
            assert!(body.radius <= base * 1.25 + 1e-4);
            assert_eq!(body.pos.y, -body.radius);
        }
    }

    #[test]
    fn test_replenish_matches_removals() {
        let mut world = World::new(Tuning::default(), 9);
        populate(&mut world);
        world.bodies[2].alive = false;
        world.bodies[5].alive = false;
        let replacements = replenish(&mut world);
        assert_eq!(replacements.len(), 2);
        assert_eq!(world.live_obstacles(), 10);
        assert!(world.bodies.iter().all(|b| b.alive));
        assert!(world.bodies[0].is_roller());
    }
}
