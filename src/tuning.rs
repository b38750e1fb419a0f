//! Data-driven physics and spawning constants
//!
//! Every tuned number lives here. Hosts may override any subset from JSON;
//! missing fields fall back to the defaults below.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sim::populate::ObjectType;

/// Rejected configuration value
#[derive(Debug, Error, PartialEq)]
pub enum TuningError {
    #[error("invalid tuning JSON: {0}")]
    Parse(String),
    #[error("{field} must be positive (got {value})")]
    NotPositive { field: &'static str, value: f32 },
    #[error("{field} must be within {min}..={max} (got {value})")]
    OutOfRange {
        field: &'static str,
        value: f32,
        min: f32,
        max: f32,
    },
    #[error("{0} must be non-zero")]
    Zero(&'static str),
    #[error("object catalog is empty")]
    EmptyCatalog,
    #[error("catalog entry {index} ({sprite}) has non-positive radius {radius}")]
    BadCatalogEntry {
        index: usize,
        sprite: String,
        radius: f32,
    },
}

/// Simulation tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === World ===
    /// Base world width in world units; the wrap band is three of these
    pub world_width: f32,
    /// Downward acceleration while airborne (units/s², +y is down)
    pub gravity: f32,
    /// Rolling resistance rate (1/s); dx loses `dx * rate * slice` per step
    pub rolling_resistance: f32,
    /// Velocity components below this magnitude do not move a body
    pub velocity_epsilon: f32,

    // === Collision ===
    /// Extra reach added to the sum of radii when testing contact
    pub contact_margin: f32,
    /// Obstacles at or above this fraction of the roller radius bounce instead of absorbing
    pub swallow_ratio: f32,
    /// Fraction of roller momentum pushed into a bounced obstacle
    pub transfer_fraction: f32,
    /// Fraction of roller momentum returned to the roller as rebound
    pub rebound_fraction: f32,
    /// Milestone multiplier; camera scale shrinks by its inverse
    pub growth_factor: f32,

    // === Roller ===
    pub roller_radius: f32,
    pub roller_sprite: String,
    /// Side length of the rollup overlay buffer in pixels
    pub overlay_resolution: u32,

    // === Population ===
    pub obstacle_target: usize,
    /// Spawn radius jitter as a fraction of the type's base radius
    pub spawn_jitter: f32,
    pub spawn_attempts: u32,
    /// Spawns must be this multiple of combined radii away from live bodies
    pub spawn_clearance: f32,
    /// Types with base radius up to roller radius × this ratio are unlocked
    pub unlock_ratio: f32,
    /// Number of catalog types visible at once
    pub window_len: usize,
    /// Ordered smallest to largest
    pub catalog: Vec<ObjectType>,

    // === Input ===
    pub jump_impulse: f32,
    pub steer_impulse: f32,
    pub zoom_step: f32,

    // === Pacing ===
    pub watchdog_period_ms: u32,
    pub stall_threshold_ms: f64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            world_width: 1024.0,
            gravity: 600.0,
            rolling_resistance: 0.8,
            velocity_epsilon: 1e-3,

            contact_margin: 1.0,
            swallow_ratio: 0.75,
            transfer_fraction: 1.0 / 3.0,
            rebound_fraction: 1.0 / 3.0,
            growth_factor: 2.0,

            roller_radius: 10.0,
            roller_sprite: "roller".to_string(),
            overlay_resolution: 256,

            obstacle_target: 10,
            spawn_jitter: 0.25,
            spawn_attempts: 20,
            spawn_clearance: 2.0,
            unlock_ratio: 1.5,
            window_len: 4,
            catalog: default_catalog(),

            jump_impulse: 300.0,
            steer_impulse: 40.0,
            zoom_step: 1.25,

            watchdog_period_ms: 100,
            stall_threshold_ms: 100.0,
        }
    }
}

/// Stock objects, smallest first
pub fn default_catalog() -> Vec<ObjectType> {
    [
        ("pebble", 3.0),
        ("coin", 4.0),
        ("button", 5.0),
        ("flower", 7.0),
        ("mushroom", 9.0),
        ("shoe", 12.0),
        ("cat", 18.0),
        ("bush", 25.0),
        ("car", 40.0),
        ("tree", 60.0),
        ("house", 90.0),
        ("tower", 140.0),
    ]
    .into_iter()
    .map(|(sprite, base_radius)| ObjectType::new(sprite, base_radius))
    .collect()
}

impl Tuning {
    /// Parse and validate a JSON override
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning =
            serde_json::from_str(json).map_err(|e| TuningError::Parse(e.to_string()))?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Check every field for values the simulation cannot run with
    pub fn validate(&self) -> Result<(), TuningError> {
        positive("world_width", self.world_width)?;
        positive("roller_radius", self.roller_radius)?;
        positive("velocity_epsilon", self.velocity_epsilon)?;
        positive("jump_impulse", self.jump_impulse)?;
        positive("steer_impulse", self.steer_impulse)?;
        positive("stall_threshold_ms", self.stall_threshold_ms as f32)?;
        non_negative("gravity", self.gravity)?;
        non_negative("rolling_resistance", self.rolling_resistance)?;
        non_negative("contact_margin", self.contact_margin)?;
        non_negative("spawn_clearance", self.spawn_clearance)?;
        within("swallow_ratio", self.swallow_ratio, f32::EPSILON, 1.0)?;
        within("transfer_fraction", self.transfer_fraction, 0.0, 1.0)?;
        within("rebound_fraction", self.rebound_fraction, 0.0, 1.0)?;
        within("spawn_jitter", self.spawn_jitter, 0.0, 0.99)?;
        within("growth_factor", self.growth_factor, 1.0 + f32::EPSILON, 100.0)?;
        within("zoom_step", self.zoom_step, 1.0 + f32::EPSILON, 10.0)?;
        positive("unlock_ratio", self.unlock_ratio)?;

        if self.overlay_resolution == 0 {
            return Err(TuningError::Zero("overlay_resolution"));
        }
        if self.spawn_attempts == 0 {
            return Err(TuningError::Zero("spawn_attempts"));
        }
        if self.window_len == 0 {
            return Err(TuningError::Zero("window_len"));
        }
        if self.watchdog_period_ms == 0 {
            return Err(TuningError::Zero("watchdog_period_ms"));
        }
        if self.catalog.is_empty() {
            return Err(TuningError::EmptyCatalog);
        }
        for (index, entry) in self.catalog.iter().enumerate() {
            if entry.base_radius.is_nan() || entry.base_radius <= 0.0 {
                return Err(TuningError::BadCatalogEntry {
                    index,
                    sprite: entry.sprite.clone(),
                    radius: entry.base_radius,
                });
            }
        }
        Ok(())
    }

    /// Every sprite name the simulation may ask for
    pub fn sprite_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.catalog.iter().map(|t| t.sprite.clone()).collect();
        names.push(self.roller_sprite.clone());
        names.sort();
        names.dedup();
        names
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), TuningError> {
    if value.is_nan() || value <= 0.0 {
        return Err(TuningError::NotPositive { field, value });
    }
    Ok(())
}

fn non_negative(field: &'static str, value: f32) -> Result<(), TuningError> {
    within(field, value, 0.0, f32::MAX)
}

fn within(field: &'static str, value: f32, min: f32, max: f32) -> Result<(), TuningError> {
    if value.is_nan() || value < min || value > max {
        return Err(TuningError::OutOfRange {
            field,
            value,
            min,
            max,
        });
    }
    Ok(())
}
