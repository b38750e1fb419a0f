//! Simulation core
//!
//! All physics and world bookkeeping lives here. This module must stay free
//! of rendering and platform concerns:
//! - One integrator for every body
//! - Explicitly owned `World`, no globals
//! - Seeded RNG only
//! - Rendering never mutates anything in here

pub mod collision;
pub mod integrate;
pub mod populate;
pub mod raster;
pub mod rollup;
pub mod state;
pub mod tick;

pub use collision::{Contact, Outcome, check_contact, heading_toward, resolve};
pub use integrate::integrate;
pub use populate::{ObjectType, Placement, catalog_window, find_spawn_x, populate, replenish};
pub use raster::{Image, Rgba};
pub use rollup::{Overlay, Stamp, composite};
pub use state::{Body, BodyKind, SpriteId, World, WrapBand, area_of, radius_for_area};
pub use tick::{SimEvent, StepReport, step};
