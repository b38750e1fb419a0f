//! Player commands
//!
//! Hosts translate raw keyboard/touch events into a [`Command`]; applying one
//! is a direct velocity (or zoom) change on the world with no further state.

use crate::consts::{MAX_USER_ZOOM, MIN_USER_ZOOM};
use crate::sim::World;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Jump,
    SteerLeft,
    SteerRight,
    ZoomIn,
    ZoomOut,
}

impl Command {
    /// Map a DOM `KeyboardEvent.key` value
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            " " | "ArrowUp" | "w" | "W" => Some(Command::Jump),
            "ArrowLeft" | "a" | "A" => Some(Command::SteerLeft),
            "ArrowRight" | "d" | "D" => Some(Command::SteerRight),
            "+" | "=" => Some(Command::ZoomIn),
            "-" | "_" => Some(Command::ZoomOut),
            _ => None,
        }
    }

    /// Map a touch at horizontal position `x` on a surface `width` wide
    ///
    /// Left third steers left, right third steers right, middle jumps.
    pub fn from_touch(x: f32, width: f32) -> Option<Self> {
        if width <= 0.0 || !x.is_finite() {
            return None;
        }
        let t = x / width;
        Some(if t < 1.0 / 3.0 {
            Command::SteerLeft
        } else if t > 2.0 / 3.0 {
            Command::SteerRight
        } else {
            Command::Jump
        })
    }
}

/// Apply a command to the world
pub fn apply(world: &mut World, command: Command) {
    let tuning = &world.tuning;
    let (jump, steer, zoom) = (tuning.jump_impulse, tuning.steer_impulse, tuning.zoom_step);
    match command {
        Command::Jump => world.roller_mut().vel.y -= jump,
        Command::SteerLeft => world.roller_mut().vel.x -= steer,
        Command::SteerRight => world.roller_mut().vel.x += steer,
        Command::ZoomIn => {
            world.user_zoom = (world.user_zoom * zoom).clamp(MIN_USER_ZOOM, MAX_USER_ZOOM)
        }
        Command::ZoomOut => {
            world.user_zoom = (world.user_zoom / zoom).clamp(MIN_USER_ZOOM, MAX_USER_ZOOM)
        }
    }
}
