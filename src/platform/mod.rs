//! Platform-facing pieces that stay host-agnostic
//!
//! - `scheduler`: render/watchdog cadence to physics slices
//! - `input`: command vocabulary and its effect on the world
//! - `assets`: sprite load accounting and the decoded sprite atlas

pub mod assets;
pub mod input;
pub mod scheduler;

pub use assets::{AssetError, AssetLoader, SpriteAtlas, placeholder_atlas};
pub use input::Command;
pub use scheduler::{Clock, FrameTick, SchedulerState, TickScheduler};
