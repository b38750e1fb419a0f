//! One physics step over the whole world
//!
//! Integrate every body, resolve the roller against each live obstacle,
//! then replace whatever was absorbed before returning.

use super::collision::{self, Outcome};
use super::integrate::integrate;
use super::populate;
use super::state::World;
use crate::platform::assets::SpriteAtlas;

/// Something notable that happened during a step
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SimEvent {
    Absorbed {
        id: u32,
        radius: f32,
        roller_radius: f32,
    },
    Bounced {
        id: u32,
    },
    Milestone {
        roller_radius: f32,
        camera_scale: f32,
    },
    Spawned {
        id: u32,
    },
}

/// Summary of one step
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepReport {
    pub slice: f32,
    pub events: Vec<SimEvent>,
}

impl StepReport {
    pub fn absorbed(&self) -> usize {
        self.count(|e| matches!(e, SimEvent::Absorbed { .. }))
    }

    pub fn spawned(&self) -> usize {
        self.count(|e| matches!(e, SimEvent::Spawned { .. }))
    }

    pub fn bounced(&self) -> usize {
        self.count(|e| matches!(e, SimEvent::Bounced { .. }))
    }

    fn count(&self, pred: impl Fn(&SimEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

/// Advance the world by `slice` seconds
///
/// Negative slices are floored to zero. All removals and replacements are
/// finished before this returns.
pub fn step(world: &mut World, slice: f32, sprites: &SpriteAtlas) -> StepReport {
    let slice = if slice.is_finite() { slice.max(0.0) } else { 0.0 };
    let mut report = StepReport {
        slice,
        events: Vec::new(),
    };

    // Keep the roller in the middle of the band so it never meets a seam
    world.wrap_center = world.roller().pos.x;
    let band = world.wrap_band();
    for body in &mut world.bodies {
        integrate(body, slice, band, &world.tuning);
    }

    for index in 1..world.bodies.len() {
        let id = world.bodies[index].id;
        let radius = world.bodies[index].radius;
        match collision::resolve(world, index, sprites) {
            Some(Outcome::Bounced) => report.events.push(SimEvent::Bounced { id }),
            Some(Outcome::Absorbed {
                new_radius,
                milestones,
                ..
            }) => {
                report.events.push(SimEvent::Absorbed {
                    id,
                    radius,
                    roller_radius: new_radius,
                });
                if milestones > 0 {
                    report.events.push(SimEvent::Milestone {
                        roller_radius: new_radius,
                        camera_scale: world.camera_scale,
                    });
                }
            }
            None => {}
        }
    }

    for id in populate::replenish(world) {
        report.events.push(SimEvent::Spawned { id });
    }

    report
}
