//! One running game: world, pacing, sprites and viewport
//!
//! Hosts forward their callbacks here and never touch the world directly.
//! Sessions share nothing, so any number can run side by side.

use crate::platform::assets::SpriteAtlas;
use crate::platform::input::{self, Command};
use crate::platform::scheduler::{FrameTick, TickScheduler};
use crate::renderer::{Canvas, Viewport, paint};
use crate::sim::{self, StepReport, World};
use crate::tuning::{Tuning, TuningError};

pub struct Session {
    world: World,
    scheduler: TickScheduler,
    sprites: SpriteAtlas,
    viewport: Viewport,
    last_report: StepReport,
}

impl Session {
    /// Build a populated world; call once every sprite has settled
    ///
    /// The tuning is validated first, so a session never runs with values
    /// the simulation cannot handle (such as an empty catalog).
    pub fn new(
        tuning: Tuning,
        seed: u64,
        sprites: SpriteAtlas,
        viewport: Viewport,
    ) -> Result<Self, TuningError> {
        tuning.validate()?;
        let mut scheduler =
            TickScheduler::new(tuning.stall_threshold_ms, tuning.watchdog_period_ms);
        let mut world = World::new(tuning, seed);
        let spawned = sim::populate(&mut world);
        log::info!(
            "Session ready: seed {}, {} obstacles, {} sprites",
            seed,
            spawned.len(),
            sprites.len()
        );
        scheduler.init();
        Ok(Self {
            world,
            scheduler,
            sprites,
            viewport,
            last_report: StepReport::default(),
        })
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn scheduler(&self) -> &TickScheduler {
        &self.scheduler
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Report from the most recent physics step
    pub fn last_report(&self) -> &StepReport {
        &self.last_report
    }

    /// Start ticking; the host should then request its first frame
    pub fn start(&mut self) -> bool {
        let started = self.scheduler.start();
        if started {
            log::info!("Session started");
        } else {
            log::warn!("Session cannot start before sprites are ready");
        }
        started
    }

    pub fn stop(&mut self) {
        if self.scheduler.is_running() {
            log::info!("Session stopped after {} ticks", self.scheduler.clock.ticks);
        }
        self.scheduler.stop();
    }

    pub fn is_running(&self) -> bool {
        self.scheduler.is_running()
    }

    /// Render callback; returns whether the host should schedule another
    pub fn frame<C: Canvas>(&mut self, timestamp_ms: f64, canvas: &mut C) -> bool {
        match self.scheduler.on_frame(timestamp_ms) {
            FrameTick::Stopped => return false,
            FrameTick::Primed => {}
            FrameTick::Step(slice) => self.advance(slice),
        }
        paint(canvas, &self.world, self.viewport);
        true
    }

    /// Watchdog timer; returns whether a catch-up tick ran
    pub fn watchdog(&mut self, now_ms: f64) -> bool {
        match self.scheduler.on_watchdog(now_ms) {
            Some(slice) => {
                self.advance(slice);
                true
            }
            None => false,
        }
    }

    pub fn command(&mut self, command: Command) {
        log::debug!("Command {:?}", command);
        input::apply(&mut self.world, command);
    }

    pub fn resize(&mut self, viewport: Viewport) {
        if viewport.width <= 0.0 || viewport.height <= 0.0 {
            log::warn!(
                "Ignoring degenerate viewport {}x{}",
                viewport.width,
                viewport.height
            );
            return;
        }
        self.viewport = viewport;
    }

    fn advance(&mut self, slice: f32) {
        let report = sim::step(&mut self.world, slice, &self.sprites);
        if !report.events.is_empty() {
            log::debug!(
                "Step {:.4} s: {} absorbed, {} bounced, {} spawned",
                report.slice,
                report.absorbed(),
                report.bounced(),
                report.spawned()
            );
        }
        self.last_report = report;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::RecordingCanvas;

    fn session(seed: u64) -> Session {
        Session::new(
            Tuning::default(),
            seed,
            SpriteAtlas::default(),
            Viewport::new(800.0, 600.0),
        )
        .unwrap()
    }

    #[test]
    fn test_new_session_is_populated_and_idle() {
        let s = session(1);
        assert_eq!(s.world().live_obstacles(), 10);
        assert!(!s.is_running());
    }

    #[test]
    fn test_frame_before_start_does_nothing() {
        let mut s = session(1);
        let mut canvas = RecordingCanvas::default();
        assert!(!s.frame(0.0, &mut canvas));
        assert!(canvas.ops.is_empty());
    }

    #[test]
    fn test_first_frame_primes_then_steps() {
        let mut s = session(2);
        let mut canvas = RecordingCanvas::default();
        assert!(s.start());
        assert!(s.frame(1000.0, &mut canvas));
        assert_eq!(s.scheduler().clock.ticks, 0);
        assert!(!canvas.ops.is_empty());

        s.command(Command::SteerRight);
        assert!(s.frame(1016.0, &mut canvas));
        assert_eq!(s.scheduler().clock.ticks, 1);
        assert!((s.last_report().slice - 0.016).abs() < 1e-6);
        assert!(s.world().roller().pos.x > 0.0);
    }

    #[test]
    fn test_stop_ends_the_loop() {
        let mut s = session(3);
        let mut canvas = RecordingCanvas::default();
        s.start();
        s.frame(0.0, &mut canvas);
        s.stop();
        assert!(!s.frame(16.0, &mut canvas));
        assert!(!s.watchdog(10_000.0));
    }

    #[test]
    fn test_watchdog_catches_up_after_stall() {
        let mut s = session(4);
        let mut canvas = RecordingCanvas::default();
        s.start();
        s.frame(0.0, &mut canvas);
        assert!(!s.watchdog(50.0));
        assert!(s.watchdog(250.0));
        assert!((s.last_report().slice - 0.25).abs() < 1e-6);
        // The next frame only covers time since the catch-up
        s.frame(266.0, &mut canvas);
        assert!((s.last_report().slice - 0.016).abs() < 1e-6);
    }

    #[test]
    fn test_resize_rejects_degenerate() {
        let mut s = session(5);
        s.resize(Viewport::new(0.0, 100.0));
        assert_eq!(s.viewport(), Viewport::new(800.0, 600.0));
        s.resize(Viewport::new(1024.0, 768.0));
        assert_eq!(s.viewport(), Viewport::new(1024.0, 768.0));
    }

    #[test]
    fn test_invalid_tuning_is_rejected() {
        let tuning = Tuning {
            catalog: Vec::new(),
            ..Tuning::default()
        };
        let result = Session::new(
            tuning,
            1,
            SpriteAtlas::default(),
            Viewport::new(800.0, 600.0),
        );
        assert!(matches!(result, Err(TuningError::EmptyCatalog)));

        let tuning = Tuning {
            growth_factor: 1.0,
            ..Tuning::default()
        };
        let result = Session::new(
            tuning,
            1,
            SpriteAtlas::default(),
            Viewport::new(800.0, 600.0),
        );
        assert!(matches!(
            result,
            Err(TuningError::OutOfRange {
                field: "growth_factor",
                ..
            })
        ));
    }

    #[test]
    fn test_sessions_are_independent() {
        let mut a = session(9);
        let b = session(9);
        a.command(Command::Jump);
        assert_ne!(a.world().roller().vel, b.world().roller().vel);
        assert_eq!(a.world().obstacles().len(), b.world().obstacles().len());
    }
}
