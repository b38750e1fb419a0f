//! Tick pacing
//!
//! Turns an irregular stream of render timestamps, plus a periodic watchdog,
//! into physics slices. One render callback yields at most one slice of
//! `(timestamp - last_tick) / 1000` seconds; nothing is ever sliced backward.

use crate::consts::DIAGNOSTIC_INTERVAL_MS;

/// Lifecycle of a scheduler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// Assets not ready yet
    Uninitialized,
    /// Ready but not running (never started, or stopped)
    Idle,
    Running,
}

/// What the host should do with a render callback
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameTick {
    /// Not running: do nothing and do not reschedule
    Stopped,
    /// First frame after start: timestamp recorded, no physics
    Primed,
    /// Run one physics step of this many seconds, then render
    Step(f32),
}

/// Pacing and diagnostics counters
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Clock {
    /// Timestamp (ms) of the last physics step, or of priming
    pub last_tick: Option<f64>,
    /// Physics steps taken
    pub ticks: u64,
    /// Render callbacks seen while running
    pub frames: u64,
    /// Most recent frame rate sample
    pub fps: Option<f32>,
    sample_start: Option<f64>,
    sample_frames: u64,
}

impl Clock {
    /// Count a frame; returns a new fps sample when one is due
    pub fn record_frame(&mut self, timestamp: f64) -> Option<f32> {
        self.frames += 1;
        let Some(start) = self.sample_start else {
            self.sample_start = Some(timestamp);
            self.sample_frames = self.frames;
            return None;
        };
        let elapsed = timestamp - start;
        if elapsed < DIAGNOSTIC_INTERVAL_MS {
            return None;
        }
        let fps = ((self.frames - self.sample_frames) as f64 / (elapsed / 1000.0)).round() as f32;
        self.fps = Some(fps);
        self.sample_start = Some(timestamp);
        self.sample_frames = self.frames;
        Some(fps)
    }

    /// Seconds since the last tick, floored at zero; advances the tick mark
    fn take_slice(&mut self, timestamp: f64) -> f32 {
        let last = self.last_tick.unwrap_or(timestamp);
        let slice = ((timestamp - last) / 1000.0).max(0.0) as f32;
        // A regressed timestamp never moves the mark backward
        self.last_tick = Some(last.max(timestamp));
        self.ticks += 1;
        slice
    }
}

/// Render-driven ticking with a stall watchdog
#[derive(Debug, Clone)]
pub struct TickScheduler {
    state: SchedulerState,
    pub clock: Clock,
    /// Force a catch-up tick when no tick has happened for longer than this
    pub stall_threshold_ms: f64,
    /// How often the host should call [`TickScheduler::on_watchdog`]
    pub watchdog_period_ms: u32,
}

impl TickScheduler {
    pub fn new(stall_threshold_ms: f64, watchdog_period_ms: u32) -> Self {
        Self {
            state: SchedulerState::Uninitialized,
            clock: Clock::default(),
            stall_threshold_ms,
            watchdog_period_ms,
        }
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == SchedulerState::Running
    }

    /// Assets are ready
    pub fn init(&mut self) {
        if self.state == SchedulerState::Uninitialized {
            self.state = SchedulerState::Idle;
        }
    }

    /// Begin ticking; returns false if not initialised
    ///
    /// The tick mark is cleared so the first frame after a (re)start primes
    /// instead of integrating over the idle gap.
    pub fn start(&mut self) -> bool {
        match self.state {
            SchedulerState::Uninitialized => false,
            SchedulerState::Running => true,
            SchedulerState::Idle => {
                self.state = SchedulerState::Running;
                self.clock.last_tick = None;
                true
            }
        }
    }

    /// Cooperative stop, observed by the next callback
    pub fn stop(&mut self) {
        if self.state == SchedulerState::Running {
            self.state = SchedulerState::Idle;
        }
    }

    /// Handle a render callback
    pub fn on_frame(&mut self, timestamp: f64) -> FrameTick {
        if !self.is_running() {
            return FrameTick::Stopped;
        }
        if let Some(fps) = self.clock.record_frame(timestamp) {
            log::debug!("{} fps; frame {}", fps, self.clock.frames);
        }
        if self.clock.last_tick.is_none() {
            self.clock.last_tick = Some(timestamp);
            return FrameTick::Primed;
        }
        FrameTick::Step(self.clock.take_slice(timestamp))
    }

    /// Handle a watchdog timer; returns a catch-up slice if rendering stalled
    pub fn on_watchdog(&mut self, now: f64) -> Option<f32> {
        if !self.is_running() {
            return None;
        }
        let last = self.clock.last_tick?;
        if now - last <= self.stall_threshold_ms {
            return None;
        }
        let slice = self.clock.take_slice(now);
        log::debug!(
            "Watchdog catch-up after {:.0} ms without a tick",
            now - last
        );
        Some(slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn running() -> TickScheduler {
        let mut s = TickScheduler::new(100.0, 100);
        s.init();
        assert!(s.start());
        s
    }

    #[test]
    fn test_lifecycle() {
        let mut s = TickScheduler::new(100.0, 100);
        assert_eq!(s.state(), SchedulerState::Uninitialized);
        assert!(!s.start());
        assert_eq!(s.on_frame(0.0), FrameTick::Stopped);
        s.init();
        assert_eq!(s.state(), SchedulerState::Idle);
        assert!(s.start());
        assert_eq!(s.state(), SchedulerState::Running);
        s.stop();
        assert_eq!(s.state(), SchedulerState::Idle);
        assert_eq!(s.on_frame(10.0), FrameTick::Stopped);
    }

    #[test]
    fn test_first_frame_only_primes() {
        let mut s = running();
        assert_eq!(s.on_frame(1000.0), FrameTick::Primed);
        assert_eq!(s.clock.ticks, 0);
        assert_eq!(s.on_frame(1016.0), FrameTick::Step(0.016));
        assert_eq!(s.clock.ticks, 1);
    }

    #[test]
    fn test_regressed_timestamp_is_zero_slice() {
        let mut s = running();
        s.on_frame(1000.0);
        assert_eq!(s.on_frame(1050.0), FrameTick::Step(0.05));
        assert_eq!(s.on_frame(1020.0), FrameTick::Step(0.0));
        // Mark stays at 1050, so time is not simulated twice
        assert_eq!(s.on_frame(1060.0), FrameTick::Step(0.01));
    }

    #[test]
    fn test_watchdog_only_fires_on_stall() {
        let mut s = running();
        assert_eq!(s.on_watchdog(50.0), None);
        s.on_frame(0.0);
        assert_eq!(s.on_watchdog(100.0), None);
        let slice = s.on_watchdog(250.0).unwrap();
        assert!((slice - 0.25).abs() < 1e-6);
        // Catch-up moved the mark
        assert_eq!(s.on_watchdog(300.0), None);
        assert_eq!(s.on_frame(316.0), FrameTick::Step(0.066));
    }

    #[test]
    fn test_watchdog_silent_when_stopped() {
        let mut s = running();
        s.on_frame(0.0);
        s.stop();
        assert_eq!(s.on_watchdog(10_000.0), None);
    }

    #[test]
    fn test_restart_primes_again() {
        let mut s = running();
        s.on_frame(0.0);
        s.on_frame(16.0);
        s.stop();
        assert!(s.start());
        assert_eq!(s.on_frame(60_000.0), FrameTick::Primed);
    }

    #[test]
    fn test_fps_sample() {
        let mut clock = Clock::default();
        assert_eq!(clock.record_frame(0.0), None);
        for i in 1..60 {
            assert_eq!(clock.record_frame(i as f64 * 1000.0 / 60.0), None);
        }
        assert_eq!(clock.record_frame(1000.0), Some(60.0));
        assert_eq!(clock.fps, Some(60.0));
    }

    proptest! {
        #[test]
        fn prop_slices_never_negative(stamps in proptest::collection::vec(0.0f64..100_000.0, 1..64)) {
            let mut s = running();
            let mut total = 0.0f64;
            let mut high = None::<f64>;
            for ts in &stamps {
                if let FrameTick::Step(slice) = s.on_frame(*ts) {
                    prop_assert!(slice >= 0.0);
                    total += slice as f64;
                }
                high = Some(high.map_or(*ts, |h: f64| h.max(*ts)));
            }
            // Total simulated time never exceeds the span actually covered
            let span = (high.unwrap() - stamps[0]) / 1000.0;
            prop_assert!(total <= span + 1e-3);
        }
    }
}
