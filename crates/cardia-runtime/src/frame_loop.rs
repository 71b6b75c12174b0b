#![forbid(unsafe_code)]

//! The render loop.
//!
//! The host owns the actual frame pacing (a `requestAnimationFrame`
//! equivalent): the engine registers interest through a [`FrameScheduler`]
//! and gets one [`RenderLoopController::tick`] per refresh. Each tick reads
//! the visibility gate exactly once — mid-tick visibility changes are not
//! observed — and, while the region is off-screen, does no per-instance
//! work at all.
//!
//! The controller also carries the user-facing control surface: heart rate
//! (clamped to the valid domain), pause/resume, and the animation profile.
//! Pausing freezes the animation clock; frames still render, holding the
//! last pose.

use std::collections::BTreeSet;

use web_time::Instant;

use cardia_core::clock::{self, AnimationProfile, HeartRate, YawOscillation};
use cardia_core::visibility::VisibilityGate;

use crate::instance::ModelInstanceManager;
use crate::telemetry::{FpsCounter, FpsSample};

/// Token for one pending frame callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct FrameHandle(pub u64);

/// The injected per-refresh callback capability: a register/cancel pair.
pub trait FrameScheduler {
    /// Ask for one callback at the next display refresh.
    fn request(&mut self) -> FrameHandle;
    /// Cancel a pending callback. Cancelling an already-fired handle is a
    /// no-op.
    fn cancel(&mut self, handle: FrameHandle);
}

/// A hand-cranked scheduler for tests and simulations.
///
/// `take_pending` hands back the handles that would fire this refresh; the
/// test then calls `tick` itself.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    next: u64,
    pending: BTreeSet<u64>,
}

impl ManualScheduler {
    /// Create an empty scheduler.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of callbacks currently registered.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Drain the registered callbacks, as the host's refresh would.
    pub fn take_pending(&mut self) -> Vec<FrameHandle> {
        std::mem::take(&mut self.pending).into_iter().map(FrameHandle).collect()
    }
}

impl FrameScheduler for ManualScheduler {
    fn request(&mut self) -> FrameHandle {
        self.next += 1;
        self.pending.insert(self.next);
        FrameHandle(self.next)
    }

    fn cancel(&mut self, handle: FrameHandle) {
        self.pending.remove(&handle.0);
    }
}

/// What one tick did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickReport {
    /// Whether per-instance work ran (false while off-screen).
    pub rendered: bool,
    /// The beat scale applied this tick (1.0 when not rendered).
    pub scale: f64,
    /// The yaw applied this tick.
    pub yaw: f64,
    /// Present on the tick that closed a telemetry window.
    pub fps: Option<FpsSample>,
}

/// Orchestrates one frame: visibility gate, cardiac clock, instance
/// updates, telemetry.
pub struct RenderLoopController {
    gate: VisibilityGate,
    heart_rate: HeartRate,
    profile: AnimationProfile,
    yaw: YawOscillation,
    paused: bool,
    /// Animation-clock seconds; advances only while visible and unpaused.
    animation_secs: f64,
    last_tick: Option<Instant>,
    telemetry: Option<FpsCounter>,
    frame: Option<FrameHandle>,
}

impl RenderLoopController {
    /// Create a controller gated on `gate`.
    #[must_use]
    pub fn new(gate: VisibilityGate) -> Self {
        Self {
            gate,
            heart_rate: HeartRate::default(),
            profile: AnimationProfile::Normal,
            yaw: YawOscillation::default(),
            paused: false,
            animation_secs: 0.0,
            last_tick: None,
            telemetry: None,
            frame: None,
        }
    }

    // ── Control surface ────────────────────────────────────────────────

    /// Set the heart rate; out-of-domain values are clamped.
    pub fn set_heart_rate(&mut self, bpm: f64) {
        self.heart_rate.set(bpm);
    }

    /// Current heart rate in BPM.
    #[must_use]
    pub fn heart_rate(&self) -> f64 {
        self.heart_rate.bpm()
    }

    /// Set the animation profile.
    pub fn set_profile(&mut self, profile: AnimationProfile) {
        self.profile = profile;
    }

    /// Current animation profile.
    #[must_use]
    pub fn profile(&self) -> AnimationProfile {
        self.profile
    }

    /// Set the idle yaw sway.
    pub fn set_yaw(&mut self, yaw: YawOscillation) {
        self.yaw = yaw;
    }

    /// Pause the animation clock.
    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Resume the animation clock.
    pub fn resume(&mut self) {
        self.paused = false;
    }

    /// Flip pause state and return the new value.
    pub fn toggle_paused(&mut self) -> bool {
        self.paused = !self.paused;
        self.paused
    }

    /// Whether the animation clock is paused.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// The gate this controller reads.
    #[must_use]
    pub fn gate(&self) -> &VisibilityGate {
        &self.gate
    }

    // ── Scheduling ─────────────────────────────────────────────────────

    /// Register for the next refresh unless already registered.
    pub fn ensure_scheduled(&mut self, scheduler: &mut dyn FrameScheduler) {
        if self.frame.is_none() {
            self.frame = Some(scheduler.request());
        }
    }

    /// Cancel any pending frame callback (e.g. on unmount).
    pub fn halt(&mut self, scheduler: &mut dyn FrameScheduler) {
        if let Some(handle) = self.frame.take() {
            scheduler.cancel(handle);
        }
    }

    // ── The tick ───────────────────────────────────────────────────────

    /// Run one frame at `now` over the live managers.
    pub fn tick(&mut self, now: Instant, managers: &mut [&mut ModelInstanceManager]) -> TickReport {
        // The host just fired our callback; a new one must be requested.
        self.frame = None;

        // Read the gate once; this value holds for the whole tick.
        let visible = self.gate.should_render();

        let dt = match self.last_tick.replace(now) {
            Some(last) => now.saturating_duration_since(last).as_secs_f64(),
            None => 0.0,
        };

        if !visible {
            // Off-screen: no clock advance, no instance work, no telemetry.
            return TickReport {
                rendered: false,
                scale: 1.0,
                yaw: 0.0,
                fps: None,
            };
        }

        if !self.paused {
            self.animation_secs += dt;
        }

        let scale = clock::phase_scale(self.animation_secs, self.heart_rate.bpm(), self.profile);
        let yaw = clock::yaw_angle(self.animation_secs, self.yaw);
        for manager in managers.iter_mut() {
            manager.per_frame_update(scale, yaw);
        }

        let fps = self
            .telemetry
            .get_or_insert_with(|| FpsCounter::new(now))
            .tick(now);

        TickReport {
            rendered: true,
            scale,
            yaw,
            fps,
        }
    }
}
