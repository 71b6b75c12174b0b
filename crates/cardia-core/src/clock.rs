#![forbid(unsafe_code)]

//! The cardiac cycle clock.
//!
//! Pure functions mapping (elapsed time, heart rate, profile) to the scale
//! factor one heartbeat applies to the model's root transform. There is no
//! persistent state: the render loop evaluates these every tick.
//!
//! # Beat shape
//!
//! One beat is divided into four sub-intervals of the cycle phase:
//!
//! ```text
//! phase   0.0 ─── 0.1 ─── 0.2 ─── 0.4 ──────────── 1.0
//!         systolic  early    diastolic   rest
//!         rise      settle   decay       (flat 1.0)
//! ```
//!
//! Systolic contraction is a fast sinusoidal rise to `1 + amplitude`; early
//! relaxation settles sinusoidally to a residual bump; diastolic relaxation
//! decays linearly back to exactly 1.0; the remainder of the beat is flat.
//!
//! The `Irregular` profile perturbs the effective beats-per-second term with
//! a secondary low-frequency sinusoid, so beat *timing*, not beat *shape*,
//! becomes non-uniform. The perturbation constants are tunable and carry no
//! clinical meaning.

use std::f64::consts::FRAC_PI_2;

/// Phase at which systolic contraction peaks.
const SYSTOLE_END: f64 = 0.10;
/// Phase at which early relaxation hands over to diastolic decay.
const EARLY_RELAX_END: f64 = 0.20;
/// Phase at which the beat reaches rest (scale exactly 1.0).
const REST_START: f64 = 0.40;
/// Fraction of the amplitude still present when diastolic decay begins.
const SETTLE_FRACTION: f64 = 0.35;
/// Angular rate (rad/s) of the irregular profile's timing perturbation.
const IRREGULAR_PERTURB_RATE: f64 = 3.0;

// ---------------------------------------------------------------------------
// Animation profiles
// ---------------------------------------------------------------------------

/// How a heartbeat animates: speed multiplier, timing variability, and the
/// contraction amplitude.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AnimationProfile {
    /// Baseline beat.
    #[default]
    Normal,
    /// Slowed beat with a shallower contraction.
    Slow,
    /// Accelerated beat.
    Fast,
    /// Normal-speed beat with non-uniform timing and a deeper contraction.
    Irregular,
}

/// The (base speed, variability, scale amplitude) triple a profile drives
/// the clock with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProfileParams {
    /// Multiplier on the beats-per-second derived from the heart rate.
    pub base_speed: f64,
    /// Relative depth of the timing perturbation (only nonzero for
    /// [`AnimationProfile::Irregular`]).
    pub variability: f64,
    /// Peak contraction above the 1.0 rest scale.
    pub scale_amplitude: f64,
}

impl AnimationProfile {
    /// The parameter triple for this profile.
    #[must_use]
    pub const fn params(&self) -> ProfileParams {
        match self {
            Self::Normal => ProfileParams {
                base_speed: 1.0,
                variability: 0.05,
                scale_amplitude: 0.08,
            },
            Self::Slow => ProfileParams {
                base_speed: 0.6,
                variability: 0.05,
                scale_amplitude: 0.06,
            },
            Self::Fast => ProfileParams {
                base_speed: 1.8,
                variability: 0.05,
                scale_amplitude: 0.08,
            },
            Self::Irregular => ProfileParams {
                base_speed: 1.0,
                variability: 0.4,
                scale_amplitude: 0.10,
            },
        }
    }

    /// Get the profile name as a string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Slow => "slow",
            Self::Fast => "fast",
            Self::Irregular => "irregular",
        }
    }

    /// All profiles.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Normal, Self::Slow, Self::Fast, Self::Irregular]
    }

    /// Parse a profile name, defaulting to `Normal` for anything unknown.
    ///
    /// Profile strings come from trusted internal controls, so an unknown
    /// value is clamped to the default rather than propagated as a fault.
    #[must_use]
    pub fn from_name_or_default(name: &str) -> Self {
        name.parse().unwrap_or_default()
    }
}

impl std::str::FromStr for AnimationProfile {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "normal" => Ok(Self::Normal),
            "slow" => Ok(Self::Slow),
            "fast" => Ok(Self::Fast),
            "irregular" => Ok(Self::Irregular),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for AnimationProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Heart rate parameter
// ---------------------------------------------------------------------------

/// Minimum accepted heart rate (beats per minute).
pub const MIN_BPM: f64 = 40.0;
/// Maximum accepted heart rate (beats per minute).
pub const MAX_BPM: f64 = 220.0;
/// Resting default.
pub const DEFAULT_BPM: f64 = 70.0;

/// A heart rate in beats per minute, clamped to `[40, 220]`.
///
/// Out-of-range values originate from trusted internal controls, so they are
/// clamped at this boundary rather than surfaced as errors.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct HeartRate(f64);

impl HeartRate {
    /// Create a heart rate, clamping into the valid domain.
    ///
    /// Non-finite input falls back to the default resting rate.
    #[must_use]
    pub fn new(bpm: f64) -> Self {
        if bpm.is_finite() {
            Self(bpm.clamp(MIN_BPM, MAX_BPM))
        } else {
            Self(DEFAULT_BPM)
        }
    }

    /// The rate in beats per minute.
    #[must_use]
    pub const fn bpm(&self) -> f64 {
        self.0
    }

    /// Replace the rate, clamping into the valid domain.
    pub fn set(&mut self, bpm: f64) {
        *self = Self::new(bpm);
    }
}

impl Default for HeartRate {
    fn default() -> Self {
        Self(DEFAULT_BPM)
    }
}

// ---------------------------------------------------------------------------
// Cycle evaluation
// ---------------------------------------------------------------------------

/// Position within the current beat, in `[0, 1)`.
///
/// `phase = (elapsed × bps) mod 1`, where `bps = bpm/60 × base_speed`, with
/// the irregular profile's timing perturbation folded into `bps`. A
/// non-positive or non-finite `bpm` yields phase 0.0 (no motion).
#[must_use]
pub fn cycle_phase(elapsed_secs: f64, bpm: f64, profile: AnimationProfile) -> f64 {
    if !(bpm > 0.0) || !bpm.is_finite() || !elapsed_secs.is_finite() {
        return 0.0;
    }
    let elapsed = elapsed_secs.max(0.0);
    let params = profile.params();
    let mut bps = bpm / 60.0 * params.base_speed;
    if profile == AnimationProfile::Irregular {
        bps *= 1.0 + params.variability * (IRREGULAR_PERTURB_RATE * elapsed).sin();
    }
    (elapsed * bps).rem_euclid(1.0)
}

/// The multiplicative scale factor for the current instant of the beat.
///
/// Nominal 1.0, rising to `1 + amplitude` at peak systole. A heart rate of
/// zero (or anything non-positive) returns exactly 1.0: the zero-rate guard
/// that keeps a paused or unset rate from dividing by zero.
#[must_use]
pub fn phase_scale(elapsed_secs: f64, bpm: f64, profile: AnimationProfile) -> f64 {
    if !(bpm > 0.0) || !bpm.is_finite() {
        return 1.0;
    }
    let phase = cycle_phase(elapsed_secs, bpm, profile);
    beat_shape(phase, profile.params().scale_amplitude)
}

/// Piecewise beat shape: phase in `[0, 1)` to a scale around 1.0.
fn beat_shape(phase: f64, amplitude: f64) -> f64 {
    if phase < SYSTOLE_END {
        // Systolic contraction: fast sinusoidal rise to the peak.
        let s = phase / SYSTOLE_END;
        1.0 + amplitude * (s * FRAC_PI_2).sin()
    } else if phase < EARLY_RELAX_END {
        // Early relaxation: sinusoidal settle onto the residual bump.
        let s = (phase - SYSTOLE_END) / (EARLY_RELAX_END - SYSTOLE_END);
        let residual = amplitude * SETTLE_FRACTION;
        1.0 + residual + (amplitude - residual) * (s * FRAC_PI_2).cos()
    } else if phase < REST_START {
        // Diastolic relaxation: linear decay back toward rest.
        let s = (phase - EARLY_RELAX_END) / (REST_START - EARLY_RELAX_END);
        1.0 + amplitude * SETTLE_FRACTION * (1.0 - s)
    } else {
        1.0
    }
}

// ---------------------------------------------------------------------------
// Yaw oscillation
// ---------------------------------------------------------------------------

/// The idle yaw sway applied to the model root, independent of the beat.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct YawOscillation {
    /// Angular rate of the sway, rad/s.
    pub frequency: f64,
    /// Peak deflection, radians.
    pub amplitude: f64,
}

impl Default for YawOscillation {
    /// The comparison-view sway: slow and subtle.
    fn default() -> Self {
        Self {
            frequency: 0.5,
            amplitude: 0.1,
        }
    }
}

impl YawOscillation {
    /// Wider, slower sway used for a standalone showcase model.
    #[must_use]
    pub const fn showcase() -> Self {
        Self {
            frequency: 0.3,
            amplitude: 0.2,
        }
    }
}

/// Yaw angle (radians) at `elapsed_secs`.
#[must_use]
pub fn yaw_angle(elapsed_secs: f64, osc: YawOscillation) -> f64 {
    osc.amplitude * (osc.frequency * elapsed_secs).sin()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
