#![forbid(unsafe_code)]

//! Host capability classification.
//!
//! Maps a snapshot of host environment signals to a [`QualityTier`].
//! Detection is evidence-based and fail-safe: when a signal is missing or
//! ambiguous, classification degrades rather than erroring — a host we know
//! nothing about gets `Low`, never a panic.
//!
//! # Detection Strategy
//!
//! Three signals, in priority order:
//!
//! 1. **Form factor**: a mobile indicator or a viewport narrower than the
//!    mobile breakpoint forces `Low`.
//! 2. **Graphics context**: if no context can be created (renderer identity
//!    unobtainable), or the identity names a software rasterizer, `Low`.
//! 3. **Renderer identity**: a known discrete-GPU substring promotes to
//!    `High`; everything else is `Medium`.
//!
//! # Invariants
//!
//! 1. **Totality**: [`classify`] always returns a tier; there is no failure
//!    path out of this module.
//! 2. **Determinism**: the same [`ProbeInputs`] and
//!    [`CapabilityThresholds`] always produce the same tier.
//! 3. **Session stability**: [`SessionTier`] caches the result; the tier
//!    changes only through an explicit [`SessionTier::reprobe`].
//!
//! The classification rules live in [`CapabilityThresholds`] rather than in
//! code so tests can swap them without touching the probing mechanism; the
//! exact thresholds are heuristics, not contracts.

use crate::quality::QualityTier;
use crate::tier_override;

/// Default viewport width (px) at or below which a host is treated as mobile.
const DEFAULT_MOBILE_MAX_WIDTH: u32 = 768;

/// Renderer-identity substrings that indicate a discrete GPU.
const DISCRETE_GPU_PATTERNS: &[&str] = &[
    "nvidia", "geforce", "rtx", "gtx", "quadro", "radeon", "amd", "arc",
];

/// Renderer-identity substrings that indicate a software rasterizer.
const SOFTWARE_PATTERNS: &[&str] = &["swiftshader", "llvmpipe", "softpipe", "software"];

/// Produces the renderer identity string from a throwaway graphics context.
///
/// This is the injected probing capability: the real host implementation
/// creates a short-lived context and reads the unmasked renderer string;
/// tests supply canned strings. Returning `None` means no context could be
/// created at all.
pub trait GraphicsProbe {
    /// The renderer identity, or `None` if no graphics context is obtainable.
    fn renderer_identity(&self) -> Option<String>;
}

/// A [`GraphicsProbe`] for hosts with no graphics stack. Always `None`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoGraphics;

impl GraphicsProbe for NoGraphics {
    fn renderer_identity(&self) -> Option<String> {
        None
    }
}

/// Snapshot of host environment signals consumed by [`classify`].
///
/// The engine never reads the environment implicitly; the host gathers these
/// and hands them over, which keeps classification pure and testable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProbeInputs {
    /// Current viewport width in pixels, if known.
    pub viewport_width: Option<u32>,
    /// Host-provided mobile form-factor indicator (user-agent-like signal).
    pub mobile_hint: bool,
    /// Renderer identity from a throwaway graphics context.
    /// `None` means no context could be created.
    pub renderer: Option<String>,
}

impl ProbeInputs {
    /// Gather inputs using the given graphics probe plus explicit host hints.
    pub fn gather(probe: &dyn GraphicsProbe, viewport_width: Option<u32>, mobile_hint: bool) -> Self {
        Self {
            viewport_width,
            mobile_hint,
            renderer: probe.renderer_identity(),
        }
    }
}

/// Injected classification rules.
///
/// Pattern matching is case-insensitive substring containment.
#[derive(Debug, Clone, PartialEq)]
pub struct CapabilityThresholds {
    /// Viewport widths at or below this are treated as mobile.
    pub mobile_max_width: u32,
    /// Renderer substrings promoting to [`QualityTier::High`].
    pub discrete_gpu_patterns: Vec<String>,
    /// Renderer substrings demoting to [`QualityTier::Low`].
    pub software_patterns: Vec<String>,
}

impl Default for CapabilityThresholds {
    fn default() -> Self {
        Self {
            mobile_max_width: DEFAULT_MOBILE_MAX_WIDTH,
            discrete_gpu_patterns: DISCRETE_GPU_PATTERNS.iter().map(|s| (*s).to_string()).collect(),
            software_patterns: SOFTWARE_PATTERNS.iter().map(|s| (*s).to_string()).collect(),
        }
    }
}

impl CapabilityThresholds {
    /// Set the mobile breakpoint (builder).
    #[must_use]
    pub fn mobile_max_width(mut self, width: u32) -> Self {
        self.mobile_max_width = width;
        self
    }

    fn matches_any(patterns: &[String], renderer: &str) -> bool {
        let lower = renderer.to_lowercase();
        patterns.iter().any(|p| lower.contains(&p.to_lowercase()))
    }
}

/// Classify a host into a quality tier. Total: never fails.
#[must_use]
pub fn classify(inputs: &ProbeInputs, thresholds: &CapabilityThresholds) -> QualityTier {
    let mobile = inputs.mobile_hint
        || inputs
            .viewport_width
            .is_some_and(|w| w <= thresholds.mobile_max_width);
    if mobile {
        return QualityTier::Low;
    }

    match &inputs.renderer {
        // No graphics context obtainable: the safest assumption.
        None => QualityTier::Low,
        Some(renderer) => {
            if CapabilityThresholds::matches_any(&thresholds.software_patterns, renderer) {
                QualityTier::Low
            } else if CapabilityThresholds::matches_any(&thresholds.discrete_gpu_patterns, renderer)
            {
                QualityTier::High
            } else {
                QualityTier::Medium
            }
        }
    }
}

/// The session's cached quality tier.
///
/// Classified once at construction; [`tier`](Self::tier) is stable until an
/// explicit [`reprobe`](Self::reprobe) with fresh inputs. Thread-local
/// overrides (see [`tier_override`]) take precedence when active so tests
/// can pin a tier.
#[derive(Debug, Clone)]
pub struct SessionTier {
    tier: QualityTier,
    thresholds: CapabilityThresholds,
}

impl SessionTier {
    /// Classify `inputs` and cache the result for the session.
    #[must_use]
    pub fn probe(inputs: &ProbeInputs, thresholds: CapabilityThresholds) -> Self {
        let tier = classify(inputs, &thresholds);
        Self { tier, thresholds }
    }

    /// The session tier, honoring any active thread-local override.
    #[must_use]
    pub fn tier(&self) -> QualityTier {
        tier_override::current().unwrap_or(self.tier)
    }

    /// Re-run classification with fresh inputs (e.g. after a resize crossed
    /// the mobile breakpoint). Returns the new tier.
    pub fn reprobe(&mut self, inputs: &ProbeInputs) -> QualityTier {
        self.tier = classify(inputs, &self.thresholds);
        self.tier
    }
}
