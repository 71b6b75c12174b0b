#![forbid(unsafe_code)]

//! Viewport visibility gating.
//!
//! Rendering and animation only run while the target region is on-screen.
//! The host owns the actual intersection machinery (an
//! `IntersectionObserver` on the web, a scroll-rect check elsewhere) and
//! feeds ratios into an [`ObserverRegistry`]; the engine reads the derived
//! boolean through a [`VisibilityGate`].
//!
//! The registry is an injected capability keyed by region rather than a
//! process-wide singleton, so tests can drive intersection changes without
//! global mutable state.
//!
//! # Lifecycle invariants
//!
//! 1. Every attach has a matching detach: releasing a gate, or the
//!    automatic unobserve after a `once` gate fires, removes the region
//!    from the registry. Rapid mount/unmount cycles must leave
//!    [`ObserverRegistry::active_count`] at zero.
//! 2. With `once = true` the signal latches on the first ≥-threshold
//!    intersection and the observation is dropped immediately, bounding
//!    resource use.
//! 3. `has_ever_been_visible` never rolls back.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Identifies one observed region within a registry.
pub type RegionId = u64;

/// How a gate decides the region is "visible".
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GateConfig {
    /// Fraction of the region that must intersect the viewport.
    pub threshold: f64,
    /// Margin (px) the host should inflate the viewport by, for early
    /// loading. Consumed by the host when it sets up its observer; the
    /// gate itself only stores it.
    pub root_margin_px: f32,
    /// Latch on first visibility and stop observing.
    pub once: bool,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            threshold: 0.1,
            root_margin_px: 0.0,
            once: true,
        }
    }
}

impl GateConfig {
    /// Set the intersection threshold (builder).
    #[must_use]
    pub fn threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold.clamp(0.0, 1.0);
        self
    }

    /// Set the root margin in pixels (builder).
    #[must_use]
    pub fn root_margin(mut self, px: f32) -> Self {
        self.root_margin_px = px;
        self
    }

    /// Set whether the gate latches on first visibility (builder).
    #[must_use]
    pub fn once(mut self, once: bool) -> Self {
        self.once = once;
        self
    }
}

/// Current visibility of an observed region.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VisibilityState {
    /// Whether the region currently intersects at or above the threshold.
    pub is_intersecting: bool,
    /// Whether it has ever intersected. Never rolls back.
    pub has_ever_been_visible: bool,
}

#[derive(Debug)]
struct GateShared {
    config: GateConfig,
    state: VisibilityState,
    detached: bool,
}

/// The visibility signal for one observed region.
///
/// Obtained from [`ObserverRegistry::attach`]. Cheap to clone; all clones
/// observe the same region.
#[derive(Debug, Clone)]
pub struct VisibilityGate {
    region: RegionId,
    shared: Rc<RefCell<GateShared>>,
}

impl VisibilityGate {
    /// The region this gate observes.
    #[must_use]
    pub fn region(&self) -> RegionId {
        self.region
    }

    /// The configuration the gate was attached with.
    #[must_use]
    pub fn config(&self) -> GateConfig {
        self.shared.borrow().config
    }

    /// Current visibility state.
    #[must_use]
    pub fn state(&self) -> VisibilityState {
        self.shared.borrow().state
    }

    /// Whether render/animation work should run this tick.
    ///
    /// In `once` mode this stays `true` forever after the first visible
    /// transition (trigger-once semantics); otherwise it follows the
    /// current intersection.
    #[must_use]
    pub fn should_render(&self) -> bool {
        let inner = self.shared.borrow();
        if inner.config.once {
            inner.state.has_ever_been_visible
        } else {
            inner.state.is_intersecting
        }
    }

    /// Whether the registry has dropped this observation.
    #[must_use]
    pub fn is_detached(&self) -> bool {
        self.shared.borrow().detached
    }
}

/// Injectable registry of visibility observations, keyed by region.
///
/// The host delivers intersection ratios with [`deliver`](Self::deliver);
/// the engine attaches and releases gates. Single-threaded by design: the
/// registry lives on the frame-driving thread.
#[derive(Debug, Default)]
pub struct ObserverRegistry {
    gates: HashMap<RegionId, Rc<RefCell<GateShared>>>,
    next_region: RegionId,
}

impl ObserverRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start observing a new region and return its gate.
    pub fn attach(&mut self, config: GateConfig) -> VisibilityGate {
        let region = self.next_region;
        self.next_region += 1;
        let shared = Rc::new(RefCell::new(GateShared {
            config,
            state: VisibilityState::default(),
            detached: false,
        }));
        self.gates.insert(region, Rc::clone(&shared));
        VisibilityGate { region, shared }
    }

    /// Deliver an intersection ratio for a region.
    ///
    /// Ratios for unknown (already detached) regions are ignored; a late
    /// callback after unmount is not an error.
    pub fn deliver(&mut self, region: RegionId, ratio: f64) {
        let Some(shared) = self.gates.get(&region) else {
            return;
        };
        let mut inner = shared.borrow_mut();
        let visible = ratio >= inner.config.threshold;
        inner.state.is_intersecting = visible;
        if visible {
            inner.state.has_ever_been_visible = true;
        }
        let fired_once = inner.config.once && visible;
        if fired_once {
            inner.detached = true;
        }
        drop(inner);
        if fired_once {
            self.gates.remove(&region);
        }
    }

    /// Stop observing a gate's region.
    ///
    /// Safe to call repeatedly; the second and later calls are no-ops.
    pub fn release(&mut self, gate: &VisibilityGate) {
        if self.gates.remove(&gate.region).is_some() {
            gate.shared.borrow_mut().detached = true;
        }
    }

    /// Number of regions currently observed.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.gates.len()
    }
}
