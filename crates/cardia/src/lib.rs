#![forbid(unsafe_code)]

//! Cardia public facade crate.
//!
//! This crate provides the stable, ergonomic surface area for hosts
//! embedding the cardiac model engine. It re-exports common types from the
//! internal crates and offers a lightweight prelude for day-to-day usage.

use std::fmt;

// --- Core re-exports -------------------------------------------------------

pub use cardia_core::capability::{
    CapabilityThresholds, GraphicsProbe, NoGraphics, ProbeInputs, SessionTier, classify,
};
pub use cardia_core::clock::{
    AnimationProfile, HeartRate, YawOscillation, cycle_phase, phase_scale, yaw_angle,
};
pub use cardia_core::quality::QualityTier;
pub use cardia_core::visibility::{GateConfig, ObserverRegistry, VisibilityGate, VisibilityState};

// --- Scene re-exports ------------------------------------------------------

pub use cardia_scene::asset::{AssetCatalog, AssetDescriptor, HeartVariant, MaterialPolicy};
pub use cardia_scene::graph::{ModelInstance, Node, SceneTemplate, SizeClass, Transform};
pub use cardia_scene::lighting::{CameraConfig, Light, LightingRig, SceneConfig, compose};
pub use cardia_scene::material::{Material, Rgb};

// --- Runtime re-exports ----------------------------------------------------

pub use cardia_runtime::{
    AssetError, AssetFetcher, ComparisonOrchestrator, Condition, FpsCounter, FpsSample,
    FrameHandle, FrameScheduler, HeartView, LoadRequest, LoadState, LoadTicket, ManualScheduler,
    ModelInstanceManager, RenderLoopController, StaticCatalog, ThreadedAssetLoader, TickReport,
};

// --- Errors ---------------------------------------------------------------

/// Top-level error type for hosts embedding the engine.
#[derive(Debug)]
pub enum Error {
    /// An asset could not be loaded.
    Asset(AssetError),
    /// Host integration error with message.
    Host(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Asset(err) => write!(f, "{err}"),
            Self::Host(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<AssetError> for Error {
    fn from(err: AssetError) -> Self {
        Self::Asset(err)
    }
}

/// Standard result type for cardia APIs.
pub type Result<T> = std::result::Result<T, Error>;

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        AnimationProfile, AssetCatalog, ComparisonOrchestrator, Error, GateConfig, HeartRate,
        HeartVariant, ModelInstanceManager, ObserverRegistry, QualityTier, RenderLoopController,
        Result, SessionTier, ThreadedAssetLoader,
    };

    pub use crate::{core, runtime, scene};
}

pub use cardia_core as core;
pub use cardia_runtime as runtime;
pub use cardia_scene as scene;
