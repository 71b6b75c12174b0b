#![forbid(unsafe_code)]

//! Cardia Runtime
//!
//! This crate ties the core clock and the scene data model into a running
//! engine: it loads assets off the frame loop, owns the live model
//! instances, drives one update per host frame callback, and measures what
//! that costs.
//!
//! # Key Components
//!
//! - [`AssetFetcher`] / [`ThreadedAssetLoader`] - asynchronous asset I/O with
//!   last-request-wins delivery
//! - [`ModelInstanceManager`] - load lifecycle, highlights, per-frame updates
//! - [`RenderLoopController`] - visibility-gated per-frame orchestration
//! - [`FpsCounter`] - rolling frames-per-second estimate
//! - [`ComparisonOrchestrator`] - two-pane healthy/condition comparison
//!
//! # Role in Cardia
//! `cardia-runtime` is the orchestrator: `cardia-core` decides *whether* and
//! *how fast* to animate, `cardia-scene` says *what* to render, and this
//! crate makes it happen once per frame.

pub mod comparison;
pub mod frame_loop;
pub mod instance;
pub mod loader;
pub mod telemetry;

pub use comparison::{ComparisonOrchestrator, Condition, HeartView};
pub use frame_loop::{FrameHandle, FrameScheduler, ManualScheduler, RenderLoopController, TickReport};
pub use instance::{LoadState, ModelInstanceManager};
pub use loader::{AssetError, AssetFetcher, LoadRequest, LoadTicket, StaticCatalog, ThreadedAssetLoader};
pub use telemetry::{FpsCounter, FpsSample, TARGET_FPS};
