#![forbid(unsafe_code)]

//! Core: host capability classification, the cardiac cycle clock, and
//! viewport visibility gating.

pub mod capability;
pub mod clock;
pub mod logging;
pub mod quality;
pub mod tier_override;
pub mod visibility;

// Re-export tracing macros at crate root for ergonomic use.
#[cfg(feature = "tracing")]
pub use logging::{
    debug, debug_span, error, error_span, info, info_span, trace, trace_span, warn, warn_span,
};
