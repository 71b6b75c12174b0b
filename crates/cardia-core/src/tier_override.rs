#![forbid(unsafe_code)]

//! Thread-local quality-tier override injection for testing.
//!
//! Lets a test pin the session tier without touching global state or the
//! probing mechanism.
//!
//! - **Thread-local**: overrides on one thread never affect another, so
//!   parallel test runs stay isolated.
//! - **Stackable**: nested overrides win over outer ones; popping restores
//!   the previous state.
//! - **RAII-based**: the guard removes its override on drop, even on panic.
//!
//! # Example
//!
//! ```
//! use cardia_core::quality::QualityTier;
//! use cardia_core::tier_override::with_tier_override;
//!
//! with_tier_override(QualityTier::Low, || {
//!     assert_eq!(cardia_core::tier_override::current(), Some(QualityTier::Low));
//! });
//! assert_eq!(cardia_core::tier_override::current(), None);
//! ```

use crate::quality::QualityTier;
use std::cell::RefCell;

thread_local! {
    static OVERRIDE_STACK: RefCell<Vec<QualityTier>> = const { RefCell::new(Vec::new()) };
}

/// The innermost active override on this thread, if any.
#[must_use]
pub fn current() -> Option<QualityTier> {
    OVERRIDE_STACK.with(|stack| stack.borrow().last().copied())
}

/// Push a tier override; it stays active until the returned guard drops.
#[must_use = "the override is removed when the guard drops"]
pub fn push_tier_override(tier: QualityTier) -> TierOverrideGuard {
    OVERRIDE_STACK.with(|stack| stack.borrow_mut().push(tier));
    TierOverrideGuard { _private: () }
}

/// Run `f` with `tier` pinned as the active override.
pub fn with_tier_override<R>(tier: QualityTier, f: impl FnOnce() -> R) -> R {
    let _guard = push_tier_override(tier);
    f()
}

/// RAII guard that removes its override when dropped.
pub struct TierOverrideGuard {
    _private: (),
}

impl Drop for TierOverrideGuard {
    fn drop(&mut self) {
        OVERRIDE_STACK.with(|stack| {
            stack.borrow_mut().pop();
        });
    }
}
