#![forbid(unsafe_code)]

//! Materials and the highlight override.
//!
//! Materials are plain data. The renderer-facing invariant is ownership:
//! materials are only ever mutated on a cloned instance's nodes, never on a
//! shared template (see [`graph`](crate::graph)).

use serde::{Deserialize, Serialize};

use crate::asset::MaterialPolicy;

/// An sRGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    /// Create a color from channel values.
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const BLACK: Self = Self::new(0, 0, 0);
    pub const WHITE: Self = Self::new(255, 255, 255);
}

/// Surface material for one scene node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub base_color: Rgb,
    pub roughness: f32,
    pub metalness: f32,
    pub emissive: Rgb,
    pub emissive_intensity: f32,
    pub flat_shading: bool,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            base_color: Rgb::new(200, 200, 200),
            roughness: 0.7,
            metalness: 0.0,
            emissive: Rgb::BLACK,
            emissive_intensity: 0.0,
            flat_shading: false,
        }
    }
}

impl Material {
    /// The fixed highlight override: flat red with a warm emissive glow.
    ///
    /// Applied to nodes matching a requested highlight region; every other
    /// node keeps its original material.
    #[must_use]
    pub const fn highlight() -> Self {
        Self {
            base_color: Rgb::new(0xff, 0x00, 0x00),
            roughness: 0.5,
            metalness: 0.5,
            emissive: Rgb::new(0xff, 0x44, 0x44),
            emissive_intensity: 0.5,
            flat_shading: false,
        }
    }

    /// Apply a tier's simplification policy.
    ///
    /// Simplification only ever cheapens shading: roughness can rise,
    /// metalness can fall, flat shading can switch on. Base colors and
    /// emissive terms are untouched.
    pub fn simplify(&mut self, policy: &MaterialPolicy) {
        self.roughness = self.roughness.max(policy.roughness);
        self.metalness = self.metalness.min(policy.metalness);
        if policy.flat_shading {
            self.flat_shading = true;
        }
    }

    /// Adjust for the pathological variant without replacing the material.
    ///
    /// Caps roughness, nudges metalness up, and adds a faint emissive term
    /// so diseased tissue reads differently under the same lighting. Colors
    /// and maps stay as authored.
    pub fn mark_pathological(&mut self) {
        self.roughness = self.roughness.min(0.6);
        self.metalness = (self.metalness + 0.2).min(0.3);
        self.emissive_intensity = 0.2;
    }
}
