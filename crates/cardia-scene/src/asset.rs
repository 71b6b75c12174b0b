#![forbid(unsafe_code)]

//! The tiered asset catalog.
//!
//! One binary scene asset exists per (tier, variant) pair. Selection is a
//! pure table lookup: total over both enums, no side effects, and the
//! medium-tier descriptor doubles as the universal fallback so the renderer
//! never receives an undefined asset — deployments that ship only the
//! medium meshes still work.

use cardia_core::quality::QualityTier;
use serde::{Deserialize, Serialize};

/// Which anatomy a mesh depicts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeartVariant {
    /// The baseline healthy heart.
    #[default]
    Healthy,
    /// The diseased-anatomy mesh used by comparison mode.
    Pathological,
}

impl HeartVariant {
    /// Get the variant name as a string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Healthy => "healthy",
            Self::Pathological => "pathological",
        }
    }

    /// Both variants.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Healthy, Self::Pathological]
    }
}

impl std::fmt::Display for HeartVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How far a tier simplifies materials on load.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MaterialPolicy {
    /// Whether this tier's meshes cast and receive shadows.
    pub shadows_enabled: bool,
    /// Floor applied to material roughness.
    pub roughness: f32,
    /// Ceiling applied to material metalness.
    pub metalness: f32,
    /// Replace smooth normals with flat shading.
    pub flat_shading: bool,
}

impl MaterialPolicy {
    const LOW: Self = Self {
        shadows_enabled: false,
        roughness: 0.9,
        metalness: 0.0,
        flat_shading: true,
    };
    const MEDIUM: Self = Self {
        shadows_enabled: false,
        roughness: 0.7,
        metalness: 0.1,
        flat_shading: false,
    };
    const HIGH: Self = Self {
        shadows_enabled: true,
        roughness: 0.0,
        metalness: 1.0,
        flat_shading: false,
    };

    /// The simplification policy for a tier.
    #[must_use]
    pub const fn for_tier(tier: QualityTier) -> Self {
        match tier {
            QualityTier::Low => Self::LOW,
            QualityTier::Medium => Self::MEDIUM,
            QualityTier::High => Self::HIGH,
        }
    }
}

/// One loadable asset: where it lives and how to treat its materials.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetDescriptor {
    /// Asset location, resolved by the host's fetcher.
    pub uri: String,
    /// Material simplification applied after load.
    pub policy: MaterialPolicy,
}

/// The (tier × variant) asset table.
#[derive(Debug, Clone)]
pub struct AssetCatalog {
    entries: Vec<(QualityTier, HeartVariant, AssetDescriptor)>,
}

impl Default for AssetCatalog {
    fn default() -> Self {
        fn uri(variant: HeartVariant, tier: QualityTier) -> String {
            let stem = match variant {
                HeartVariant::Healthy => "heart",
                HeartVariant::Pathological => "unhealthy_heart",
            };
            match tier {
                QualityTier::Low => format!("models/{stem}-low.glb"),
                QualityTier::Medium => format!("models/{stem}.glb"),
                QualityTier::High => format!("models/{stem}-high.glb"),
            }
        }

        let mut entries = Vec::with_capacity(6);
        for &tier in QualityTier::all() {
            for &variant in HeartVariant::all() {
                entries.push((
                    tier,
                    variant,
                    AssetDescriptor {
                        uri: uri(variant, tier),
                        policy: MaterialPolicy::for_tier(tier),
                    },
                ));
            }
        }
        Self { entries }
    }
}

impl AssetCatalog {
    /// Create the default catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the URI for one (tier, variant) slot (builder).
    #[must_use]
    pub fn with_uri(mut self, tier: QualityTier, variant: HeartVariant, uri: impl Into<String>) -> Self {
        let uri = uri.into();
        for entry in &mut self.entries {
            if entry.0 == tier && entry.1 == variant {
                entry.2.uri = uri.clone();
            }
        }
        self
    }

    /// Look up the descriptor for a tier/variant pair. Total: every pair
    /// has an entry, and a missing slot (only possible through future table
    /// edits) resolves to the medium-tier fallback.
    #[must_use]
    pub fn select(&self, tier: QualityTier, variant: HeartVariant) -> &AssetDescriptor {
        self.entries
            .iter()
            .find(|(t, v, _)| *t == tier && *v == variant)
            .map(|(_, _, d)| d)
            .unwrap_or_else(|| self.fallback(variant))
    }

    /// The universal fallback: the medium-tier descriptor for a variant.
    #[must_use]
    pub fn fallback(&self, variant: HeartVariant) -> &AssetDescriptor {
        self.entries
            .iter()
            .find(|(t, v, _)| *t == QualityTier::Medium && *v == variant)
            .map(|(_, _, d)| d)
            .expect("catalog always carries the medium tier")
    }

    /// Whether `descriptor` already is the fallback for `variant`.
    #[must_use]
    pub fn is_fallback(&self, descriptor: &AssetDescriptor, variant: HeartVariant) -> bool {
        self.fallback(variant).uri == descriptor.uri
    }
}
