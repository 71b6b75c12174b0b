#![forbid(unsafe_code)]

//! Deterministic lighting-rig and camera composition.
//!
//! `compose(tier, variant)` is a pure function: the same inputs always yield
//! the same rig, so rigs can be snapshot-tested and diffed. Tiers degrade by
//! dropping decorative lights first and shadows last-but-one — the key light
//! never goes away.
//!
//! Intensities carry a pathological-context boost: the diseased mesh has
//! darker, denser surface detail and needs more light to read at the same
//! exposure.

use cardia_core::quality::QualityTier;

use crate::asset::HeartVariant;

/// Kind of light source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightKind {
    Ambient,
    Directional,
    Point,
    Spot,
}

/// One light in a rig.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Light {
    pub kind: LightKind,
    /// World position; ignored for ambient light.
    pub position: [f32; 3],
    pub intensity: f32,
    pub cast_shadow: bool,
    /// Cone angle (radians) for spot lights.
    pub angle: f32,
    /// Cone softness in [0, 1] for spot lights.
    pub penumbra: f32,
}

impl Light {
    /// Even, directionless base light.
    #[must_use]
    pub const fn ambient(intensity: f32) -> Self {
        Self {
            kind: LightKind::Ambient,
            position: [0.0, 0.0, 0.0],
            intensity,
            cast_shadow: false,
            angle: 0.0,
            penumbra: 0.0,
        }
    }

    /// Parallel key light.
    #[must_use]
    pub const fn directional(position: [f32; 3], intensity: f32) -> Self {
        Self {
            kind: LightKind::Directional,
            position,
            intensity,
            cast_shadow: false,
            angle: 0.0,
            penumbra: 0.0,
        }
    }

    /// Omnidirectional fill light.
    #[must_use]
    pub const fn point(position: [f32; 3], intensity: f32) -> Self {
        Self {
            kind: LightKind::Point,
            position,
            intensity,
            cast_shadow: false,
            angle: 0.0,
            penumbra: 0.0,
        }
    }

    /// Cone light.
    #[must_use]
    pub const fn spot(position: [f32; 3], intensity: f32, angle: f32, penumbra: f32) -> Self {
        Self {
            kind: LightKind::Spot,
            position,
            intensity,
            cast_shadow: false,
            angle,
            penumbra,
        }
    }

    #[must_use]
    const fn shadowed(mut self) -> Self {
        self.cast_shadow = true;
        self
    }
}

/// A composed set of lights plus the rig-wide shadow switch.
#[derive(Debug, Clone, PartialEq)]
pub struct LightingRig {
    pub lights: Vec<Light>,
    pub shadows_enabled: bool,
}

/// Orbit-camera configuration for the heart viewer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraConfig {
    pub position: [f32; 3],
    pub fov_degrees: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub enable_pan: bool,
    pub enable_zoom: bool,
    pub damping: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: [0.0, 0.0, 5.0],
            fov_degrees: 45.0,
            min_distance: 3.0,
            max_distance: 8.0,
            enable_pan: false,
            enable_zoom: true,
            damping: 0.05,
        }
    }
}

/// Everything the renderer needs besides the model itself.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneConfig {
    pub lighting: LightingRig,
    pub camera: CameraConfig,
}

/// Compose the lighting rig and camera for a tier and variant.
#[must_use]
pub fn compose(tier: QualityTier, variant: HeartVariant) -> SceneConfig {
    let healthy = variant == HeartVariant::Healthy;

    // Base + key are always present.
    let mut lights = vec![
        Light::ambient(if healthy { 0.8 } else { 1.2 }),
        Light::directional([0.0, 10.0, 5.0], if healthy { 1.0 } else { 1.2 }),
    ];

    if tier >= QualityTier::Medium {
        // Front fill to show surface detail, side points for dimension.
        lights.push(Light::point([0.0, 0.0, 5.0], if healthy { 0.8 } else { 1.0 }));
        lights.push(Light::point([5.0, 0.0, 0.0], 0.7));
        lights.push(Light::point([-5.0, 0.0, 0.0], 0.7));
    }

    let shadows = tier == QualityTier::High;
    if shadows {
        // Soft overhead spot; the key light starts casting too.
        lights.push(Light::spot([0.0, 10.0, 0.0], if healthy { 0.5 } else { 0.7 }, 0.6, 0.5).shadowed());
        lights[1] = lights[1].shadowed();
    }

    SceneConfig {
        lighting: LightingRig {
            lights,
            shadows_enabled: shadows,
        },
        camera: CameraConfig::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn composition_is_deterministic() {
        for &tier in QualityTier::all() {
            for &variant in HeartVariant::all() {
                assert_eq!(compose(tier, variant), compose(tier, variant));
            }
        }
    }

    #[test]
    fn low_tier_is_two_lights_no_shadows() {
        let config = compose(QualityTier::Low, HeartVariant::Healthy);
        assert_eq!(config.lighting.lights.len(), 2);
        assert!(!config.lighting.shadows_enabled);
        assert!(config.lighting.lights.iter().all(|l| !l.cast_shadow));
    }

    #[test]
    fn medium_tier_adds_fill_and_side_lights() {
        let config = compose(QualityTier::Medium, HeartVariant::Healthy);
        assert_eq!(config.lighting.lights.len(), 5);
        assert!(!config.lighting.shadows_enabled);
    }

    #[test]
    fn high_tier_enables_shadows_and_the_spot() {
        let config = compose(QualityTier::High, HeartVariant::Healthy);
        assert_eq!(config.lighting.lights.len(), 6);
        assert!(config.lighting.shadows_enabled);
        let spot = config
            .lighting
            .lights
            .iter()
            .find(|l| l.kind == LightKind::Spot)
            .expect("high tier carries the overhead spot");
        assert!(spot.cast_shadow);
        // The key directional casts too.
        assert!(config.lighting.lights[1].cast_shadow);
    }

    #[test]
    fn pathological_context_brightens_the_rig() {
        for &tier in QualityTier::all() {
            let healthy = compose(tier, HeartVariant::Healthy);
            let diseased = compose(tier, HeartVariant::Pathological);
            assert!(diseased.lighting.lights[0].intensity > healthy.lighting.lights[0].intensity);
            assert!(diseased.lighting.lights[1].intensity > healthy.lighting.lights[1].intensity);
        }
    }

    #[test]
    fn camera_matches_the_viewer_defaults() {
        let camera = compose(QualityTier::Medium, HeartVariant::Healthy).camera;
        assert_eq!(camera.position, [0.0, 0.0, 5.0]);
        assert_eq!(camera.fov_degrees, 45.0);
        assert_eq!((camera.min_distance, camera.max_distance), (3.0, 8.0));
        assert!(!camera.enable_pan);
        assert!(camera.enable_zoom);
    }
}
