#![forbid(unsafe_code)]

//! End-to-end: probe, load, gate, animate.
//!
//! The low-tier / healthy / 70 BPM / normal-profile walkthrough: rest at
//! t=0, peak contraction 10% into the first beat, back to rest by 40%.

use std::time::Duration;

use web_time::Instant;

use cardia_core::capability::{CapabilityThresholds, ProbeInputs, classify};
use cardia_core::quality::QualityTier;
use cardia_core::visibility::{GateConfig, ObserverRegistry};
use cardia_runtime::{ModelInstanceManager, RenderLoopController, StaticCatalog, ThreadedAssetLoader};
use cardia_scene::asset::{AssetCatalog, HeartVariant};
use cardia_scene::graph::{Node, SceneTemplate};
use cardia_scene::lighting;

const BEAT_70_BPM: f64 = 60.0 / 70.0;

fn heart_template() -> SceneTemplate {
    SceneTemplate::new(
        "heart",
        vec![Node::named("LeftVentricle"), Node::named("Aorta")],
    )
}

#[test]
fn low_tier_healthy_walkthrough() {
    // A phone-sized host with no discrete GPU classifies Low.
    let inputs = ProbeInputs {
        viewport_width: Some(390),
        mobile_hint: true,
        renderer: None,
    };
    let tier = classify(&inputs, &CapabilityThresholds::default());
    assert_eq!(tier, QualityTier::Low);

    // The low-tier rig is the two-light, shadowless one.
    let scene = lighting::compose(tier, HeartVariant::Healthy);
    assert!(!scene.lighting.shadows_enabled);

    // Load the low-tier healthy asset through the real loader.
    let fetcher = StaticCatalog::new().with("models/heart-low.glb", heart_template());
    let loader = ThreadedAssetLoader::new(Box::new(fetcher));
    let mut manager = ModelInstanceManager::new(AssetCatalog::new(), HeartVariant::Healthy);
    loader.submit(manager.request(tier));
    for (ticket, result) in loader.wait() {
        assert!(manager.resolve(ticket, result).is_none());
    }
    let instance = manager.instance().expect("low-tier asset loaded");
    // The low-tier policy flattened shading on the clone.
    assert!(instance.nodes().iter().all(|n| n.material.flat_shading));

    // Gate starts hidden: ticks do nothing.
    let mut registry = ObserverRegistry::new();
    let gate = registry.attach(GateConfig::default());
    let mut controller = RenderLoopController::new(gate.clone());
    controller.set_heart_rate(70.0);

    let t0 = Instant::now();
    let hidden = controller.tick(t0, &mut [&mut manager]);
    assert!(!hidden.rendered);

    // The region scrolls into view.
    registry.deliver(gate.region(), 0.5);

    // First visible tick anchors the animation clock at rest.
    let report = controller.tick(t0, &mut [&mut manager]);
    assert!(report.rendered);
    assert!((report.scale - 1.0).abs() < 1e-9);

    // 10% into the first beat: peak contraction.
    let peak = t0 + Duration::from_secs_f64(BEAT_70_BPM * 0.10);
    let report = controller.tick(peak, &mut [&mut manager]);
    assert!((report.scale - 1.08).abs() < 1e-6, "got {}", report.scale);
    let transform = manager.instance().unwrap().transform();
    assert!((transform.scale - 2.5 * report.scale).abs() < 1e-9);

    // By 40% into the beat the rest plateau is reached; tick just inside it
    // (instants are nanosecond-quantized, so not exactly on the boundary).
    let rest = t0 + Duration::from_secs_f64(BEAT_70_BPM * 0.42);
    let report = controller.tick(rest, &mut [&mut manager]);
    assert_eq!(report.scale, 1.0);
}

#[test]
fn telemetry_reports_once_per_second_of_ticks() {
    let mut registry = ObserverRegistry::new();
    let gate = registry.attach(GateConfig::default());
    registry.deliver(gate.region(), 1.0);
    let mut controller = RenderLoopController::new(gate);

    let t0 = Instant::now();
    let mut samples = Vec::new();
    // 16ms cadence for ~1.04s of frames.
    for k in 0..65u32 {
        let report = controller.tick(t0 + Duration::from_millis(u64::from(k) * 16), &mut []);
        samples.extend(report.fps);
    }
    assert_eq!(samples.len(), 1);
    let fps = samples[0].fps;
    assert!((59..=64).contains(&fps), "expected ~60, got {fps}");
}
