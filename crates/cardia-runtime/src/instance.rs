#![forbid(unsafe_code)]

//! Model instance lifecycle.
//!
//! A [`ModelInstanceManager`] owns at most one live [`ModelInstance`] and
//! the state machine around it:
//!
//! ```text
//! Idle ──request──▶ Loading ──resolve(Ok)──▶ Ready
//!                      │  ▲                    │
//!          resolve(Err)│  │retry / request     │ set_highlights /
//!                      ▼  │                    │ set_size (re-derive
//!                    Failed                    ▼  in place)
//! ```
//!
//! Tier and variant changes issue a new request; the in-flight load is
//! never mutated, and a result whose ticket is no longer the latest is
//! discarded (last-request-wins). A `NotFound` for a tier-specific asset
//! silently retries the medium-tier fallback so deployments with only the
//! medium meshes still render; every other failure is surfaced as
//! [`LoadState::Failed`] for the caller to offer a retry — an empty scene
//! is never shown silently.

use std::sync::atomic::{AtomicU32, Ordering};

use cardia_core::quality::QualityTier;
use cardia_scene::asset::{AssetCatalog, AssetDescriptor, HeartVariant};
use cardia_scene::graph::{ModelInstance, SceneTemplate, SizeClass};

use crate::loader::{AssetError, LoadRequest, LoadTicket};

static NEXT_OWNER: AtomicU32 = AtomicU32::new(1);

/// Where the manager is in its load lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    /// Nothing requested yet, or unmounted.
    Idle,
    /// A request is in flight.
    Loading,
    /// A live instance is available.
    Ready,
    /// The last load failed; see [`ModelInstanceManager::failure`].
    Failed,
}

#[derive(Debug)]
enum State {
    Idle,
    Loading {
        ticket: LoadTicket,
        descriptor: AssetDescriptor,
    },
    Ready(ModelInstance),
    Failed(AssetError),
}

/// Owns and animates one model instance for a (variant, tier) pair.
pub struct ModelInstanceManager {
    owner: u32,
    generation: u64,
    catalog: AssetCatalog,
    variant: HeartVariant,
    size: SizeClass,
    highlights: Vec<String>,
    last_tier: QualityTier,
    state: State,
}

impl ModelInstanceManager {
    /// Create a manager for one variant over the given catalog.
    #[must_use]
    pub fn new(catalog: AssetCatalog, variant: HeartVariant) -> Self {
        Self {
            owner: NEXT_OWNER.fetch_add(1, Ordering::Relaxed),
            generation: 0,
            catalog,
            variant,
            size: SizeClass::Normal,
            highlights: Vec::new(),
            last_tier: QualityTier::Medium,
            state: State::Idle,
        }
    }

    /// The variant this manager renders.
    #[must_use]
    pub fn variant(&self) -> HeartVariant {
        self.variant
    }

    /// Coarse load state.
    #[must_use]
    pub fn load_state(&self) -> LoadState {
        match self.state {
            State::Idle => LoadState::Idle,
            State::Loading { .. } => LoadState::Loading,
            State::Ready(_) => LoadState::Ready,
            State::Failed(_) => LoadState::Failed,
        }
    }

    /// The failure behind [`LoadState::Failed`], if any.
    #[must_use]
    pub fn failure(&self) -> Option<&AssetError> {
        match &self.state {
            State::Failed(err) => Some(err),
            _ => None,
        }
    }

    /// The live instance, if ready.
    #[must_use]
    pub fn instance(&self) -> Option<&ModelInstance> {
        match &self.state {
            State::Ready(instance) => Some(instance),
            _ => None,
        }
    }

    /// Whether `ticket` belongs to this manager (any generation).
    #[must_use]
    pub fn owns(&self, ticket: LoadTicket) -> bool {
        ticket.owner == self.owner
    }

    /// Begin loading the asset for `tier`. Any in-flight load is
    /// superseded, not cancelled: its result will arrive and be discarded.
    pub fn request(&mut self, tier: QualityTier) -> LoadRequest {
        self.last_tier = tier;
        let descriptor = self.catalog.select(tier, self.variant).clone();
        self.begin(descriptor)
    }

    /// Re-issue the last request after a failure.
    ///
    /// Returns `None` unless the manager is in [`LoadState::Failed`].
    pub fn retry(&mut self) -> Option<LoadRequest> {
        if matches!(self.state, State::Failed(_)) {
            Some(self.request(self.last_tier))
        } else {
            None
        }
    }

    fn begin(&mut self, descriptor: AssetDescriptor) -> LoadRequest {
        self.generation += 1;
        let ticket = LoadTicket {
            owner: self.owner,
            generation: self.generation,
        };
        let request = LoadRequest {
            uri: descriptor.uri.clone(),
            ticket,
        };
        tracing::info!(uri = %descriptor.uri, variant = %self.variant, "loading model asset");
        self.state = State::Loading { ticket, descriptor };
        request
    }

    /// Accept a load completion.
    ///
    /// Returns a follow-up [`LoadRequest`] when the completion triggers the
    /// medium-tier fallback; the caller submits it like any other request.
    pub fn resolve(
        &mut self,
        ticket: LoadTicket,
        result: Result<SceneTemplate, AssetError>,
    ) -> Option<LoadRequest> {
        if ticket.owner != self.owner || ticket.generation != self.generation {
            // Superseded (or foreign) result: drop it. Not an error.
            tracing::debug!(?ticket, "discarding stale load result");
            return None;
        }
        let State::Loading { descriptor, .. } = &self.state else {
            tracing::debug!(?ticket, "load result arrived outside Loading state");
            return None;
        };
        let descriptor = descriptor.clone();

        match result {
            Ok(template) => {
                self.state = State::Ready(self.derive_instance(&template, &descriptor));
                None
            }
            Err(AssetError::NotFound(uri))
                if !self.catalog.is_fallback(&descriptor, self.variant) =>
            {
                tracing::warn!(%uri, "tier asset missing, falling back to medium");
                let fallback = self.catalog.fallback(self.variant).clone();
                Some(self.begin(fallback))
            }
            Err(err) => {
                tracing::error!(error = %err, uri = %descriptor.uri, "model asset failed to load");
                self.state = State::Failed(err);
                None
            }
        }
    }

    /// Build the owned instance: clone the template, simplify materials per
    /// the tier policy, mark the pathological variant, apply highlights.
    fn derive_instance(&self, template: &SceneTemplate, descriptor: &AssetDescriptor) -> ModelInstance {
        let mut instance = template.instantiate(self.variant);
        for node in instance.nodes_mut() {
            node.material.simplify(&descriptor.policy);
            if self.variant == HeartVariant::Pathological {
                node.material.mark_pathological();
            }
        }
        instance.apply_highlights(&self.highlights);
        instance
    }

    /// Replace the highlight set.
    ///
    /// A ready instance re-derives its materials in place: reset to the
    /// template, re-simplify, re-mark, re-highlight. Applying the same set
    /// twice therefore leaves the instance visibly identical — no double
    /// tinting, no leaked intermediate materials.
    pub fn set_highlights<S: AsRef<str>>(&mut self, regions: &[S]) {
        self.highlights = regions.iter().map(|r| r.as_ref().to_string()).collect();
        self.rederive_in_place();
    }

    /// Set the gross size presentation.
    pub fn set_size(&mut self, size: SizeClass) {
        self.size = size;
    }

    /// Current size class.
    #[must_use]
    pub fn size(&self) -> SizeClass {
        self.size
    }

    fn rederive_in_place(&mut self) {
        let descriptor = match &self.state {
            State::Loading { descriptor, .. } => descriptor.clone(),
            _ => self.catalog.select(self.last_tier, self.variant).clone(),
        };
        if let State::Ready(instance) = &mut self.state {
            instance.reset_materials();
            for node in instance.nodes_mut() {
                node.material.simplify(&descriptor.policy);
            }
            if self.variant == HeartVariant::Pathological {
                for node in instance.nodes_mut() {
                    node.material.mark_pathological();
                }
            }
            instance.apply_highlights(&self.highlights);
        }
    }

    /// Apply this frame's beat scale and yaw to the instance root.
    ///
    /// The final uniform scale is the size-class base times the cycle
    /// scale. No-op unless an instance is ready.
    pub fn per_frame_update(&mut self, cycle_scale: f64, yaw: f64) {
        if let State::Ready(instance) = &mut self.state {
            instance.set_transform(self.size.base_scale() * cycle_scale, yaw);
        }
    }

    /// Drop the instance and invalidate any in-flight load.
    ///
    /// A pending result that arrives after this is stale by construction
    /// and will be discarded; no further per-frame work happens.
    pub fn unmount(&mut self) {
        self.generation += 1;
        self.state = State::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cardia_scene::graph::Node;
    use cardia_scene::material::Material;

    fn template() -> SceneTemplate {
        SceneTemplate::new(
            "heart",
            vec![
                Node::named("LeftVentricle"),
                Node::named("Coronary Arteries"),
                Node::named("Aorta"),
            ],
        )
    }

    fn manager(variant: HeartVariant) -> ModelInstanceManager {
        ModelInstanceManager::new(AssetCatalog::new(), variant)
    }

    #[test]
    fn request_then_resolve_reaches_ready() {
        let mut m = manager(HeartVariant::Healthy);
        let request = m.request(QualityTier::Medium);
        assert_eq!(request.uri, "models/heart.glb");
        assert_eq!(m.load_state(), LoadState::Loading);

        assert!(m.resolve(request.ticket, Ok(template())).is_none());
        assert_eq!(m.load_state(), LoadState::Ready);
        assert!(m.instance().is_some());
    }

    #[test]
    fn stale_result_is_discarded() {
        let mut m = manager(HeartVariant::Healthy);
        let first = m.request(QualityTier::Low);
        let second = m.request(QualityTier::High);

        // First resolves late: ignored, still loading the second.
        assert!(m.resolve(first.ticket, Ok(template())).is_none());
        assert_eq!(m.load_state(), LoadState::Loading);

        m.resolve(second.ticket, Ok(template()));
        assert_eq!(m.load_state(), LoadState::Ready);
    }

    #[test]
    fn not_found_falls_back_to_medium() {
        let mut m = manager(HeartVariant::Healthy);
        let request = m.request(QualityTier::High);

        let follow_up = m
            .resolve(request.ticket, Err(AssetError::NotFound(request.uri.clone())))
            .expect("fallback request");
        assert_eq!(follow_up.uri, "models/heart.glb");
        assert_eq!(m.load_state(), LoadState::Loading);

        m.resolve(follow_up.ticket, Ok(template()));
        assert_eq!(m.load_state(), LoadState::Ready);
    }

    #[test]
    fn not_found_on_the_fallback_itself_fails() {
        let mut m = manager(HeartVariant::Healthy);
        let request = m.request(QualityTier::Medium);
        let follow_up = m.resolve(request.ticket, Err(AssetError::NotFound(request.uri.clone())));
        assert!(follow_up.is_none());
        assert_eq!(m.load_state(), LoadState::Failed);
    }

    #[test]
    fn fetch_failure_surfaces_and_retry_reissues() {
        let mut m = manager(HeartVariant::Healthy);
        let request = m.request(QualityTier::Medium);
        m.resolve(request.ticket, Err(AssetError::Fetch("offline".into())));
        assert_eq!(m.load_state(), LoadState::Failed);
        assert_eq!(m.failure(), Some(&AssetError::Fetch("offline".into())));

        let retry = m.retry().expect("retry from Failed");
        assert_eq!(retry.uri, "models/heart.glb");
        assert_eq!(m.load_state(), LoadState::Loading);
    }

    #[test]
    fn retry_outside_failed_is_noop() {
        let mut m = manager(HeartVariant::Healthy);
        assert!(m.retry().is_none());
        let request = m.request(QualityTier::Medium);
        assert!(m.retry().is_none());
        m.resolve(request.ticket, Ok(template()));
        assert!(m.retry().is_none());
    }

    #[test]
    fn highlights_apply_and_are_idempotent() {
        let mut m = manager(HeartVariant::Healthy);
        let request = m.request(QualityTier::Medium);
        m.resolve(request.ticket, Ok(template()));

        m.set_highlights(&["coronary arteries"]);
        let once: Vec<_> = m.instance().unwrap().nodes().to_vec();
        assert_eq!(once[1].material, Material::highlight());
        assert_ne!(once[0].material, Material::highlight());

        // Applying the same set again changes nothing visible.
        m.set_highlights(&["coronary arteries"]);
        let twice: Vec<_> = m.instance().unwrap().nodes().to_vec();
        assert_eq!(once, twice);
    }

    #[test]
    fn clearing_highlights_restores_tier_materials() {
        let mut m = manager(HeartVariant::Healthy);
        let request = m.request(QualityTier::Medium);
        m.resolve(request.ticket, Ok(template()));

        m.set_highlights(&["aorta"]);
        assert_eq!(m.instance().unwrap().nodes()[2].material, Material::highlight());

        m.set_highlights::<&str>(&[]);
        let restored = m.instance().unwrap().nodes()[2].material;
        assert_ne!(restored, Material::highlight());
        // The tier policy is still applied after the reset.
        assert!(restored.roughness >= 0.7);
    }

    #[test]
    fn highlights_set_before_load_apply_on_ready() {
        let mut m = manager(HeartVariant::Healthy);
        m.set_highlights(&["ventricle"]);
        let request = m.request(QualityTier::Medium);
        m.resolve(request.ticket, Ok(template()));
        assert_eq!(m.instance().unwrap().nodes()[0].material, Material::highlight());
    }

    #[test]
    fn pathological_variant_marks_materials() {
        let mut m = manager(HeartVariant::Pathological);
        let request = m.request(QualityTier::Medium);
        assert_eq!(request.uri, "models/unhealthy_heart.glb");
        m.resolve(request.ticket, Ok(template()));

        let material = m.instance().unwrap().nodes()[0].material;
        assert_eq!(material.emissive_intensity, 0.2);
        assert!(material.metalness > 0.0);
    }

    #[test]
    fn per_frame_update_combines_size_and_cycle_scale() {
        let mut m = manager(HeartVariant::Healthy);
        let request = m.request(QualityTier::Medium);
        m.resolve(request.ticket, Ok(template()));
        m.set_size(SizeClass::Enlarged);

        m.per_frame_update(1.08, 0.05);
        let transform = m.instance().unwrap().transform();
        assert!((transform.scale - 2.7 * 1.08).abs() < 1e-9);
        assert_eq!(transform.yaw, 0.05);
    }

    #[test]
    fn unmount_discards_late_results() {
        let mut m = manager(HeartVariant::Healthy);
        let request = m.request(QualityTier::Medium);
        m.unmount();
        assert_eq!(m.load_state(), LoadState::Idle);

        assert!(m.resolve(request.ticket, Ok(template())).is_none());
        assert_eq!(m.load_state(), LoadState::Idle);
        assert!(m.instance().is_none());
    }

    #[test]
    fn tickets_are_scoped_per_manager() {
        let mut a = manager(HeartVariant::Healthy);
        let mut b = manager(HeartVariant::Pathological);
        let request_a = a.request(QualityTier::Medium);
        let request_b = b.request(QualityTier::Medium);

        assert!(a.owns(request_a.ticket));
        assert!(!a.owns(request_b.ticket));

        // A ticket delivered to the wrong manager is ignored.
        assert!(b.resolve(request_a.ticket, Ok(template())).is_none());
        assert_eq!(b.load_state(), LoadState::Loading);
    }
}
