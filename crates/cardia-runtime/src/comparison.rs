#![forbid(unsafe_code)]

//! Healthy-versus-condition comparison mode.
//!
//! Two instance managers — one per mesh variant — with a toggle that
//! cross-fades between them instead of popping. Each named condition
//! carries the highlight regions, animation profile, and size class the
//! pathological pane presents with; selecting a condition forwards its
//! highlight set to the manager before any load it triggers.

use std::time::Duration;

use web_time::Instant;

use cardia_core::clock::AnimationProfile;
use cardia_core::quality::QualityTier;
use cardia_scene::asset::{AssetCatalog, HeartVariant};
use cardia_scene::graph::{SceneTemplate, SizeClass};

use crate::instance::ModelInstanceManager;
use crate::loader::{AssetError, LoadRequest, LoadTicket};

/// How long the cross-fade between panes runs.
const TRANSITION: Duration = Duration::from_millis(300);

/// Opacity of the outgoing pane while the fade runs.
const FADE_OPACITY: f64 = 0.7;

/// Which pane is (or is becoming) visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeartView {
    Healthy,
    Condition,
}

impl HeartView {
    const fn other(self) -> Self {
        match self {
            Self::Healthy => Self::Condition,
            Self::Condition => Self::Healthy,
        }
    }
}

/// A named heart condition and how it presents on the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Condition {
    /// Stable identifier used by the tab selector.
    pub slug: &'static str,
    /// Display title.
    pub title: &'static str,
    /// Beat profile the condition animates with.
    pub profile: AnimationProfile,
    /// Gross size presentation.
    pub size: SizeClass,
    /// Regions to highlight on the pathological mesh.
    pub highlights: &'static [&'static str],
}

/// The built-in condition catalog, healthy first.
pub const CONDITIONS: &[Condition] = &[
    Condition {
        slug: "healthy",
        title: "Healthy Heart",
        profile: AnimationProfile::Normal,
        size: SizeClass::Normal,
        highlights: &[],
    },
    Condition {
        slug: "coronary-artery-disease",
        title: "Coronary Artery Disease",
        profile: AnimationProfile::Normal,
        size: SizeClass::Normal,
        highlights: &["coronary arteries"],
    },
    Condition {
        slug: "heart-failure",
        title: "Heart Failure",
        profile: AnimationProfile::Slow,
        size: SizeClass::Enlarged,
        highlights: &["ventricles"],
    },
    Condition {
        slug: "valve-disease",
        title: "Heart Valve Disease",
        profile: AnimationProfile::Irregular,
        size: SizeClass::Normal,
        highlights: &["valves"],
    },
    Condition {
        slug: "arrhythmia",
        title: "Arrhythmia",
        profile: AnimationProfile::Irregular,
        size: SizeClass::Normal,
        highlights: &["conduction system"],
    },
];

impl Condition {
    /// All known conditions.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        CONDITIONS
    }

    /// Look up a condition by slug.
    #[must_use]
    pub fn find(slug: &str) -> Option<&'static Self> {
        CONDITIONS.iter().find(|c| c.slug == slug)
    }
}

/// Drives the two-pane healthy/condition comparison.
pub struct ComparisonOrchestrator {
    healthy: ModelInstanceManager,
    condition: ModelInstanceManager,
    selected: &'static Condition,
    active: HeartView,
    fade: Option<(Instant, HeartView)>,
    tier: QualityTier,
}

impl ComparisonOrchestrator {
    /// Create the orchestrator with both managers over one catalog.
    #[must_use]
    pub fn new(catalog: AssetCatalog, tier: QualityTier) -> Self {
        Self {
            healthy: ModelInstanceManager::new(catalog.clone(), HeartVariant::Healthy),
            condition: ModelInstanceManager::new(catalog, HeartVariant::Pathological),
            selected: &CONDITIONS[0],
            active: HeartView::Healthy,
            fade: None,
            tier,
        }
    }

    /// Kick off the initial loads for both panes.
    pub fn initial_loads(&mut self) -> Vec<LoadRequest> {
        vec![self.healthy.request(self.tier), self.condition.request(self.tier)]
    }

    /// The currently selected condition.
    #[must_use]
    pub fn selected(&self) -> &'static Condition {
        self.selected
    }

    /// The pane currently (or about to be) shown.
    #[must_use]
    pub fn active_view(&self) -> HeartView {
        self.active
    }

    /// The beat profile the visible pane should animate with.
    ///
    /// The healthy pane always beats normally; the condition pane beats
    /// with the selected condition's profile.
    #[must_use]
    pub fn active_profile(&self) -> AnimationProfile {
        match self.active {
            HeartView::Healthy => AnimationProfile::Normal,
            HeartView::Condition => self.selected.profile,
        }
    }

    /// Both managers, for the render loop's per-frame pass.
    pub fn managers_mut(&mut self) -> [&mut ModelInstanceManager; 2] {
        [&mut self.healthy, &mut self.condition]
    }

    /// The manager behind the active pane.
    #[must_use]
    pub fn active_manager(&self) -> &ModelInstanceManager {
        match self.active {
            HeartView::Healthy => &self.healthy,
            HeartView::Condition => &self.condition,
        }
    }

    /// The healthy pane's manager.
    #[must_use]
    pub fn healthy_manager(&self) -> &ModelInstanceManager {
        &self.healthy
    }

    /// The condition pane's manager.
    #[must_use]
    pub fn condition_manager(&self) -> &ModelInstanceManager {
        &self.condition
    }

    /// Select a condition by slug; unknown slugs leave everything as-is.
    ///
    /// The condition pane's highlight set, size, and (if it has no instance
    /// yet) a fresh load are updated before anything becomes visible.
    pub fn select_condition(&mut self, slug: &str) -> Option<LoadRequest> {
        let condition = Condition::find(slug)?;
        self.selected = condition;
        // Forward presentation before the (re)load: a load that completes
        // later derives its materials from this set.
        self.condition.set_highlights(condition.highlights);
        self.condition.set_size(condition.size);
        match self.condition.instance() {
            Some(_) => None,
            None => Some(self.condition.request(self.tier)),
        }
    }

    /// Flip which pane is visible, fading rather than popping.
    ///
    /// Ignored while a fade is already running.
    pub fn toggle(&mut self, now: Instant) {
        if self.fade.is_none() {
            self.fade = Some((now, self.active.other()));
        }
    }

    /// Advance the fade; call once per frame.
    pub fn tick(&mut self, now: Instant) {
        if let Some((started, target)) = self.fade
            && now.saturating_duration_since(started) >= TRANSITION
        {
            self.active = target;
            self.fade = None;
        }
    }

    /// Whether a cross-fade is in progress.
    #[must_use]
    pub fn transitioning(&self) -> bool {
        self.fade.is_some()
    }

    /// Opacity for the visible pane: dimmed while fading, full otherwise.
    #[must_use]
    pub fn opacity(&self) -> f64 {
        if self.fade.is_some() { FADE_OPACITY } else { 1.0 }
    }

    /// Route a load completion to whichever manager owns the ticket.
    ///
    /// Returns a follow-up request when a fallback load is triggered.
    pub fn resolve(
        &mut self,
        ticket: LoadTicket,
        result: Result<SceneTemplate, AssetError>,
    ) -> Option<LoadRequest> {
        if self.healthy.owns(ticket) {
            self.healthy.resolve(ticket, result)
        } else if self.condition.owns(ticket) {
            self.condition.resolve(ticket, result)
        } else {
            tracing::debug!(?ticket, "completion for unknown manager ignored");
            None
        }
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
                Node::named("Ventricles"),
                Node::named("Coronary Arteries"),
                Node::named("Valves"),
            ],
        )
    }

    fn ready_orchestrator() -> ComparisonOrchestrator {
        let mut orchestrator = ComparisonOrchestrator::new(AssetCatalog::new(), QualityTier::Medium);
        for request in orchestrator.initial_loads() {
            orchestrator.resolve(request.ticket, Ok(template()));
        }
        orchestrator
    }

    #[test]
    fn catalog_covers_the_condition_tabs() {
        assert_eq!(Condition::all().len(), 5);
        for condition in Condition::all() {
            assert_eq!(Condition::find(condition.slug), Some(condition));
        }
        assert!(Condition::find("common-cold").is_none());
    }

    #[test]
    fn initial_loads_cover_both_variants() {
        let mut orchestrator = ComparisonOrchestrator::new(AssetCatalog::new(), QualityTier::Medium);
        let loads = orchestrator.initial_loads();
        assert_eq!(loads.len(), 2);
        assert_eq!(loads[0].uri, "models/heart.glb");
        assert_eq!(loads[1].uri, "models/unhealthy_heart.glb");
    }

    #[test]
    fn starts_on_the_healthy_pane() {
        let orchestrator = ready_orchestrator();
        assert_eq!(orchestrator.active_view(), HeartView::Healthy);
        assert_eq!(orchestrator.active_profile(), AnimationProfile::Normal);
        assert!(!orchestrator.transitioning());
        assert_eq!(orchestrator.opacity(), 1.0);
    }

    #[test]
    fn toggle_fades_then_flips() {
        let mut orchestrator = ready_orchestrator();
        let t0 = Instant::now();
        orchestrator.toggle(t0);
        assert!(orchestrator.transitioning());
        assert_eq!(orchestrator.opacity(), 0.7);
        // Still the old pane mid-fade.
        orchestrator.tick(t0 + Duration::from_millis(150));
        assert_eq!(orchestrator.active_view(), HeartView::Healthy);

        orchestrator.tick(t0 + Duration::from_millis(300));
        assert_eq!(orchestrator.active_view(), HeartView::Condition);
        assert!(!orchestrator.transitioning());
        assert_eq!(orchestrator.opacity(), 1.0);
    }

    #[test]
    fn toggle_during_fade_is_ignored() {
        let mut orchestrator = ready_orchestrator();
        let t0 = Instant::now();
        orchestrator.toggle(t0);
        orchestrator.toggle(t0 + Duration::from_millis(100));
        orchestrator.tick(t0 + Duration::from_millis(300));
        // One flip, not two.
        assert_eq!(orchestrator.active_view(), HeartView::Condition);
    }

    #[test]
    fn selecting_a_condition_highlights_before_showing() {
        let mut orchestrator = ready_orchestrator();
        let follow_up = orchestrator.select_condition("heart-failure");
        // Instance already loaded: re-derived in place, no new load.
        assert!(follow_up.is_none());
        assert_eq!(orchestrator.selected().slug, "heart-failure");

        let instance = orchestrator
            .condition_manager()
            .instance()
            .expect("condition instance ready");
        assert_eq!(instance.nodes()[0].material, Material::highlight());
        assert_ne!(instance.nodes()[1].material, Material::highlight());
    }

    #[test]
    fn selecting_before_load_forwards_highlights_into_the_load() {
        let mut orchestrator = ComparisonOrchestrator::new(AssetCatalog::new(), QualityTier::Medium);
        let request = orchestrator
            .select_condition("valve-disease")
            .expect("no instance yet, a load is issued");
        orchestrator.resolve(request.ticket, Ok(template()));

        let instance = orchestrator.condition_manager().instance().unwrap();
        assert_eq!(instance.nodes()[2].material, Material::highlight());
    }

    #[test]
    fn condition_profile_drives_the_active_pane() {
        let mut orchestrator = ready_orchestrator();
        orchestrator.select_condition("arrhythmia");
        assert_eq!(orchestrator.active_profile(), AnimationProfile::Normal);

        let t0 = Instant::now();
        orchestrator.toggle(t0);
        orchestrator.tick(t0 + TRANSITION);
        assert_eq!(orchestrator.active_profile(), AnimationProfile::Irregular);
    }

    #[test]
    fn unknown_slug_changes_nothing() {
        let mut orchestrator = ready_orchestrator();
        assert!(orchestrator.select_condition("common-cold").is_none());
        assert_eq!(orchestrator.selected().slug, "healthy");
    }

    #[test]
    fn heart_failure_presents_enlarged_and_slow() {
        let condition = Condition::find("heart-failure").unwrap();
        assert_eq!(condition.size, SizeClass::Enlarged);
        assert_eq!(condition.profile, AnimationProfile::Slow);
        let mut orchestrator = ready_orchestrator();
        orchestrator.select_condition("heart-failure");
        assert_eq!(orchestrator.condition_manager().size(), SizeClass::Enlarged);
    }
}
