#![forbid(unsafe_code)]

//! Scene-graph templates and owned instances.
//!
//! A loaded asset becomes an immutable [`SceneTemplate`]: a flat arena of
//! named nodes behind an `Arc`, shared by everyone who loaded the same URI.
//! All rendering state lives in [`ModelInstance`]s — owned clones of the
//! arena. Cloning before mutation is mandatory: it is what keeps one
//! comparison pane's highlight edits from bleeding into the other pane's
//! materials. The template is never written after construction.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::asset::HeartVariant;
use crate::material::Material;

/// One named sub-part of a scene with its surface material.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub name: String,
    pub material: Material,
}

impl Node {
    /// Create a node with the default material.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            material: Material::default(),
        }
    }

    /// Create a node with an explicit material.
    #[must_use]
    pub fn with_material(name: impl Into<String>, material: Material) -> Self {
        Self {
            name: name.into(),
            material,
        }
    }
}

#[derive(Debug)]
struct TemplateInner {
    name: String,
    nodes: Vec<Node>,
}

/// An immutable, shareable scene loaded from one asset.
#[derive(Debug, Clone)]
pub struct SceneTemplate {
    inner: Arc<TemplateInner>,
}

impl PartialEq for SceneTemplate {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
            || (self.inner.name == other.inner.name && self.inner.nodes == other.inner.nodes)
    }
}

impl SceneTemplate {
    /// Build a template from its parts.
    #[must_use]
    pub fn new(name: impl Into<String>, nodes: Vec<Node>) -> Self {
        Self {
            inner: Arc::new(TemplateInner {
                name: name.into(),
                nodes,
            }),
        }
    }

    /// The scene's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// The template's nodes, read-only.
    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.inner.nodes
    }

    /// Clone the arena into a fresh, independently mutable instance.
    #[must_use]
    pub fn instantiate(&self, variant: HeartVariant) -> ModelInstance {
        ModelInstance {
            template: self.clone(),
            nodes: self.inner.nodes.clone(),
            variant,
            highlighted: BTreeSet::new(),
            transform: Transform::default(),
        }
    }
}

/// Gross size presentation of a heart instance.
///
/// Conditions like heart failure present an enlarged silhouette; the base
/// scale factor multiplies the per-frame beat scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SizeClass {
    #[default]
    Normal,
    Enlarged,
    Reduced,
}

impl SizeClass {
    /// The base uniform scale applied to the instance root.
    #[must_use]
    pub const fn base_scale(&self) -> f64 {
        match self {
            Self::Normal => 2.5,
            Self::Enlarged => 2.7,
            Self::Reduced => 2.3,
        }
    }
}

/// Root transform of an instance: uniform scale plus yaw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub scale: f64,
    pub yaw: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self { scale: 1.0, yaw: 0.0 }
    }
}

/// Lowercase a name and strip all whitespace, the normalization used for
/// highlight-region matching.
#[must_use]
pub fn normalize_region_name(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// One live, exclusively owned copy of a loaded asset.
///
/// Created by [`SceneTemplate::instantiate`]; dropped (and re-derived) on
/// tier, variant, or highlight-set changes. Never shared between managers.
#[derive(Debug, Clone)]
pub struct ModelInstance {
    template: SceneTemplate,
    nodes: Vec<Node>,
    variant: HeartVariant,
    highlighted: BTreeSet<String>,
    transform: Transform,
}

impl ModelInstance {
    /// The variant this instance was cloned for.
    #[must_use]
    pub fn variant(&self) -> HeartVariant {
        self.variant
    }

    /// The instance's nodes.
    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Mutable access for material passes (simplification, variant marks).
    pub fn nodes_mut(&mut self) -> &mut [Node] {
        &mut self.nodes
    }

    /// The normalized names of currently highlighted regions.
    #[must_use]
    pub fn highlighted_regions(&self) -> &BTreeSet<String> {
        &self.highlighted
    }

    /// Current root transform.
    #[must_use]
    pub fn transform(&self) -> Transform {
        self.transform
    }

    /// Set the root transform for this frame.
    pub fn set_transform(&mut self, scale: f64, yaw: f64) {
        self.transform = Transform { scale, yaw };
    }

    /// Restore every node's material to the template's original.
    ///
    /// Node *count* and *names* are template-fixed, so this is a straight
    /// per-index copy.
    pub fn reset_materials(&mut self) {
        for (node, original) in self.nodes.iter_mut().zip(self.template.nodes()) {
            node.material = original.material;
        }
        self.highlighted.clear();
    }

    /// Replace the material of every node whose name matches one of
    /// `regions` (case-insensitive, whitespace-normalized substring match)
    /// with the fixed highlight material. Non-matching nodes are untouched.
    ///
    /// Matching is applied on top of whatever materials the nodes currently
    /// carry; callers wanting idempotence reset first (the instance manager
    /// does). Returns the number of nodes highlighted.
    pub fn apply_highlights<S: AsRef<str>>(&mut self, regions: &[S]) -> usize {
        let wanted: Vec<String> = regions
            .iter()
            .map(|r| normalize_region_name(r.as_ref()))
            .filter(|r| !r.is_empty())
            .collect();
        if wanted.is_empty() {
            return 0;
        }

        let mut hits = 0;
        for node in &mut self.nodes {
            let name = normalize_region_name(&node.name);
            if wanted.iter().any(|w| name.contains(w.as_str())) {
                node.material = Material::highlight();
                hits += 1;
            }
        }
        for w in wanted {
            self.highlighted.insert(w);
        }
        hits
    }
}
